//! Project configuration for the review suite.
//!
//! Read from `.review-suite/config.toml`; a missing file means defaults.
//! Layering is file → environment → CLI.
//!
//! # Configuration File Format
//!
//! ```toml
//! [agent]
//! cmd = "claude"
//! allowed_tools = ["Read", "Glob", "Grep", "Bash(git diff:*)"]
//! extra_args = ["--model", "opus"]
//!
//! [suite]
//! fresh_context = true
//! show_freshness = true
//!
//! [prompts]
//! dir = "~/my-review-prompts"
//! ```

use crate::prompt::templates::{TemplateLoader, packaged_template_names};
use crate::suite::SuiteOptions;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the per-project configuration directory.
pub const CONFIG_DIR: &str = ".review-suite";

/// Name of the configuration file inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "config.toml";

/// Environment variable overriding `[agent] cmd`.
pub const AGENT_CMD_ENV: &str = "REVIEW_SUITE_AGENT_CMD";

/// Agent CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSection {
    /// Agent CLI command (default: "claude")
    #[serde(default)]
    pub cmd: Option<String>,
    /// Tools the agent may use; reviews are read-only
    #[serde(default = "default_allowed_tools")]
    pub allowed_tools: Vec<String>,
    /// Extra arguments passed verbatim to the agent CLI
    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_allowed_tools() -> Vec<String> {
    [
        "Read",
        "Glob",
        "Grep",
        "Bash(git status:*)",
        "Bash(git diff:*)",
        "Bash(git log:*)",
        "Bash(git show:*)",
        "Bash(gh pr view:*)",
        "Bash(gh pr diff:*)",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            cmd: None,
            allowed_tools: default_allowed_tools(),
            extra_args: Vec::new(),
        }
    }
}

/// Suite behaviour settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteSection {
    /// Hide earlier stages from later review stages
    #[serde(default = "default_true")]
    pub fresh_context: bool,
    /// Show a freshness indicator in the status line
    #[serde(default = "default_true")]
    pub show_freshness: bool,
}

fn default_true() -> bool {
    true
}

impl Default for SuiteSection {
    fn default() -> Self {
        Self {
            fresh_context: true,
            show_freshness: true,
        }
    }
}

/// Template override settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptsSection {
    /// Directory searched before the packaged templates. Replaces the
    /// user-level directory when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

/// The complete config.toml structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SuiteToml {
    #[serde(default)]
    pub agent: AgentSection,
    #[serde(default)]
    pub suite: SuiteSection,
    #[serde(default)]
    pub prompts: PromptsSection,
}

impl SuiteToml {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config.toml")
    }

    /// Load from `<project>/.review-suite/config.toml`, or defaults if absent.
    pub fn load_or_default(project_dir: &Path) -> Result<Self> {
        let path = config_path(project_dir);
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Agent command, with fallback to the environment variable.
    pub fn agent_cmd(&self) -> String {
        if let Ok(cmd) = std::env::var(AGENT_CMD_ENV)
            && !cmd.trim().is_empty()
        {
            return cmd;
        }
        self.agent
            .cmd
            .clone()
            .unwrap_or_else(|| "claude".to_string())
    }

    /// Options for new suite runs.
    pub fn suite_options(&self) -> SuiteOptions {
        SuiteOptions {
            fresh_context: self.suite.fresh_context,
            show_freshness: self.suite.show_freshness,
        }
    }

    /// Template override directory, with `~` expanded.
    pub fn prompts_dir(&self) -> Option<PathBuf> {
        self.prompts.dir.as_deref().map(expand_home)
    }

    /// Template loader honouring `[prompts] dir`, else the user-level directory.
    pub fn template_loader(&self) -> TemplateLoader {
        match self.prompts_dir() {
            Some(dir) => TemplateLoader::new(Some(dir)),
            None => TemplateLoader::with_user_overrides(),
        }
    }

    /// Validate the configuration and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if let Some(cmd) = &self.agent.cmd
            && cmd.trim().is_empty()
        {
            warnings.push("[agent] cmd is empty; falling back to 'claude'".to_string());
        }

        if self.agent.allowed_tools.is_empty() {
            warnings.push(
                "[agent] allowed_tools is empty; the agent will not be able to inspect the change"
                    .to_string(),
            );
        }

        if let Some(dir) = self.prompts_dir() {
            if dir.is_dir() {
                warnings.extend(unknown_overrides(&dir));
            } else {
                warnings.push(format!(
                    "[prompts] dir '{}' does not exist; packaged templates will be used",
                    dir.display()
                ));
            }
        }

        if !self.suite.fresh_context {
            warnings.push(
                "[suite] fresh_context is off; later review stages will see earlier findings"
                    .to_string(),
            );
        }

        warnings
    }
}

/// `<project>/.review-suite/config.toml`
pub fn config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(CONFIG_DIR).join(CONFIG_FILE)
}

/// Template files in `dir` that no stage will ever load.
fn unknown_overrides(dir: &Path) -> Vec<String> {
    let known = packaged_template_names();
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut unknown: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "md"))
        .filter_map(|path| {
            let stem = path.file_stem()?.to_str()?.to_string();
            (!known.contains(&stem)).then_some(stem)
        })
        .collect();
    unknown.sort();

    unknown
        .into_iter()
        .map(|stem| format!("[prompts] '{stem}.md' does not match any stage template"))
        .collect()
}

fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}
