//! Stage template loading.
//!
//! Templates resolve in order:
//! 1. An override directory: `[prompts] dir` from the project config, or the
//!    user-level `<config_dir>/review-suite/prompts/`
//! 2. The packaged defaults compiled into the binary from `prompts/`
//!
//! A leading front-matter block is stripped:
//!
//! ```text
//! ---
//! description: Correctness lens
//! ---
//! # Correctness Review
//! {{SCOPE}}
//! ```

use super::TemplateSource;
use rust_embed::RustEmbed;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// File extension for template files.
pub const TEMPLATE_EXT: &str = "md";

#[derive(RustEmbed)]
#[folder = "prompts/"]
struct PackagedPrompts;

/// Metadata carried in a template's front matter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TemplateMeta {
    #[serde(default)]
    pub description: Option<String>,
}

/// A loaded template body plus its metadata.
#[derive(Debug, Clone)]
pub struct Template {
    pub name: String,
    pub meta: TemplateMeta,
    pub body: String,
    /// Override file this came from; `None` for packaged defaults.
    pub path: Option<PathBuf>,
}

/// Loads and caches stage templates.
#[derive(Debug)]
pub struct TemplateLoader {
    override_dir: Option<PathBuf>,
    cache: HashMap<String, Template>,
}

impl TemplateLoader {
    /// Loader with the given override directory (may not exist).
    pub fn new(override_dir: Option<PathBuf>) -> Self {
        Self {
            override_dir,
            cache: HashMap::new(),
        }
    }

    /// Loader using the user-level override directory.
    pub fn with_user_overrides() -> Self {
        Self::new(user_prompts_dir())
    }

    /// Loader that only sees the packaged defaults.
    pub fn packaged_only() -> Self {
        Self::new(None)
    }

    pub fn override_dir(&self) -> Option<&Path> {
        self.override_dir.as_deref()
    }

    /// Resolve a template by name.
    ///
    /// Returns `None` when neither an override nor a packaged default exists.
    pub fn template(&mut self, name: &str) -> Option<Template> {
        if let Some(cached) = self.cache.get(name) {
            return Some(cached.clone());
        }

        let template = self
            .load_override(name)
            .or_else(|| load_packaged(name))?;
        self.cache.insert(name.to_string(), template.clone());
        Some(template)
    }

    fn load_override(&self, name: &str) -> Option<Template> {
        let path = self
            .override_dir
            .as_ref()?
            .join(format!("{}.{}", name, TEMPLATE_EXT));
        if !path.is_file() {
            return None;
        }

        match std::fs::read_to_string(&path) {
            Ok(raw) => {
                tracing::debug!(template = name, path = %path.display(), "using template override");
                Some(parse_template(name, &raw, Some(path)))
            }
            Err(e) => {
                tracing::warn!(
                    template = name,
                    path = %path.display(),
                    error = %e,
                    "failed to read template override, using packaged default"
                );
                None
            }
        }
    }
}

impl TemplateSource for TemplateLoader {
    fn load(&mut self, name: &str) -> String {
        self.template(name).map(|t| t.body).unwrap_or_default()
    }
}

/// `<config_dir>/review-suite/prompts`, if the platform has a config dir.
pub fn user_prompts_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("review-suite").join("prompts"))
}

/// Names of the packaged default templates.
pub fn packaged_template_names() -> Vec<String> {
    let mut names: Vec<String> = PackagedPrompts::iter()
        .filter_map(|file| {
            file.strip_suffix(&format!(".{}", TEMPLATE_EXT))
                .map(str::to_string)
        })
        .collect();
    names.sort();
    names
}

fn load_packaged(name: &str) -> Option<Template> {
    let file = PackagedPrompts::get(&format!("{}.{}", name, TEMPLATE_EXT))?;
    let raw = String::from_utf8_lossy(&file.data);
    Some(parse_template(name, &raw, None))
}

fn parse_template(name: &str, raw: &str, path: Option<PathBuf>) -> Template {
    let (front_matter, body) = split_front_matter(raw);

    let meta = match front_matter {
        Some(yaml) if !yaml.trim().is_empty() => {
            serde_yaml::from_str(yaml).unwrap_or_else(|e| {
                tracing::warn!(template = name, error = %e, "ignoring malformed front matter");
                TemplateMeta::default()
            })
        }
        _ => TemplateMeta::default(),
    };

    Template {
        name: name.to_string(),
        meta,
        body: body.to_string(),
        path,
    }
}

/// Split a leading `---` block from the body.
///
/// Text without a complete front-matter block is returned unchanged as body.
pub fn split_front_matter(raw: &str) -> (Option<&str>, &str) {
    let Some(rest) = raw
        .strip_prefix("---\n")
        .or_else(|| raw.strip_prefix("---\r\n"))
    else {
        return (None, raw);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let meta = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return (Some(meta), body);
        }
        offset += line.len();
    }

    (None, raw)
}
