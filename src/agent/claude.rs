use super::stream::{StreamEvent, describe_tool_use, snippet, tool_emoji};
use super::{Agent, render_transcript};
use crate::conversation::{ContentBlock, Role, Turn};
use crate::errors::SuiteError;
use crate::suite_config::SuiteToml;
use crate::ui::SessionUI;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tokio::task::JoinHandle;

/// Aborts the wrapped task when dropped, so a cancelled turn takes its
/// helpers down with it.
struct AbortOnDrop(JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Runs each turn through the agent CLI in print mode.
pub struct ClaudeAgent {
    cmd: String,
    allowed_tools: Vec<String>,
    extra_args: Vec<String>,
    project_dir: PathBuf,
    ui: Option<Arc<SessionUI>>,
}

impl ClaudeAgent {
    pub fn new(cmd: impl Into<String>, project_dir: PathBuf) -> Self {
        Self {
            cmd: cmd.into(),
            allowed_tools: Vec::new(),
            extra_args: Vec::new(),
            project_dir,
            ui: None,
        }
    }

    pub fn from_config(config: &SuiteToml, project_dir: PathBuf) -> Self {
        Self {
            cmd: config.agent_cmd(),
            allowed_tools: config.agent.allowed_tools.clone(),
            extra_args: config.agent.extra_args.clone(),
            project_dir,
            ui: None,
        }
    }

    pub fn with_ui(mut self, ui: Arc<SessionUI>) -> Self {
        self.ui = Some(ui);
        self
    }

    /// Arguments passed to the agent CLI.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "--print".to_string(),
            "--output-format".to_string(),
            "stream-json".to_string(),
            "--verbose".to_string(),
        ];
        if !self.allowed_tools.is_empty() {
            args.push("--allowedTools".to_string());
            args.push(self.allowed_tools.join(","));
        }
        args.extend(self.extra_args.iter().cloned());
        args
    }

    fn log_step(&self, msg: &str) {
        tracing::debug!("{msg}");
        if let Some(ui) = &self.ui {
            ui.log_step(msg);
        }
    }
}

#[async_trait]
impl Agent for ClaudeAgent {
    async fn respond(&self, history: &[Turn]) -> Result<Vec<Turn>> {
        let prompt = render_transcript(history);
        let args = self.args();
        let start = Instant::now();

        self.log_step(&format!("Spawning: {} {}", self.cmd, args.join(" ")));

        let mut child = Command::new(&self.cmd)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .current_dir(&self.project_dir)
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to spawn agent process '{}'", self.cmd))?;

        if let Some(mut stdin) = child.stdin.take() {
            self.log_step(&format!("Writing {} chars to stdin...", prompt.len()));
            stdin.write_all(prompt.as_bytes()).await?;
            stdin.shutdown().await.context("Failed to close stdin")?;
        }

        let stdout = child.stdout.take().context("Failed to get stdout")?;
        let mut reader = BufReader::new(stdout).lines();

        let ui_clone = self.ui.clone();
        let elapsed_task = AbortOnDrop(tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(10));
            interval.tick().await;
            loop {
                interval.tick().await;
                if let Some(ui) = &ui_clone {
                    ui.update_elapsed(start.elapsed());
                }
            }
        }));

        let mut turns: Vec<Turn> = Vec::new();
        let mut final_result: Option<String> = None;
        let mut is_error = false;
        let mut stray_output = String::new();

        while let Some(line) = reader.next_line().await? {
            if line.is_empty() {
                continue;
            }

            match serde_json::from_str::<StreamEvent>(&line) {
                Ok(StreamEvent::Assistant { message, .. }) => {
                    let turn = message.into_turn();
                    if let Some(ui) = &self.ui {
                        for block in &turn.content {
                            match block {
                                ContentBlock::ToolUse { name, input } => {
                                    ui.show_tool_use(
                                        tool_emoji(name),
                                        &describe_tool_use(name, input),
                                    );
                                }
                                ContentBlock::Text { text } => {
                                    let s = snippet(text, 60);
                                    if !s.is_empty() {
                                        ui.show_thinking(&s);
                                    }
                                }
                            }
                        }
                    }
                    turns.push(turn);
                }
                Ok(StreamEvent::User { message }) => {
                    if let Some(output) = message.and_then(|m| m.tool_output()) {
                        turns.push(Turn::tool_result(output));
                    }
                }
                Ok(StreamEvent::Result {
                    result,
                    is_error: err,
                    ..
                }) => {
                    final_result = result;
                    is_error = err;
                }
                Ok(StreamEvent::System { .. }) => {}
                Err(_) => {
                    stray_output.push_str(&line);
                    stray_output.push('\n');
                }
            }
        }

        let status = child.wait().await?;
        drop(elapsed_task);

        let exit_code = status.code().unwrap_or(-1);
        self.log_step(&format!(
            "Completed in {:.1}s (exit: {})",
            start.elapsed().as_secs_f64(),
            exit_code
        ));

        if is_error || !status.success() {
            let detail = final_result
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| stray_output.trim().to_string());
            return Err(SuiteError::Agent(format!("exit code {exit_code}: {detail}")).into());
        }

        let has_text = turns
            .iter()
            .any(|t| t.role == Role::Assistant && !t.text().is_empty());
        if !has_text && let Some(result) = final_result {
            turns.push(Turn::assistant(result));
        }

        Ok(turns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_include_stream_json_and_tools() {
        let mut config = SuiteToml::default();
        config.agent.allowed_tools = vec!["Read".into(), "Grep".into()];
        config.agent.extra_args = vec!["--model".into(), "opus".into()];
        let agent = ClaudeAgent::from_config(&config, PathBuf::from("."));

        let args = agent.args();
        assert_eq!(&args[..3], ["--print", "--output-format", "stream-json"]);
        let tools = args.iter().position(|a| a == "--allowedTools").unwrap();
        assert_eq!(args[tools + 1], "Read,Grep");
        assert_eq!(&args[args.len() - 2..], ["--model", "opus"]);
    }

    #[test]
    fn args_omit_tools_flag_when_empty() {
        let agent = ClaudeAgent::new("claude", PathBuf::from("."));
        assert!(!agent.args().iter().any(|a| a == "--allowedTools"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn parses_turns_from_a_scripted_cli() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-agent");
        std::fs::write(
            &script,
            r#"#!/bin/sh
cat > /dev/null
echo '{"type":"system","subtype":"init"}'
echo '{"type":"assistant","message":{"content":[{"type":"tool_use","name":"Bash","input":{"command":"git diff"},"id":"1"}]}}'
echo '{"type":"user","message":{"content":[{"type":"tool_result","tool_use_id":"1","content":"diff --git"}]}}'
echo '{"type":"assistant","message":{"content":[{"type":"text","text":"Looks fine. <review-stage-complete/>"}]}}'
echo '{"type":"result","subtype":"success","result":"Looks fine.","is_error":false}'
"#,
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let agent = ClaudeAgent::new(script.to_string_lossy(), dir.path().to_path_buf());
        let turns = agent.respond(&[Turn::user("review")]).await.unwrap();

        assert_eq!(turns.len(), 3);
        assert_eq!(turns[1], Turn::tool_result("diff --git"));
        assert!(turns[2].text().starts_with("Looks fine."));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_cli_is_an_agent_error() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fail-agent");
        std::fs::write(&script, "#!/bin/sh\ncat > /dev/null\necho boom\nexit 3\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let agent = ClaudeAgent::new(script.to_string_lossy(), dir.path().to_path_buf());
        let err = agent.respond(&[Turn::user("review")]).await.unwrap_err();

        let suite_err = err.downcast_ref::<SuiteError>().unwrap();
        assert!(matches!(suite_err, SuiteError::Agent(msg) if msg.contains("exit code 3") && msg.contains("boom")));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn cancelled_turn_releases_the_ui() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("slow-agent");
        std::fs::write(&script, "#!/bin/sh\ncat > /dev/null\nsleep 5\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let ui = Arc::new(SessionUI::hidden());
        let agent = ClaudeAgent::new(script.to_string_lossy(), dir.path().to_path_buf())
            .with_ui(ui.clone());
        let held = Arc::strong_count(&ui);

        let history = [Turn::user("review")];
        let outcome =
            tokio::time::timeout(Duration::from_millis(500), agent.respond(&history)).await;
        assert!(outcome.is_err(), "slow agent should still be running");
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(Arc::strong_count(&ui), held);
    }
}
