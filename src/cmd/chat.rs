//! Interactive session: `review-suite chat`.
//!
//! Plain text is a chat turn. `/review [TARGET...]` starts a suite run and
//! `/quit` exits. Typing while a run is active interrupts it.

use anyhow::{Context, Result};
use dialoguer::Input;
use std::path::Path;
use std::sync::Arc;

use review_suite::errors::SuiteError;
use review_suite::hooks::InputSource;
use review_suite::suite::{NotifyLevel, Transition};
use review_suite::ui::SessionUI;

use super::review::{load_config, new_session, resolve_target, run_suite};

enum Command<'a> {
    Quit,
    Review(Vec<String>),
    Chat(&'a str),
}

fn parse_line(line: &str) -> Command<'_> {
    let trimmed = line.trim();
    match trimmed.split_once(char::is_whitespace) {
        _ if trimmed == "/quit" || trimmed == "/exit" => Command::Quit,
        _ if trimmed == "/review" => Command::Review(Vec::new()),
        Some(("/review", rest)) => {
            Command::Review(rest.split_whitespace().map(str::to_string).collect())
        }
        _ => Command::Chat(trimmed),
    }
}

/// Setup errors leave the session usable, so they are only warnings.
fn error_level(err: &anyhow::Error) -> NotifyLevel {
    match err.downcast_ref::<SuiteError>() {
        Some(e) if e.is_setup_error() => NotifyLevel::Warning,
        _ => NotifyLevel::Error,
    }
}

fn report_error(ui: &SessionUI, err: &anyhow::Error) {
    ui.notify(error_level(err), &format!("{err:#}"));
}

pub async fn cmd_chat(project_dir: &Path, verbose: bool) -> Result<()> {
    let config = load_config(project_dir)?;
    let ui = Arc::new(SessionUI::new(verbose));
    let mut session = new_session(project_dir, &config, ui.clone());

    println!("Chat with the agent. /review [TARGET] runs the review suite, /quit exits.");

    loop {
        let line: String = Input::new()
            .with_prompt(">")
            .allow_empty(true)
            .interact_text()
            .context("Failed to read input")?;

        match parse_line(&line) {
            Command::Quit => break,
            Command::Chat("") => continue,
            Command::Review(args) => {
                let target = match resolve_target(project_dir, &args) {
                    Ok(Some(target)) => target,
                    Ok(None) => continue,
                    Err(e) => {
                        report_error(&ui, &e);
                        continue;
                    }
                };
                ui.print_suite_header(&target.to_string(), config.suite.fresh_context);
                match run_suite(&mut session, target).await {
                    Ok(Transition::Completed { report }) => {
                        ui.print_report("Review suite report", &report)
                    }
                    Ok(_) => {}
                    Err(e) => report_error(&ui, &e),
                }
            }
            Command::Chat(text) => {
                let finished = tokio::select! {
                    outcome = session.submit(text, InputSource::Interactive) => Some(outcome),
                    _ = tokio::signal::ctrl_c() => None,
                };
                match finished {
                    Some(Ok(_)) => {
                        if let Some(answer) = session.last_answer() {
                            ui.print_report("Agent", &answer);
                        }
                    }
                    Some(Err(e)) => report_error(&ui, &e),
                    None => {
                        session.interrupt();
                    }
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert!(matches!(parse_line("/quit"), Command::Quit));
        assert!(matches!(parse_line("  /exit "), Command::Quit));
        assert!(matches!(parse_line("/review"), Command::Review(a) if a.is_empty()));
        assert!(matches!(
            parse_line("/review pr 42"),
            Command::Review(a) if a == ["pr", "42"]
        ));
        assert!(matches!(parse_line("/reviewer"), Command::Chat("/reviewer")));
        assert!(matches!(parse_line("hello there"), Command::Chat("hello there")));
    }

    #[test]
    fn setup_errors_are_warnings() {
        let invalid: anyhow::Error = SuiteError::invalid_target("pr 0", "not positive").into();
        assert_eq!(error_level(&invalid), NotifyLevel::Warning);

        let agent: anyhow::Error = SuiteError::Agent("exit code 2: rate limited".into()).into();
        assert_eq!(error_level(&agent), NotifyLevel::Error);

        let other = anyhow::anyhow!("Failed to read input");
        assert_eq!(error_level(&other), NotifyLevel::Error);
    }
}
