//! One-shot suite run: `review-suite review [TARGET...]`.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

use review_suite::agent::ClaudeAgent;
use review_suite::repo::RepoInspector;
use review_suite::resolver::{Resolution, parse_target_args, pick_target};
use review_suite::session::Session;
use review_suite::suite::{SuiteMachine, Transition};
use review_suite::suite_config::SuiteToml;
use review_suite::target::ReviewTarget;
use review_suite::ui::SessionUI;

/// Load config, logging validation warnings.
pub fn load_config(project_dir: &Path) -> Result<SuiteToml> {
    let config = SuiteToml::load_or_default(project_dir)?;
    for warning in config.validate() {
        tracing::warn!("{warning}");
    }
    Ok(config)
}

/// Resolve `args` to a target, falling back to the picker on a terminal.
///
/// `Ok(None)` means the user cancelled the picker.
pub fn resolve_target(project_dir: &Path, args: &[String]) -> Result<Option<ReviewTarget>> {
    match parse_target_args(&args.join(" "))? {
        Resolution::Target(target) => {
            if target.needs_repository() {
                RepoInspector::discover(project_dir)?.check_target(&target)?;
            }
            Ok(Some(target))
        }
        Resolution::NeedsSelection => {
            if !console::Term::stdout().is_term() {
                anyhow::bail!(
                    "No review target given. Pass one of: worktree, staged, pr <n>, recent <ref>"
                );
            }
            let repo = RepoInspector::discover(project_dir).ok();
            pick_target(repo.as_ref())
        }
    }
}

pub fn new_session(
    project_dir: &Path,
    config: &SuiteToml,
    ui: Arc<SessionUI>,
) -> Session<ClaudeAgent> {
    let agent = ClaudeAgent::from_config(config, project_dir.to_path_buf()).with_ui(ui.clone());
    let machine = SuiteMachine::new(Box::new(config.template_loader()), config.suite_options());
    Session::new(agent, machine).with_ui(ui)
}

/// Drive a suite run to its end; Ctrl-C interrupts it.
pub async fn run_suite(
    session: &mut Session<ClaudeAgent>,
    target: ReviewTarget,
) -> Result<Transition> {
    let finished = tokio::select! {
        outcome = session.start_review(target) => Some(outcome),
        _ = tokio::signal::ctrl_c() => None,
    };
    match finished {
        Some(outcome) => outcome,
        None => Ok(session.interrupt()),
    }
}

pub async fn cmd_review(project_dir: &Path, verbose: bool, args: &[String]) -> Result<()> {
    let config = load_config(project_dir)?;
    let Some(target) = resolve_target(project_dir, args)? else {
        println!("Review cancelled.");
        return Ok(());
    };

    let ui = Arc::new(SessionUI::new(verbose));
    ui.print_suite_header(&target.to_string(), config.suite.fresh_context);
    let mut session = new_session(project_dir, &config, ui.clone());

    let outcome = run_suite(&mut session, target)
        .await
        .context("Review suite failed")?;

    match outcome {
        Transition::Completed { report } => {
            ui.print_separator();
            println!("{report}");
            Ok(())
        }
        Transition::Aborted(reason) if reason.is_failure() => {
            anyhow::bail!("Review suite {reason}")
        }
        _ => Ok(()),
    }
}
