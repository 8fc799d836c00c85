//! Fresh-eyes history redaction.
//!
//! Before a later review stage runs, everything the suite injected before the
//! current stage prompt (earlier stage prompts and the agent's answers to
//! them) is cut from the view handed to the agent. Pre-suite context and the
//! current stage prompt onward stay. The durable history is never touched.

use crate::conversation::{Turn, last_user_turn_index};
use crate::suite::{RedactionWindow, SuiteMachine};

/// Rewrite `history` for the upcoming turn.
///
/// Returns `None` to pass the history through unmodified.
pub fn filter_context(machine: &mut SuiteMachine, history: &[Turn]) -> Option<Vec<Turn>> {
    let window = machine.redaction_window(history)?;
    let current = last_user_turn_index(history)?;
    if current <= window.boundary {
        return None;
    }

    let dropped = current - window.boundary;
    tracing::debug!(
        stage = window.stage_label,
        boundary = window.boundary,
        current,
        dropped,
        "redacting earlier suite stages"
    );

    let mut view = Vec::with_capacity(window.boundary + 1 + history.len() - current);
    view.extend_from_slice(&history[..window.boundary]);
    view.push(Turn::user(fresh_eyes_notice(&window)));
    view.extend_from_slice(&history[current..]);
    Some(view)
}

/// Synthetic user turn standing in for the hidden stages.
pub fn fresh_eyes_notice(window: &RedactionWindow) -> String {
    format!(
        "[Review suite] This is stage {} of {}: {}. Output from earlier review \
         stages is intentionally hidden so this pass is independent. Review the \
         change from scratch.",
        window.stage_number, window.total_stages, window.stage_label
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::test_support::StaticTemplates;
    use crate::suite::{RecordingHost, SuiteOptions};
    use crate::target::ReviewTarget;

    fn machine() -> SuiteMachine {
        SuiteMachine::new(Box::new(StaticTemplates::pipeline()), SuiteOptions::default())
    }

    /// Drive a run to `stage_index`, building the history the session would.
    fn run_to_stage(stage_index: usize) -> (SuiteMachine, Vec<Turn>) {
        let mut host = RecordingHost::new();
        let mut m = machine();
        let mut history = vec![Turn::user("U0"), Turn::assistant("A0")];

        m.start(&mut host, ReviewTarget::Worktree).unwrap();
        history.push(Turn::user(host.last_sent().unwrap()));
        assert_eq!(filter_context(&mut m, &history), None);

        for i in 1..=stage_index {
            let answer = format!("A{i}");
            history.push(Turn::assistant(answer.clone()));
            m.on_turn_completed(&mut host, Some(&answer));
            history.push(Turn::user(host.last_sent().unwrap()));
        }
        (m, history)
    }

    #[test]
    fn third_stage_sees_only_presuite_context_and_own_prompt() {
        let (mut m, history) = run_to_stage(2);
        assert_eq!(history.len(), 7);

        let view = filter_context(&mut m, &history).unwrap();

        assert_eq!(view.len(), 4);
        assert_eq!(view[0], history[0]);
        assert_eq!(view[1], history[1]);
        assert!(view[2].is_user());
        assert!(view[2].text().contains("stage 3 of 4"));
        assert!(view[2].text().contains("Design & Maintainability"));
        assert_eq!(view[3], history[6]);
        // The durable history is unchanged.
        assert_eq!(history.len(), 7);
    }

    #[test]
    fn second_stage_drops_first_stage_exchange() {
        let (mut m, history) = run_to_stage(1);
        let view = filter_context(&mut m, &history).unwrap();
        assert_eq!(view.len(), 4);
        assert_eq!(view[3], history[4]);
        assert!(!view.iter().any(|t| t.text() == "A1"));
    }

    #[test]
    fn tool_traffic_after_stage_prompt_is_kept() {
        let (mut m, mut history) = run_to_stage(1);
        history.push(Turn::assistant("running git diff"));
        history.push(Turn::tool_result("diff --git a/x b/x"));

        let view = filter_context(&mut m, &history).unwrap();

        assert_eq!(view.len(), 6);
        assert_eq!(view.last().unwrap().text(), "diff --git a/x b/x");
    }

    #[test]
    fn synthesis_stage_is_not_redacted() {
        let (mut m, history) = run_to_stage(3);
        assert_eq!(m.run().unwrap().stage_index(), 3);
        assert_eq!(filter_context(&mut m, &history), None);
    }

    #[test]
    fn inactive_machine_passes_through() {
        let mut m = machine();
        let history = vec![Turn::user("hi")];
        assert_eq!(filter_context(&mut m, &history), None);
    }

    #[test]
    fn unset_boundary_passes_through() {
        let mut host = RecordingHost::new();
        let mut m = machine();
        m.start(&mut host, ReviewTarget::Worktree).unwrap();
        // First observed history has no user turn at all.
        assert_eq!(filter_context(&mut m, &[Turn::assistant("x")]), None);
        m.on_turn_completed(&mut host, Some("a"));

        let history = vec![
            Turn::user("s0"),
            Turn::assistant("a"),
            Turn::user("s1"),
        ];
        assert_eq!(m.run().unwrap().boundary_marker(), None);
        assert_eq!(filter_context(&mut m, &history), None);
    }

    #[test]
    fn current_prompt_not_after_boundary_passes_through() {
        let (mut m, mut history) = run_to_stage(1);
        // Simulate a history that lost the newer prompt.
        history.truncate(3);
        assert_eq!(filter_context(&mut m, &history), None);
    }
}
