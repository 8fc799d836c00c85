//! Turn-end handling: hand the agent's answer to the state machine.

use crate::conversation::{Turn, last_assistant_text};
use crate::suite::{SuiteHost, SuiteMachine, Transition};

/// Report the newest assistant turn in `turns` to `machine`.
///
/// `turns` are the messages the finished agent call produced. No assistant
/// turn at all counts as empty output.
pub fn on_turn_end(
    machine: &mut SuiteMachine,
    host: &mut dyn SuiteHost,
    turns: &[Turn],
) -> Transition {
    if !machine.is_active() {
        return Transition::Idle;
    }

    let produced = last_assistant_text(turns);
    machine.on_turn_completed(host, produced.as_deref())
}
