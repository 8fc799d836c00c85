//! New input from the user cancels an active suite run.

use super::types::InputSource;
use crate::suite::{SuiteHost, SuiteMachine, Transition};

/// Run before any other processing of a new input.
///
/// Interactive input aborts an active run; programmatic input (including the
/// suite's own stage prompts) never does. The input always proceeds.
pub fn on_input(
    machine: &mut SuiteMachine,
    host: &mut dyn SuiteHost,
    source: InputSource,
) -> Transition {
    if !source.is_interactive() || !machine.is_active() {
        return Transition::Idle;
    }

    tracing::info!("interactive input received, interrupting review suite");
    machine.on_user_interrupt(host)
}
