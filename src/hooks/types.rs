//! Event types delivered by the hosting session.
//!
//! - `HookEvent`: the points where the suite is consulted
//! - `InputSource`: where a new input came from

use serde::{Deserialize, Serialize};

/// Session events the suite hooks into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookEvent {
    /// New input is about to be processed
    Input,
    /// History for the next agent call is being assembled
    Context,
    /// The agent finished producing a turn
    TurnEnd,
}

impl HookEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            HookEvent::Input => "input",
            HookEvent::Context => "context",
            HookEvent::TurnEnd => "turn_end",
        }
    }
}

impl std::fmt::Display for HookEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Origin of a new input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputSource {
    /// Typed or signalled by the user at the terminal.
    Interactive,
    /// Injected by code, including the suite's own stage prompts.
    Programmatic,
}

impl InputSource {
    pub fn is_interactive(&self) -> bool {
        matches!(self, InputSource::Interactive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hook_event_display_matches_serde_name() {
        for event in [HookEvent::Input, HookEvent::Context, HookEvent::TurnEnd] {
            let json = serde_json::to_string(&event).unwrap();
            assert_eq!(json, format!("\"{event}\""));
        }
    }

    #[test]
    fn only_interactive_source_is_interactive() {
        assert!(InputSource::Interactive.is_interactive());
        assert!(!InputSource::Programmatic.is_interactive());
    }
}
