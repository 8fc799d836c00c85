//! The environment the state machine talks to.

use crate::pipeline::StageKind;
use std::fmt;

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyLevel {
    Info,
    Warning,
    Error,
}

impl fmt::Display for NotifyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotifyLevel::Info => write!(f, "info"),
            NotifyLevel::Warning => write!(f, "warning"),
            NotifyLevel::Error => write!(f, "error"),
        }
    }
}

/// What the status indicator shows while a run is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteStatus {
    /// `Review suite: <label> (<i>/<N>)`, with the freshness suffix if any.
    pub text: String,
    /// Kind of the stage the text describes.
    pub kind: StageKind,
}

impl fmt::Display for SuiteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Side effects the suite asks its host to perform.
///
/// The machine never reaches the agent or the terminal directly; every
/// outward effect goes through one of these calls.
pub trait SuiteHost {
    /// Queue `text` as the next user turn.
    fn send_user_message(&mut self, text: String);

    /// Surface a message to the user.
    fn notify(&mut self, message: &str, level: NotifyLevel);

    /// Replace the status indicator; `None` clears it.
    fn set_status(&mut self, status: Option<SuiteStatus>);
}

/// Host that records every call, for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub sent: Vec<String>,
    pub notifications: Vec<(NotifyLevel, String)>,
    pub status: Option<String>,
    pub status_kind: Option<StageKind>,
    pub status_updates: usize,
}

#[cfg(test)]
impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_sent(&self) -> Option<&str> {
        self.sent.last().map(String::as_str)
    }

    pub fn last_notification(&self) -> Option<&(NotifyLevel, String)> {
        self.notifications.last()
    }
}

#[cfg(test)]
impl SuiteHost for RecordingHost {
    fn send_user_message(&mut self, text: String) {
        self.sent.push(text);
    }

    fn notify(&mut self, message: &str, level: NotifyLevel) {
        self.notifications.push((level, message.to_string()));
    }

    fn set_status(&mut self, status: Option<SuiteStatus>) {
        self.status_kind = status.as_ref().map(|s| s.kind);
        self.status = status.map(|s| s.text);
        self.status_updates += 1;
    }
}
