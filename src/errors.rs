//! Typed error hierarchy for the review suite.
//!
//! Only setup failures surface as `Err(SuiteError)` from the state machine.
//! Failures that happen once a run is underway (missing template, empty
//! agent output, user interruption) tear the run down and are reported as a
//! [`crate::suite::Transition::Aborted`] outcome instead.

use thiserror::Error;

/// Errors from the review suite and its collaborators.
#[derive(Debug, Error)]
pub enum SuiteError {
    #[error("A review suite is already running; interrupt it before starting another")]
    AlreadyActive,

    #[error("No review context available: {reason}")]
    NoReviewContext { reason: String },

    #[error("Invalid review target '{input}': {reason}")]
    InvalidTarget { input: String, reason: String },

    #[error("Prompt template '{template}' is missing or empty")]
    MissingTemplate { template: String },

    #[error("Agent failed: {0}")]
    Agent(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SuiteError {
    /// Build an `InvalidTarget` error.
    pub fn invalid_target(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTarget {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error was raised before any run state was touched.
    pub fn is_setup_error(&self) -> bool {
        matches!(
            self,
            Self::AlreadyActive | Self::NoReviewContext { .. } | Self::InvalidTarget { .. }
        )
    }
}
