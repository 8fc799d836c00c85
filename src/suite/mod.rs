//! Review suite orchestration.
//!
//! A suite run drives the agent through the fixed [`crate::pipeline::PIPELINE`]:
//! three independent review passes, then one synthesis pass.
//!
//! ```text
//! start(target) ──► stage 0 prompt ──► turn completed ──► stage 1 prompt ──► ...
//!                                          │
//!                   empty output / missing template / user input
//!                                          ▼
//!                                      teardown
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use review_suite::suite::{SuiteMachine, SuiteOptions};
//!
//! let mut machine = SuiteMachine::new(Box::new(loader), SuiteOptions::default());
//! machine.start(&mut host, ReviewTarget::Staged)?;
//! // ... after each agent turn:
//! machine.on_turn_completed(&mut host, Some(&answer));
//! ```

pub mod host;
pub mod machine;

#[cfg(test)]
pub use host::RecordingHost;
pub use host::{NotifyLevel, SuiteHost, SuiteStatus};
pub use machine::{EndReason, RedactionWindow, SuiteMachine, SuiteOptions, SuiteRun, Transition};
