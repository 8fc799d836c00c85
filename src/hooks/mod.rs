//! Session hooks that connect the review suite to the agent loop.
//!
//! The session fires three events, one at a time, and each hook runs to
//! completion against the [`crate::suite::SuiteMachine`] before the next:
//!
//! - `Input` - before a new input is processed. Interactive input interrupts
//!   an active suite run; the input itself still goes through.
//! - `Context` - before the agent sees the history. Later review stages get a
//!   redacted view so earlier stages cannot anchor them.
//! - `TurnEnd` - after the agent answers. The answer is handed to the state
//!   machine, which advances, completes, or aborts the run.
//!
//! # Usage
//!
//! ```ignore
//! use review_suite::hooks::{filter_context, on_input, on_turn_end, InputSource};
//!
//! on_input(&mut machine, &mut host, InputSource::Interactive);
//! let view = filter_context(&mut machine, &history).unwrap_or_else(|| history.clone());
//! let answer = agent.respond(&view).await?;
//! on_turn_end(&mut machine, &mut host, std::slice::from_ref(&answer));
//! ```

pub mod context_filter;
pub mod interrupt;
pub mod turn_complete;
pub mod types;

pub use context_filter::{filter_context, fresh_eyes_notice};
pub use interrupt::on_input;
pub use turn_complete::on_turn_end;
pub use types::{HookEvent, InputSource};
