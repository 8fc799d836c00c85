//! CLI command implementations.
//!
//! | Module   | Commands handled        |
//! |----------|-------------------------|
//! | `review` | `Review`                |
//! | `chat`   | `Chat`                  |
//! | `prompt` | `Prompt`, `Stages`      |
//! | `config` | `Config`                |

pub mod chat;
pub mod config;
pub mod prompt;
pub mod review;

pub use chat::cmd_chat;
pub use config::cmd_config;
pub use prompt::{cmd_prompt, cmd_stages};
pub use review::cmd_review;
