//! The coding agent that answers each turn.

pub mod claude;
pub mod stream;

pub use claude::ClaudeAgent;

use crate::conversation::{Role, Turn};
use anyhow::Result;
use async_trait::async_trait;

/// Something that can answer a conversation.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Answer the newest user turn of `history`.
    ///
    /// Returns every turn produced while answering, in order: assistant
    /// turns and any tool results between them.
    async fn respond(&self, history: &[Turn]) -> Result<Vec<Turn>>;
}

/// Render `history` as a single prompt for a stateless agent invocation.
///
/// A lone user turn is sent as-is. Longer histories become a transcript
/// that ends with the turn to answer.
pub fn render_transcript(history: &[Turn]) -> String {
    if let [only] = history
        && only.is_user()
    {
        return only.text();
    }

    let mut out = String::from(
        "Below is the conversation so far. Respond to the final user message.\n\n",
    );
    for turn in history {
        let heading = match turn.role {
            Role::User => "User",
            Role::Assistant => "Assistant",
            Role::ToolResult => "Tool result",
        };
        let text = turn.text();
        if text.is_empty() {
            continue;
        }
        out.push_str(&format!("### {heading}\n\n{text}\n\n"));
    }
    out.trim_end().to_string()
}
