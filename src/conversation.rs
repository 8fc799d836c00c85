//! Conversation turns as seen by the agent.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Who authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    /// Output of a tool the agent invoked. Never counts as user-authored.
    ToolResult,
}

/// One segment of a turn's content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    ToolUse { name: String, input: Value },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            Self::ToolUse { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentBlock::text(text)],
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: vec![ContentBlock::text(text)],
        }
    }

    pub fn tool_result(text: impl Into<String>) -> Self {
        Self {
            role: Role::ToolResult,
            content: vec![ContentBlock::text(text)],
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    /// Text-bearing segments in order, newline-joined and trimmed.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(ContentBlock::as_text)
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string()
    }
}

/// Position of the most recent user-authored turn.
///
/// Boundary capture and redaction both go through this helper so they agree
/// on which turn is the current stage prompt.
pub fn last_user_turn_index(turns: &[Turn]) -> Option<usize> {
    turns.iter().rposition(Turn::is_user)
}

/// Text of the most recent assistant turn; `None` when there is none.
pub fn last_assistant_text(turns: &[Turn]) -> Option<String> {
    turns
        .iter()
        .rev()
        .find(|t| t.role == Role::Assistant)
        .map(Turn::text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn last_user_turn_skips_tool_results() {
        let turns = vec![
            Turn::user("question"),
            Turn::assistant("looking"),
            Turn::tool_result("diff output"),
            Turn::assistant("done"),
        ];
        assert_eq!(last_user_turn_index(&turns), Some(0));
    }

    #[test]
    fn last_user_turn_on_empty_history() {
        assert_eq!(last_user_turn_index(&[]), None);
        assert_eq!(last_user_turn_index(&[Turn::assistant("hi")]), None);
    }

    #[test]
    fn text_joins_text_blocks_and_skips_tool_use() {
        let turn = Turn {
            role: Role::Assistant,
            content: vec![
                ContentBlock::text("  First."),
                ContentBlock::ToolUse {
                    name: "Bash".to_string(),
                    input: json!({"command": "git diff"}),
                },
                ContentBlock::text("Second.  "),
            ],
        };
        assert_eq!(turn.text(), "First.\nSecond.");
    }

    #[test]
    fn last_assistant_text_picks_latest() {
        let turns = vec![
            Turn::assistant("old"),
            Turn::user("next"),
            Turn::assistant("new"),
        ];
        assert_eq!(last_assistant_text(&turns).as_deref(), Some("new"));
        assert_eq!(last_assistant_text(&[Turn::user("only")]), None);
    }

    #[test]
    fn content_block_serializes_tagged() {
        let block = ContentBlock::text("hi");
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json, json!({"type": "text", "text": "hi"}));
    }
}
