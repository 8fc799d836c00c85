//! Parsing of the agent CLI's `stream-json` output.

use crate::conversation::{self, Turn};
use serde::Deserialize;
use serde_json::Value;

/// Events from Claude CLI's stream-json output format
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum StreamEvent {
    #[serde(rename = "assistant")]
    Assistant {
        message: AssistantMessage,
        #[serde(default)]
        session_id: String,
    },

    #[serde(rename = "user")]
    User {
        #[serde(default)]
        message: Option<UserMessage>,
    },

    #[serde(rename = "result")]
    Result {
        subtype: String,
        #[serde(default)]
        result: Option<String>,
        #[serde(default)]
        is_error: bool,
    },

    #[serde(rename = "system")]
    System { subtype: String },
}

#[derive(Debug, Deserialize)]
pub struct AssistantMessage {
    #[serde(default)]
    pub content: Vec<StreamBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum StreamBlock {
    #[serde(rename = "tool_use")]
    ToolUse {
        name: String,
        input: Value,
        #[serde(default)]
        id: String,
    },

    #[serde(rename = "text")]
    Text { text: String },

    #[serde(other)]
    Other,
}

/// Tool results echoed back to the agent.
#[derive(Debug, Deserialize)]
pub struct UserMessage {
    #[serde(default)]
    pub content: Vec<Value>,
}

impl AssistantMessage {
    /// Convert to a conversation turn, dropping block kinds we don't model.
    pub fn into_turn(self) -> Turn {
        let content = self
            .content
            .into_iter()
            .filter_map(|block| match block {
                StreamBlock::Text { text } => Some(conversation::ContentBlock::Text { text }),
                StreamBlock::ToolUse { name, input, .. } => {
                    Some(conversation::ContentBlock::ToolUse { name, input })
                }
                StreamBlock::Other => None,
            })
            .collect();
        Turn {
            role: conversation::Role::Assistant,
            content,
        }
    }
}

impl UserMessage {
    /// Text of every `tool_result` block, or `None` if there were none.
    pub fn tool_output(&self) -> Option<String> {
        let parts: Vec<String> = self
            .content
            .iter()
            .filter(|block| block.get("type").and_then(Value::as_str) == Some("tool_result"))
            .filter_map(|block| block.get("content"))
            .map(result_text)
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("\n"))
        }
    }
}

/// `content` of a tool result is either a string or a list of text blocks.
fn result_text(content: &Value) -> String {
    match content {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| item.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("\n"),
        other => other.to_string(),
    }
}

/// Extract a human-readable description from a tool use event
pub fn describe_tool_use(name: &str, input: &Value) -> String {
    let field = |key: &str| input.get(key).and_then(Value::as_str);
    match name {
        "Read" => format!(
            "Reading: {}",
            field("file_path")
                .map(shorten_path)
                .unwrap_or_else(|| "file".to_string())
        ),
        "Bash" => format!(
            "Running: {}",
            field("command")
                .map(|s| truncate_str(s, 40))
                .unwrap_or_else(|| "command".to_string())
        ),
        "Glob" => format!("Searching: {}", field("pattern").unwrap_or("*")),
        "Grep" => format!(
            "Grep: {}",
            field("pattern")
                .map(|s| truncate_str(s, 30))
                .unwrap_or_else(|| "pattern".to_string())
        ),
        "Task" => format!("Agent: {}", field("description").unwrap_or("subagent")),
        _ => name.to_string(),
    }
}

/// Get an emoji for a tool
pub fn tool_emoji(name: &str) -> &'static str {
    match name {
        "Read" => "\u{1F4D6}",
        "Bash" => "\u{2699}\u{FE0F}",
        "Glob" => "\u{1F50D}",
        "Grep" => "\u{1F50E}",
        "Task" => "\u{1F916}",
        _ => "\u{1F527}",
    }
}

/// Keep only the last two path components.
fn shorten_path(path: &str) -> String {
    let parts: Vec<&str> = path.split('/').collect();
    if parts.len() <= 2 {
        path.to_string()
    } else {
        parts[parts.len() - 2..].join("/")
    }
}

/// Truncate on a char boundary, with ellipsis.
fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// First line of the agent's text, shortened for a status line.
pub fn snippet(text: &str, max_chars: usize) -> String {
    let first_line = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    truncate_str(first_line.trim(), max_chars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::ContentBlock;

    #[test]
    fn test_parse_assistant_tool_use() {
        let json = r#"{"type":"assistant","message":{"content":[{"type":"tool_use","name":"Read","input":{"file_path":"/foo/bar.rs"},"id":"123"}]},"session_id":"abc"}"#;
        let event: StreamEvent = serde_json::from_str(json).unwrap();

        let StreamEvent::Assistant { message, .. } = event else {
            panic!("Expected Assistant event");
        };
        let turn = message.into_turn();
        assert_eq!(turn.content.len(), 1);
        let ContentBlock::ToolUse { name, input } = &turn.content[0] else {
            panic!("Expected ToolUse");
        };
        assert_eq!(name, "Read");
        assert_eq!(input["file_path"], "/foo/bar.rs");
    }

    #[test]
    fn test_parse_assistant_text_skips_thinking() {
        let json = r#"{"type":"assistant","message":{"content":[{"type":"thinking","thinking":"hmm"},{"type":"text","text":"Hello world"}]}}"#;
        let event: StreamEvent = serde_json::from_str(json).unwrap();

        let StreamEvent::Assistant { message, .. } = event else {
            panic!("Expected Assistant event");
        };
        let turn = message.into_turn();
        assert_eq!(turn.content.len(), 1);
        assert_eq!(turn.text(), "Hello world");
    }

    #[test]
    fn test_parse_tool_result() {
        let json = r#"{"type":"user","message":{"content":[{"type":"tool_result","tool_use_id":"1","content":"M src/lib.rs"},{"type":"tool_result","tool_use_id":"2","content":[{"type":"text","text":"diff"}]}]}}"#;
        let event: StreamEvent = serde_json::from_str(json).unwrap();

        let StreamEvent::User { message: Some(message) } = event else {
            panic!("Expected User event");
        };
        assert_eq!(message.tool_output().as_deref(), Some("M src/lib.rs\ndiff"));
    }

    #[test]
    fn test_parse_result() {
        let json = r#"{"type":"result","subtype":"success","result":"Done","is_error":false}"#;
        let event: StreamEvent = serde_json::from_str(json).unwrap();
        assert!(matches!(
            event,
            StreamEvent::Result { result: Some(ref r), is_error: false, .. } if r == "Done"
        ));
    }

    #[test]
    fn test_describe_tool_use() {
        let input = serde_json::json!({"file_path": "/Users/foo/project/src/main.rs"});
        assert_eq!(describe_tool_use("Read", &input), "Reading: src/main.rs");

        let input = serde_json::json!({"command": "git diff --stat HEAD"});
        assert_eq!(
            describe_tool_use("Bash", &input),
            "Running: git diff --stat HEAD"
        );
    }

    #[test]
    fn test_truncate_is_char_safe() {
        let s = "é".repeat(50);
        let out = truncate_str(&s, 10);
        assert_eq!(out.chars().count(), 10);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn test_snippet_skips_blank_lines() {
        assert_eq!(snippet("\n\n  First finding\nsecond", 60), "First finding");
    }
}
