//! Conversation messages and the tool-call wire format.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── messages ─────────────────────────────────────────────────────────────────

/// A single message in a chat conversation.
///
/// Serializes to the structured chat shape used by OpenAI-compatible
/// `/chat/completions` endpoints: the variant becomes the `role` tag,
/// assistant `tool_calls` are omitted when empty, and tool results carry the
/// `tool_call_id` that correlates them with the originating call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum ChatMessage {
    System {
        content: String,
    },
    User {
        content: String,
    },
    Assistant {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        /// Tool calls requested by the model, in the order it emitted them.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCall>,
    },
    Tool {
        content: String,
        /// Which tool call this result answers.
        tool_call_id: String,
    },
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self::System {
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::User {
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant {
            content: Some(content.into()),
            tool_calls: vec![],
        }
    }

    pub fn assistant_tool_calls(content: Option<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self::Assistant {
            content,
            tool_calls,
        }
    }

    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::Tool {
            content: content.into(),
            tool_call_id: tool_call_id.into(),
        }
    }

    /// Assistant tool calls, when this is an assistant message that carries
    /// any.
    pub fn tool_calls(&self) -> Option<&[ToolCall]> {
        match self {
            Self::Assistant { tool_calls, .. } if !tool_calls.is_empty() => Some(tool_calls),
            _ => None,
        }
    }

    /// Text content, for the variants that carry one.
    pub fn content(&self) -> Option<&str> {
        match self {
            Self::System { content } | Self::User { content } | Self::Tool { content, .. } => {
                Some(content)
            }
            Self::Assistant { content, .. } => content.as_deref(),
        }
    }
}

// ── tool calls ───────────────────────────────────────────────────────────────

/// A tool call requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Opaque id assigned by the model client; preserved end-to-end so the
    /// tool response can be correlated with this call.
    #[serde(default)]
    pub id: String,
    /// Always `"function"` for OpenAI-compatible APIs.
    #[serde(default = "default_tool_call_type", rename = "type")]
    pub call_type: String,
    pub function: ToolCallFunction,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            call_type: default_tool_call_type(),
            function: ToolCallFunction {
                name: name.into(),
                arguments,
            },
        }
    }
}

fn default_tool_call_type() -> String {
    "function".to_string()
}

/// The function name and arguments within a tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallFunction {
    pub name: String,
    /// Arguments as a parsed JSON value.  A JSON object in the normal case;
    /// `null` is legal only for zero-parameter tools.
    #[serde(default)]
    pub arguments: Value,
}

// ── tests ────────────────────────────────────────────────────────────────────
