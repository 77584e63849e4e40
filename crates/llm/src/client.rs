//! The provider seam: completion options, responses, and the client trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::message::{ChatMessage, ToolCall};

// ── options ──────────────────────────────────────────────────────────────────

/// Passthrough configuration for a completion call.
///
/// The core never interprets these beyond attaching the tool advertisement
/// array; providers map them onto their own request shapes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionOptions {
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub max_tokens: Option<u32>,
    /// JSON array of tool advertisements, as produced by the registry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Value>,
}

impl CompletionOptions {
    pub fn with_tools(mut self, tools: Value) -> Self {
        self.tools = Some(tools);
        self
    }
}

// ── responses ────────────────────────────────────────────────────────────────

/// Assistant reply from a completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    /// Text content; may be empty when `tool_calls` is non-empty.
    pub content: String,
    /// Tool calls the model wants to make, in emission order.
    pub tool_calls: Vec<ToolCall>,
    /// Provider finish reason: `"stop"`, `"tool_calls"`, `"length"`, …
    pub finish_reason: String,
}

impl CompletionResponse {
    /// A plain text reply.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: vec![],
            finish_reason: "stop".to_string(),
        }
    }

    /// A reply requesting tool calls.
    pub fn tool_calls(calls: Vec<ToolCall>) -> Self {
        Self {
            content: String::new(),
            tool_calls: calls,
            finish_reason: "tool_calls".to_string(),
        }
    }
}

// ── errors ───────────────────────────────────────────────────────────────────

/// Failures a provider client can surface to the agent loop.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LlmError {
    #[error("LLM API error: {message}")]
    Api { message: String },
    #[error("LLM rate limited: {message}")]
    RateLimited { message: String },
    #[error("invalid LLM response: {message}")]
    InvalidResponse { message: String },
}

// ── client trait ─────────────────────────────────────────────────────────────

/// A chat-completion backend.
///
/// Implementations own transport, authentication, and retries; the core only
/// requires that the returned assistant message carries any tool calls the
/// model produced.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<CompletionResponse, LlmError>;
}

// ── tests ────────────────────────────────────────────────────────────────────
