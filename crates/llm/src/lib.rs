//! Chat wire types and the LLM client seam.
//!
//! This crate defines the conversation model shared by the tool layer and
//! the agent loop: role-tagged [`ChatMessage`] values that serialize to the
//! OpenAI chat-completion shape, the [`ToolCall`] wire format produced by
//! models, and the [`LlmClient`] trait that concrete provider clients
//! implement.  No HTTP lives here; providers are external.

mod client;
mod message;

pub use client::{CompletionOptions, CompletionResponse, LlmClient, LlmError};
pub use message::{ChatMessage, ToolCall, ToolCallFunction};
