//! Agent state: conversation, status, tools, and telemetry logs.
//!
//! States are values.  Every transition helper consumes `self` and returns
//! the next state, so a caller can hold on to any intermediate state without
//! seeing later mutations.

use agentry_llm::{ChatMessage, CompletionOptions, ToolCall};
use agentry_tools::ToolRegistry;

use crate::prompt::build_system_message;

// ── status ───────────────────────────────────────────────────────────────────

/// Where the loop stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentStatus {
    /// Ready to ask the model for the next message.
    InProgress,
    /// The last assistant message requested tool calls that have not been
    /// answered yet.
    WaitingForTools,
    Complete,
    Failed(String),
}

impl AgentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed(_))
    }
}

// ── context window ───────────────────────────────────────────────────────────

/// Pruning policy applied when a conversation is continued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextWindowConfig {
    /// Upper bound on messages kept in the conversation.
    pub max_messages: usize,
}

// ── state ────────────────────────────────────────────────────────────────────

/// Full state of one agent run.
#[derive(Debug, Clone)]
pub struct AgentState {
    /// Conversation history as sent to the model, system message excluded.
    pub conversation: Vec<ChatMessage>,
    pub status: AgentStatus,
    pub tools: ToolRegistry,
    /// Prepended on the wire for every model call; never part of
    /// `conversation` so clients iterating history do not see it.
    pub system_message: Option<String>,
    pub initial_query: Option<String>,
    pub completion_options: CompletionOptions,
    /// Human-readable telemetry lines, oldest first.  Reset on each
    /// continued turn.
    pub logs: Vec<String>,
}

impl AgentState {
    /// Fresh state for a query: one user message, `InProgress`, and the base
    /// system prompt with an optional appended addition.
    pub fn initialize(
        query: impl Into<String>,
        tools: ToolRegistry,
        system_prompt_addition: Option<&str>,
        completion_options: CompletionOptions,
    ) -> Self {
        let query = query.into();
        Self {
            conversation: vec![ChatMessage::user(query.clone())],
            status: AgentStatus::InProgress,
            tools,
            system_message: Some(build_system_message(system_prompt_addition)),
            initial_query: Some(query),
            completion_options,
            logs: Vec::new(),
        }
    }

    pub fn with_message(mut self, message: ChatMessage) -> Self {
        self.conversation.push(message);
        self
    }

    pub fn with_status(mut self, status: AgentStatus) -> Self {
        self.status = status;
        self
    }

    pub fn fail(self, reason: impl Into<String>) -> Self {
        self.with_status(AgentStatus::Failed(reason.into()))
    }

    /// Append one telemetry line.
    pub fn log(mut self, line: impl Into<String>) -> Self {
        self.logs.push(line.into());
        self
    }

    pub fn reset_logs(mut self) -> Self {
        self.logs.clear();
        self
    }

    /// The conversation as sent to the model: system message first when set.
    pub fn wire_conversation(&self) -> Vec<ChatMessage> {
        let mut wire = Vec::with_capacity(self.conversation.len() + 1);
        if let Some(system) = &self.system_message {
            wire.push(ChatMessage::system(system.clone()));
        }
        wire.extend(self.conversation.iter().cloned());
        wire
    }

    /// Tool calls of the most recent assistant message that carries any.
    pub fn pending_tool_calls(&self) -> Option<&[ToolCall]> {
        self.conversation.iter().rev().find_map(ChatMessage::tool_calls)
    }

    /// Content of the most recent assistant message with text.
    pub fn final_assistant_content(&self) -> Option<&str> {
        self.conversation.iter().rev().find_map(|message| match message {
            ChatMessage::Assistant { content, .. } => content.as_deref(),
            _ => None,
        })
    }

    /// Trim the conversation to the window: the first user message (the
    /// original task) survives, then the most recent messages up to the cap.
    pub fn prune(mut self, window: &ContextWindowConfig) -> Self {
        let max = window.max_messages;
        if max == 0 || self.conversation.len() <= max {
            return self;
        }
        let head = self.conversation.first().cloned();
        let tail_len = max.saturating_sub(1);
        let tail_start = self.conversation.len() - tail_len;
        let mut pruned = Vec::with_capacity(max);
        if let Some(head) = head {
            pruned.push(head);
        }
        pruned.extend(self.conversation[tail_start..].iter().cloned());
        self.conversation = pruned;
        self
    }
}

// ── tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use serde_json::json;

    use agentry_llm::ToolCall;

    use crate::prompt::BASE_SYSTEM_PROMPT;

    use super::*;

    fn state() -> AgentState {
        AgentState::initialize(
            "what is 2 + 3?",
            ToolRegistry::default(),
            None,
            CompletionOptions::default(),
        )
    }

    #[test]
    fn initialize_starts_in_progress_with_one_user_message() {
        let state = state();
        assert_eq!(state.status, AgentStatus::InProgress);
        assert_eq!(state.conversation.len(), 1);
        assert_eq!(state.conversation[0].content(), Some("what is 2 + 3?"));
        assert_eq!(state.initial_query.as_deref(), Some("what is 2 + 3?"));
    }

    #[test]
    fn system_message_stays_out_of_the_conversation() {
        let state = state();
        assert!(state.system_message.is_some());
        let wire = state.wire_conversation();
        assert_eq!(wire.len(), 2);
        assert!(matches!(wire[0], ChatMessage::System { .. }));
        // Only the wire view sees it.
        assert!(
            state
                .conversation
                .iter()
                .all(|m| !matches!(m, ChatMessage::System { .. }))
        );
    }

    #[test]
    fn system_prompt_addition_is_appended() {
        let state = AgentState::initialize(
            "q",
            ToolRegistry::default(),
            Some("Answer in French."),
            CompletionOptions::default(),
        );
        let system = state.system_message.unwrap();
        assert!(system.starts_with(BASE_SYSTEM_PROMPT));
        assert!(system.ends_with("Answer in French."));
    }

    #[test]
    fn pending_tool_calls_finds_the_most_recent_batch() {
        let older = ToolCall::new("c1", "first", json!({}));
        let newer = ToolCall::new("c2", "second", json!({}));
        let state = state()
            .with_message(ChatMessage::assistant_tool_calls(None, vec![older]))
            .with_message(ChatMessage::tool_result("c1", "{}"))
            .with_message(ChatMessage::assistant_tool_calls(None, vec![newer.clone()]));

        let pending = state.pending_tool_calls().unwrap();
        assert_eq!(pending, &[newer][..]);
    }

    #[test]
    fn pending_tool_calls_ignores_plain_assistant_messages() {
        let state = state().with_message(ChatMessage::assistant("done"));
        assert!(state.pending_tool_calls().is_none());
    }

    #[test]
    fn prune_keeps_first_user_message_and_recent_tail() {
        let mut state = state();
        for i in 0..8 {
            state = state
                .with_message(ChatMessage::assistant(format!("a{i}")))
                .with_message(ChatMessage::user(format!("u{i}")));
        }
        assert_eq!(state.conversation.len(), 17);

        let pruned = state.prune(&ContextWindowConfig { max_messages: 5 });
        assert_eq!(pruned.conversation.len(), 5);
        assert_eq!(pruned.conversation[0].content(), Some("what is 2 + 3?"));
        assert_eq!(pruned.conversation[4].content(), Some("u7"));
    }

    #[test]
    fn prune_is_a_no_op_under_the_cap() {
        let state = state().with_message(ChatMessage::assistant("a"));
        let pruned = state.prune(&ContextWindowConfig { max_messages: 10 });
        assert_eq!(pruned.conversation.len(), 2);
    }

    #[test]
    fn logs_accumulate_and_reset() {
        let state = state().log("[tools] executing 1 tools (add)").log("[tool] add (3ms): {}");
        assert_eq!(state.logs.len(), 2);
        assert!(state.reset_logs().logs.is_empty());
    }
}
