//! The step machine that drives a tool-using conversation.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tracing::{debug, info, warn};

use agentry_llm::{ChatMessage, CompletionOptions, LlmClient, LlmError};
use agentry_tools::{ToolCallRequest, ToolRegistry};

use crate::state::{AgentState, AgentStatus, ContextWindowConfig};
use crate::trace;

// ── errors ───────────────────────────────────────────────────────────────────

/// Failures that abort a run rather than feed back into the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AgentError {
    #[error("validation failed for '{field}': {message}")]
    Validation { field: String, message: String },
    #[error(transparent)]
    Llm(#[from] LlmError),
}

// ── guardrails ───────────────────────────────────────────────────────────────

/// Boundary check applied to user input before a run and to the final
/// assistant answer after it.  Implementations are external; no guardrails
/// means passthrough.
pub trait Guardrail: Send + Sync {
    fn validate(&self, content: &str) -> Result<(), String>;
}

// ── agent ────────────────────────────────────────────────────────────────────

/// Drives [`AgentState`] transitions against an LLM client.
///
/// The agent itself is stateless between calls; every operation takes a
/// state and returns the next one.
pub struct Agent {
    client: Arc<dyn LlmClient>,
    input_guardrails: Vec<Arc<dyn Guardrail>>,
    output_guardrails: Vec<Arc<dyn Guardrail>>,
}

impl Agent {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            client,
            input_guardrails: Vec::new(),
            output_guardrails: Vec::new(),
        }
    }

    pub fn with_input_guardrail(mut self, guardrail: Arc<dyn Guardrail>) -> Self {
        self.input_guardrails.push(guardrail);
        self
    }

    pub fn with_output_guardrail(mut self, guardrail: Arc<dyn Guardrail>) -> Self {
        self.output_guardrails.push(guardrail);
        self
    }

    /// Validate the query and build a fresh state in `InProgress`.
    pub fn initialize(
        &self,
        query: &str,
        tools: ToolRegistry,
        system_prompt_addition: Option<&str>,
        completion_options: CompletionOptions,
    ) -> Result<AgentState, AgentError> {
        check_guardrails(&self.input_guardrails, "input", query)?;
        Ok(AgentState::initialize(
            query,
            tools,
            system_prompt_addition,
            completion_options,
        ))
    }

    /// Advance the state machine by one transition.
    ///
    /// `InProgress` asks the model for the next message; `WaitingForTools`
    /// dispatches the pending tool calls in the order the model emitted
    /// them.  Terminal states pass through unchanged.
    pub async fn run_step(&self, state: AgentState, debug: bool) -> Result<AgentState, AgentError> {
        match state.status {
            AgentStatus::InProgress => self.step_completion(state, debug).await,
            AgentStatus::WaitingForTools => Ok(step_tools(state)),
            AgentStatus::Complete | AgentStatus::Failed(_) => Ok(state),
        }
    }

    async fn step_completion(
        &self,
        state: AgentState,
        debug: bool,
    ) -> Result<AgentState, AgentError> {
        let options = state
            .completion_options
            .clone()
            .with_tools(state.tools.get_openai_tools(true));
        let wire = state.wire_conversation();
        if debug {
            debug!(
                messages = wire.len(),
                tools = state.tools.len(),
                "requesting completion"
            );
        }

        let response = self.client.complete(&wire, &options).await?;

        if response.tool_calls.is_empty() {
            info!("assistant returned a final answer");
            return Ok(state
                .log(format!("[assistant] text: {}", preview(&response.content)))
                .with_message(ChatMessage::assistant(response.content))
                .with_status(AgentStatus::Complete));
        }

        let names = call_names(&response.tool_calls);
        info!(count = response.tool_calls.len(), "assistant requested tool calls");
        let content = if response.content.is_empty() {
            None
        } else {
            Some(response.content.clone())
        };
        Ok(state
            .log(format!(
                "[assistant] tools: {} tool calls requested ({names})",
                response.tool_calls.len()
            ))
            .with_message(ChatMessage::assistant_tool_calls(
                content,
                response.tool_calls,
            ))
            .with_status(AgentStatus::WaitingForTools))
    }

    /// Drive the machine until it terminates or the step budget runs out.
    ///
    /// The budget counts transitions that enter or leave `WaitingForTools`,
    /// so one tool round costs two and a direct answer costs none of it.
    /// When `trace_path` is set, a Markdown trace is rewritten after every
    /// transition, best-effort.
    pub async fn run(
        &self,
        state: AgentState,
        max_steps: Option<usize>,
        trace_path: Option<&Path>,
        debug: bool,
    ) -> Result<AgentState, AgentError> {
        let mut state = state;
        let mut steps_used = 0usize;

        while !state.status.is_terminal() {
            if let Some(max) = max_steps {
                if steps_used >= max {
                    warn!(max, "step budget exhausted");
                    state = state
                        .log("[system] maximum step limit reached")
                        .fail("Maximum step limit reached");
                    break;
                }
            }
            let was_waiting = state.status == AgentStatus::WaitingForTools;
            state = self.run_step(state, debug).await?;
            if was_waiting || state.status == AgentStatus::WaitingForTools {
                steps_used += 1;
            }
            if let Some(path) = trace_path {
                trace::write_trace(&state, path);
            }
        }

        if let Some(path) = trace_path {
            trace::write_trace(&state, path);
        }
        if state.status == AgentStatus::Complete {
            let answer = state.final_assistant_content().unwrap_or_default();
            check_guardrails(&self.output_guardrails, "output", answer)?;
        }
        Ok(state)
    }

    /// Append a user message to a finished conversation and run again.
    ///
    /// Telemetry logs restart for the new turn; the conversation is
    /// optionally pruned to the context window first.
    pub async fn continue_conversation(
        &self,
        previous: AgentState,
        user_message: &str,
        max_steps: Option<usize>,
        context_window: Option<&ContextWindowConfig>,
        debug: bool,
    ) -> Result<AgentState, AgentError> {
        if !previous.status.is_terminal() {
            return Err(AgentError::Validation {
                field: "agent_state".to_string(),
                message: "conversation can only continue from a completed or failed state"
                    .to_string(),
            });
        }
        check_guardrails(&self.input_guardrails, "input", user_message)?;

        let mut state = previous
            .reset_logs()
            .with_message(ChatMessage::user(user_message))
            .with_status(AgentStatus::InProgress);
        if let Some(window) = context_window {
            state = state.prune(window);
        }
        self.run(state, max_steps, None, debug).await
    }

    /// Run the initial query, then fold every follow-up through
    /// [`continue_conversation`](Self::continue_conversation).
    pub async fn run_multi_turn(
        &self,
        initial_query: &str,
        follow_ups: &[String],
        tools: ToolRegistry,
        completion_options: CompletionOptions,
        max_steps: Option<usize>,
        debug: bool,
    ) -> Result<AgentState, AgentError> {
        let state = self.initialize(initial_query, tools, None, completion_options)?;
        let mut state = self.run(state, max_steps, None, debug).await?;
        for follow_up in follow_ups {
            state = self
                .continue_conversation(state, follow_up, max_steps, None, debug)
                .await?;
        }
        Ok(state)
    }
}

// ── tool dispatch ────────────────────────────────────────────────────────────

/// Answer the pending tool calls and hand control back to the model.
fn step_tools(state: AgentState) -> AgentState {
    let Some(calls) = state.pending_tool_calls().map(<[_]>::to_vec) else {
        // WaitingForTools with nothing to answer: the conversation is
        // inconsistent and there is no message to hand back to the model.
        return state.fail("No tool calls found in conversation");
    };

    let names = call_names(&calls);
    info!(count = calls.len(), %names, "executing tool calls");
    let mut state = state.log(format!(
        "[tools] executing {} tools ({names})",
        calls.len()
    ));

    for call in &calls {
        let request = ToolCallRequest::from(call);
        let started = Instant::now();
        let result = state.tools.execute(&request);
        let elapsed_ms = started.elapsed().as_millis() as u64;
        let content = match &result {
            Ok(value) => value.to_string(),
            Err(error) => error_json(&error.to_string()),
        };
        debug!(
            tool = %call.function.name,
            elapsed_ms,
            ok = result.is_ok(),
            "tool call finished"
        );
        state = state
            .log(format!(
                "[tool] {} ({elapsed_ms}ms): {content}",
                call.function.name
            ))
            .with_message(ChatMessage::tool_result(call.id.clone(), content));
    }

    state.with_status(AgentStatus::InProgress)
}

// ── helpers ──────────────────────────────────────────────────────────────────

fn check_guardrails(
    guardrails: &[Arc<dyn Guardrail>],
    field: &str,
    content: &str,
) -> Result<(), AgentError> {
    for guardrail in guardrails {
        guardrail
            .validate(content)
            .map_err(|message| AgentError::Validation {
                field: field.to_string(),
                message,
            })?;
    }
    Ok(())
}

fn call_names(calls: &[agentry_llm::ToolCall]) -> String {
    calls
        .iter()
        .map(|c| c.function.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// The single-line error object handed back to the model in a tool message.
/// Backslash, quote, newline, carriage return, and tab are escaped so the
/// document stays one minified line.
fn error_json(message: &str) -> String {
    let mut escaped = String::with_capacity(message.len());
    for c in message.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            other => escaped.push(other),
        }
    }
    format!("{{\"isError\":true,\"error\":\"{escaped}\"}}")
}

fn preview(text: &str) -> String {
    const MAX_CHARS: usize = 200;
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(MAX_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}…")
    } else {
        head
    }
}

// ── tests ────────────────────────────────────────────────────────────────────
