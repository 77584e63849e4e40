//! The agent reasoning loop.
//!
//! An [`AgentState`] threads a conversation, a status, a tool registry, and
//! telemetry logs through a finite step machine: `InProgress` asks the model
//! for the next message, `WaitingForTools` dispatches the requested tool
//! calls and feeds their results back, and the loop ends in `Complete` or a
//! bounded `Failed`.  [`Agent`] drives the machine against any
//! [`LlmClient`](agentry_llm::LlmClient), with optional step budgets,
//! guardrail hooks, multi-turn continuation, and best-effort Markdown trace
//! files for offline inspection.

mod agent;
mod prompt;
mod state;
mod trace;

pub use agent::{Agent, AgentError, Guardrail};
pub use prompt::BASE_SYSTEM_PROMPT;
pub use state::{AgentState, AgentStatus, ContextWindowConfig};
pub use trace::{format_trace, write_trace};
