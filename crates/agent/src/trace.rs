//! Markdown trace rendering for offline inspection of a run.
//!
//! The trace is a snapshot document: header, full conversation (system
//! message included), and the telemetry log lines.  Writes are best-effort;
//! a failed write must never fail the run it is documenting.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use chrono::Utc;
use tracing::warn;

use agentry_llm::ChatMessage;

use crate::state::{AgentState, AgentStatus};

/// Render the state as a Markdown document.
pub fn format_trace(state: &AgentState) -> String {
    let mut out = String::new();

    out.push_str("# Agent Trace\n\n");
    let _ = writeln!(out, "- Generated: {}", Utc::now().format("%Y-%m-%d %H:%M:%S UTC"));
    let _ = writeln!(
        out,
        "- Initial query: {}",
        state.initial_query.as_deref().unwrap_or("(none)")
    );
    let _ = writeln!(out, "- Status: {}", status_label(&state.status));
    let tool_names = state.tools.tool_names();
    let _ = writeln!(
        out,
        "- Available tools: {}",
        if tool_names.is_empty() {
            "(none)".to_string()
        } else {
            tool_names.join(", ")
        }
    );

    out.push_str("\n## Conversation Flow\n");
    for (index, message) in state.wire_conversation().iter().enumerate() {
        render_message(&mut out, index + 1, message);
    }

    out.push_str("\n## Execution Logs\n\n");
    if state.logs.is_empty() {
        out.push_str("(no log entries)\n");
    } else {
        for (index, line) in state.logs.iter().enumerate() {
            let _ = writeln!(out, "{}. {line}", index + 1);
        }
    }

    out
}

fn render_message(out: &mut String, index: usize, message: &ChatMessage) {
    match message {
        ChatMessage::System { content } => {
            let _ = write!(out, "\n### {index}. System Message\n\n{content}\n");
        }
        ChatMessage::User { content } => {
            let _ = write!(out, "\n### {index}. User Message\n\n{content}\n");
        }
        ChatMessage::Assistant {
            content,
            tool_calls,
        } if tool_calls.is_empty() => {
            let text = content.as_deref().unwrap_or("(no content)");
            let _ = write!(out, "\n### {index}. Assistant Message\n\n{text}\n");
        }
        ChatMessage::Assistant {
            content,
            tool_calls,
        } => {
            let _ = write!(out, "\n### {index}. Assistant Tool Calls\n\n");
            if let Some(text) = content.as_deref() {
                let _ = write!(out, "{text}\n\n");
            }
            for call in tool_calls {
                let _ = writeln!(
                    out,
                    "- `{}`: `{}({})`",
                    call.id, call.function.name, call.function.arguments
                );
            }
        }
        ChatMessage::Tool {
            content,
            tool_call_id,
        } => {
            let _ = write!(
                out,
                "\n### {index}. Tool Response (`{tool_call_id}`)\n\n```json\n{content}\n```\n"
            );
        }
    }
}

fn status_label(status: &AgentStatus) -> String {
    match status {
        AgentStatus::InProgress => "In progress".to_string(),
        AgentStatus::WaitingForTools => "Waiting for tools".to_string(),
        AgentStatus::Complete => "Complete".to_string(),
        AgentStatus::Failed(reason) => format!("Failed: {reason}"),
    }
}

/// Write the trace to `path`, logging and swallowing any I/O error.
pub fn write_trace(state: &AgentState, path: &Path) {
    if let Err(error) = fs::write(path, format_trace(state)) {
        warn!(path = %path.display(), %error, "failed to write agent trace");
    }
}

// ── tests ────────────────────────────────────────────────────────────────────
