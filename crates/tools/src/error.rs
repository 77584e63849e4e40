//! Error taxonomy for tool dispatch.
//!
//! Two layers coexist: [`ToolParameterError`] describes one bad field and is
//! produced by the extractor; [`ToolCallError`] describes a whole call and
//! is what the registry returns.  The formatted strings below are read by
//! models retrying a failed call, so their wording is frozen.

use thiserror::Error;

// ── parameter level ──────────────────────────────────────────────────────────

/// A single parameter the handler could not extract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolParameterError {
    /// The path resolved to an object that has no such key.  `available`
    /// lists the keys of the object containing the final segment, never the
    /// root.
    #[error("required parameter '{path}' (type: {expected}) is missing{}", available_suffix(.available))]
    MissingParameter {
        path: String,
        expected: String,
        available: Vec<String>,
    },
    /// The key exists but its value is JSON `null`.  Distinct from missing so
    /// optional getters can collapse both while required ones report which
    /// happened.
    #[error("parameter '{path}' (type: {expected}) is required but value was null")]
    NullParameter { path: String, expected: String },
    #[error("parameter '{path}' has wrong type - expected {expected} but got {actual}")]
    TypeMismatch {
        path: String,
        expected: String,
        actual: String,
    },
    /// A non-final path segment resolved to something that cannot be
    /// descended into.
    #[error("cannot access parameter '{segment}' because parent '{parent}' is {actual}, not an object")]
    InvalidNesting {
        segment: String,
        parent: String,
        actual: String,
    },
}

fn available_suffix(available: &[String]) -> String {
    if available.is_empty() {
        String::new()
    } else {
        format!(" (available: {})", available.join(", "))
    }
}

// ── call level ───────────────────────────────────────────────────────────────

/// A tool call that could not produce a result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolCallError {
    #[error("Tool call '{0}' is not a recognized tool")]
    UnknownFunction(String),
    #[error("Tool call '{0}' received null arguments - expected an object with required parameters")]
    NullArguments(String),
    #[error("{}", invalid_arguments_message(.0, .1))]
    InvalidArguments(String, Vec<ToolParameterError>),
    /// The handler returned a domain error string.
    #[error("Tool call '{0}' failed with error: {1}")]
    HandlerError(String, String),
    /// The handler panicked or its task died.
    #[error("Tool call '{0}' failed during execution: {1}")]
    ExecutionError(String, String),
}

fn invalid_arguments_message(name: &str, errors: &[ToolParameterError]) -> String {
    match errors {
        [single] => format!("Tool call '{name}' {single}"),
        many => {
            let bullets = many
                .iter()
                .map(|e| format!("  - {e}"))
                .collect::<Vec<_>>()
                .join("\n");
            format!("Tool call '{name}' has parameter issues:\n{bullets}")
        }
    }
}

// ── tests ────────────────────────────────────────────────────────────────────
