//! Tool lookup and batched dispatch.

use std::num::NonZeroUsize;

use anyhow::{Result, bail};
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::ToolCallError;
use crate::function::{ToolCallRequest, ToolFunction};

// ── strategies ───────────────────────────────────────────────────────────────

/// How `execute_all` schedules a batch.  Whatever the strategy, results come
/// back in request order and one failure never aborts its siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionStrategy {
    /// One request at a time; each completes before the next starts.
    #[default]
    Sequential,
    /// All requests launched at once on the task system.
    Parallel,
    /// Chunks of `n`, each chunk fully drained before the next starts.
    ParallelWithLimit(NonZeroUsize),
}

impl ExecutionStrategy {
    /// Bounded-concurrency strategy.  The limit must be at least 1.
    pub fn parallel_with_limit(limit: usize) -> Result<Self> {
        match NonZeroUsize::new(limit) {
            Some(limit) => Ok(Self::ParallelWithLimit(limit)),
            None => bail!("parallel execution limit must be at least 1, got {limit}"),
        }
    }
}

// ── registry ─────────────────────────────────────────────────────────────────

/// An immutable bundle of tools, addressable by name.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<ToolFunction>,
}

impl ToolRegistry {
    pub fn new(tools: Vec<ToolFunction>) -> Self {
        Self { tools }
    }

    /// Look a tool up by name.  Duplicate names are a caller bug; when they
    /// occur anyway, the last-registered tool wins.
    pub fn get_tool(&self, name: &str) -> Option<&ToolFunction> {
        self.tools.iter().rev().find(|t| t.name() == name)
    }

    /// Registered names, in registration order.
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Synchronous single dispatch.
    pub fn execute(&self, request: &ToolCallRequest) -> Result<Value, ToolCallError> {
        match self.get_tool(&request.tool_name) {
            Some(tool) => tool.execute(&request.arguments),
            None => Err(ToolCallError::UnknownFunction(request.tool_name.clone())),
        }
    }

    /// Schedule a single dispatch on the blocking task pool.  Aborting the
    /// returned handle cancels at the task boundary; handlers themselves are
    /// synchronous and run to completion once started.
    pub fn execute_async(
        &self,
        request: &ToolCallRequest,
    ) -> JoinHandle<Result<Value, ToolCallError>> {
        let tool = self.get_tool(&request.tool_name).cloned();
        let request = request.clone();
        tokio::task::spawn_blocking(move || match tool {
            Some(tool) => tool.execute(&request.arguments),
            None => Err(ToolCallError::UnknownFunction(request.tool_name)),
        })
    }

    /// Dispatch a batch under `strategy`.
    ///
    /// The result vector always has one slot per request, in request order:
    /// a failed request contributes its error in place.
    pub async fn execute_all(
        &self,
        requests: &[ToolCallRequest],
        strategy: ExecutionStrategy,
    ) -> Vec<Result<Value, ToolCallError>> {
        debug!(
            count = requests.len(),
            ?strategy,
            "executing tool call batch"
        );
        match strategy {
            ExecutionStrategy::Sequential => requests.iter().map(|r| self.execute(r)).collect(),
            ExecutionStrategy::Parallel => self.gather(requests).await,
            ExecutionStrategy::ParallelWithLimit(limit) => {
                let mut results = Vec::with_capacity(requests.len());
                for chunk in requests.chunks(limit.get()) {
                    results.extend(self.gather(chunk).await);
                }
                results
            }
        }
    }

    /// Launch every request concurrently and collect results in input order.
    async fn gather(&self, requests: &[ToolCallRequest]) -> Vec<Result<Value, ToolCallError>> {
        let handles: Vec<_> = requests.iter().map(|r| self.execute_async(r)).collect();
        let joined = futures::future::join_all(handles).await;
        joined
            .into_iter()
            .zip(requests)
            .map(|(outcome, request)| match outcome {
                Ok(result) => result,
                // The task was cancelled or its panic escaped the handler
                // guard; surface it in this request's slot.
                Err(join_error) => Err(ToolCallError::ExecutionError(
                    request.tool_name.clone(),
                    join_error.to_string(),
                )),
            })
            .collect()
    }

    /// JSON array of per-tool advertisements in the OpenAI function format.
    pub fn get_openai_tools(&self, strict: bool) -> Value {
        Value::Array(
            self.tools
                .iter()
                .map(|t| t.to_openai_tool(strict))
                .collect(),
        )
    }

    /// Provider-keyed advertisement lookup.  All supported providers accept
    /// the OpenAI form today; an unknown provider is a programmer error, not
    /// a tool-call failure.
    pub fn tool_definitions(&self, provider: &str) -> Result<Value> {
        match provider.to_ascii_lowercase().as_str() {
            "openai" | "anthropic" | "gemini" => Ok(self.get_openai_tools(true)),
            other => bail!("unknown tool definition provider '{other}' (expected openai, anthropic, or gemini)"),
        }
    }
}

// ── tests ────────────────────────────────────────────────────────────────────
