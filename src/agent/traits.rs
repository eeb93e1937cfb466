//! Worker agent abstraction and per-task execution context.

use crate::agent::prompt::PromptSet;
use crate::core::{AgentResult, ContextWindow, Task};
use crate::llm::{LlmClient, RetryPolicy};
use crate::tool::ToolGateway;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Everything an agent may touch while handling one task.
///
/// Agents never reach the memory bank or other agents directly; their
/// world is the gateway, the LLM, the rendered conversation context,
/// and the results of their declared upstream dependencies.
#[derive(Clone)]
pub struct TaskContext {
    /// Tool gateway for external capabilities.
    pub gateway: Arc<ToolGateway>,

    /// LLM backend.
    pub llm: Arc<dyn LlmClient>,

    /// System prompts in effect.
    pub prompts: Arc<PromptSet>,

    /// Recent conversation context for this request.
    pub context: ContextWindow,

    /// Results of the task's declared dependencies, keyed by task ID.
    pub upstream: HashMap<String, AgentResult>,

    /// Timeout applied to each tool invocation.
    pub tool_timeout: Duration,

    /// Retry policy for transient LLM failures.
    pub retry: RetryPolicy,
}

impl TaskContext {
    /// Result of a declared upstream dependency.
    #[must_use]
    pub fn upstream(&self, task_id: &str) -> Option<&AgentResult> {
        self.upstream.get(task_id)
    }
}

/// A worker that handles tasks for exactly one capability tag.
///
/// `handle` is infallible by contract: every tool, LLM, or input
/// failure is folded into a `Failed` [`AgentResult`] so orchestration
/// decisions stay with the coordinator. Handlers must be idempotent;
/// a retried task may run more than once.
#[async_trait]
pub trait WorkerAgent: std::fmt::Debug + Send + Sync {
    /// The capability tag this agent serves.
    fn capability(&self) -> &str;

    /// Executes one task to a terminal result.
    async fn handle(&self, task: &Task, ctx: &TaskContext) -> AgentResult;
}
