//! Request orchestration.
//!
//! The [`Coordinator`] owns the request lifecycle: record the user
//! message, plan, execute the task DAG, synthesize the final result in
//! plan order, and record the agent response. Memory writes are
//! best-effort; a computed result is never lost to a failed append.

pub mod scheduler;
pub mod trace;

pub use trace::{ExecutionTrace, TraceSpan};

use crate::agent::{AgentRegistry, PromptSet, TaskContext};
use crate::core::{AgentResult, FinalResult, FinalStatus, Role, TaskStatus};
use crate::error::{PlanError, Result};
use crate::llm::{LlmClient, RetryPolicy};
use crate::memory::MemoryBank;
use crate::plan::{PlanRequest, Planner};
use crate::tool::ToolGateway;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Coordinator tuning knobs.
#[derive(Debug, Clone, Copy)]
pub struct CoordinatorConfig {
    /// Maximum number of tasks executing at once.
    pub max_concurrency: usize,

    /// Re-dispatch budget for timeout-classified task failures.
    pub max_retries: u32,

    /// Timeout applied to each tool invocation.
    pub tool_timeout: Duration,

    /// Context window budget passed to the memory bank.
    pub context_budget: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            max_retries: 1,
            tool_timeout: Duration::from_secs(30),
            context_budget: 4000,
        }
    }
}

impl CoordinatorConfig {
    /// Sets the concurrency bound.
    #[must_use]
    pub fn with_max_concurrency(mut self, limit: usize) -> Self {
        self.max_concurrency = limit;
        self
    }

    /// Sets the retry budget for timed-out tasks.
    #[must_use]
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Sets the per-tool-call timeout.
    #[must_use]
    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = timeout;
        self
    }

    /// Sets the context window budget.
    #[must_use]
    pub fn with_context_budget(mut self, budget: usize) -> Self {
        self.context_budget = budget;
        self
    }
}

/// Orchestrates one analysis request end to end.
pub struct Coordinator {
    bank: Arc<MemoryBank>,
    registry: Arc<AgentRegistry>,
    gateway: Arc<ToolGateway>,
    llm: Arc<dyn LlmClient>,
    planner: Arc<dyn Planner>,
    prompts: Arc<PromptSet>,
    config: CoordinatorConfig,
}

impl Coordinator {
    /// Creates a coordinator over the given collaborators.
    #[must_use]
    pub fn new(
        bank: Arc<MemoryBank>,
        registry: Arc<AgentRegistry>,
        gateway: Arc<ToolGateway>,
        llm: Arc<dyn LlmClient>,
        planner: Arc<dyn Planner>,
        prompts: Arc<PromptSet>,
        config: CoordinatorConfig,
    ) -> Self {
        Self {
            bank,
            registry,
            gateway,
            llm,
            planner,
            prompts,
            config,
        }
    }

    /// Runs one analysis request against a session.
    ///
    /// # Errors
    ///
    /// Returns a planning error for malformed requests and
    /// [`PlanError::ExecutionFailed`] when the plan's root task fails.
    pub async fn analyze(&self, session_id: &str, request: &str) -> Result<FinalResult> {
        self.analyze_with_cancel(session_id, request, &CancellationToken::new())
            .await
    }

    /// Like [`Coordinator::analyze`], abandoning in-flight work when
    /// the token fires. Tasks completed before cancellation keep their
    /// results.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Coordinator::analyze`].
    pub async fn analyze_with_cancel(
        &self,
        session_id: &str,
        request: &str,
        cancel: &CancellationToken,
    ) -> Result<FinalResult> {
        info!(session_id, "analysis request received");

        if let Err(err) = self.bank.append(session_id, Role::User, request).await {
            warn!(session_id, error = %err, "failed to record user message");
        }

        let plan = self
            .planner
            .plan(&PlanRequest::new(session_id, request))
            .await?;
        info!(session_id, tasks = plan.len(), "plan ready");

        let context = match self
            .bank
            .get_context(session_id, self.config.context_budget)
            .await
        {
            Ok(window) => window,
            Err(err) => {
                warn!(session_id, error = %err, "failed to load context window");
                crate::core::ContextWindow::default()
            }
        };

        let base_ctx = TaskContext {
            gateway: Arc::clone(&self.gateway),
            llm: Arc::clone(&self.llm),
            prompts: Arc::clone(&self.prompts),
            context,
            upstream: HashMap::new(),
            tool_timeout: self.config.tool_timeout,
            retry: RetryPolicy::default(),
        };

        let outcome = scheduler::execute_plan(
            &plan,
            &self.registry,
            &base_ctx,
            self.config.max_concurrency,
            self.config.max_retries,
            cancel,
        )
        .await;

        // Root-task failure fails the whole call; cancellation of the
        // root degrades to a Failed final status instead.
        if let Some(root) = plan.root() {
            if let Some(result) = outcome.results.get(&root.id)
                && result.status == TaskStatus::Failed
            {
                let detail = result
                    .failure
                    .as_ref()
                    .map_or_else(String::new, |f| f.detail.clone());
                return Err(PlanError::ExecutionFailed {
                    task_id: root.id.clone(),
                    detail,
                }
                .into());
            }
        }

        let ordered: Vec<&AgentResult> = plan
            .tasks()
            .iter()
            .filter_map(|task| outcome.results.get(&task.id))
            .collect();

        let status = if ordered.iter().all(|r| r.is_ok()) {
            FinalStatus::Ok
        } else if ordered.iter().any(|r| r.is_ok()) {
            FinalStatus::Partial
        } else {
            FinalStatus::Failed
        };

        let answer = Self::synthesize_answer(&ordered);
        let payload = json!({
            "answer": answer,
            "tasks": ordered
                .iter()
                .map(|r| serde_json::to_value(r).unwrap_or(Value::Null))
                .collect::<Vec<_>>(),
        });

        if let Err(err) = self.bank.append(session_id, Role::Agent, &answer).await {
            warn!(session_id, error = %err, "failed to record agent message");
        }

        info!(session_id, status = ?status, "analysis request complete");
        Ok(FinalResult {
            status,
            session_id: session_id.to_string(),
            payload,
            trace: serde_json::to_value(&outcome.trace).unwrap_or(Value::Null),
        })
    }

    /// The user-facing answer: the report when one was produced, the
    /// analysis insights otherwise. Plan order makes this deterministic
    /// regardless of completion order.
    fn synthesize_answer(ordered: &[&AgentResult]) -> String {
        let mut answer = String::new();
        for result in ordered {
            if !result.is_ok() {
                continue;
            }
            if let Some(report) = result.payload.get("report").and_then(Value::as_str) {
                answer = report.to_string();
            } else if answer.is_empty()
                && let Some(insights) = result.payload.get("insights").and_then(Value::as_str)
            {
                answer = insights.to_string();
            }
        }
        if answer.is_empty() {
            answer = "No results were produced for this request.".to_string();
        }
        answer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::default_registry;
    use crate::llm::OfflineLlm;
    use crate::memory::MemoryConfig;
    use crate::plan::KeywordPlanner;
    use crate::storage::{RecordStore, SqliteStore};
    use crate::tool::default_gateway;

    fn test_coordinator() -> Coordinator {
        let store = SqliteStore::in_memory().unwrap();
        store.init().unwrap();
        Coordinator::new(
            Arc::new(MemoryBank::new(Arc::new(store), MemoryConfig::default())),
            Arc::new(default_registry()),
            Arc::new(default_gateway()),
            Arc::new(OfflineLlm::new()),
            Arc::new(KeywordPlanner::new()),
            Arc::new(PromptSet::defaults()),
            CoordinatorConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_empty_request_fails_planning() {
        let coordinator = test_coordinator();
        let err = coordinator.analyze("s", "   ").await.unwrap_err();
        assert!(err.to_string().contains("empty request"));
    }

    #[tokio::test]
    async fn test_analysis_only_request() {
        let coordinator = test_coordinator();
        let result = coordinator
            .analyze("s", "what does the data suggest?")
            .await
            .unwrap();

        assert_eq!(result.status, FinalStatus::Ok);
        assert_eq!(result.session_id, "s");
        assert_eq!(result.payload["tasks"].as_array().unwrap().len(), 1);
        assert!(!result.payload["answer"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_messages_recorded_around_request() {
        let coordinator = test_coordinator();
        coordinator.analyze("s", "analyze things").await.unwrap();

        let window = coordinator.bank.get_context("s", usize::MAX).await.unwrap();
        assert_eq!(window.len(), 2);
        assert_eq!(window.messages()[0].role, Role::User);
        assert_eq!(window.messages()[1].role, Role::Agent);
        assert_eq!(window.messages()[0].seq, 0);
        assert_eq!(window.messages()[1].seq, 1);
    }

    #[tokio::test]
    async fn test_root_failure_fails_the_call() {
        let coordinator = test_coordinator();
        // The planner detects a data file; loading it fails, so the
        // root analysis task fails and the call errors.
        let err = coordinator
            .analyze("s", "analyze /definitely/missing.csv and generate a report")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("plan execution failed"));
    }

    #[tokio::test]
    async fn test_cancelled_root_degrades_to_failed_status() {
        let coordinator = test_coordinator();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = coordinator
            .analyze_with_cancel("s", "analyze the figures", &cancel)
            .await
            .unwrap();
        assert_eq!(result.status, FinalStatus::Failed);
    }
}
