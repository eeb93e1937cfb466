//! Ready-set DAG scheduler.
//!
//! Dispatches every task whose dependencies completed `Ok`, runs
//! independent tasks concurrently under a semaphore bound, retries
//! timeout-classified failures, and records transitive dependents of a
//! failure as `Skipped` without ever dispatching them.

use crate::agent::{AgentRegistry, TaskContext};
use crate::coordinator::trace::ExecutionTrace;
use crate::core::{AgentResult, TaskFailure, TaskPlan, TaskStatus};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Execution output: one terminal result per plan task plus the trace.
pub(crate) struct SchedulerOutcome {
    pub results: HashMap<String, AgentResult>,
    pub trace: ExecutionTrace,
}

/// Runs a validated plan to completion.
///
/// Every task in the plan ends up with exactly one terminal result in
/// the outcome map, regardless of failures or cancellation.
pub(crate) async fn execute_plan(
    plan: &TaskPlan,
    registry: &AgentRegistry,
    base_ctx: &TaskContext,
    max_concurrency: usize,
    max_retries: u32,
    cancel: &CancellationToken,
) -> SchedulerOutcome {
    let run_start = Instant::now();
    let semaphore = Arc::new(Semaphore::new(max_concurrency.max(1)));
    let mut join_set: JoinSet<(String, Duration, AgentResult)> = JoinSet::new();

    let mut results: HashMap<String, AgentResult> = HashMap::new();
    let mut in_flight: HashSet<String> = HashSet::new();
    let mut attempts: HashMap<String, u32> = HashMap::new();
    let mut trace = ExecutionTrace::new();

    loop {
        // Dispatch pass: a task becomes eligible the instant all of its
        // dependencies hold Ok results.
        for task in plan.tasks() {
            if cancel.is_cancelled() {
                break;
            }
            if results.contains_key(&task.id) || in_flight.contains(&task.id) {
                continue;
            }
            let deps_ok = task
                .depends_on
                .iter()
                .all(|dep| results.get(dep).is_some_and(AgentResult::is_ok));
            if !deps_ok {
                continue;
            }

            let agent = match registry.resolve(&task.capability) {
                Ok(agent) => agent,
                Err(err) => {
                    // Registry miss fails the task, never the process.
                    let result =
                        AgentResult::failed(&task.id, TaskFailure::from(&err), Duration::ZERO);
                    trace.record(
                        &task.id,
                        TaskStatus::Failed,
                        run_start.elapsed(),
                        Duration::ZERO,
                        1,
                    );
                    skip_dependents(plan, &task.id, &mut results, &in_flight, &mut trace, run_start);
                    results.insert(task.id.clone(), result);
                    continue;
                }
            };

            let attempt = attempts.entry(task.id.clone()).or_insert(0);
            *attempt += 1;
            debug!(task_id = %task.id, capability = %task.capability, attempt = *attempt, "dispatching task");

            let mut ctx = base_ctx.clone();
            ctx.upstream = task
                .depends_on
                .iter()
                .filter_map(|dep| results.get(dep).map(|r| (dep.clone(), r.clone())))
                .collect();

            in_flight.insert(task.id.clone());
            let task = task.clone();
            let semaphore = Arc::clone(&semaphore);
            let cancel = cancel.clone();
            join_set.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return (
                        task.id.clone(),
                        run_start.elapsed(),
                        AgentResult::cancelled(&task.id, Duration::ZERO),
                    );
                };
                let offset = run_start.elapsed();
                let started = Instant::now();
                let result = tokio::select! {
                    () = cancel.cancelled() => AgentResult::cancelled(&task.id, started.elapsed()),
                    result = agent.handle(&task, &ctx) => result,
                };
                (task.id.clone(), offset, result)
            });
        }

        if results.len() == plan.len() {
            break;
        }

        if join_set.is_empty() {
            // Nothing running and nothing dispatchable: the remaining
            // tasks sit behind a failure or the request was cancelled.
            finish_unreachable(plan, cancel, &mut results, &mut trace, run_start);
            break;
        }

        match join_set.join_next().await {
            Some(Ok((task_id, offset, result))) => {
                in_flight.remove(&task_id);
                let attempt = attempts.get(&task_id).copied().unwrap_or(1);

                if result.is_retryable() && attempt <= max_retries {
                    debug!(task_id = %task_id, attempt, "retrying timed-out task");
                    continue;
                }

                trace.record(&task_id, result.status, offset, result.duration, attempt);
                if !result.is_ok() && result.status != TaskStatus::Cancelled {
                    skip_dependents(plan, &task_id, &mut results, &in_flight, &mut trace, run_start);
                }
                results.insert(task_id, result);
            }
            Some(Err(join_err)) => {
                // Agents are infallible by contract; a panicking handler
                // is a bug. Drop the in-flight marker so the run can
                // still terminate.
                warn!(error = %join_err, "agent task aborted unexpectedly");
                in_flight.clear();
            }
            None => {
                in_flight.clear();
            }
        }
    }

    SchedulerOutcome { results, trace }
}

/// Marks every not-yet-dispatched dependent of `failed` as skipped.
fn skip_dependents(
    plan: &TaskPlan,
    failed: &str,
    results: &mut HashMap<String, AgentResult>,
    in_flight: &HashSet<String>,
    trace: &mut ExecutionTrace,
    run_start: Instant,
) {
    for dep_id in plan.transitive_dependents(failed) {
        if results.contains_key(&dep_id) || in_flight.contains(&dep_id) {
            continue;
        }
        trace.record(
            &dep_id,
            TaskStatus::Skipped,
            run_start.elapsed(),
            Duration::ZERO,
            0,
        );
        results.insert(dep_id.clone(), AgentResult::skipped(&dep_id, failed));
    }
}

/// Gives every task without a result a terminal record: cancelled when
/// the token fired, skipped behind its first failed dependency
/// otherwise.
fn finish_unreachable(
    plan: &TaskPlan,
    cancel: &CancellationToken,
    results: &mut HashMap<String, AgentResult>,
    trace: &mut ExecutionTrace,
    run_start: Instant,
) {
    for task in plan.tasks() {
        if results.contains_key(&task.id) {
            continue;
        }
        let result = if cancel.is_cancelled() {
            AgentResult::cancelled(&task.id, Duration::ZERO)
        } else {
            let failed_dep = task
                .depends_on
                .iter()
                .find(|dep| results.get(dep.as_str()).is_some_and(|r| !r.is_ok()))
                .map_or("dependency", String::as_str);
            AgentResult::skipped(&task.id, failed_dep)
        };
        trace.record(&task.id, result.status, run_start.elapsed(), Duration::ZERO, 0);
        results.insert(task.id.clone(), result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::prompt::PromptSet;
    use crate::agent::traits::WorkerAgent;
    use crate::core::{FailureKind, Task};
    use crate::llm::{OfflineLlm, RetryPolicy};
    use crate::tool::ToolGateway;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn base_ctx() -> TaskContext {
        TaskContext {
            gateway: Arc::new(ToolGateway::new()),
            llm: Arc::new(OfflineLlm::new()),
            prompts: Arc::new(PromptSet::defaults()),
            context: crate::core::ContextWindow::default(),
            upstream: HashMap::new(),
            tool_timeout: Duration::from_secs(1),
            retry: RetryPolicy::default(),
        }
    }

    #[derive(Debug)]
    struct OkAgent {
        tag: &'static str,
        delay: Duration,
    }

    #[async_trait]
    impl WorkerAgent for OkAgent {
        fn capability(&self) -> &str {
            self.tag
        }

        async fn handle(&self, task: &Task, ctx: &TaskContext) -> AgentResult {
            tokio::time::sleep(self.delay).await;
            let upstream_ids: Vec<&str> = task
                .depends_on
                .iter()
                .filter(|d| ctx.upstream(d).is_some())
                .map(String::as_str)
                .collect();
            AgentResult::ok(
                &task.id,
                json!({"task": task.id, "upstream": upstream_ids}),
                self.delay,
            )
        }
    }

    #[derive(Debug)]
    struct FailingAgent {
        tag: &'static str,
        kind: FailureKind,
        successes_after: u32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl WorkerAgent for FailingAgent {
        fn capability(&self) -> &str {
            self.tag
        }

        async fn handle(&self, task: &Task, _ctx: &TaskContext) -> AgentResult {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.successes_after {
                AgentResult::failed(
                    &task.id,
                    TaskFailure::new(self.kind, "injected failure"),
                    Duration::ZERO,
                )
            } else {
                AgentResult::ok(&task.id, json!({"recovered": true}), Duration::ZERO)
            }
        }
    }

    fn two_node_plan() -> TaskPlan {
        TaskPlan::new(vec![
            Task::new("a", "analysis", json!({})),
            Task::new("b", "report", json!({})).depends_on("a"),
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn test_dependency_ordering() {
        let registry = AgentRegistry::new();
        registry.register(Arc::new(OkAgent { tag: "analysis", delay: Duration::from_millis(10) }));
        registry.register(Arc::new(OkAgent { tag: "report", delay: Duration::ZERO }));

        let plan = two_node_plan();
        let outcome = execute_plan(
            &plan,
            &registry,
            &base_ctx(),
            4,
            0,
            &CancellationToken::new(),
        )
        .await;

        assert!(outcome.results["a"].is_ok());
        assert!(outcome.results["b"].is_ok());
        // The dependent observed its upstream result.
        assert_eq!(outcome.results["b"].payload["upstream"], json!(["a"]));
    }

    #[tokio::test]
    async fn test_failure_skips_transitive_dependents() {
        let registry = AgentRegistry::new();
        registry.register(Arc::new(FailingAgent {
            tag: "analysis",
            kind: FailureKind::ToolFailed,
            successes_after: u32::MAX,
            calls: AtomicU32::new(0),
        }));
        registry.register(Arc::new(OkAgent { tag: "report", delay: Duration::ZERO }));

        let plan = TaskPlan::new(vec![
            Task::new("a", "analysis", json!({})),
            Task::new("b", "report", json!({})).depends_on("a"),
            Task::new("c", "report", json!({})).depends_on("b"),
        ])
        .unwrap();

        let outcome = execute_plan(
            &plan,
            &registry,
            &base_ctx(),
            4,
            3,
            &CancellationToken::new(),
        )
        .await;

        assert_eq!(outcome.results["a"].status, TaskStatus::Failed);
        assert_eq!(outcome.results["b"].status, TaskStatus::Skipped);
        assert_eq!(outcome.results["c"].status, TaskStatus::Skipped);
    }

    #[tokio::test]
    async fn test_only_timeouts_are_retried() {
        let registry = AgentRegistry::new();
        let flaky = Arc::new(FailingAgent {
            tag: "analysis",
            kind: FailureKind::Timeout,
            successes_after: 2,
            calls: AtomicU32::new(0),
        });
        registry.register(flaky.clone());

        let plan = TaskPlan::new(vec![Task::new("a", "analysis", json!({}))]).unwrap();
        let outcome = execute_plan(
            &plan,
            &registry,
            &base_ctx(),
            4,
            2,
            &CancellationToken::new(),
        )
        .await;

        assert!(outcome.results["a"].is_ok());
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 3);
        assert_eq!(outcome.trace.spans[0].attempts, 3);
    }

    #[tokio::test]
    async fn test_retry_budget_is_bounded() {
        let registry = AgentRegistry::new();
        let flaky = Arc::new(FailingAgent {
            tag: "analysis",
            kind: FailureKind::Timeout,
            successes_after: u32::MAX,
            calls: AtomicU32::new(0),
        });
        registry.register(flaky.clone());

        let plan = TaskPlan::new(vec![Task::new("a", "analysis", json!({}))]).unwrap();
        let outcome = execute_plan(
            &plan,
            &registry,
            &base_ctx(),
            4,
            2,
            &CancellationToken::new(),
        )
        .await;

        assert_eq!(outcome.results["a"].status, TaskStatus::Failed);
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_timeout_failures_are_terminal() {
        let registry = AgentRegistry::new();
        let flaky = Arc::new(FailingAgent {
            tag: "analysis",
            kind: FailureKind::ToolFailed,
            successes_after: 1,
            calls: AtomicU32::new(0),
        });
        registry.register(flaky.clone());

        let plan = TaskPlan::new(vec![Task::new("a", "analysis", json!({}))]).unwrap();
        let outcome = execute_plan(
            &plan,
            &registry,
            &base_ctx(),
            4,
            5,
            &CancellationToken::new(),
        )
        .await;

        assert_eq!(outcome.results["a"].status, TaskStatus::Failed);
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_capability_is_task_failure() {
        let registry = AgentRegistry::new();
        registry.register(Arc::new(OkAgent { tag: "report", delay: Duration::ZERO }));

        let plan = two_node_plan();
        let outcome = execute_plan(
            &plan,
            &registry,
            &base_ctx(),
            4,
            0,
            &CancellationToken::new(),
        )
        .await;

        let failure = outcome.results["a"].failure.as_ref().unwrap();
        assert_eq!(failure.kind, FailureKind::UnknownCapability);
        assert_eq!(outcome.results["b"].status, TaskStatus::Skipped);
    }

    #[tokio::test]
    async fn test_cancellation_records_cancelled() {
        let registry = AgentRegistry::new();
        registry.register(Arc::new(OkAgent {
            tag: "analysis",
            delay: Duration::from_secs(30),
        }));
        registry.register(Arc::new(OkAgent { tag: "report", delay: Duration::ZERO }));

        let cancel = CancellationToken::new();
        let cancel_clone = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            cancel_clone.cancel();
        });

        let plan = two_node_plan();
        let outcome = execute_plan(&plan, &registry, &base_ctx(), 4, 0, &cancel).await;

        assert_eq!(outcome.results["a"].status, TaskStatus::Cancelled);
        assert_eq!(outcome.results["b"].status, TaskStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_independent_tasks_run_concurrently() {
        let registry = AgentRegistry::new();
        registry.register(Arc::new(OkAgent {
            tag: "analysis",
            delay: Duration::from_millis(50),
        }));

        let plan = TaskPlan::new(vec![
            Task::new("a", "analysis", json!({})),
            Task::new("b", "analysis", json!({})),
            Task::new("c", "analysis", json!({})),
        ])
        .unwrap();

        let started = Instant::now();
        let outcome = execute_plan(
            &plan,
            &registry,
            &base_ctx(),
            3,
            0,
            &CancellationToken::new(),
        )
        .await;

        assert!(outcome.results.values().all(AgentResult::is_ok));
        // Three 50ms tasks under a 3-permit semaphore overlap.
        assert!(started.elapsed() < Duration::from_millis(140));
    }
}
