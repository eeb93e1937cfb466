//! Data analyst worker agent.

use crate::agent::prompt::build_analyst_prompt;
use crate::agent::traits::{TaskContext, WorkerAgent};
use crate::core::{AgentResult, CAP_ANALYSIS, Task, TaskFailure};
use crate::error::{AgentError, ToolError};
use crate::llm::{CompletionOptions, complete_with_retry};
use crate::tool::{DataLoaderTool, StatsTool};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::time::Instant;
use tracing::debug;

/// Handles `analysis` tasks.
///
/// When the task input names a data file the agent loads it through the
/// gateway, computes descriptive statistics and a trend, then asks the
/// LLM for insights grounded in those numbers. Without a data file it
/// answers from the conversation context alone. All tool and LLM time
/// is bounded by the context's timeout and retry policy, so a retried
/// task simply recomputes from the same immutable input.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataAnalystAgent;

impl DataAnalystAgent {
    /// Creates a new analyst agent.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    async fn measure(
        &self,
        ctx: &TaskContext,
        data_file: &str,
    ) -> Result<(Value, Option<Value>), ToolError> {
        let loaded = ctx
            .gateway
            .invoke(
                DataLoaderTool::NAME,
                &json!({"path": data_file}),
                ctx.tool_timeout,
            )
            .await?;
        let rows = loaded.get("rows").cloned().unwrap_or_else(|| json!([]));

        let described = ctx
            .gateway
            .invoke(
                StatsTool::NAME,
                &json!({"op": "describe", "rows": rows}),
                ctx.tool_timeout,
            )
            .await?;
        let statistics = described
            .get("statistics")
            .cloned()
            .unwrap_or_else(|| json!({}));

        // Trend over the first numeric column, when there is one.
        let trend_column = statistics
            .as_object()
            .and_then(|cols| cols.keys().next().cloned());
        let trend = match trend_column {
            Some(column) => {
                let result = ctx
                    .gateway
                    .invoke(
                        StatsTool::NAME,
                        &json!({"op": "trend", "rows": rows, "column": column}),
                        ctx.tool_timeout,
                    )
                    .await;
                match result {
                    Ok(trend) => Some(trend),
                    // Too few values is not a task failure; there is
                    // just no trend to report.
                    Err(ToolError::InvalidArgs { .. }) => None,
                    Err(err) => return Err(err),
                }
            }
            None => None,
        };

        Ok((statistics, trend))
    }
}

#[async_trait]
impl WorkerAgent for DataAnalystAgent {
    fn capability(&self) -> &str {
        CAP_ANALYSIS
    }

    async fn handle(&self, task: &Task, ctx: &TaskContext) -> AgentResult {
        let started = Instant::now();

        let Some(query) = task.input.get("query").and_then(Value::as_str) else {
            let err = AgentError::MissingInput {
                field: "query".to_string(),
            };
            return AgentResult::failed(&task.id, TaskFailure::from(&err), started.elapsed());
        };

        let (statistics, trend) = match task.input.get("data_file").and_then(Value::as_str) {
            Some(data_file) => {
                debug!(task_id = %task.id, data_file, "analyst loading data");
                match self.measure(ctx, data_file).await {
                    Ok(measured) => measured,
                    Err(err) => {
                        return AgentResult::failed(
                            &task.id,
                            TaskFailure::from(&err),
                            started.elapsed(),
                        );
                    }
                }
            }
            None => (json!({}), None),
        };

        let prompt = build_analyst_prompt(query, &statistics, trend.as_ref());
        let insights = complete_with_retry(
            ctx.llm.as_ref(),
            &ctx.prompts.analyst,
            &prompt,
            &ctx.context.render(),
            &CompletionOptions::default(),
            ctx.retry,
        )
        .await;

        match insights {
            Ok(insights) => AgentResult::ok(
                &task.id,
                json!({
                    "statistics": statistics,
                    "trend": trend,
                    "insights": insights,
                }),
                started.elapsed(),
            ),
            Err(err) => {
                AgentResult::failed(&task.id, TaskFailure::from(&err), started.elapsed())
            }
        }
    }
}
