//! Report generator worker agent.

use crate::agent::prompt::build_reporter_prompt;
use crate::agent::traits::{TaskContext, WorkerAgent};
use crate::core::{AgentResult, CAP_REPORT, Task, TaskFailure};
use crate::error::AgentError;
use crate::llm::{CompletionOptions, complete_with_retry};
use crate::tool::{FormatterTool, VisualizationTool};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::time::Instant;

/// Handles `report` tasks.
///
/// Consumes the analysis payload produced by its declared upstream
/// dependency, asks the LLM for the report narrative, and renders the
/// final document through the formatter tool.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportGeneratorAgent;

impl ReportGeneratorAgent {
    /// Creates a new report generator agent.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// The analysis payload from the first declared dependency.
    fn upstream_analysis<'a>(task: &Task, ctx: &'a TaskContext) -> Option<&'a Value> {
        task.depends_on
            .iter()
            .filter_map(|dep| ctx.upstream(dep))
            .find(|result| result.is_ok())
            .map(|result| &result.payload)
    }

    fn build_sections(narrative: &str, analysis: &Value) -> Vec<Value> {
        let mut sections = vec![json!({"heading": "Summary", "body": narrative})];

        if let Some(statistics) = analysis.get("statistics")
            && statistics.as_object().is_some_and(|s| !s.is_empty())
        {
            let body = serde_json::to_string_pretty(statistics)
                .unwrap_or_else(|_| "{}".to_string());
            sections.push(json!({"heading": "Statistics", "body": format!("```\n{body}\n```")}));
        }

        if let Some(trend) = analysis.get("trend")
            && trend.is_object()
        {
            let direction = trend.get("direction").and_then(Value::as_str).unwrap_or("unknown");
            let pct = trend.get("pct_change").and_then(Value::as_f64).unwrap_or(0.0);
            sections.push(json!({
                "heading": "Trend",
                "body": format!("The measured trend is {direction} ({pct:.1}% change over the period)."),
            }));
        }

        if let Some(insights) = analysis.get("insights").and_then(Value::as_str) {
            sections.push(json!({"heading": "Insights", "body": insights}));
        }

        sections
    }

    /// A chart-spec section over the per-column means, when the
    /// analysis carried any statistics. A chart tool failure drops the
    /// section rather than failing the report.
    async fn chart_section(ctx: &TaskContext, analysis: &Value) -> Option<Value> {
        let statistics = analysis.get("statistics")?.as_object()?;
        let rows: Vec<Value> = statistics
            .iter()
            .filter_map(|(column, summary)| {
                let mean = summary.get("mean").and_then(Value::as_f64)?;
                Some(json!({"column": column, "mean": mean}))
            })
            .collect();
        if rows.is_empty() {
            return None;
        }

        let spec = ctx
            .gateway
            .invoke(
                VisualizationTool::NAME,
                &json!({
                    "type": "bar",
                    "title": "Mean by column",
                    "rows": rows,
                    "x": "column",
                    "y": "mean",
                }),
                ctx.tool_timeout,
            )
            .await
            .ok()?;

        let body = serde_json::to_string_pretty(spec.get("chart")?).ok()?;
        Some(json!({"heading": "Chart", "body": format!("```\n{body}\n```")}))
    }
}

#[async_trait]
impl WorkerAgent for ReportGeneratorAgent {
    fn capability(&self) -> &str {
        CAP_REPORT
    }

    async fn handle(&self, task: &Task, ctx: &TaskContext) -> AgentResult {
        let started = Instant::now();

        let Some(query) = task.input.get("query").and_then(Value::as_str) else {
            let err = AgentError::MissingInput {
                field: "query".to_string(),
            };
            return AgentResult::failed(&task.id, TaskFailure::from(&err), started.elapsed());
        };

        let Some(analysis) = Self::upstream_analysis(task, ctx).cloned() else {
            let err = AgentError::MissingInput {
                field: "analysis".to_string(),
            };
            return AgentResult::failed(&task.id, TaskFailure::from(&err), started.elapsed());
        };

        let narrative = complete_with_retry(
            ctx.llm.as_ref(),
            &ctx.prompts.reporter,
            &build_reporter_prompt(query, &analysis),
            &ctx.context.render(),
            &CompletionOptions::default(),
            ctx.retry,
        )
        .await;
        let narrative = match narrative {
            Ok(text) => text,
            Err(err) => {
                return AgentResult::failed(&task.id, TaskFailure::from(&err), started.elapsed());
            }
        };

        let mut sections = Self::build_sections(&narrative, &analysis);
        if let Some(section) = Self::chart_section(ctx, &analysis).await {
            sections.push(section);
        }

        let formatted = ctx
            .gateway
            .invoke(
                FormatterTool::NAME,
                &json!({
                    "title": "Analysis Report",
                    "sections": sections,
                }),
                ctx.tool_timeout,
            )
            .await;

        match formatted {
            Ok(document) => AgentResult::ok(&task.id, document, started.elapsed()),
            Err(err) => {
                AgentResult::failed(&task.id, TaskFailure::from(&err), started.elapsed())
            }
        }
    }
}
