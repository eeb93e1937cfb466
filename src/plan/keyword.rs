//! Deterministic heuristic planner.

use crate::core::{CAP_ANALYSIS, CAP_REPORT, Task, TaskPlan};
use crate::error::PlanError;
use crate::plan::traits::{PlanRequest, Planner};
use async_trait::async_trait;
use regex::Regex;
use serde_json::json;
use std::sync::LazyLock;

#[allow(clippy::unwrap_used)]
static DATA_FILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)([\w./\\-]+\.(?:csv|json))\b").unwrap());

const REPORT_KEYWORDS: &[&str] = &["report", "summary", "summarize", "document", "write up"];

/// Keyword and pattern based planner.
///
/// Detects data-file references and report intent in the query, then
/// emits either a single `analysis` task or an `analysis` task followed
/// by a dependent `report` task. Fully deterministic, so it doubles as
/// the fallback when the LLM planner cannot produce a usable plan.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordPlanner;

impl KeywordPlanner {
    /// Creates a new keyword planner.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn data_file(query: &str) -> Option<String> {
        DATA_FILE_RE
            .captures(query)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    }

    fn wants_report(query: &str) -> bool {
        let lower = query.to_lowercase();
        REPORT_KEYWORDS.iter().any(|k| lower.contains(k))
    }
}

#[async_trait]
impl Planner for KeywordPlanner {
    fn name(&self) -> &str {
        "keyword"
    }

    async fn plan(&self, request: &PlanRequest) -> Result<TaskPlan, PlanError> {
        let query = request.query.trim();
        if query.is_empty() {
            return Err(PlanError::EmptyRequest);
        }

        let mut analysis_input = json!({ "query": query });
        if let Some(path) = Self::data_file(query) {
            analysis_input["data_file"] = json!(path);
        }

        let mut tasks = vec![Task::new("analyze", CAP_ANALYSIS, analysis_input)];
        if Self::wants_report(query) {
            tasks.push(
                Task::new("report", CAP_REPORT, json!({ "query": query })).depends_on("analyze"),
            );
        }

        TaskPlan::new(tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn plan_for(query: &str) -> Result<TaskPlan, PlanError> {
        KeywordPlanner::new()
            .plan(&PlanRequest::new("s", query))
            .await
    }

    #[tokio::test]
    async fn test_empty_request_is_fatal() {
        assert!(matches!(plan_for("").await, Err(PlanError::EmptyRequest)));
        assert!(matches!(plan_for("   ").await, Err(PlanError::EmptyRequest)));
    }

    #[tokio::test]
    async fn test_analysis_only_plan() {
        let plan = plan_for("what is the average revenue?").await.unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.tasks()[0].capability, CAP_ANALYSIS);
        assert!(plan.tasks()[0].input.get("data_file").is_none());
    }

    #[tokio::test]
    async fn test_analysis_then_report_plan() {
        let plan = plan_for("Analyze the sales data in sales_data.csv and generate a report")
            .await
            .unwrap();
        assert_eq!(plan.len(), 2);

        let analyze = &plan.tasks()[0];
        assert_eq!(analyze.capability, CAP_ANALYSIS);
        assert_eq!(analyze.input["data_file"], "sales_data.csv");

        let report = &plan.tasks()[1];
        assert_eq!(report.capability, CAP_REPORT);
        assert_eq!(report.depends_on, vec!["analyze".to_string()]);
    }

    #[tokio::test]
    async fn test_json_data_file_detected() {
        let plan = plan_for("load data/metrics.json and describe it").await.unwrap();
        assert_eq!(plan.tasks()[0].input["data_file"], "data/metrics.json");
    }

    #[tokio::test]
    async fn test_report_keyword_variants() {
        for query in ["summarize q3 numbers", "write up the findings as a document"] {
            let plan = plan_for(query).await.unwrap();
            assert_eq!(plan.len(), 2, "query: {query}");
        }
    }
}
