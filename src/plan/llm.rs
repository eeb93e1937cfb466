//! LLM-backed planner with deterministic fallback.

use crate::agent::prompt::PLANNER_SYSTEM_PROMPT;
use crate::core::{CAP_ANALYSIS, CAP_REPORT, Task, TaskPlan};
use crate::error::PlanError;
use crate::llm::{CompletionOptions, LlmClient};
use crate::plan::keyword::KeywordPlanner;
use crate::plan::traits::{PlanRequest, Planner};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Deserialize)]
struct PlannedTask {
    id: String,
    capability: String,
    #[serde(default)]
    input: Value,
    #[serde(default)]
    depends_on: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct PlannedWorkflow {
    tasks: Vec<PlannedTask>,
}

/// Asks the LLM to decompose the request into a task DAG.
///
/// Any LLM failure or unusable response falls back to the
/// deterministic [`KeywordPlanner`], so planning degrades rather than
/// fails when the model is unavailable.
pub struct LlmPlanner {
    llm: Arc<dyn LlmClient>,
    system_prompt: String,
    fallback: KeywordPlanner,
}

impl LlmPlanner {
    /// Creates a planner over the given LLM client with the default
    /// planning prompt.
    #[must_use]
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            system_prompt: PLANNER_SYSTEM_PROMPT.to_string(),
            fallback: KeywordPlanner::new(),
        }
    }

    /// Replaces the planning system prompt (prompt-dir overrides).
    #[must_use]
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    fn strip_fences(text: &str) -> &str {
        let trimmed = text.trim();
        let Some(inner) = trimmed.strip_prefix("```") else {
            return trimmed;
        };
        let inner = inner.strip_prefix("json").unwrap_or(inner);
        inner.strip_suffix("```").unwrap_or(inner).trim()
    }

    fn parse_plan(text: &str) -> Option<TaskPlan> {
        let workflow: PlannedWorkflow = serde_json::from_str(Self::strip_fences(text)).ok()?;
        if workflow.tasks.is_empty() {
            return None;
        }
        let tasks: Vec<Task> = workflow
            .tasks
            .into_iter()
            .map(|t| Task {
                id: t.id,
                capability: t.capability,
                input: t.input,
                depends_on: t.depends_on,
            })
            .collect();

        // Only plans over known capabilities are trusted.
        if tasks
            .iter()
            .any(|t| t.capability != CAP_ANALYSIS && t.capability != CAP_REPORT)
        {
            return None;
        }
        // Both built-in agents require a string query; a plan missing
        // one would fail at dispatch rather than fall back here.
        if tasks
            .iter()
            .any(|t| !t.input.get("query").is_some_and(Value::is_string))
        {
            return None;
        }
        TaskPlan::new(tasks).ok()
    }
}

#[async_trait]
impl Planner for LlmPlanner {
    fn name(&self) -> &str {
        "llm"
    }

    async fn plan(&self, request: &PlanRequest) -> Result<TaskPlan, PlanError> {
        if request.query.trim().is_empty() {
            return Err(PlanError::EmptyRequest);
        }

        let completion = self
            .llm
            .complete(
                &self.system_prompt,
                &request.query,
                "",
                &CompletionOptions::default(),
            )
            .await;

        match completion {
            Ok(text) => {
                if let Some(plan) = Self::parse_plan(&text) {
                    return Ok(plan);
                }
                warn!(session_id = %request.session_id, "unusable llm plan, using keyword fallback");
            }
            Err(err) => {
                warn!(session_id = %request.session_id, error = %err, "llm planning failed, using keyword fallback");
            }
        }
        self.fallback.plan(request).await
    }
}
