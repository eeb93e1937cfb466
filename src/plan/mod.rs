//! Request planning strategies.
//!
//! A [`Planner`] turns a natural-language request into a validated
//! [`crate::core::TaskPlan`]. The [`KeywordPlanner`] is deterministic;
//! the [`LlmPlanner`] delegates decomposition to the model and falls
//! back to keywords when the model is unavailable or unusable.

pub mod keyword;
pub mod llm;
pub mod traits;

pub use keyword::KeywordPlanner;
pub use llm::LlmPlanner;
pub use traits::{PlanRequest, Planner};

use crate::error::PlanError;
use crate::llm::LlmClient;
use std::sync::Arc;

/// Creates a planner strategy by name.
///
/// # Errors
///
/// Returns [`PlanError::UnknownPlanner`] for an unrecognized name.
pub fn create_planner(
    name: &str,
    llm: Arc<dyn LlmClient>,
) -> Result<Arc<dyn Planner>, PlanError> {
    match name {
        "keyword" => Ok(Arc::new(KeywordPlanner::new())),
        "llm" => Ok(Arc::new(LlmPlanner::new(llm))),
        other => Err(PlanError::UnknownPlanner {
            name: other.to_string(),
        }),
    }
}

/// Names of the available planner strategies.
#[must_use]
pub fn available_planners() -> Vec<&'static str> {
    vec!["keyword", "llm"]
}
