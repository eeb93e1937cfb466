//! Planner abstraction.

use crate::core::TaskPlan;
use crate::error::PlanError;
use async_trait::async_trait;

/// A request to decompose into a task plan.
#[derive(Debug, Clone)]
pub struct PlanRequest {
    /// Session the request belongs to.
    pub session_id: String,

    /// The natural-language analysis request.
    pub query: String,
}

impl PlanRequest {
    /// Creates a plan request.
    #[must_use]
    pub fn new(session_id: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            query: query.into(),
        }
    }
}

/// Decomposes a request into a validated task DAG.
#[async_trait]
pub trait Planner: Send + Sync {
    /// Planner strategy name.
    fn name(&self) -> &str;

    /// Produces a plan for the request.
    async fn plan(&self, request: &PlanRequest) -> Result<TaskPlan, PlanError>;
}
