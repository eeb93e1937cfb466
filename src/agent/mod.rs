//! Worker agents, their registry, and agent prompts.
//!
//! Agents handle exactly one capability tag each and communicate only
//! through task inputs, upstream results, the tool gateway, and the
//! LLM. The coordinator owns all scheduling decisions.

pub mod analyst;
pub mod prompt;
pub mod registry;
pub mod reporter;
pub mod traits;

pub use analyst::DataAnalystAgent;
pub use prompt::PromptSet;
pub use registry::AgentRegistry;
pub use reporter::ReportGeneratorAgent;
pub use traits::{TaskContext, WorkerAgent};

use std::sync::Arc;

/// Creates a registry with the built-in agents registered.
#[must_use]
pub fn default_registry() -> AgentRegistry {
    let registry = AgentRegistry::new();
    registry.register(Arc::new(DataAnalystAgent::new()));
    registry.register(Arc::new(ReportGeneratorAgent::new()));
    registry
}
