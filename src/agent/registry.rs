//! Capability-to-agent registry.

use crate::agent::traits::WorkerAgent;
use crate::error::AgentError;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Maps capability tags to worker agents.
///
/// Exactly one agent serves a tag; registering a second agent for the
/// same tag replaces the first, which is how tests install doubles.
/// A resolution miss is a task-level failure, never fatal to the
/// process.
#[derive(Default)]
pub struct AgentRegistry {
    agents: RwLock<HashMap<String, Arc<dyn WorkerAgent>>>,
}

impl AgentRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an agent under its capability tag (last write wins).
    pub fn register(&self, agent: Arc<dyn WorkerAgent>) {
        let tag = agent.capability().to_string();
        debug!(capability = %tag, "registering agent");
        if let Ok(mut agents) = self.agents.write() {
            agents.insert(tag, agent);
        }
    }

    /// Resolves the agent for a capability tag.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::UnknownCapability`] when no agent is
    /// registered for the tag.
    pub fn resolve(&self, tag: &str) -> Result<Arc<dyn WorkerAgent>, AgentError> {
        let agents = self
            .agents
            .read()
            .map_err(|_| AgentError::UnknownCapability {
                tag: tag.to_string(),
            })?;
        agents
            .get(tag)
            .cloned()
            .ok_or_else(|| AgentError::UnknownCapability {
                tag: tag.to_string(),
            })
    }

    /// Registered capability tags in sorted order.
    #[must_use]
    pub fn capabilities(&self) -> Vec<String> {
        let Ok(agents) = self.agents.read() else {
            return Vec::new();
        };
        let mut tags: Vec<String> = agents.keys().cloned().collect();
        tags.sort();
        tags
    }
}
