//! Uniform entry point for tool invocation.

use crate::error::ToolError;
use crate::tool::traits::Tool;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::debug;

/// Tool registry with uniform timeout enforcement and error
/// normalization.
///
/// Every invocation goes through [`ToolGateway::invoke`], which bounds
/// the call with `tokio::time::timeout` and maps all failures into the
/// [`ToolError`] taxonomy. A timed-out tool future is dropped; no
/// result from it is ever observed.
#[derive(Default)]
pub struct ToolGateway {
    tools: RwLock<HashMap<String, Arc<dyn Tool>>>,
}

impl ToolGateway {
    /// Creates an empty gateway.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool under its own name. Registering a second tool
    /// with the same name replaces the first (last write wins).
    pub fn register(&self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        if let Ok(mut tools) = self.tools.write() {
            tools.insert(name, tool);
        }
    }

    /// Registered tool names in sorted order.
    #[must_use]
    pub fn tool_names(&self) -> Vec<String> {
        let Ok(tools) = self.tools.read() else {
            return Vec::new();
        };
        let mut names: Vec<String> = tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Invokes a named tool with a hard timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::NotFound`] for an unregistered name,
    /// [`ToolError::Timeout`] when the tool does not answer in time,
    /// and the tool's own normalized error otherwise.
    pub async fn invoke(
        &self,
        name: &str,
        args: &Value,
        timeout: Duration,
    ) -> Result<Value, ToolError> {
        let tool = self.resolve(name)?;
        let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        debug!(tool = name, timeout_ms, "invoking tool");

        match tokio::time::timeout(timeout, tool.invoke(args)).await {
            Ok(result) => result,
            Err(_) => Err(ToolError::Timeout {
                name: name.to_string(),
                timeout_ms,
            }),
        }
    }

    fn resolve(&self, name: &str) -> Result<Arc<dyn Tool>, ToolError> {
        let tools = self.tools.read().map_err(|e| ToolError::ExecutionFailed {
            name: name.to_string(),
            reason: format!("tool registry lock poisoned: {e}"),
        })?;
        tools
            .get(name)
            .cloned()
            .ok_or_else(|| ToolError::NotFound {
                name: name.to_string(),
            })
    }
}
