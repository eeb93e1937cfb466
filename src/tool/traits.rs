//! Tool abstraction for external collaborators.

use crate::error::ToolError;
use async_trait::async_trait;
use serde_json::Value;

/// An invokable external capability with a JSON-in, JSON-out contract.
///
/// Tool outputs are opaque to the orchestration core; agents interpret
/// them. Implementations must be safe to invoke concurrently.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique tool name used for gateway lookup.
    fn name(&self) -> &str;

    /// Human-readable description of what the tool does.
    fn description(&self) -> &str;

    /// Runs the tool against the given arguments.
    async fn invoke(&self, args: &Value) -> Result<Value, ToolError>;
}

/// Extracts a required string argument.
pub(crate) fn require_str<'a>(tool: &str, args: &'a Value, field: &str) -> Result<&'a str, ToolError> {
    args.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| ToolError::InvalidArgs {
            name: tool.to_string(),
            reason: format!("missing string argument: {field}"),
        })
}

/// Extracts a required array argument.
pub(crate) fn require_array<'a>(
    tool: &str,
    args: &'a Value,
    field: &str,
) -> Result<&'a Vec<Value>, ToolError> {
    args.get(field)
        .and_then(Value::as_array)
        .ok_or_else(|| ToolError::InvalidArgs {
            name: tool.to_string(),
            reason: format!("missing array argument: {field}"),
        })
}
