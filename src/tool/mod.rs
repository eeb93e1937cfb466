//! Tool gateway and built-in external collaborators.
//!
//! All tool access goes through [`ToolGateway`], which enforces a
//! uniform timeout and normalizes failures into the
//! [`crate::error::ToolError`] taxonomy. Tool outputs are opaque JSON
//! to the core; only agents interpret them.

pub mod formatter;
pub mod gateway;
pub mod loader;
pub mod stats;
pub mod traits;
pub mod visualization;

pub use formatter::FormatterTool;
pub use gateway::ToolGateway;
pub use loader::DataLoaderTool;
pub use stats::StatsTool;
pub use traits::Tool;
pub use visualization::VisualizationTool;

use std::sync::Arc;

/// Creates a gateway with the built-in tools registered.
#[must_use]
pub fn default_gateway() -> ToolGateway {
    let gateway = ToolGateway::new();
    gateway.register(Arc::new(DataLoaderTool::new()));
    gateway.register(Arc::new(StatsTool::new()));
    gateway.register(Arc::new(VisualizationTool::new()));
    gateway.register(Arc::new(FormatterTool::new()));
    gateway
}
