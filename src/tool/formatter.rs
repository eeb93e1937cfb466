//! Markdown report formatting tool.

use crate::error::ToolError;
use crate::tool::traits::{Tool, require_array};
use async_trait::async_trait;
use serde_json::{Value, json};

/// Assembles titled sections into a markdown document.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatterTool;

impl FormatterTool {
    /// Tool name used for gateway registration.
    pub const NAME: &'static str = "format";

    /// Creates a new formatter tool.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Tool for FormatterTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "renders report sections as a markdown document"
    }

    async fn invoke(&self, args: &Value) -> Result<Value, ToolError> {
        let title = args
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or("Analysis Report");
        let sections = require_array(Self::NAME, args, "sections")?;

        let mut document = format!("# {title}\n");
        for section in sections {
            let heading = section.get("heading").and_then(Value::as_str);
            let body = section
                .get("body")
                .and_then(Value::as_str)
                .unwrap_or_default();
            if let Some(heading) = heading {
                document.push_str(&format!("\n## {heading}\n\n{body}\n"));
            } else {
                document.push_str(&format!("\n{body}\n"));
            }
        }

        Ok(json!({
            "report": document,
            "format": "markdown",
        }))
    }
}
