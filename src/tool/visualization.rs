//! Chart specification tool.

use crate::error::ToolError;
use crate::tool::traits::{Tool, require_array, require_str};
use async_trait::async_trait;
use serde_json::{Value, json};

/// Builds chart specifications from row records.
///
/// Rendering happens outside the orchestration core; the output is an
/// opaque chart-spec payload (`type`, axes, data points) that a
/// downstream renderer can turn into an image. Supported chart types
/// are `line`, `bar`, `pie`, and `scatter`.
#[derive(Debug, Clone, Copy, Default)]
pub struct VisualizationTool;

impl VisualizationTool {
    /// Tool name used for gateway registration.
    pub const NAME: &'static str = "chart";

    /// Creates a new visualization tool.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn invalid(reason: impl Into<String>) -> ToolError {
        ToolError::InvalidArgs {
            name: Self::NAME.to_string(),
            reason: reason.into(),
        }
    }

    fn default_title(chart_type: &str) -> &'static str {
        match chart_type {
            "line" => "Line Chart",
            "bar" => "Bar Chart",
            "pie" => "Pie Chart",
            _ => "Scatter Plot",
        }
    }

    fn points(rows: &[Value], x: &str, y: &str) -> Vec<Value> {
        rows.iter()
            .filter_map(|row| {
                let x_value = row.get(x)?;
                let y_value = row.get(y).and_then(Value::as_f64)?;
                Some(json!({"x": x_value, "y": y_value}))
            })
            .collect()
    }
}

#[async_trait]
impl Tool for VisualizationTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "builds chart specifications from row records"
    }

    async fn invoke(&self, args: &Value) -> Result<Value, ToolError> {
        let chart_type = require_str(Self::NAME, args, "type")?;
        if !matches!(chart_type, "line" | "bar" | "pie" | "scatter") {
            return Err(Self::invalid(format!("unsupported chart type: {chart_type}")));
        }

        let rows = require_array(Self::NAME, args, "rows")?;
        let x = require_str(Self::NAME, args, "x")?;
        let y = require_str(Self::NAME, args, "y")?;
        let title = args
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or_else(|| Self::default_title(chart_type));

        let points = Self::points(rows, x, y);
        if points.is_empty() {
            return Err(Self::invalid("no plottable points"));
        }

        Ok(json!({
            "chart": {
                "type": chart_type,
                "title": title,
                "x": x,
                "y": y,
                "points": points,
            },
            "format": "chart-spec",
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_line_chart_spec_from_rows() {
        let rows = json!([
            {"month": "Jan", "revenue": 100.0},
            {"month": "Feb", "revenue": 130.0},
        ]);
        let out = VisualizationTool::new()
            .invoke(&json!({"type": "line", "rows": rows, "x": "month", "y": "revenue"}))
            .await
            .unwrap();

        assert_eq!(out["format"], "chart-spec");
        assert_eq!(out["chart"]["type"], "line");
        assert_eq!(out["chart"]["title"], "Line Chart");
        assert_eq!(out["chart"]["points"][0], json!({"x": "Jan", "y": 100.0}));
        assert_eq!(out["chart"]["points"][1]["y"], 130.0);
    }

    #[tokio::test]
    async fn test_explicit_title_wins() {
        let rows = json!([{"k": "a", "v": 1.0}]);
        let out = VisualizationTool::new()
            .invoke(&json!({"type": "bar", "title": "Q3", "rows": rows, "x": "k", "y": "v"}))
            .await
            .unwrap();
        assert_eq!(out["chart"]["title"], "Q3");
    }

    #[tokio::test]
    async fn test_rows_without_numeric_y_are_dropped() {
        let rows = json!([
            {"k": "a", "v": 1.0},
            {"k": "b", "v": "n/a"},
            {"k": "c"},
        ]);
        let out = VisualizationTool::new()
            .invoke(&json!({"type": "pie", "rows": rows, "x": "k", "y": "v"}))
            .await
            .unwrap();
        assert_eq!(out["chart"]["points"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_no_plottable_points_is_invalid_args() {
        let err = VisualizationTool::new()
            .invoke(&json!({"type": "line", "rows": [], "x": "k", "y": "v"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArgs { .. }));
    }

    #[tokio::test]
    async fn test_unsupported_chart_type() {
        let err = VisualizationTool::new()
            .invoke(&json!({"type": "heatmap", "rows": [], "x": "k", "y": "v"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArgs { .. }));
    }

    #[tokio::test]
    async fn test_missing_axes_is_invalid_args() {
        let err = VisualizationTool::new()
            .invoke(&json!({"type": "line", "rows": []}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArgs { .. }));
    }
}
