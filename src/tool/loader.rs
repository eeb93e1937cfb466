//! Data file loading tool.

use crate::error::ToolError;
use crate::tool::traits::{Tool, require_str};
use async_trait::async_trait;
use serde_json::{Map, Value, json};
use std::path::Path;

/// Loads CSV or JSON data files into row records plus column metadata.
///
/// CSV parsing is line-oriented with comma splitting; quoted fields are
/// not supported. Numeric cells are coerced to JSON numbers so the
/// stats tool can consume them directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataLoaderTool;

impl DataLoaderTool {
    /// Tool name used for gateway registration.
    pub const NAME: &'static str = "load";

    /// Creates a new loader tool.
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

    fn failed(reason: impl Into<String>) -> ToolError {
        ToolError::ExecutionFailed {
            name: Self::NAME.to_string(),
            reason: reason.into(),
        }
    }

    fn coerce_cell(cell: &str) -> Value {
        let trimmed = cell.trim();
        if let Ok(n) = trimmed.parse::<i64>() {
            return json!(n);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            return json!(f);
        }
        Value::String(trimmed.to_string())
    }

    fn parse_csv(text: &str) -> Result<(Vec<String>, Vec<Value>), ToolError> {
        let mut lines = text.lines().filter(|l| !l.trim().is_empty());
        let header = lines
            .next()
            .ok_or_else(|| Self::failed("empty data file"))?;
        let columns: Vec<String> = header.split(',').map(|c| c.trim().to_string()).collect();

        let mut rows = Vec::new();
        for line in lines {
            let mut row = Map::new();
            for (column, cell) in columns.iter().zip(line.split(',')) {
                row.insert(column.clone(), Self::coerce_cell(cell));
            }
            rows.push(Value::Object(row));
        }
        Ok((columns, rows))
    }

    fn parse_json(text: &str) -> Result<(Vec<String>, Vec<Value>), ToolError> {
        let parsed: Value =
            serde_json::from_str(text).map_err(|e| Self::failed(format!("invalid json: {e}")))?;
        let rows = match parsed {
            Value::Array(rows) => rows,
            other => vec![other],
        };
        let columns = rows
            .first()
            .and_then(Value::as_object)
            .map(|obj| obj.keys().cloned().collect())
            .unwrap_or_default();
        Ok((columns, rows))
    }
}

#[async_trait]
impl Tool for DataLoaderTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "loads a CSV or JSON data file into row records"
    }

    async fn invoke(&self, args: &Value) -> Result<Value, ToolError> {
        let path = require_str(Self::NAME, args, "path")?;
        let extension = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let text = std::fs::read_to_string(path)
            .map_err(|e| Self::failed(format!("cannot read {path}: {e}")))?;

        let (columns, rows) = match extension.as_str() {
            "csv" => Self::parse_csv(&text)?,
            "json" => Self::parse_json(&text)?,
            other => return Err(Self::invalid(format!("unsupported file type: {other:?}"))),
        };

        Ok(json!({
            "source": path,
            "columns": columns,
            "row_count": rows.len(),
            "rows": rows,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, content: &str) -> (tempfile::TempDir, String) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        (dir, path.to_string_lossy().into_owned())
    }

    #[tokio::test]
    async fn test_load_csv_with_numeric_coercion() {
        let (_dir, path) = write_temp("sales.csv", "month,revenue\nJan,100\nFeb,150.5\n");
        let out = DataLoaderTool::new()
            .invoke(&json!({"path": path}))
            .await
            .unwrap();

        assert_eq!(out["row_count"], 2);
        assert_eq!(out["columns"], json!(["month", "revenue"]));
        assert_eq!(out["rows"][0]["revenue"], json!(100));
        assert_eq!(out["rows"][1]["revenue"], json!(150.5));
        assert_eq!(out["rows"][0]["month"], json!("Jan"));
    }

    #[tokio::test]
    async fn test_load_json_array() {
        let (_dir, path) = write_temp("data.json", r#"[{"a": 1}, {"a": 2}]"#);
        let out = DataLoaderTool::new()
            .invoke(&json!({"path": path}))
            .await
            .unwrap();

        assert_eq!(out["row_count"], 2);
        assert_eq!(out["columns"], json!(["a"]));
    }

    #[tokio::test]
    async fn test_missing_path_is_invalid_args() {
        let err = DataLoaderTool::new().invoke(&json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArgs { .. }));
    }

    #[tokio::test]
    async fn test_unreadable_file_is_execution_failed() {
        let err = DataLoaderTool::new()
            .invoke(&json!({"path": "/nonexistent/sales.csv"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::ExecutionFailed { .. }));
    }

    #[tokio::test]
    async fn test_unsupported_extension() {
        let (_dir, path) = write_temp("data.xlsx", "junk");
        let err = DataLoaderTool::new()
            .invoke(&json!({"path": path}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArgs { .. }));
    }
}
