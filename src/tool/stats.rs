//! Statistical computation tool.

use crate::error::ToolError;
use crate::tool::traits::{Tool, require_array, require_str};
use async_trait::async_trait;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

/// Computes descriptive statistics and trends over row records.
///
/// Operations:
/// - `describe`: per numeric column count, mean, min, max.
/// - `trend`: least-squares slope direction and percentage change over
///   a value series, taken either from an explicit `values` array or
///   from a named `column` of `rows`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatsTool;

impl StatsTool {
    /// Tool name used for gateway registration.
    pub const NAME: &'static str = "stats";

    /// Creates a new stats tool.
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

    fn describe(rows: &[Value]) -> Value {
        let mut series: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for row in rows {
            let Some(object) = row.as_object() else {
                continue;
            };
            for (column, value) in object {
                if let Some(n) = value.as_f64() {
                    series.entry(column.clone()).or_default().push(n);
                }
            }
        }

        let mut statistics = Map::new();
        for (column, values) in series {
            if values.is_empty() {
                continue;
            }
            let count = values.len();
            #[allow(clippy::cast_precision_loss)]
            let mean = values.iter().sum::<f64>() / count as f64;
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            statistics.insert(
                column,
                json!({"count": count, "mean": mean, "min": min, "max": max}),
            );
        }
        json!({ "statistics": statistics })
    }

    fn trend(values: &[f64]) -> Result<Value, ToolError> {
        if values.len() < 2 {
            return Err(Self::invalid("trend requires at least 2 values"));
        }

        #[allow(clippy::cast_precision_loss)]
        let n = values.len() as f64;
        let mean_x = (n - 1.0) / 2.0;
        let mean_y = values.iter().sum::<f64>() / n;

        let mut numerator = 0.0;
        let mut denominator = 0.0;
        for (i, y) in values.iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let dx = i as f64 - mean_x;
            numerator += dx * (y - mean_y);
            denominator += dx * dx;
        }
        let slope = if denominator == 0.0 { 0.0 } else { numerator / denominator };

        let first = values[0];
        let last = values[values.len() - 1];
        let pct_change = if first == 0.0 {
            0.0
        } else {
            (last - first) / first.abs() * 100.0
        };

        let direction = if slope > 0.0 {
            "up"
        } else if slope < 0.0 {
            "down"
        } else {
            "flat"
        };

        Ok(json!({
            "direction": direction,
            "slope": slope,
            "pct_change": pct_change,
        }))
    }

    fn trend_values(args: &Value) -> Result<Vec<f64>, ToolError> {
        if let Some(values) = args.get("values").and_then(Value::as_array) {
            return Ok(values.iter().filter_map(Value::as_f64).collect());
        }
        let rows = require_array(Self::NAME, args, "rows")?;
        let column = require_str(Self::NAME, args, "column")?;
        Ok(rows
            .iter()
            .filter_map(|row| row.get(column).and_then(Value::as_f64))
            .collect())
    }
}

#[async_trait]
impl Tool for StatsTool {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "computes descriptive statistics and trends over row records"
    }

    async fn invoke(&self, args: &Value) -> Result<Value, ToolError> {
        let op = require_str(Self::NAME, args, "op")?;
        match op {
            "describe" => {
                let rows = require_array(Self::NAME, args, "rows")?;
                Ok(Self::describe(rows))
            }
            "trend" => Self::trend(&Self::trend_values(args)?),
            other => Err(Self::invalid(format!("unknown op: {other}"))),
        }
    }
}
