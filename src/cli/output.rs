//! Output formatting for CLI commands.
//!
//! Supports text and JSON output formats.

use crate::core::{FinalResult, MemoryRecord};
use crate::error::Error;
use crate::storage::StoreStats;
use serde::Serialize;
use serde_json::Value;
use std::fmt::Write;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output.
    Json,
}

impl OutputFormat {
    /// Parses format from string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

fn format_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// Formats a simple confirmation message.
#[must_use]
pub fn format_message(message: &str, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format!("{message}\n"),
        OutputFormat::Json => format_json(&serde_json::json!({ "message": message })),
    }
}

/// Formats a status response.
#[must_use]
pub fn format_status(stats: &StoreStats, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format_status_text(stats),
        OutputFormat::Json => format_json(stats),
    }
}

fn format_status_text(stats: &StoreStats) -> String {
    let mut output = String::new();
    output.push_str("Ensemble Status\n");
    output.push_str("===============\n\n");
    let _ = writeln!(output, "  Records:  {}", stats.record_count);
    let _ = writeln!(output, "  Owners:   {}", stats.owner_count);
    let _ = writeln!(output, "  Schema:   v{}", stats.schema_version);
    if let Some(size) = stats.db_size {
        let _ = writeln!(output, "  DB size:  {size} bytes");
    }
    output
}

/// Formats the result of an analyze call.
#[must_use]
pub fn format_result(result: &FinalResult, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format_result_text(result),
        OutputFormat::Json => format_json(result),
    }
}

fn format_result_text(result: &FinalResult) -> String {
    let mut output = String::new();
    if let Some(answer) = result.payload.get("answer").and_then(Value::as_str) {
        output.push_str(answer);
        if !answer.ends_with('\n') {
            output.push('\n');
        }
    }

    let _ = writeln!(output, "\n[session: {}] status: {:?}", result.session_id, result.status);

    if let Some(tasks) = result.payload.get("tasks").and_then(Value::as_array) {
        for task in tasks {
            let id = task.get("task_id").and_then(Value::as_str).unwrap_or("?");
            let status = task.get("status").and_then(Value::as_str).unwrap_or("?");
            let duration = task.get("duration").and_then(Value::as_u64).unwrap_or(0);
            let _ = write!(output, "  {id}: {status} ({duration}ms)");
            if let Some(failure) = task.get("failure").and_then(Value::as_object) {
                let detail = failure.get("detail").and_then(Value::as_str).unwrap_or("");
                let _ = write!(output, " - {detail}");
            }
            output.push('\n');
        }
    }
    output
}

/// Formats a list of long-term memory records.
#[must_use]
pub fn format_records(records: &[MemoryRecord], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format_records_text(records),
        OutputFormat::Json => format_json(&records),
    }
}

fn format_records_text(records: &[MemoryRecord]) -> String {
    if records.is_empty() {
        return "No records found.\n".to_string();
    }

    let mut output = String::new();
    let _ = writeln!(output, "{:<24} {:<12} Content", "Key", "Category");
    for record in records {
        let _ = writeln!(
            output,
            "{:<24} {:<12} {}",
            record.key, record.category, record.content
        );
    }
    output
}

/// Formats an error for the selected output format.
#[must_use]
pub fn format_error(err: &Error, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => err.to_string(),
        OutputFormat::Json => format_json(&serde_json::json!({ "error": err.to_string() })),
    }
}
