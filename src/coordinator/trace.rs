//! Execution trace records attached to final results.

use crate::core::TaskStatus;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One task's recorded execution span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceSpan {
    /// Task the span belongs to.
    pub task_id: String,

    /// Terminal status of the task.
    pub status: TaskStatus,

    /// Offset from request start to dispatch, in milliseconds.
    pub start_ms: u64,

    /// Task execution time in milliseconds.
    pub duration_ms: u64,

    /// Number of dispatch attempts (1 unless retried).
    pub attempts: u32,
}

/// Per-request execution trace in task completion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionTrace {
    /// Recorded spans.
    pub spans: Vec<TraceSpan>,
}

impl ExecutionTrace {
    /// Creates an empty trace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a span for a terminal task outcome.
    pub fn record(
        &mut self,
        task_id: impl Into<String>,
        status: TaskStatus,
        start: Duration,
        duration: Duration,
        attempts: u32,
    ) {
        self.spans.push(TraceSpan {
            task_id: task_id.into(),
            status,
            start_ms: u64::try_from(start.as_millis()).unwrap_or(u64::MAX),
            duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            attempts,
        });
    }

    /// Total recorded task execution time in milliseconds.
    #[must_use]
    pub fn total_task_ms(&self) -> u64 {
        self.spans.iter().map(|s| s.duration_ms).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_total() {
        let mut trace = ExecutionTrace::new();
        trace.record(
            "analyze",
            TaskStatus::Ok,
            Duration::from_millis(2),
            Duration::from_millis(40),
            1,
        );
        trace.record(
            "report",
            TaskStatus::Ok,
            Duration::from_millis(45),
            Duration::from_millis(10),
            2,
        );

        assert_eq!(trace.spans.len(), 2);
        assert_eq!(trace.total_task_ms(), 50);
        assert_eq!(trace.spans[1].attempts, 2);
    }

    #[test]
    fn test_serializes_to_json() {
        let mut trace = ExecutionTrace::new();
        trace.record("t", TaskStatus::Skipped, Duration::ZERO, Duration::ZERO, 1);
        let value = serde_json::to_value(&trace).unwrap();
        assert_eq!(value["spans"][0]["task_id"], "t");
        assert_eq!(value["spans"][0]["status"], "skipped");
    }
}
