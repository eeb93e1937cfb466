//! Task and request result types.
//!
//! An [`AgentResult`] is produced exactly once per task and never
//! mutated. A [`FinalResult`] is the synthesized answer for one
//! `analyze` call, assembled in the plan's declared output order.

use crate::error::{AgentError, LlmError, ToolError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Terminal status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Completed successfully.
    Ok,
    /// Ran and failed.
    Failed,
    /// Never dispatched because an upstream dependency failed.
    Skipped,
    /// Abandoned mid-flight due to request cancellation.
    Cancelled,
}

/// Classification of a task failure.
///
/// The kind drives the coordinator's retry policy: only timeout-class
/// failures are retried; everything else is terminal for the task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// A tool or LLM call exceeded its timeout.
    Timeout,
    /// The LLM backend applied rate limiting.
    RateLimited,
    /// The requested tool is not registered.
    ToolNotFound,
    /// A tool rejected its arguments.
    InvalidArgs,
    /// A tool ran but failed.
    ToolFailed,
    /// The LLM returned a malformed or unusable response.
    InvalidResponse,
    /// A declared upstream field was missing from the task input.
    MissingInput,
    /// No agent is registered for the task's capability tag.
    UnknownCapability,
    /// An upstream dependency failed; the task was skipped.
    DependencyFailed,
    /// The request was cancelled while the task was in flight.
    Cancelled,
}

impl FailureKind {
    /// Returns `true` when the coordinator may re-dispatch the task.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Timeout)
    }
}

/// A classified task failure with human-readable detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFailure {
    /// Failure classification.
    pub kind: FailureKind,

    /// Failure detail for caller visibility.
    pub detail: String,
}

impl TaskFailure {
    /// Creates a failure record.
    #[must_use]
    pub fn new(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

impl From<&ToolError> for TaskFailure {
    fn from(err: &ToolError) -> Self {
        let kind = match err {
            ToolError::NotFound { .. } => FailureKind::ToolNotFound,
            ToolError::Timeout { .. } => FailureKind::Timeout,
            ToolError::InvalidArgs { .. } => FailureKind::InvalidArgs,
            ToolError::ExecutionFailed { .. } => FailureKind::ToolFailed,
        };
        Self::new(kind, err.to_string())
    }
}

impl From<&LlmError> for TaskFailure {
    fn from(err: &LlmError) -> Self {
        let kind = match err {
            LlmError::Timeout { .. } => FailureKind::Timeout,
            LlmError::RateLimited { .. } => FailureKind::RateLimited,
            LlmError::InvalidResponse(_) => FailureKind::InvalidResponse,
        };
        Self::new(kind, err.to_string())
    }
}

impl From<&AgentError> for TaskFailure {
    fn from(err: &AgentError) -> Self {
        let kind = match err {
            AgentError::UnknownCapability { .. } => FailureKind::UnknownCapability,
            AgentError::MissingInput { .. } => FailureKind::MissingInput,
            AgentError::DependencyFailed { .. } => FailureKind::DependencyFailed,
        };
        Self::new(kind, err.to_string())
    }
}

/// The result of one task, produced exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResult {
    /// ID of the task this result belongs to.
    pub task_id: String,

    /// Terminal status.
    pub status: TaskStatus,

    /// Opaque result payload (empty object unless `Ok`).
    pub payload: Value,

    /// Failure detail when the task did not complete.
    pub failure: Option<TaskFailure>,

    /// Wall-clock duration of the handling attempt.
    #[serde(with = "duration_millis")]
    pub duration: Duration,
}

impl AgentResult {
    /// Creates a successful result.
    #[must_use]
    pub fn ok(task_id: impl Into<String>, payload: Value, duration: Duration) -> Self {
        Self {
            task_id: task_id.into(),
            status: TaskStatus::Ok,
            payload,
            failure: None,
            duration,
        }
    }

    /// Creates a failed result.
    #[must_use]
    pub fn failed(task_id: impl Into<String>, failure: TaskFailure, duration: Duration) -> Self {
        Self {
            task_id: task_id.into(),
            status: TaskStatus::Failed,
            payload: Value::Null,
            failure: Some(failure),
            duration,
        }
    }

    /// Creates a skipped result for an undispatched task.
    #[must_use]
    pub fn skipped(task_id: impl Into<String>, failed_dependency: &str) -> Self {
        Self {
            task_id: task_id.into(),
            status: TaskStatus::Skipped,
            payload: Value::Null,
            failure: Some(TaskFailure::new(
                FailureKind::DependencyFailed,
                format!("dependency failed: {failed_dependency}"),
            )),
            duration: Duration::ZERO,
        }
    }

    /// Creates a cancelled result for an abandoned task.
    #[must_use]
    pub fn cancelled(task_id: impl Into<String>, duration: Duration) -> Self {
        Self {
            task_id: task_id.into(),
            status: TaskStatus::Cancelled,
            payload: Value::Null,
            failure: Some(TaskFailure::new(
                FailureKind::Cancelled,
                "request cancelled",
            )),
            duration,
        }
    }

    /// Returns `true` for successful results.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == TaskStatus::Ok
    }

    /// Returns `true` when the coordinator may retry the task.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.status == TaskStatus::Failed
            && self.failure.as_ref().is_some_and(|f| f.kind.is_retryable())
    }
}

/// Overall status of an `analyze` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinalStatus {
    /// All tasks succeeded.
    Ok,
    /// Some non-root tasks failed or were skipped.
    Partial,
    /// The request produced no usable results.
    Failed,
}

/// The synthesized result of one `analyze` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalResult {
    /// Overall status.
    pub status: FinalStatus,

    /// Session the request ran against.
    pub session_id: String,

    /// Synthesized payload: answer text plus per-task results in plan
    /// output order.
    pub payload: Value,

    /// Execution trace spans for caller visibility.
    pub trace: Value,
}

mod duration_millis {
    //! Serializes [`std::time::Duration`] as integer milliseconds.

    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        u64::try_from(d.as_millis())
            .unwrap_or(u64::MAX)
            .serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}
