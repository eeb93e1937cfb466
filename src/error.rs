//! Error types for ensemble-rs operations.
//!
//! This module provides the error hierarchy using `thiserror` for all
//! orchestration operations: planning, agent dispatch, tool invocation,
//! LLM calls, memory, and CLI commands.

use thiserror::Error;

/// Result type alias for ensemble operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for ensemble operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Planning errors (malformed or un-decomposable requests).
    #[error("planning error: {0}")]
    Plan(#[from] PlanError),

    /// Agent dispatch errors (registry misses, contract violations).
    #[error("agent error: {0}")]
    Agent(#[from] AgentError),

    /// Tool invocation errors.
    #[error("tool error: {0}")]
    Tool(#[from] ToolError),

    /// LLM invocation errors.
    #[error("llm error: {0}")]
    Llm(#[from] LlmError),

    /// Memory bank errors (session or long-term store).
    #[error("memory error: {0}")]
    Memory(#[from] MemoryError),

    /// CLI command errors.
    #[error("command error: {0}")]
    Command(#[from] CommandError),

    /// Configuration errors.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },
}

/// Planning-specific errors.
///
/// Plan validation failures and root-task execution failures are fatal to
/// the `analyze` call; everything downstream is reported per-task instead.
#[derive(Error, Debug)]
pub enum PlanError {
    /// The user request is empty or whitespace-only.
    #[error("empty request")]
    EmptyRequest,

    /// The request could not be decomposed into tasks.
    #[error("un-decomposable request: {reason}")]
    Undecomposable {
        /// Why no plan could be derived.
        reason: String,
    },

    /// Two tasks in the plan share an ID.
    #[error("duplicate task id: {task_id}")]
    DuplicateTask {
        /// The repeated task ID.
        task_id: String,
    },

    /// A task depends on an ID that is not part of the plan.
    #[error("task {task_id} depends on unknown task: {dependency}")]
    UnknownDependency {
        /// Task declaring the dependency.
        task_id: String,
        /// The missing dependency ID.
        dependency: String,
    },

    /// The dependency graph contains a cycle.
    #[error("dependency cycle involving task: {task_id}")]
    CyclicDependency {
        /// A task on the cycle.
        task_id: String,
    },

    /// The root task of the plan failed, failing the whole call.
    #[error("plan execution failed at root task {task_id}: {detail}")]
    ExecutionFailed {
        /// Root task ID.
        task_id: String,
        /// Detail of the first failure.
        detail: String,
    },

    /// An unknown planner strategy was requested.
    #[error("unknown planner: {name}")]
    UnknownPlanner {
        /// Name of the unknown strategy.
        name: String,
    },
}

/// Agent-level errors surfaced as task failures.
#[derive(Error, Debug)]
pub enum AgentError {
    /// No agent is registered for the capability tag.
    #[error("unknown capability: {tag}")]
    UnknownCapability {
        /// The unresolved capability tag.
        tag: String,
    },

    /// A declared upstream field is missing from the task input.
    #[error("missing expected input: {field}")]
    MissingInput {
        /// Name of the missing field.
        field: String,
    },

    /// An upstream dependency failed, so this task was skipped.
    #[error("dependency failed: {task_id}")]
    DependencyFailed {
        /// The failed upstream task ID.
        task_id: String,
    },
}

/// Normalized tool invocation errors.
///
/// The gateway maps every underlying tool failure into this taxonomy so
/// callers never see backend-specific error shapes.
#[derive(Error, Debug)]
pub enum ToolError {
    /// No tool is registered under the requested name.
    #[error("tool not found: {name}")]
    NotFound {
        /// The unknown tool name.
        name: String,
    },

    /// The tool did not return within the caller-supplied timeout.
    #[error("tool {name} timed out after {timeout_ms}ms")]
    Timeout {
        /// Tool name.
        name: String,
        /// Enforced timeout in milliseconds.
        timeout_ms: u64,
    },

    /// The tool rejected its arguments.
    #[error("invalid arguments for tool {name}: {reason}")]
    InvalidArgs {
        /// Tool name.
        name: String,
        /// Why the arguments were rejected.
        reason: String,
    },

    /// The tool ran but failed.
    #[error("tool {name} execution failed: {reason}")]
    ExecutionFailed {
        /// Tool name.
        name: String,
        /// Failure detail.
        reason: String,
    },
}

/// LLM invocation errors.
#[derive(Error, Debug)]
pub enum LlmError {
    /// The completion did not return within the configured timeout.
    #[error("llm call timed out after {timeout_ms}ms")]
    Timeout {
        /// Enforced timeout in milliseconds.
        timeout_ms: u64,
    },

    /// The backend applied rate limiting.
    #[error("llm rate limited: {detail}")]
    RateLimited {
        /// Backend-provided detail.
        detail: String,
    },

    /// The backend returned a malformed or unusable response.
    #[error("invalid llm response: {0}")]
    InvalidResponse(String),
}

impl LlmError {
    /// Returns `true` for transient errors worth a bounded retry.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::RateLimited { .. })
    }
}

/// Memory bank errors.
#[derive(Error, Debug)]
pub enum MemoryError {
    /// Session not found (lookup without creation).
    #[error("session not found: {session_id}")]
    SessionNotFound {
        /// The unknown session identifier.
        session_id: String,
    },

    /// Long-term store not initialized (init command not run).
    #[error("store not initialized. Run: ensemble-rs init")]
    NotInitialized,

    /// Database connection or query error.
    #[error("store error: {0}")]
    Store(String),

    /// Schema migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// CLI command-specific errors.
#[derive(Error, Debug)]
pub enum CommandError {
    /// Invalid argument provided.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Missing required argument.
    #[error("missing required argument: {0}")]
    MissingArgument(String),

    /// Command execution failed.
    #[error("command execution failed: {0}")]
    ExecutionFailed(String),

    /// User cancelled operation.
    #[error("operation cancelled by user")]
    Cancelled,

    /// Output format error.
    #[error("output format error: {0}")]
    OutputFormat(String),
}

// Implement From traits for standard library and backend errors

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Command(CommandError::ExecutionFailed(err.to_string()))
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Self::Memory(MemoryError::Store(err.to_string()))
    }
}

impl From<rusqlite::Error> for MemoryError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Store(err.to_string())
    }
}

impl From<serde_json::Error> for MemoryError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for LlmError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}
