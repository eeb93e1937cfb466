//! # Ensemble-RS
//!
//! Multi-agent analytics orchestration engine.
//!
//! Ensemble-RS turns a natural-language analytics request into a dependency
//! plan of tasks, dispatches each task to a capability-matched worker agent,
//! and synthesizes the per-task outputs into a single answer. Agents share a
//! session-scoped memory bank and reach data through a mediated tool gateway.
//!
//! ## Features
//!
//! - **Planning**: Keyword and LLM-backed planners that decompose requests
//!   into validated task DAGs
//! - **Scheduling**: Concurrent ready-set execution with bounded parallelism,
//!   timeout retries, and cooperative cancellation
//! - **Memory**: Ordered conversation history with deterministic compaction
//!   and budgeted context windows
//! - **`SQLite` Storage**: Persistent long-term records keyed by owner

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![warn(unsafe_code)]

pub mod agent;
pub mod cli;
pub mod coordinator;
pub mod core;
pub mod error;
pub mod llm;
pub mod memory;
pub mod plan;
pub mod storage;
pub mod tool;

// Re-export commonly used types at crate root
pub use error::{Error, Result};

// Re-export core domain types
pub use core::{
    AgentResult, ContextWindow, FinalResult, FinalStatus, MemoryRecord, Message, Role, Task,
    TaskPlan, TaskStatus,
};

// Re-export storage types
pub use storage::{DEFAULT_DB_PATH, RecordStore, SqliteStore};

// Re-export memory types
pub use memory::{MemoryBank, MemoryConfig};

// Re-export planning types
pub use plan::{KeywordPlanner, LlmPlanner, PlanRequest, Planner, available_planners, create_planner};

// Re-export agent and coordinator types
pub use agent::{AgentRegistry, WorkerAgent, default_registry};
pub use coordinator::{Coordinator, CoordinatorConfig};

// Re-export tool types
pub use tool::{Tool, ToolGateway, default_gateway};

// Re-export LLM types
pub use llm::{LlmClient, OfflineLlm, OpenAiConfig, available_llms, create_llm};

// Re-export CLI types
pub use cli::{Cli, Commands, OutputFormat};
