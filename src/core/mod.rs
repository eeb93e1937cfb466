//! Core domain types for ensemble-rs.
//!
//! Tasks and plans, session messages and long-term records, and the
//! result types produced by agents and the coordinator.

pub mod message;
pub mod result;
pub mod task;

pub use message::{ContextWindow, MemoryRecord, Message, Role};
pub use result::{AgentResult, FailureKind, FinalResult, FinalStatus, TaskFailure, TaskStatus};
pub use task::{CAP_ANALYSIS, CAP_REPORT, Task, TaskPlan};
