//! Session memory with bounded context and long-term recall.
//!
//! [`MemoryBank`] owns per-session histories (gapless sequence indices,
//! automatic compaction) and fronts the long-term [`crate::storage`]
//! layer for owner-scoped records.

pub mod bank;
pub mod compactor;
pub mod session;

pub use bank::{MemoryBank, MemoryConfig};
pub use compactor::{ExtractiveSummarizer, Summarizer};
pub use session::Session;
