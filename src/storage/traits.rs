//! Record store trait definition.
//!
//! Defines the interface for long-term memory persistence backends,
//! enabling pluggable storage implementations. The core mandates only
//! this logical contract, not an on-disk format.

use crate::core::MemoryRecord;
use crate::error::Result;
use serde::Serialize;

/// Trait for long-term memory persistence backends.
///
/// Records are owner-scoped and ordered by insertion. Implementations
/// must be safe to share across threads; callers serialize mutation per
/// owner at the memory-bank layer.
pub trait RecordStore: Send + Sync {
    /// Initializes storage (creates schema).
    ///
    /// Idempotent - safe to call multiple times.
    ///
    /// # Errors
    ///
    /// Returns an error if schema creation fails.
    fn init(&self) -> Result<()>;

    /// Checks if storage is initialized.
    ///
    /// # Errors
    ///
    /// Returns an error if the check cannot be performed.
    fn is_initialized(&self) -> Result<bool>;

    /// Resets all stored records, preserving the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if deletion fails.
    fn reset(&self) -> Result<()>;

    /// Stores a record for an owner.
    ///
    /// Re-storing the same owner/key pair replaces the prior record.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn put(&self, owner: &str, record: &MemoryRecord) -> Result<()>;

    /// Retrieves a record by owner and key.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn get(&self, owner: &str, key: &str) -> Result<Option<MemoryRecord>>;

    /// Lists all records for an owner in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn list(&self, owner: &str) -> Result<Vec<MemoryRecord>>;

    /// Lists records for an owner filtered by category.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn list_by_category(&self, owner: &str, category: &str) -> Result<Vec<MemoryRecord>>;

    /// Deletes a record by owner and key (explicit eviction).
    ///
    /// Returns `true` if a record was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if deletion fails.
    fn delete(&self, owner: &str, key: &str) -> Result<bool>;

    /// Gets storage statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if statistics cannot be gathered.
    fn stats(&self) -> Result<StoreStats>;
}

/// Storage statistics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StoreStats {
    /// Number of records stored.
    pub record_count: usize,
    /// Number of distinct owners.
    pub owner_count: usize,
    /// Schema version.
    pub schema_version: u32,
    /// Database file size in bytes (if applicable).
    pub db_size: Option<u64>,
}
