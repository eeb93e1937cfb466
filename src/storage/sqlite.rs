//! `SQLite` record store implementation.
//!
//! Persists long-term memory records using `SQLite` with WAL journaling
//! and schema version tracking.

use crate::core::MemoryRecord;
use crate::error::{MemoryError, Result};
use crate::storage::schema::{
    CHECK_SCHEMA_SQL, CURRENT_SCHEMA_VERSION, GET_VERSION_SQL, SCHEMA_SQL, SET_VERSION_SQL,
};
use crate::storage::traits::{RecordStore, StoreStats};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Default database path relative to the working directory.
pub const DEFAULT_DB_PATH: &str = ".ensemble/memory.db";

/// SQLite-backed record store.
///
/// The connection is guarded by a mutex so the store satisfies the
/// `Send + Sync` bound of [`RecordStore`]; operations are short and
/// single-statement, so contention stays negligible.
///
/// # Examples
///
/// ```no_run
/// use ensemble_rs::storage::{RecordStore, SqliteStore};
///
/// let store = SqliteStore::open("memory.db").unwrap();
/// store.init().unwrap();
/// ```
pub struct SqliteStore {
    conn: Mutex<Connection>,
    /// Path to the database file (None for in-memory).
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Opens or creates a `SQLite` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        // Ensure parent directory exists
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| MemoryError::Store(e.to_string()))?;
        }

        let conn = Connection::open(&path).map_err(MemoryError::from)?;

        conn.execute("PRAGMA foreign_keys = ON;", [])
            .map_err(MemoryError::from)?;

        // WAL mode for better concurrent access (returns a row, use query_row)
        let _: String = conn
            .query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))
            .map_err(MemoryError::from)?;

        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path),
        })
    }

    /// Creates an in-memory `SQLite` database.
    ///
    /// Useful for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be created.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(MemoryError::from)?;
        conn.execute("PRAGMA foreign_keys = ON;", [])
            .map_err(MemoryError::from)?;

        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
        })
    }

    /// Returns the database path (None for in-memory).
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| MemoryError::Store(format!("connection lock poisoned: {e}")).into())
    }

    fn get_schema_version(conn: &Connection) -> Result<Option<u32>> {
        let version: Option<String> = conn
            .query_row(GET_VERSION_SQL, [], |row| row.get(0))
            .optional()
            .map_err(MemoryError::from)?;

        Ok(version.and_then(|v| v.parse().ok()))
    }

    fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<MemoryRecord> {
        Ok(MemoryRecord {
            key: row.get(0)?,
            content: row.get(1)?,
            category: row.get(2)?,
            timestamp: row.get(3)?,
        })
    }
}

impl RecordStore for SqliteStore {
    fn init(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| MemoryError::Migration(e.to_string()))?;
        conn.execute(SET_VERSION_SQL, params![CURRENT_SCHEMA_VERSION.to_string()])
            .map_err(MemoryError::from)?;
        Ok(())
    }

    fn is_initialized(&self) -> Result<bool> {
        let conn = self.conn()?;
        let count: i64 = conn
            .query_row(CHECK_SCHEMA_SQL, [], |row| row.get(0))
            .map_err(MemoryError::from)?;
        Ok(count > 0)
    }

    fn reset(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM records;", [])
            .map_err(MemoryError::from)?;
        Ok(())
    }

    fn put(&self, owner: &str, record: &MemoryRecord) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO records (owner, key, content, category, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (owner, key) DO UPDATE SET
                 content = excluded.content,
                 category = excluded.category,
                 created_at = excluded.created_at;",
            params![
                owner,
                record.key,
                record.content,
                record.category,
                record.timestamp
            ],
        )
        .map_err(MemoryError::from)?;
        Ok(())
    }

    fn get(&self, owner: &str, key: &str) -> Result<Option<MemoryRecord>> {
        let conn = self.conn()?;
        let record = conn
            .query_row(
                "SELECT key, content, category, created_at FROM records
                 WHERE owner = ?1 AND key = ?2;",
                params![owner, key],
                Self::row_to_record,
            )
            .optional()
            .map_err(MemoryError::from)?;
        Ok(record)
    }

    fn list(&self, owner: &str) -> Result<Vec<MemoryRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT key, content, category, created_at FROM records
                 WHERE owner = ?1 ORDER BY id;",
            )
            .map_err(MemoryError::from)?;
        let records = stmt
            .query_map(params![owner], Self::row_to_record)
            .map_err(MemoryError::from)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(MemoryError::from)?;
        Ok(records)
    }

    fn list_by_category(&self, owner: &str, category: &str) -> Result<Vec<MemoryRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT key, content, category, created_at FROM records
                 WHERE owner = ?1 AND category = ?2 ORDER BY id;",
            )
            .map_err(MemoryError::from)?;
        let records = stmt
            .query_map(params![owner, category], Self::row_to_record)
            .map_err(MemoryError::from)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(MemoryError::from)?;
        Ok(records)
    }

    fn delete(&self, owner: &str, key: &str) -> Result<bool> {
        let conn = self.conn()?;
        let affected = conn
            .execute(
                "DELETE FROM records WHERE owner = ?1 AND key = ?2;",
                params![owner, key],
            )
            .map_err(MemoryError::from)?;
        Ok(affected > 0)
    }

    fn stats(&self) -> Result<StoreStats> {
        let conn = self.conn()?;
        let record_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM records;", [], |row| row.get(0))
            .map_err(MemoryError::from)?;
        let owner_count: i64 = conn
            .query_row("SELECT COUNT(DISTINCT owner) FROM records;", [], |row| {
                row.get(0)
            })
            .map_err(MemoryError::from)?;
        let schema_version = Self::get_schema_version(&conn)?.unwrap_or(0);
        let db_size = self
            .path
            .as_ref()
            .and_then(|p| std::fs::metadata(p).ok())
            .map(|m| m.len());

        Ok(StoreStats {
            record_count: usize::try_from(record_count).unwrap_or(0),
            owner_count: usize::try_from(owner_count).unwrap_or(0),
            schema_version,
            db_size,
        })
    }
}
