//! Persistent storage for long-term memory records.
//!
//! The [`RecordStore`] trait abstracts over storage backends; the
//! default backend is [`SqliteStore`].

pub mod schema;
pub mod sqlite;
pub mod traits;

pub use sqlite::{DEFAULT_DB_PATH, SqliteStore};
pub use traits::{RecordStore, StoreStats};
