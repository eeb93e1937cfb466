//! Session memory and long-term record storage.

use crate::core::{ContextWindow, Message, MemoryRecord, Role};
use crate::error::{MemoryError, Result};
use crate::memory::compactor::{ExtractiveSummarizer, Summarizer};
use crate::memory::session::Session;
use crate::storage::RecordStore;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::Mutex;
use tracing::debug;

/// Configuration for session memory behavior.
#[derive(Debug, Clone, Copy)]
pub struct MemoryConfig {
    /// Message count above which an append triggers compaction.
    pub compact_threshold: usize,

    /// Number of newest messages compaction preserves verbatim.
    pub keep_recent: usize,

    /// Default context window budget in bytes of content.
    pub context_budget: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            compact_threshold: 20,
            keep_recent: 5,
            context_budget: 4000,
        }
    }
}

impl MemoryConfig {
    /// Sets the compaction trigger threshold.
    #[must_use]
    pub fn with_compact_threshold(mut self, threshold: usize) -> Self {
        self.compact_threshold = threshold;
        self
    }

    /// Sets how many newest messages compaction keeps.
    #[must_use]
    pub fn with_keep_recent(mut self, keep: usize) -> Self {
        self.keep_recent = keep;
        self
    }

    /// Sets the default context budget.
    #[must_use]
    pub fn with_context_budget(mut self, budget: usize) -> Self {
        self.context_budget = budget;
        self
    }
}

/// Session histories plus an owner-scoped long-term record store.
///
/// Appends within one session are serialized through a per-session
/// async mutex: concurrent appenders queue and each observes a fully
/// consistent history, so sequence indices stay gapless and strictly
/// increasing. Different sessions never contend with each other.
pub struct MemoryBank {
    sessions: RwLock<HashMap<String, Arc<Mutex<Session>>>>,
    store: Arc<dyn RecordStore>,
    summarizer: Box<dyn Summarizer>,
    config: MemoryConfig,
}

impl MemoryBank {
    /// Creates a bank over the given long-term store with the default
    /// deterministic summarizer.
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>, config: MemoryConfig) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            store,
            summarizer: Box::new(ExtractiveSummarizer::new()),
            config,
        }
    }

    /// Replaces the summarizer used during compaction.
    #[must_use]
    pub fn with_summarizer(mut self, summarizer: Box<dyn Summarizer>) -> Self {
        self.summarizer = summarizer;
        self
    }

    /// Memory configuration in effect.
    #[must_use]
    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    /// Number of sessions seen so far.
    ///
    /// # Errors
    ///
    /// Returns an error if the session map lock is poisoned.
    pub fn session_count(&self) -> Result<usize> {
        Ok(self.read_sessions()?.len())
    }

    /// Appends a message to a session, creating the session on first
    /// use, and returns the assigned sequence index.
    ///
    /// Triggers compaction when the session's message count exceeds the
    /// configured threshold.
    ///
    /// # Errors
    ///
    /// Returns an error if the session map lock is poisoned.
    pub async fn append(
        &self,
        session_id: &str,
        role: Role,
        content: impl Into<String>,
    ) -> Result<u64> {
        let handle = self.session_handle(session_id)?;
        let mut session = handle.lock().await;
        let seq = session.append(role, content);

        if session.len() > self.config.compact_threshold {
            let compacted = self.compact_session(&mut session);
            debug!(
                session_id,
                compacted,
                remaining = session.len(),
                "compacted session history"
            );
        }

        Ok(seq)
    }

    /// Returns the most recent messages whose cumulative content size
    /// fits in `budget`. The newest message is always included even
    /// when it alone exceeds the budget; unknown sessions yield an
    /// empty window.
    ///
    /// # Errors
    ///
    /// Returns an error if the session map lock is poisoned.
    pub async fn get_context(&self, session_id: &str, budget: usize) -> Result<ContextWindow> {
        let handle = self.read_sessions()?.get(session_id).cloned();
        let Some(handle) = handle else {
            return Ok(ContextWindow::default());
        };
        let session = handle.lock().await;
        Ok(ContextWindow::from_recent(session.messages(), budget))
    }

    /// Compacts a session's history, replacing all but the newest
    /// configured number of messages with one summary message. Returns
    /// the number of messages compacted away (zero when there is
    /// nothing to compact, so repeated calls are no-ops).
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError::SessionNotFound`] for an unknown session.
    pub async fn compact(&self, session_id: &str) -> Result<usize> {
        let handle = self.read_sessions()?.get(session_id).cloned();
        let Some(handle) = handle else {
            return Err(MemoryError::SessionNotFound {
                session_id: session_id.to_string(),
            }
            .into());
        };
        let mut session = handle.lock().await;
        Ok(self.compact_session(&mut session))
    }

    /// Stores a long-term record for an owner. Re-storing a key
    /// replaces the prior record.
    ///
    /// # Errors
    ///
    /// Returns an error if the store write fails.
    pub fn remember(&self, owner: &str, record: &MemoryRecord) -> Result<()> {
        self.store.put(owner, record)
    }

    /// All long-term records for an owner in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store read fails.
    pub fn recall(&self, owner: &str) -> Result<Vec<MemoryRecord>> {
        self.store.list(owner)
    }

    /// Long-term records for an owner filtered by category.
    ///
    /// # Errors
    ///
    /// Returns an error if the store read fails.
    pub fn recall_by_category(&self, owner: &str, category: &str) -> Result<Vec<MemoryRecord>> {
        self.store.list_by_category(owner, category)
    }

    /// Explicitly evicts one record. Returns `true` when a record was
    /// removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store write fails.
    pub fn forget(&self, owner: &str, key: &str) -> Result<bool> {
        self.store.delete(owner, key)
    }

    fn session_handle(&self, session_id: &str) -> Result<Arc<Mutex<Session>>> {
        if let Some(handle) = self.read_sessions()?.get(session_id) {
            return Ok(Arc::clone(handle));
        }
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| MemoryError::Store(format!("session map lock poisoned: {e}")))?;
        let handle = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(Session::new(session_id))));
        Ok(Arc::clone(handle))
    }

    fn read_sessions(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, HashMap<String, Arc<Mutex<Session>>>>> {
        self.sessions
            .read()
            .map_err(|e| MemoryError::Store(format!("session map lock poisoned: {e}")).into())
    }

    /// Requires the caller to hold the session lock. Keeps the newest
    /// `keep_recent` messages and replaces everything older with one
    /// summary message that adopts the first compacted index.
    fn compact_session(&self, session: &mut Session) -> usize {
        let keep = self.config.keep_recent;
        if session.len() <= keep + 1 {
            return 0;
        }

        let split = session.len() - keep;
        let head = &session.messages()[..split];
        let tail = session.messages()[split..].to_vec();

        let mut summary = Message::new(Role::System, self.summarizer.summarize(head), head[0].seq);
        summary.is_summary = true;

        session.replace_head(summary, tail);
        split
    }
}
