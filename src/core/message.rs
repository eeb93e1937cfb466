//! Session messages, long-term records, and context windows.
//!
//! Messages are immutable once appended and carry a strictly increasing
//! sequence index within their session. A [`ContextWindow`] is a derived,
//! size-bounded view over the most recent messages; it is never persisted.

use serde::{Deserialize, Serialize};

/// Role of a message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// End-user input.
    User,
    /// Agent-produced output.
    Agent,
    /// System-synthesized content (e.g. compaction summaries).
    System,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Agent => write!(f, "agent"),
            Self::System => write!(f, "system"),
        }
    }
}

/// One message in a session's ordered history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Author role.
    pub role: Role,

    /// Opaque text payload.
    pub content: String,

    /// Unix timestamp (seconds) of the append.
    pub timestamp: i64,

    /// Sequence index, strictly increasing within the session.
    pub seq: u64,

    /// Marks compaction summaries so repeated compaction is a no-op.
    #[serde(default)]
    pub is_summary: bool,
}

impl Message {
    /// Creates a message stamped with the current time.
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>, seq: u64) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: current_timestamp(),
            seq,
            is_summary: false,
        }
    }

    /// Size of the message for context budgeting (content bytes).
    #[must_use]
    pub fn size(&self) -> usize {
        self.content.len()
    }
}

/// A durable, owner-scoped long-term fact, independent of any session.
///
/// Never implicitly deleted; eviction is explicit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// Record key, unique per owner.
    pub key: String,

    /// Fact content.
    pub content: String,

    /// Record category (e.g. "insight", "preference").
    pub category: String,

    /// Unix timestamp (seconds) of creation.
    pub timestamp: i64,
}

impl MemoryRecord {
    /// Creates a record stamped with the current time.
    #[must_use]
    pub fn new(
        key: impl Into<String>,
        content: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            content: content.into(),
            category: category.into(),
            timestamp: current_timestamp(),
        }
    }

    /// Creates an insight record with a timestamp-derived key.
    #[must_use]
    pub fn insight(content: impl Into<String>) -> Self {
        let now = current_timestamp();
        Self {
            key: format!("insight_{now}"),
            content: content.into(),
            category: "insight".to_string(),
            timestamp: now,
        }
    }
}

/// A size-bounded, derived view over a session's most recent messages.
///
/// Recomputed on demand by the memory bank; holds clones of the
/// qualifying messages in chronological order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextWindow {
    messages: Vec<Message>,
}

impl ContextWindow {
    /// Builds a window from the most recent messages whose cumulative
    /// size fits `budget`.
    ///
    /// The newest message is always included, even when it alone exceeds
    /// the budget; messages are never split.
    #[must_use]
    pub fn from_recent(history: &[Message], budget: usize) -> Self {
        let mut selected: Vec<Message> = Vec::new();
        let mut used = 0usize;

        for message in history.iter().rev() {
            let size = message.size();
            if selected.is_empty() || used + size <= budget {
                used += size;
                selected.push(message.clone());
            } else {
                break;
            }
        }

        selected.reverse();
        Self { messages: selected }
    }

    /// Messages in chronological order.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Cumulative content size in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.messages.iter().map(Message::size).sum()
    }

    /// Number of messages in the window.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` when the window holds no messages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Renders the window as role-prefixed lines for prompt building.
    #[must_use]
    pub fn render(&self) -> String {
        self.messages
            .iter()
            .map(|m| format!("{}: {}", m.role, m.content))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Returns the current Unix timestamp in seconds.
#[allow(clippy::cast_possible_wrap)]
pub(crate) fn current_timestamp() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(sizes: &[usize]) -> Vec<Message> {
        sizes
            .iter()
            .enumerate()
            .map(|(i, size)| Message::new(Role::User, "x".repeat(*size), i as u64))
            .collect()
    }

    #[test]
    fn test_message_new() {
        let msg = Message::new(Role::Agent, "hello", 3);
        assert_eq!(msg.role, Role::Agent);
        assert_eq!(msg.content, "hello");
        assert_eq!(msg.seq, 3);
        assert_eq!(msg.size(), 5);
        assert!(!msg.is_summary);
        assert!(msg.timestamp > 0);
    }

    #[test]
    fn test_role_display() {
        assert_eq!(Role::User.to_string(), "user");
        assert_eq!(Role::Agent.to_string(), "agent");
        assert_eq!(Role::System.to_string(), "system");
    }

    #[test]
    fn test_role_serde_lowercase() {
        let json = serde_json::to_string(&Role::System).unwrap();
        assert_eq!(json, "\"system\"");
        let role: Role = serde_json::from_str("\"agent\"").unwrap();
        assert_eq!(role, Role::Agent);
    }

    #[test]
    fn test_memory_record_insight_key() {
        let record = MemoryRecord::insight("revenue trends up");
        assert!(record.key.starts_with("insight_"));
        assert_eq!(record.category, "insight");
    }

    #[test]
    fn test_context_window_respects_budget() {
        let msgs = history(&[10, 10, 10, 10]);
        let window = ContextWindow::from_recent(&msgs, 25);
        assert_eq!(window.len(), 2);
        assert!(window.size() <= 25);
        // Most recent messages, chronological order.
        assert_eq!(window.messages()[0].seq, 2);
        assert_eq!(window.messages()[1].seq, 3);
    }

    #[test]
    fn test_context_window_always_includes_newest() {
        let msgs = history(&[5, 100]);
        let window = ContextWindow::from_recent(&msgs, 10);
        assert_eq!(window.len(), 1);
        assert_eq!(window.messages()[0].seq, 1);
        assert!(window.size() > 10);
    }

    #[test]
    fn test_context_window_empty_history() {
        let window = ContextWindow::from_recent(&[], 100);
        assert!(window.is_empty());
        assert_eq!(window.size(), 0);
        assert_eq!(window.render(), "");
    }

    #[test]
    fn test_context_window_exact_budget() {
        let msgs = history(&[10, 10]);
        let window = ContextWindow::from_recent(&msgs, 20);
        assert_eq!(window.len(), 2);
        assert_eq!(window.size(), 20);
    }

    #[test]
    fn test_context_window_render() {
        let msgs = vec![
            Message::new(Role::User, "analyze sales", 0),
            Message::new(Role::Agent, "done", 1),
        ];
        let window = ContextWindow::from_recent(&msgs, 1000);
        let rendered = window.render();
        assert_eq!(rendered, "user: analyze sales\nagent: done");
    }

    #[test]
    fn test_message_serialization_defaults() {
        // Older serialized messages without the summary flag still load.
        let json = r#"{"role":"user","content":"hi","timestamp":1,"seq":0}"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert!(!msg.is_summary);
    }
}
