//! In-memory conversational session state.

use crate::core::{Message, Role};

/// A single conversation's message history and sequence counter.
///
/// Sessions hand out gapless, strictly increasing sequence indices.
/// Serialization of concurrent appenders is the bank's job; a session
/// itself is plain mutable state.
#[derive(Debug)]
pub struct Session {
    id: String,
    messages: Vec<Message>,
    next_seq: u64,
}

impl Session {
    /// Creates an empty session.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            messages: Vec::new(),
            next_seq: 0,
        }
    }

    /// Session identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Appends a message, assigning the next sequence index.
    pub fn append(&mut self, role: Role, content: impl Into<String>) -> u64 {
        let seq = self.next_seq;
        self.messages.push(Message::new(role, content, seq));
        self.next_seq += 1;
        seq
    }

    /// Full message history in append order.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages currently held (post-compaction this shrinks;
    /// the sequence counter never does).
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` when the session holds no messages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Replaces the compacted prefix with a single summary message,
    /// keeping the `tail`.
    pub(crate) fn replace_head(&mut self, summary: Message, tail: Vec<Message>) {
        self.messages = Vec::with_capacity(tail.len() + 1);
        self.messages.push(summary);
        self.messages.extend(tail);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_assigns_gapless_indices() {
        let mut session = Session::new("s1");
        for i in 0..10 {
            let seq = session.append(Role::User, format!("m{i}"));
            assert_eq!(seq, i);
        }
        assert_eq!(session.len(), 10);
        assert_eq!(session.id(), "s1");
    }

    #[test]
    fn test_indices_survive_head_replacement() {
        let mut session = Session::new("s1");
        for i in 0..5 {
            session.append(Role::User, format!("m{i}"));
        }
        let tail = session.messages()[3..].to_vec();
        let mut summary = Message::new(Role::System, "summary", 0);
        summary.is_summary = true;
        session.replace_head(summary, tail);

        assert_eq!(session.len(), 3);
        assert_eq!(session.append(Role::Agent, "next"), 5);
    }
}
