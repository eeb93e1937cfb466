//! History summarization for session compaction.

use crate::core::{Message, Role};
use std::collections::BTreeMap;

/// Produces a single summary text from a run of messages about to be
/// compacted away.
pub trait Summarizer: Send + Sync {
    /// Summarizes the given messages into one text block.
    fn summarize(&self, messages: &[Message]) -> String;
}

/// Deterministic summarizer with no external dependencies.
///
/// Counts messages per role and keeps the leading line of the oldest
/// and newest compacted message. Output depends only on the input, so
/// compaction stays reproducible in tests and offline runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractiveSummarizer;

impl ExtractiveSummarizer {
    /// Creates a new extractive summarizer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn lead_line(message: &Message) -> &str {
        message.content.lines().next().unwrap_or_default()
    }
}

impl Summarizer for ExtractiveSummarizer {
    fn summarize(&self, messages: &[Message]) -> String {
        if messages.is_empty() {
            return "Summary of 0 messages.".to_string();
        }

        let mut counts: BTreeMap<Role, usize> = BTreeMap::new();
        for message in messages {
            *counts.entry(message.role).or_default() += 1;
        }
        let breakdown = counts
            .iter()
            .map(|(role, n)| format!("{n} {role}"))
            .collect::<Vec<_>>()
            .join(", ");

        let first = messages.first().map(Self::lead_line).unwrap_or_default();
        let last = messages.last().map(Self::lead_line).unwrap_or_default();

        if messages.len() == 1 {
            format!("Summary of 1 message ({breakdown}): {first}")
        } else {
            format!(
                "Summary of {} messages ({breakdown}). Started: {first} Ended: {last}",
                messages.len()
            )
        }
    }
}
