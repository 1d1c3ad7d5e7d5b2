//! Activity log of mutations that reached the remote store.

use crate::types::{LogEntryId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::VecDeque;

/// One recorded mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: LogEntryId,

    pub timestamp: DateTime<Utc>,

    /// Canonical op string (e.g., "create card", "move card")
    pub op: String,

    /// The mutation's input parameters (as JSON)
    pub input: Value,

    /// The result value, or `{"error": ...}` on failure
    pub output: Value,

    /// Who performed the mutation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<UserId>,

    /// Wall time from entry to confirm or rollback
    pub duration_ms: u64,
}

impl LogEntry {
    pub fn new(op: impl Into<String>, input: Value, output: Value, duration_ms: u64) -> Self {
        Self {
            id: LogEntryId::new(),
            timestamp: Utc::now(),
            op: op.into(),
            input,
            output,
            actor: None,
            duration_ms,
        }
    }

    pub fn with_actor(mut self, actor: UserId) -> Self {
        self.actor = Some(actor);
        self
    }

    /// True when the output records an error
    pub fn is_error(&self) -> bool {
        self.output.get("error").is_some()
    }
}

/// Bounded ring of log entries; the oldest entry is evicted first
#[derive(Debug, Clone, Default)]
pub struct ActivityLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl ActivityLog {
    /// A capacity of zero keeps nothing
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn record(&mut self, entry: LogEntry) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Entries newest first
    pub fn recent(&self) -> Vec<LogEntry> {
        self.entries.iter().rev().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
