//! In-memory form of the journal document

use runcoach_core::{LogEntry, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mapping from user id to that user's log, in logging order.
///
/// Serializes as the bare document: `{ "<user_id>": [ {entry}, ... ] }`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JournalStore {
    users: BTreeMap<String, Vec<LogEntry>>,
}

impl JournalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The user's log, empty if the user never logged anything.
    pub fn entries(&self, user: &UserId) -> &[LogEntry] {
        self.users.get(user.as_str()).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Append to the user's log and return its new length.
    pub fn append(&mut self, user: &UserId, entry: LogEntry) -> usize {
        let log = self.users.entry(user.as_str().to_string()).or_default();
        log.push(entry);
        log.len()
    }

    pub fn users(&self) -> impl Iterator<Item = &str> {
        self.users.keys().map(String::as_str)
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn entry_count(&self) -> usize {
        self.users.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
