//! Cross-run ledger of messages not yet seen on the replacement endpoint.

use std::collections::HashSet;

use super::message::{IdentityKey, MessageRecord};

/// Messages observed on the legacy endpoint and not yet confirmed on the
/// replacement endpoint.
///
/// Holds at most one entry per [`IdentityKey`]. Entries keep their insertion
/// order so the persisted ledger stays stable between runs.
#[derive(Debug, Clone, Default)]
pub struct MissingLedger {
    entries: Vec<MessageRecord>,
    keys: HashSet<IdentityKey>,
}

impl MissingLedger {
    /// Empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a ledger from persisted entries.
    ///
    /// Returns the ledger and the number of entries dropped because an earlier
    /// entry already carried the same identity key.
    pub fn from_entries(entries: impl IntoIterator<Item = MessageRecord>) -> (Self, usize) {
        let mut ledger = Self::new();
        let mut duplicates = 0;
        for entry in entries {
            if !ledger.insert_if_absent(entry) {
                duplicates += 1;
            }
        }
        (ledger, duplicates)
    }

    /// Whether an entry carries `key`.
    pub fn contains(&self, key: &IdentityKey) -> bool {
        self.keys.contains(key)
    }

    /// Insert `message` unless an entry with the same identity key exists.
    ///
    /// Returns `true` when the message was inserted.
    pub fn insert_if_absent(&mut self, message: MessageRecord) -> bool {
        let key = message.identity_key();
        if self.keys.contains(&key) {
            return false;
        }
        self.keys.insert(key);
        self.entries.push(message);
        true
    }

    /// Remove the entry carrying `key`, if any.
    pub fn remove(&mut self, key: &IdentityKey) -> Option<MessageRecord> {
        if !self.keys.remove(key) {
            return None;
        }
        let position = self
            .entries
            .iter()
            .position(|entry| entry.identity_key() == *key)?;
        Some(self.entries.remove(position))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the ledger has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &MessageRecord> {
        self.entries.iter()
    }

    /// Entries in insertion order, as a slice.
    pub fn entries(&self) -> &[MessageRecord] {
        &self.entries
    }

    /// Consume the ledger, keeping insertion order.
    pub fn into_entries(self) -> Vec<MessageRecord> {
        self.entries
    }
}
