//! Report rows pairing a legacy payload with its replacement counterpart.

use serde::{Deserialize, Serialize};

use super::message::MessageRecord;
use super::payload::Payload;
use super::query::Query;

/// Lifecycle of a comparison record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordState {
    /// Only the legacy endpoint answered.
    Created,
    /// Both endpoints answered.
    Completed,
}

impl RecordState {
    /// Lowercase state name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Completed => "completed",
        }
    }
}

/// One row of the parity report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonRecord {
    /// Query that produced this row.
    pub query: Query,
    /// Legacy answer.
    pub legacy: Payload,
    /// Replacement answer, once it arrives.
    pub replacement: Option<Payload>,
    /// Set by verification only.
    pub matched: bool,
    /// Comparable fields that differed during verification.
    pub mismatched_fields: Vec<&'static str>,
}

impl ComparisonRecord {
    /// Record for a query whose legacy fetch succeeded.
    pub fn created(query: Query, legacy: Payload) -> Self {
        Self {
            query,
            legacy,
            replacement: None,
            matched: false,
            mismatched_fields: Vec::new(),
        }
    }

    /// Whether the replacement has answered.
    pub fn state(&self) -> RecordState {
        if self.replacement.is_some() {
            RecordState::Completed
        } else {
            RecordState::Created
        }
    }

    /// Attach the replacement payload, moving the record to `Completed`.
    pub fn complete(&mut self, replacement: Payload) {
        self.replacement = Some(replacement);
    }

    /// Legacy and replacement messages to compare, when both are present.
    pub fn comparable_pair(&self) -> Option<(&MessageRecord, &MessageRecord)> {
        let legacy = self.legacy.primary()?;
        let replacement = self.replacement.as_ref()?.primary()?;
        Some((legacy, replacement))
    }
}
