//! Field-level parity verification over completed comparison records.

use serde::Serialize;
use tracing::{debug, info};

use crate::domain::models::{ComparisonRecord, MessageRecord, RecordState};

/// Outcome of verifying a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VerificationSummary {
    /// Records with both results present.
    pub completed: usize,
    /// Completed records whose compared fields all agree.
    pub matched: usize,
    /// Completed records with at least one differing field.
    pub mismatched: usize,
    /// Records the replacement never answered.
    pub gaps: usize,
}

impl VerificationSummary {
    /// Share of completed records that matched, `0.0` when none completed.
    pub fn match_rate(&self) -> f64 {
        if self.completed == 0 {
            return 0.0;
        }
        self.matched as f64 / self.completed as f64
    }
}

/// Compares the legacy and replacement messages of each completed record.
///
/// Sets `matched` and `mismatched_fields` on every record. Records still in
/// [`RecordState::Created`] are counted as gaps and left unmatched.
pub fn verify(records: &mut [ComparisonRecord]) -> VerificationSummary {
    let mut summary = VerificationSummary::default();

    for record in records.iter_mut() {
        if record.state() == RecordState::Created {
            record.matched = false;
            record.mismatched_fields.clear();
            summary.gaps += 1;
            continue;
        }

        summary.completed += 1;
        let mismatched = match record.comparable_pair() {
            Some((legacy, replacement)) => legacy.diff_fields(replacement),
            // A payload with no primary message differs on every field.
            None => MessageRecord::default()
                .comparable_fields()
                .map(|(name, _)| name)
                .to_vec(),
        };

        record.matched = mismatched.is_empty();
        if record.matched {
            summary.matched += 1;
        } else {
            summary.mismatched += 1;
            debug!(query = %record.query, fields = ?mismatched, "field mismatch");
        }
        record.mismatched_fields = mismatched;
    }

    info!(
        completed = summary.completed,
        matched = summary.matched,
        mismatched = summary.mismatched,
        gaps = summary.gaps,
        "verification finished"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Payload, Query};

    fn payload(desc: &str, action_text: &str) -> Payload {
        Payload::Single(MessageRecord {
            long_description: desc.to_string(),
            action_text: action_text.to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn test_verify_classifies_records() {
        let mut matching = ComparisonRecord::created(Query::from("/a"), payload("a", "Play"));
        matching.complete(payload("a", "Play"));

        let mut differing = ComparisonRecord::created(Query::from("/b"), payload("b", "Play"));
        differing.complete(payload("b", "Watch"));

        let gap = ComparisonRecord::created(Query::from("/c"), payload("c", "Play"));

        let mut records = vec![matching, differing, gap];
        let summary = verify(&mut records);

        assert_eq!(
            summary,
            VerificationSummary {
                completed: 2,
                matched: 1,
                mismatched: 1,
                gaps: 1,
            }
        );
        assert!(records[0].matched);
        assert!(!records[1].matched);
        assert_eq!(records[1].mismatched_fields, vec!["action_text"]);
        assert!(!records[2].matched);
        assert!((summary.match_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_replacement_list_is_mismatch() {
        let mut record = ComparisonRecord::created(Query::from("/a"), payload("a", ""));
        record.complete(Payload::List(Vec::new()));

        let mut records = vec![record];
        let summary = verify(&mut records);
        assert_eq!(summary.mismatched, 1);
        assert!(!records[0].matched);
        assert_eq!(records[0].mismatched_fields.len(), 8);
    }

    #[test]
    fn test_match_rate_without_completed_records() {
        assert!(VerificationSummary::default().match_rate().abs() < f64::EPSILON);
    }
}
