//! Ports for the query corpus, the missing-message ledger and the report.

use crate::domain::errors::ParityResult;
use crate::domain::models::{ComparisonRecord, MessageRecord, Query};

/// Source of recorded queries
pub trait QuerySource: Send + Sync {
    /// Load every recorded query in corpus order
    fn load_queries(&self) -> ParityResult<Vec<Query>>;
}

/// Persistence for the missing-message ledger
pub trait LedgerStore: Send + Sync {
    /// Load the persisted ledger entries
    ///
    /// An absent ledger is not an error and yields no entries. A malformed
    /// entry yields [`ParityError::LedgerCorruption`](crate::domain::errors::ParityError::LedgerCorruption).
    fn load(&self) -> ParityResult<Vec<MessageRecord>>;

    /// Replace the persisted ledger with `entries`
    fn save(&self, entries: &[MessageRecord]) -> ParityResult<()>;
}

/// Destination for the comparison report
pub trait ReportSink: Send + Sync {
    /// Write every comparison record, replacing any previous report
    fn write_report(&self, records: &[ComparisonRecord]) -> ParityResult<()>;
}
