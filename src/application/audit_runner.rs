//! One complete parity audit: load, reconcile, verify, persist.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::domain::errors::ParityResult;
use crate::domain::models::{ComparisonRecord, MissingLedger};
use crate::domain::ports::{LedgerStore, QuerySource, ReportSink};
use crate::services::{verify, ReconciliationEngine, RunStats, VerificationSummary};

/// Summary of a finished audit.
#[derive(Debug, Clone, Serialize)]
pub struct AuditSummary {
    /// When loading began.
    pub started_at: DateTime<Utc>,
    /// When outputs were written.
    pub finished_at: DateTime<Utc>,
    /// Engine counters.
    pub stats: RunStats,
    /// `None` when verification was skipped.
    pub verification: Option<VerificationSummary>,
    /// Rows in the report.
    pub records: usize,
    /// Entries in the saved ledger.
    pub ledger_size: usize,
    /// Persisted ledger entries dropped on load for repeating an identity key.
    pub ledger_duplicates_dropped: usize,
}

/// Everything an audit produced.
#[derive(Debug, Clone)]
pub struct AuditOutcome {
    /// Counters and timings.
    pub summary: AuditSummary,
    /// Report rows, verified unless verification was skipped.
    pub records: Vec<ComparisonRecord>,
    /// Ledger as saved.
    pub ledger: MissingLedger,
}

/// Runs the engine between the configured stores.
pub struct AuditRunner {
    engine: ReconciliationEngine,
    query_source: Arc<dyn QuerySource>,
    ledger_store: Arc<dyn LedgerStore>,
    report_sink: Arc<dyn ReportSink>,
    verify: bool,
}

impl AuditRunner {
    /// Runner reading and writing through the given stores.
    pub fn new(
        engine: ReconciliationEngine,
        query_source: Arc<dyn QuerySource>,
        ledger_store: Arc<dyn LedgerStore>,
        report_sink: Arc<dyn ReportSink>,
    ) -> Self {
        Self {
            engine,
            query_source,
            ledger_store,
            report_sink,
            verify: true,
        }
    }

    /// Disable the field comparison step; every record stays unmatched.
    #[must_use]
    pub const fn with_verification(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Run one audit.
    ///
    /// The ledger and the query corpus are both loaded before any request is
    /// issued, so a corrupted ledger or unreadable corpus aborts the run
    /// without touching either endpoint.
    pub async fn run(&self) -> ParityResult<AuditOutcome> {
        let started_at = Utc::now();

        let (ledger, ledger_duplicates_dropped) =
            MissingLedger::from_entries(self.ledger_store.load()?);
        if ledger_duplicates_dropped > 0 {
            warn!(
                dropped = ledger_duplicates_dropped,
                "persisted ledger repeated identity keys; keeping first entries"
            );
        }
        let queries = self.query_source.load_queries()?;

        let mut reconciliation = self.engine.run(queries, ledger).await;

        let verification = if self.verify {
            Some(verify(&mut reconciliation.records))
        } else {
            info!("verification skipped");
            None
        };

        self.report_sink.write_report(&reconciliation.records)?;
        self.ledger_store.save(reconciliation.ledger.entries())?;

        let summary = AuditSummary {
            started_at,
            finished_at: Utc::now(),
            stats: reconciliation.stats,
            verification,
            records: reconciliation.records.len(),
            ledger_size: reconciliation.ledger.len(),
            ledger_duplicates_dropped,
        };
        info!(
            records = summary.records,
            ledger_size = summary.ledger_size,
            elapsed_ms = (summary.finished_at - summary.started_at).num_milliseconds(),
            "audit complete"
        );

        Ok(AuditOutcome {
            summary,
            records: reconciliation.records,
            ledger: reconciliation.ledger,
        })
    }
}
