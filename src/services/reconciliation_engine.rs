//! Reconciliation engine for batch-wise, two-phase parity checks.
//!
//! Each batch fans out every legacy fetch concurrently and waits for all of
//! them before fanning out the replacement fetches. Ledger insertions made in
//! the legacy phase are therefore visible to the removals of the replacement
//! phase of the same batch. Batches run strictly one after another.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::domain::errors::FetchError;
use crate::domain::models::{ComparisonRecord, EndpointConfig, MissingLedger, Payload, Query};
use crate::domain::ports::EndpointClient;
use crate::services::batcher::{partition, DEFAULT_BATCH_SIZE};

/// Configuration for the reconciliation engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Endpoint being retired.
    pub legacy: EndpointConfig,
    /// Endpoint being validated.
    pub replacement: EndpointConfig,
    /// Maximum concurrent fetches per phase.
    pub batch_size: usize,
}

impl EngineConfig {
    /// Config for the given endpoint pair with the default batch size.
    pub fn new(legacy: EndpointConfig, replacement: EndpointConfig) -> Self {
        Self {
            legacy,
            replacement,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Override the batch size.
    #[must_use]
    pub const fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }
}

/// Fetch phase within a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Fetches against the endpoint being retired.
    Legacy,
    /// Fetches against the endpoint being validated.
    Replacement,
}

impl Phase {
    /// Lowercase name used in logs and progress messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::Replacement => "replacement",
        }
    }
}

/// Event emitted during a run.
#[derive(Debug, Clone)]
pub enum ReconcileEvent {
    /// Run started.
    RunStarted {
        /// Distinct queries to replay.
        total_queries: usize,
        /// Batches the queries were split into.
        batch_count: usize,
    },
    /// Batch started.
    BatchStarted {
        /// One-based batch number.
        batch_number: usize,
        /// Queries in this batch.
        query_count: usize,
    },
    /// Every fetch of a phase resolved.
    PhaseCompleted {
        /// One-based batch number.
        batch_number: usize,
        /// Phase that finished.
        phase: Phase,
        /// Fetches that answered with a message.
        hits: usize,
    },
    /// Both phases of a batch resolved.
    BatchCompleted {
        /// One-based batch number.
        batch_number: usize,
        /// Ledger size after the batch.
        ledger_size: usize,
    },
    /// Run completed.
    RunCompleted {
        /// Final counters.
        stats: RunStats,
    },
}

/// Fetch outcomes for one endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EndpointStats {
    /// Fetches that answered with at least one message.
    pub hits: usize,
    /// Fetches that answered with no message.
    pub empty: usize,
    /// Fetches that failed and were treated as empty.
    pub failures: usize,
}

/// Counters for a single run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Distinct queries processed.
    pub queries: usize,
    /// Repeated queries dropped before batching.
    pub duplicate_queries: usize,
    /// Batches run.
    pub batches: usize,
    /// Legacy endpoint outcomes.
    pub legacy: EndpointStats,
    /// Replacement endpoint outcomes.
    pub replacement: EndpointStats,
    /// Replacement hits with no legacy record to attach to.
    pub lookup_gaps: usize,
    /// Ledger entries inserted by legacy answers.
    pub ledger_added: usize,
    /// Ledger entries removed by replacement answers.
    pub ledger_resolved: usize,
}

/// Result of a finished run.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    /// One record per query the legacy endpoint answered, in batch order.
    pub records: Vec<ComparisonRecord>,
    /// Ledger after every batch.
    pub ledger: MissingLedger,
    /// Run counters.
    pub stats: RunStats,
}

/// Mutable state of one run, owned by [`ReconciliationEngine::run`].
#[derive(Debug)]
struct RunState {
    records: Vec<ComparisonRecord>,
    index: HashMap<Query, usize>,
    ledger: MissingLedger,
    stats: RunStats,
}

impl RunState {
    fn new(ledger: MissingLedger) -> Self {
        Self {
            records: Vec::new(),
            index: HashMap::new(),
            ledger,
            stats: RunStats::default(),
        }
    }

    fn push_record(&mut self, record: ComparisonRecord) {
        self.index.insert(record.query.clone(), self.records.len());
        self.records.push(record);
    }

    fn record_mut(&mut self, query: &Query) -> Option<&mut ComparisonRecord> {
        let position = *self.index.get(query)?;
        self.records.get_mut(position)
    }
}

/// Drives the batched legacy/replacement fetch cycle and maintains the ledger.
pub struct ReconciliationEngine {
    client: Arc<dyn EndpointClient>,
    config: EngineConfig,
    event_tx: Option<mpsc::UnboundedSender<ReconcileEvent>>,
}

impl ReconciliationEngine {
    /// Engine fetching through `client`.
    pub fn new(client: Arc<dyn EndpointClient>, config: EngineConfig) -> Self {
        Self {
            client,
            config,
            event_tx: None,
        }
    }

    /// Send progress events to `event_tx`.
    #[must_use]
    pub fn with_events(mut self, event_tx: mpsc::UnboundedSender<ReconcileEvent>) -> Self {
        self.event_tx = Some(event_tx);
        self
    }

    /// The engine's configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Replay `queries` against both endpoints, starting from `ledger`.
    ///
    /// Never fails: fetch failures become empty results.
    pub async fn run(&self, queries: Vec<Query>, ledger: MissingLedger) -> Reconciliation {
        let run_id = Uuid::new_v4();
        let span = info_span!("reconcile", %run_id);
        self.run_inner(queries, ledger).instrument(span).await
    }

    async fn run_inner(&self, queries: Vec<Query>, ledger: MissingLedger) -> Reconciliation {
        let (queries, duplicates) = dedup_queries(queries);
        let batches = partition(queries, self.config.batch_size);

        let mut state = RunState::new(ledger);
        state.stats.queries = batches.iter().map(Vec::len).sum();
        state.stats.duplicate_queries = duplicates;
        state.stats.batches = batches.len();

        if duplicates > 0 {
            info!(duplicates, "skipping duplicate queries");
        }
        info!(
            queries = state.stats.queries,
            batches = batches.len(),
            batch_size = self.config.batch_size,
            ledger_size = state.ledger.len(),
            "starting reconciliation"
        );
        self.emit(ReconcileEvent::RunStarted {
            total_queries: state.stats.queries,
            batch_count: batches.len(),
        });

        for (i, batch) in batches.iter().enumerate() {
            self.process_batch(i + 1, batch, &mut state).await;
        }

        info!(
            records = state.records.len(),
            ledger_size = state.ledger.len(),
            ledger_added = state.stats.ledger_added,
            ledger_resolved = state.stats.ledger_resolved,
            lookup_gaps = state.stats.lookup_gaps,
            "reconciliation finished"
        );
        self.emit(ReconcileEvent::RunCompleted {
            stats: state.stats.clone(),
        });

        Reconciliation {
            records: state.records,
            ledger: state.ledger,
            stats: state.stats,
        }
    }

    async fn process_batch(&self, batch_number: usize, batch: &[Query], state: &mut RunState) {
        debug!(batch_number, queries = batch.len(), "batch started");
        self.emit(ReconcileEvent::BatchStarted {
            batch_number,
            query_count: batch.len(),
        });

        let hits = self.legacy_phase(batch, state).await;
        self.emit(ReconcileEvent::PhaseCompleted {
            batch_number,
            phase: Phase::Legacy,
            hits,
        });

        let hits = self.replacement_phase(batch, state).await;
        self.emit(ReconcileEvent::PhaseCompleted {
            batch_number,
            phase: Phase::Replacement,
            hits,
        });

        info!(
            batch_number,
            records = state.records.len(),
            ledger_size = state.ledger.len(),
            "batch completed"
        );
        self.emit(ReconcileEvent::BatchCompleted {
            batch_number,
            ledger_size: state.ledger.len(),
        });
    }

    /// Fetch the batch from the legacy endpoint, record hits and add unseen
    /// messages to the ledger.
    async fn legacy_phase(&self, batch: &[Query], state: &mut RunState) -> usize {
        let endpoint = &self.config.legacy;
        let results = self.fetch_all(endpoint, batch).await;

        let mut hits = 0;
        for (query, result) in batch.iter().zip(results) {
            let Some(payload) = settle(endpoint, query, result, &mut state.stats.legacy) else {
                continue;
            };
            hits += 1;

            for message in payload.messages() {
                if state.ledger.insert_if_absent(message.clone()) {
                    state.stats.ledger_added += 1;
                    debug!(%query, key = %message.identity_key(), "added to missing ledger");
                }
            }
            state.push_record(ComparisonRecord::created(query.clone(), payload));
        }
        hits
    }

    /// Fetch the batch from the replacement endpoint, complete records and
    /// resolve ledger entries the replacement now serves.
    async fn replacement_phase(&self, batch: &[Query], state: &mut RunState) -> usize {
        let endpoint = &self.config.replacement;
        let results = self.fetch_all(endpoint, batch).await;

        let mut hits = 0;
        for (query, result) in batch.iter().zip(results) {
            let Some(payload) = settle(endpoint, query, result, &mut state.stats.replacement)
            else {
                continue;
            };
            hits += 1;

            for key in payload.identity_keys() {
                if state.ledger.remove(&key).is_some() {
                    state.stats.ledger_resolved += 1;
                    debug!(%query, %key, "resolved from missing ledger");
                }
            }

            if let Some(record) = state.record_mut(query) {
                record.complete(payload);
            } else {
                state.stats.lookup_gaps += 1;
                warn!(
                    %query,
                    endpoint = %endpoint.label,
                    "replacement answered a query with no legacy record; leaving report untouched"
                );
            }
        }
        hits
    }

    async fn fetch_all(
        &self,
        endpoint: &EndpointConfig,
        batch: &[Query],
    ) -> Vec<Result<Option<Payload>, FetchError>> {
        join_all(
            batch
                .iter()
                .map(|query| self.client.fetch(endpoint, query.as_str())),
        )
        .await
    }

    fn emit(&self, event: ReconcileEvent) {
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(event);
        }
    }
}

/// Collapse a fetch result into an optional payload, counting and logging failures.
fn settle(
    endpoint: &EndpointConfig,
    query: &Query,
    result: Result<Option<Payload>, FetchError>,
    stats: &mut EndpointStats,
) -> Option<Payload> {
    match result {
        Ok(Some(payload)) => {
            stats.hits += 1;
            debug!(endpoint = %endpoint.label, %query, "fetched");
            Some(payload)
        }
        Ok(None) => {
            stats.empty += 1;
            debug!(endpoint = %endpoint.label, %query, "no messages");
            None
        }
        Err(err) => {
            stats.failures += 1;
            warn!(
                endpoint = %endpoint.label,
                %query,
                kind = err.kind(),
                error = %err,
                "fetch failed, treating as empty"
            );
            None
        }
    }
}

/// Drop repeated queries, keeping the first occurrence.
fn dedup_queries(queries: Vec<Query>) -> (Vec<Query>, usize) {
    let total = queries.len();
    let mut seen = HashSet::with_capacity(total);
    let unique: Vec<Query> = queries
        .into_iter()
        .filter(|query| seen.insert(query.clone()))
        .collect();
    let duplicates = total - unique.len();
    (unique, duplicates)
}
