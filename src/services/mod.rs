//! Service layer: batching, reconciliation and verification.

pub mod batcher;
pub mod reconciliation_engine;
pub mod verifier;

pub use batcher::{partition, DEFAULT_BATCH_SIZE};
pub use reconciliation_engine::{
    EndpointStats, EngineConfig, Phase, Reconciliation, ReconciliationEngine, ReconcileEvent,
    RunStats,
};
pub use verifier::{verify, VerificationSummary};
