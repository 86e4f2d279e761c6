//! Message Parity - legacy/replacement message API auditor
//!
//! Replays a corpus of recorded query strings against a legacy message
//! endpoint and its replacement, batch by batch, and produces a side-by-side
//! CSV report plus a persistent ledger of messages the replacement has not
//! served yet.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Message records, payloads, the missing ledger and ports
//! - **Service Layer** (`services`): Batching, two-phase reconciliation and verification
//! - **Application Layer** (`application`): One audit from corpus to persisted outputs
//! - **Infrastructure Layer** (`infrastructure`): HTTP, CSV, configuration and logging
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use message_parity::infrastructure::http::HttpEndpointClient;
//! use message_parity::services::{EngineConfig, ReconciliationEngine};
//!
//! let config = message_parity::ConfigLoader::load()?;
//! let engine = ReconciliationEngine::new(
//!     Arc::new(HttpEndpointClient::new()?),
//!     EngineConfig::new(config.legacy, config.replacement),
//! );
//! ```

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use application::{AuditOutcome, AuditRunner, AuditSummary};
pub use domain::errors::{FetchError, ParityError, ParityResult};
pub use domain::models::{
    ComparisonRecord, Config, EndpointConfig, IdentityKey, MessageRecord, MissingLedger, Payload,
    Query, RecordState, UnwrapStrategy,
};
pub use domain::ports::{EndpointClient, LedgerStore, QuerySource, ReportSink};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{partition, verify, ReconciliationEngine, RunStats};
