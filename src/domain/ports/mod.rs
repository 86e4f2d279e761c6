//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the interfaces that infrastructure adapters must implement:
//! - EndpointClient: Message API fetches
//! - QuerySource: Recorded query corpus
//! - LedgerStore: Missing-message ledger persistence
//! - ReportSink: Comparison report output
//!
//! These traits keep the reconciliation core independent of HTTP and CSV.

pub mod endpoint_client;
pub mod stores;

pub use endpoint_client::EndpointClient;
pub use stores::{LedgerStore, QuerySource, ReportSink};
