//! Domain models for the message parity auditor.

pub mod comparison;
pub mod config;
pub mod ledger;
pub mod message;
pub mod payload;
pub mod query;

pub use comparison::{ComparisonRecord, RecordState};
pub use config::{Config, EndpointConfig, HttpConfig, LoggingConfig, PathsConfig, QueryConfig};
pub use ledger::MissingLedger;
pub use message::{IdentityKey, MessageRecord};
pub use payload::{Payload, UnwrapStrategy};
pub use query::Query;
