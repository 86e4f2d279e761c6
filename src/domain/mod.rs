//! Domain layer for the message parity auditor
//!
//! This module contains the data model and the port traits the
//! reconciliation core talks through.

pub mod errors;
pub mod models;
pub mod ports;

// Re-export error types for convenient access
pub use errors::{FetchError, ParityError, ParityResult};
