//! Infrastructure layer module
//!
//! This module contains the adapters behind the domain ports and the
//! ambient plumbing:
//! - HTTP client for the message API endpoints
//! - CSV query source, ledger store and report sink
//! - Configuration management
//! - Logging infrastructure
//!
//! Infrastructure implementations satisfy the port traits defined in the domain layer.

pub mod config;
pub mod http;
pub mod logging;
pub mod tabular;
