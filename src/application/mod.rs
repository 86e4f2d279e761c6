//! Application layer: one audit from inputs to outputs.

pub mod audit_runner;

pub use audit_runner::{AuditOutcome, AuditRunner, AuditSummary};
