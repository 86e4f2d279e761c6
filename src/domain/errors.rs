//! Domain errors for the message parity auditor.

use thiserror::Error;

/// Errors that abort a run.
///
/// Fetch failures never show up here: they are recovered as empty results
/// inside the reconciliation engine.
#[derive(Debug, Error)]
pub enum ParityError {
    /// The persisted ledger cannot be parsed.
    #[error("Ledger corrupted at line {line}: {reason}")]
    LedgerCorruption {
        /// One-based CSV line of the bad record.
        line: u64,
        /// What was wrong with it.
        reason: String,
    },

    /// The query corpus cannot be read.
    #[error("Query source error: {0}")]
    QuerySource(String),

    /// A file could not be read or written.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A payload could not be serialized for the report.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Result alias for run-aborting operations.
pub type ParityResult<T> = Result<T, ParityError>;

impl From<std::io::Error> for ParityError {
    fn from(err: std::io::Error) -> Self {
        ParityError::Storage(err.to_string())
    }
}

impl From<csv::Error> for ParityError {
    fn from(err: csv::Error) -> Self {
        ParityError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for ParityError {
    fn from(err: serde_json::Error) -> Self {
        ParityError::SerializationError(err.to_string())
    }
}

/// Why a single endpoint fetch produced no payload.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// Non-success HTTP status.
    #[error("Unexpected status {0}")]
    Status(u16),

    /// No response within the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// Connection-level failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Body is not the expected JSON shape.
    #[error("Malformed response body: {0}")]
    Decode(String),
}

impl FetchError {
    /// Short label used in structured log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Status(_) => "status",
            FetchError::Timeout => "timeout",
            FetchError::Transport(_) => "transport",
            FetchError::Decode(_) => "decode",
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Decode(err.to_string())
    }
}
