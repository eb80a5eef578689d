//! Error types for the cryptorec system.

use chrono::NaiveDate;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the cryptorec system.
///
/// Ingestion and query failures are surfaced unmodified; nothing here is
/// retried internally.
#[derive(Error, Debug)]
pub enum Error {
    /// Nothing to ingest.
    #[error("No input: {0}")]
    NoInput(String),

    /// A source file could not be read or does not match the expected schema.
    #[error("Error reading CSV file {source_name}: {reason}")]
    SourceRead { source_name: String, reason: String },

    /// A parsed row failed field validation.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Query range whose end precedes its start.
    #[error("Invalid range: end {end} precedes start {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    /// Storage backend failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a no-input error.
    pub fn no_input(msg: impl Into<String>) -> Self {
        Error::NoInput(msg.into())
    }

    /// Create a source read error.
    pub fn source_read(source_name: impl Into<String>, reason: impl ToString) -> Self {
        Error::SourceRead {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an invalid record error.
    pub fn invalid_record(msg: impl Into<String>) -> Self {
        Error::InvalidRecord(msg.into())
    }

    /// Create a storage error.
    pub fn storage(msg: impl ToString) -> Self {
        Error::Storage(msg.to_string())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }
}
