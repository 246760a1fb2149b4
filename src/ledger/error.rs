//! Ledger error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or preprocessing transactions
#[derive(Error, Debug)]
pub enum LedgerError {
    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reading or writing failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Register file could not be (de)serialized
    #[error("Register error: {0}")]
    Json(#[from] serde_json::Error),

    /// A bank export row or column could not be interpreted
    #[error("Parse error in {file:?}: {message}")]
    Parse { file: PathBuf, message: String },

    /// A categorisation rule produced an invalid pattern
    #[error("Invalid rule for {concept}: {message}")]
    InvalidRule { concept: String, message: String },
}

/// Result type alias for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
