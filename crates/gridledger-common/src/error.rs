//! Error types for GridLedger.

use thiserror::Error;

/// Result type alias using LedgerError.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors that can occur in GridLedger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Index errors
    #[error("Duplicate key: {key}")]
    DuplicateKey { key: u64 },

    #[error("Invalid minimum degree: {degree} (must be at least 2)")]
    InvalidDegree { degree: usize },

    #[error("Index corrupted: {0}")]
    IndexCorrupted(String),

    // Ledger errors
    #[error("Duplicate transaction: {id}")]
    DuplicateTransaction { id: u32 },

    // Input errors
    #[error("Parse error on line {line}: {reason}")]
    ParseError { line: usize, reason: String },

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid parameter: {name} = {value}")]
    InvalidParameter { name: String, value: String },

    // Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}
