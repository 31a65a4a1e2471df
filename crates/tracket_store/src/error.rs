//! Error types for store operations.

use std::io;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in the local store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The underlying device is out of space.
    #[error("disk full")]
    DiskFull,

    /// The store could not be opened.
    #[error("store open failed: {message}")]
    OpenFailed {
        /// Description of the failure.
        message: String,
    },

    /// The operation timed out.
    #[error("store operation timed out")]
    Timeout,

    /// The requested record does not exist.
    ///
    /// This can race with a write that has not landed yet, so callers
    /// generally treat it as retryable.
    #[error("{what} not found: {id}")]
    NotFound {
        /// The record kind that was looked up.
        what: &'static str,
        /// The identifier that was not found.
        id: String,
    },

    /// The store contents are corrupted.
    #[error("store corrupted: {0}")]
    Corrupted(String),

    /// The store is closed.
    #[error("store is closed")]
    Closed,

    /// The record was rejected by the store.
    #[error("invalid record: {0}")]
    InvalidRecord(String),
}

impl StoreError {
    /// Creates an open-failure error.
    pub fn open_failed(message: impl Into<String>) -> Self {
        Self::OpenFailed {
            message: message.into(),
        }
    }

    /// Creates a not-found error.
    pub fn not_found(what: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            what,
            id: id.into(),
        }
    }
}
