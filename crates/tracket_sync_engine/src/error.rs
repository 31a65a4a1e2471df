//! Error and outcome types for the sync engine.

use thiserror::Error;
use tracket_remote::RemoteError;
use tracket_store::StoreError;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur during sync operations.
///
/// Collaborator failures are wrapped here at the repository boundary;
/// raw store or transport errors never escape further up.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Local store failure.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Remote service failure.
    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),

    /// A pending-record snapshot stream closed.
    #[error("{stream} subscription closed")]
    SubscriptionClosed {
        /// Which stream closed.
        stream: &'static str,
    },
}

/// Whether a failure is worth retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Retry is sensible: connectivity, resource exhaustion, timeouts,
    /// lock contention.
    Transient,
    /// Retry is futile: validation, authorization, malformed data.
    Permanent,
}

impl ErrorKind {
    /// Returns true for the transient kind.
    pub fn is_transient(&self) -> bool {
        matches!(self, ErrorKind::Transient)
    }
}

/// The verdict of one sync operation.
///
/// Every sync task resolves to exactly one of success, retriable error,
/// or permanent error; the external scheduler uses this to decide
/// re-enqueue vs give-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The record is in sync with the remote side.
    Success,
    /// The operation failed with the given classification.
    Error(ErrorKind),
}

impl SyncOutcome {
    /// The transient-error verdict.
    pub fn transient() -> Self {
        SyncOutcome::Error(ErrorKind::Transient)
    }

    /// The permanent-error verdict.
    pub fn permanent() -> Self {
        SyncOutcome::Error(ErrorKind::Permanent)
    }

    /// Returns true on success.
    pub fn is_success(&self) -> bool {
        matches!(self, SyncOutcome::Success)
    }

    /// Returns true if a retry could change the verdict.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SyncOutcome::Error(ErrorKind::Transient))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_predicates() {
        assert!(SyncOutcome::Success.is_success());
        assert!(!SyncOutcome::Success.is_retryable());
        assert!(SyncOutcome::transient().is_retryable());
        assert!(!SyncOutcome::permanent().is_retryable());
        assert!(!SyncOutcome::permanent().is_success());
    }

    #[test]
    fn error_display() {
        let err = SyncError::SubscriptionClosed {
            stream: "pending entries",
        };
        assert_eq!(err.to_string(), "pending entries subscription closed");
    }
}
