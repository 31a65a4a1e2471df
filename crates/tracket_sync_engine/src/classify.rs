//! Failure classification.
//!
//! The classifiers are the single source of the Transient/Permanent
//! distinction; no other component re-derives it.

use crate::error::{ErrorKind, SyncError};
use tracket_remote::{RemoteError, StatusCode};
use tracket_store::StoreError;

/// Maps failures to an [`ErrorKind`].
///
/// Classification is a pure function of the error value: repeated calls
/// on the same error return the same kind.
pub trait Classifier: Send + Sync {
    /// Returns true if the error is worth retrying.
    fn is_transient(&self, error: &SyncError) -> bool;

    /// Classifies the error.
    fn classify(&self, error: &SyncError) -> ErrorKind {
        if self.is_transient(error) {
            ErrorKind::Transient
        } else {
            ErrorKind::Permanent
        }
    }
}

/// Classifier for local store failures.
///
/// Disk pressure, I/O trouble, open failures and timeouts are retryable.
/// Not-found is also retryable: a lookup can race with a write that has
/// not landed yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct StorageClassifier;

impl Classifier for StorageClassifier {
    fn is_transient(&self, error: &SyncError) -> bool {
        match error {
            SyncError::Store(store) => matches!(
                store,
                StoreError::DiskFull
                    | StoreError::Io(_)
                    | StoreError::OpenFailed { .. }
                    | StoreError::Timeout
                    | StoreError::NotFound { .. }
            ),
            _ => false,
        }
    }
}

/// Classifier for remote transport failures.
///
/// Generic transport I/O and the unavailable / deadline-exceeded /
/// resource-exhausted service codes are retryable; every other status is
/// a deliberate answer and retrying will not change it.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransportClassifier;

impl Classifier for TransportClassifier {
    fn is_transient(&self, error: &SyncError) -> bool {
        match error {
            SyncError::Remote(RemoteError::Io(_)) => true,
            SyncError::Remote(RemoteError::Status { code, .. }) => matches!(
                code,
                StatusCode::Unavailable
                    | StatusCode::DeadlineExceeded
                    | StatusCode::ResourceExhausted
            ),
            _ => false,
        }
    }
}

/// Classifier spanning both collaborator layers.
///
/// Transient if either sub-classifier says so; this is the classifier
/// the sync tasks and the manager use.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompositeClassifier {
    storage: StorageClassifier,
    transport: TransportClassifier,
}

impl CompositeClassifier {
    /// Creates the composite classifier.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Classifier for CompositeClassifier {
    fn is_transient(&self, error: &SyncError) -> bool {
        self.storage.is_transient(error) || self.transport.is_transient(error)
    }
}
