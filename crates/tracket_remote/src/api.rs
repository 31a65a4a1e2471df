//! Remote API trait definition.

use crate::error::RemoteResult;
use async_trait::async_trait;
use tracket_model::{DeletedEntry, DoneEntry, Entry};

/// The remote service the sync engine reconciles against.
///
/// This trait abstracts the transport (HTTP, gRPC, mock for testing).
/// Every call reports success or failure on its own; no partial-batch
/// semantics are required from implementations.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// Fetches the full remote entry set.
    async fn fetch_entries(&self) -> RemoteResult<Vec<Entry>>;

    /// Pushes one entry to the remote service.
    async fn push_entry(&self, entry: &Entry) -> RemoteResult<()>;

    /// Pushes one completion record to the remote service.
    async fn push_done_entry(&self, done: &DoneEntry) -> RemoteResult<()>;

    /// Pushes one deletion to the remote service.
    async fn push_deleted_entry(&self, tombstone: &DeletedEntry) -> RemoteResult<()>;
}
