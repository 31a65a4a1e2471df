//! Sync repository: push/pull orchestration over the collaborators.

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::locks::{IdLocks, StoreGate};
use crate::resolve::newer_wins;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::warn;
use tracket_model::{DeletedEntry, DoneEntry, DoneKey, Entry, SyncState};
use tracket_remote::RemoteApi;
use tracket_store::EntryStore;

/// Result of one pull-then-merge batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Number of records fetched from the remote side.
    pub fetched: usize,
    /// Number of records that replaced the local version.
    pub replaced: usize,
    /// Number of records the local version won against.
    pub skipped: usize,
    /// Identifiers whose local write failed and were marked `Conflict`.
    pub conflicts: Vec<String>,
}

/// Orchestrates push and pull of records against the remote API and the
/// local store.
///
/// Every collaborator failure is converted to [`SyncError`] at this
/// boundary; raw store or transport errors never escape. All local-store
/// writes are bounded by the global concurrency gate, and merges
/// additionally take the per-identifier lock so a concurrent edit and an
/// incoming merge for the same record cannot interleave.
pub struct SyncRepository<S, R> {
    store: Arc<S>,
    remote: Arc<R>,
    gate: StoreGate,
    locks: IdLocks,
}

impl<S: EntryStore, R: RemoteApi> SyncRepository<S, R> {
    /// Creates a repository over the given collaborators.
    pub fn new(store: Arc<S>, remote: Arc<R>, config: &SyncConfig) -> Self {
        Self {
            store,
            remote,
            gate: StoreGate::new(config.max_concurrent_store_writes),
            locks: IdLocks::new(),
        }
    }

    /// Subscribes to snapshots of locally pending entries.
    pub fn pending_entries(&self) -> SyncResult<watch::Receiver<Vec<Entry>>> {
        Ok(self.store.subscribe_pending_entries()?)
    }

    /// Subscribes to snapshots of pending deleted-entry identifiers.
    pub fn pending_deleted_ids(&self) -> SyncResult<watch::Receiver<Vec<String>>> {
        Ok(self.store.subscribe_pending_deleted_ids()?)
    }

    /// Subscribes to snapshots of pending completion records.
    pub fn pending_done_entries(&self) -> SyncResult<watch::Receiver<Vec<DoneEntry>>> {
        Ok(self.store.subscribe_pending_done_entries()?)
    }

    /// Pushes one entry to the remote service.
    ///
    /// On failure no local state is mutated; the caller owns the state
    /// transition.
    pub async fn push_entry(&self, entry: &Entry) -> SyncResult<()> {
        Ok(self.remote.push_entry(entry).await?)
    }

    /// Pushes one completion record to the remote service.
    pub async fn push_done_entry(&self, done: &DoneEntry) -> SyncResult<()> {
        Ok(self.remote.push_done_entry(done).await?)
    }

    /// Pushes one deletion to the remote service.
    pub async fn push_deleted_entry(&self, tombstone: &DeletedEntry) -> SyncResult<()> {
        Ok(self.remote.push_deleted_entry(tombstone).await?)
    }

    /// Updates an entry's sync state.
    pub async fn update_entry_sync_state(&self, id: &str, state: SyncState) -> SyncResult<()> {
        let _permit = self.gate.acquire().await;
        Ok(self.store.update_entry_sync_state(id, state).await?)
    }

    /// Updates a completion record's sync state.
    pub async fn update_done_entry_sync_state(
        &self,
        key: &DoneKey,
        state: SyncState,
    ) -> SyncResult<()> {
        let _permit = self.gate.acquire().await;
        Ok(self.store.update_done_entry_sync_state(key, state).await?)
    }

    /// Updates a tombstone's sync state.
    pub async fn update_deleted_entry_sync_state(
        &self,
        entry_id: &str,
        state: SyncState,
    ) -> SyncResult<()> {
        let _permit = self.gate.acquire().await;
        Ok(self
            .store
            .update_deleted_entry_sync_state(entry_id, state)
            .await?)
    }

    /// Reads a completion record.
    pub async fn get_done_entry(&self, key: &DoneKey) -> SyncResult<Option<DoneEntry>> {
        Ok(self.store.get_done_entry(key).await?)
    }

    /// Reads a deletion tombstone.
    pub async fn get_deleted_entry(&self, entry_id: &str) -> SyncResult<Option<DeletedEntry>> {
        Ok(self.store.get_deleted_entry(entry_id).await?)
    }

    /// Reads all locally pending entries.
    pub async fn get_pending_entries(&self) -> SyncResult<Vec<Entry>> {
        Ok(self.store.get_pending_entries().await?)
    }

    /// Merges one remote entry into the local store.
    ///
    /// Takes the record's exclusive lock, then one gate permit for the
    /// whole read-resolve-write sequence; with a single-permit gate,
    /// merges therefore run to completion one at a time in submission
    /// order. Returns true if the incoming record replaced the local one.
    pub async fn apply_remote_entry(&self, incoming: Entry) -> SyncResult<bool> {
        let _lock = self.locks.lock(&incoming.id).await;
        let _permit = self.gate.acquire().await;

        let current = self.store.get_entry(&incoming.id).await?;
        let replace = newer_wins(
            current.as_ref().and_then(|entry| entry.updated_at),
            incoming.updated_at,
        );

        if !replace {
            return Ok(false);
        }

        let mut entry = incoming;
        entry.sync_state = SyncState::Synced;
        self.store.upsert_entry(entry).await?;
        Ok(true)
    }

    /// Pulls the full remote entry set and merges it into the local
    /// store, one record at a time.
    ///
    /// A record whose local write fails is marked `Conflict` (best
    /// effort) and the batch continues with the remaining records; one
    /// bad record never aborts the batch.
    pub async fn sync_entries(&self) -> SyncResult<MergeReport> {
        let remote_entries = self.remote.fetch_entries().await.map_err(SyncError::from)?;

        let mut report = MergeReport {
            fetched: remote_entries.len(),
            ..MergeReport::default()
        };

        for incoming in remote_entries {
            let id = incoming.id.clone();
            match self.apply_remote_entry(incoming).await {
                Ok(true) => report.replaced += 1,
                Ok(false) => report.skipped += 1,
                Err(error) => {
                    warn!(entry_id = %id, %error, "merge failed, marking conflict");
                    if let Err(error) = self.update_entry_sync_state(&id, SyncState::Conflict).await
                    {
                        warn!(entry_id = %id, %error, "could not mark conflict");
                    }
                    report.conflicts.push(id);
                }
            }
        }

        Ok(report)
    }
}
