//! Store trait definition.

use crate::error::StoreResult;
use async_trait::async_trait;
use tokio::sync::watch;
use tracket_model::{DeletedEntry, DoneEntry, DoneKey, Entry, SyncState};

/// A durable, identifier-indexed store for tracker records.
///
/// Implementations persist entries, completion records, and deletion
/// tombstones, and support point reads/writes under bounded concurrent
/// access. The sync engine never talks to storage machinery directly;
/// everything goes through this trait.
///
/// # Invariants
///
/// - `upsert_*` replaces the whole record for the key
/// - `update_*_sync_state` mutates only the record's sync state
/// - pending subscriptions deliver the *current snapshot* of pending
///   records after every change, not a queue of deltas; consumers diff if
///   they need delta semantics
/// - snapshots are ordered by key, so equal contents compare equal
///
/// # Implementors
///
/// - [`super::MemoryStore`] - in-memory, for tests and ephemeral use
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Reads an entry by identifier.
    async fn get_entry(&self, id: &str) -> StoreResult<Option<Entry>>;

    /// Reads the entries for the given identifiers, skipping missing ones.
    async fn get_entries_by_id(&self, ids: &[String]) -> StoreResult<Vec<Entry>>;

    /// Inserts or replaces an entry.
    async fn upsert_entry(&self, entry: Entry) -> StoreResult<()>;

    /// Returns all entries whose sync state is `Pending`.
    async fn get_pending_entries(&self) -> StoreResult<Vec<Entry>>;

    /// Updates the sync state of an entry.
    async fn update_entry_sync_state(&self, id: &str, state: SyncState) -> StoreResult<()>;

    /// Reads a completion record by key.
    async fn get_done_entry(&self, key: &DoneKey) -> StoreResult<Option<DoneEntry>>;

    /// Inserts or replaces a completion record.
    async fn upsert_done_entry(&self, done: DoneEntry) -> StoreResult<()>;

    /// Returns all completion records whose sync state is `Pending`.
    async fn get_pending_done_entries(&self) -> StoreResult<Vec<DoneEntry>>;

    /// Updates the sync state of a completion record.
    async fn update_done_entry_sync_state(
        &self,
        key: &DoneKey,
        state: SyncState,
    ) -> StoreResult<()>;

    /// Reads a deletion tombstone by entry identifier.
    async fn get_deleted_entry(&self, entry_id: &str) -> StoreResult<Option<DeletedEntry>>;

    /// Inserts or replaces a deletion tombstone.
    async fn put_deleted_entry(&self, tombstone: DeletedEntry) -> StoreResult<()>;

    /// Returns all tombstones whose sync state is `Pending`.
    async fn get_pending_deleted_entries(&self) -> StoreResult<Vec<DeletedEntry>>;

    /// Updates the sync state of a deletion tombstone.
    async fn update_deleted_entry_sync_state(
        &self,
        entry_id: &str,
        state: SyncState,
    ) -> StoreResult<()>;

    /// Removes a tombstone after the deletion was acknowledged remotely.
    async fn remove_deleted_entry(&self, entry_id: &str) -> StoreResult<()>;

    /// Subscribes to snapshots of pending entries.
    fn subscribe_pending_entries(&self) -> StoreResult<watch::Receiver<Vec<Entry>>>;

    /// Subscribes to snapshots of pending deleted-entry identifiers.
    fn subscribe_pending_deleted_ids(&self) -> StoreResult<watch::Receiver<Vec<String>>>;

    /// Subscribes to snapshots of pending completion records.
    fn subscribe_pending_done_entries(&self) -> StoreResult<watch::Receiver<Vec<DoneEntry>>>;
}
