//! In-memory store for testing and ephemeral use.

use crate::error::{StoreError, StoreResult};
use crate::store::EntryStore;
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::time::Duration;
use tokio::sync::watch;
use tracket_model::{DeletedEntry, DoneEntry, DoneKey, Entry, SyncState};

/// Phase of a store write, as recorded in the write-event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePhase {
    /// The write was admitted and is about to run.
    Started,
    /// The write completed (successfully or not).
    Finished,
}

/// One entry in the write-event log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteEvent {
    /// Identifier of the record being written (entry id for all record
    /// kinds).
    pub entry_id: String,
    /// Which phase was observed.
    pub phase: WritePhase,
}

#[derive(Default)]
struct Tables {
    entries: BTreeMap<String, Entry>,
    done: BTreeMap<DoneKey, DoneEntry>,
    deleted: BTreeMap<String, DeletedEntry>,
}

impl Tables {
    fn pending_entries(&self) -> Vec<Entry> {
        self.entries
            .values()
            .filter(|e| e.sync_state.is_pending())
            .cloned()
            .collect()
    }

    fn pending_deleted_ids(&self) -> Vec<String> {
        self.deleted
            .values()
            .filter(|d| d.sync_state.is_pending())
            .map(|d| d.entry_id.clone())
            .collect()
    }

    fn pending_done(&self) -> Vec<DoneEntry> {
        self.done
            .values()
            .filter(|d| d.sync_state.is_pending())
            .cloned()
            .collect()
    }
}

/// An in-memory entry store.
///
/// Stores all records in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral trackers that don't need persistence
///
/// Pending snapshots are recomputed and published through watch channels
/// after every successful write, ordered by key.
///
/// # Test instrumentation
///
/// The store can inject one-shot failures per operation family
/// ([`inject_read_error`](Self::inject_read_error),
/// [`inject_write_error`](Self::inject_write_error),
/// [`inject_subscribe_error`](Self::inject_subscribe_error),
/// [`fail_next_write_for`](Self::fail_next_write_for)), add an artificial
/// delay to every write, and log write phases per record so tests can
/// assert that a concurrency gate kept writes from overlapping.
pub struct MemoryStore {
    state: RwLock<Tables>,
    pending_entries_tx: watch::Sender<Vec<Entry>>,
    pending_deleted_tx: watch::Sender<Vec<String>>,
    pending_done_tx: watch::Sender<Vec<DoneEntry>>,
    read_faults: Mutex<VecDeque<StoreError>>,
    write_faults: Mutex<VecDeque<StoreError>>,
    subscribe_faults: Mutex<VecDeque<StoreError>>,
    keyed_write_faults: Mutex<HashMap<String, StoreError>>,
    write_delay: Mutex<Option<Duration>>,
    write_events: Mutex<Vec<WriteEvent>>,
}

impl MemoryStore {
    /// Creates a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        let (pending_entries_tx, _) = watch::channel(Vec::new());
        let (pending_deleted_tx, _) = watch::channel(Vec::new());
        let (pending_done_tx, _) = watch::channel(Vec::new());

        Self {
            state: RwLock::new(Tables::default()),
            pending_entries_tx,
            pending_deleted_tx,
            pending_done_tx,
            read_faults: Mutex::new(VecDeque::new()),
            write_faults: Mutex::new(VecDeque::new()),
            subscribe_faults: Mutex::new(VecDeque::new()),
            keyed_write_faults: Mutex::new(HashMap::new()),
            write_delay: Mutex::new(None),
            write_events: Mutex::new(Vec::new()),
        }
    }

    /// Queues an error returned by the next read operation.
    pub fn inject_read_error(&self, error: StoreError) {
        self.read_faults.lock().push_back(error);
    }

    /// Queues an error returned by the next write operation.
    pub fn inject_write_error(&self, error: StoreError) {
        self.write_faults.lock().push_back(error);
    }

    /// Queues an error returned by the next subscription request.
    pub fn inject_subscribe_error(&self, error: StoreError) {
        self.subscribe_faults.lock().push_back(error);
    }

    /// Fails the next write that targets the given entry identifier.
    pub fn fail_next_write_for(&self, entry_id: impl Into<String>, error: StoreError) {
        self.keyed_write_faults.lock().insert(entry_id.into(), error);
    }

    /// Adds an artificial delay to every write. `None` disables it.
    pub fn set_write_delay(&self, delay: Option<Duration>) {
        *self.write_delay.lock() = delay;
    }

    /// Returns the write-event log.
    pub fn write_events(&self) -> Vec<WriteEvent> {
        self.write_events.lock().clone()
    }

    /// Clears the write-event log.
    pub fn clear_write_events(&self) {
        self.write_events.lock().clear();
    }

    fn take_read_fault(&self) -> StoreResult<()> {
        match self.read_faults.lock().pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn take_write_fault(&self, entry_id: &str) -> StoreResult<()> {
        if let Some(error) = self.keyed_write_faults.lock().remove(entry_id) {
            return Err(error);
        }
        match self.write_faults.lock().pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn record_phase(&self, entry_id: &str, phase: WritePhase) {
        self.write_events.lock().push(WriteEvent {
            entry_id: entry_id.to_string(),
            phase,
        });
    }

    fn publish(&self) {
        let state = self.state.read();
        self.pending_entries_tx.send_replace(state.pending_entries());
        self.pending_deleted_tx
            .send_replace(state.pending_deleted_ids());
        self.pending_done_tx.send_replace(state.pending_done());
    }

    /// Runs one guarded write: fault injection, event log, optional
    /// delay, mutation, snapshot publication.
    async fn write<F>(&self, entry_id: &str, mutate: F) -> StoreResult<()>
    where
        F: FnOnce(&mut Tables) -> StoreResult<()>,
    {
        self.take_write_fault(entry_id)?;
        self.record_phase(entry_id, WritePhase::Started);

        let delay = *self.write_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let result = {
            let mut state = self.state.write();
            mutate(&mut state)
        };

        self.record_phase(entry_id, WritePhase::Finished);

        if result.is_ok() {
            self.publish();
        }
        result
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EntryStore for MemoryStore {
    async fn get_entry(&self, id: &str) -> StoreResult<Option<Entry>> {
        self.take_read_fault()?;
        Ok(self.state.read().entries.get(id).cloned())
    }

    async fn get_entries_by_id(&self, ids: &[String]) -> StoreResult<Vec<Entry>> {
        self.take_read_fault()?;
        let state = self.state.read();
        Ok(ids
            .iter()
            .filter_map(|id| state.entries.get(id).cloned())
            .collect())
    }

    async fn upsert_entry(&self, entry: Entry) -> StoreResult<()> {
        let id = entry.id.clone();
        self.write(&id, move |state| {
            state.entries.insert(entry.id.clone(), entry);
            Ok(())
        })
        .await
    }

    async fn get_pending_entries(&self) -> StoreResult<Vec<Entry>> {
        self.take_read_fault()?;
        Ok(self.state.read().pending_entries())
    }

    async fn update_entry_sync_state(&self, id: &str, sync_state: SyncState) -> StoreResult<()> {
        self.write(id, move |state| match state.entries.get_mut(id) {
            Some(entry) => {
                entry.sync_state = sync_state;
                Ok(())
            }
            None => Err(StoreError::not_found("entry", id)),
        })
        .await
    }

    async fn get_done_entry(&self, key: &DoneKey) -> StoreResult<Option<DoneEntry>> {
        self.take_read_fault()?;
        Ok(self.state.read().done.get(key).cloned())
    }

    async fn upsert_done_entry(&self, done: DoneEntry) -> StoreResult<()> {
        let id = done.entry_id.clone();
        self.write(&id, move |state| {
            state.done.insert(done.key(), done);
            Ok(())
        })
        .await
    }

    async fn get_pending_done_entries(&self) -> StoreResult<Vec<DoneEntry>> {
        self.take_read_fault()?;
        Ok(self.state.read().pending_done())
    }

    async fn update_done_entry_sync_state(
        &self,
        key: &DoneKey,
        sync_state: SyncState,
    ) -> StoreResult<()> {
        let entry_id = key.entry_id.clone();
        self.write(&entry_id, move |state| match state.done.get_mut(key) {
            Some(done) => {
                done.sync_state = sync_state;
                Ok(())
            }
            None => Err(StoreError::not_found("done entry", key.entry_id.clone())),
        })
        .await
    }

    async fn get_deleted_entry(&self, entry_id: &str) -> StoreResult<Option<DeletedEntry>> {
        self.take_read_fault()?;
        Ok(self.state.read().deleted.get(entry_id).cloned())
    }

    async fn put_deleted_entry(&self, tombstone: DeletedEntry) -> StoreResult<()> {
        let id = tombstone.entry_id.clone();
        self.write(&id, move |state| {
            state.deleted.insert(tombstone.entry_id.clone(), tombstone);
            Ok(())
        })
        .await
    }

    async fn get_pending_deleted_entries(&self) -> StoreResult<Vec<DeletedEntry>> {
        self.take_read_fault()?;
        Ok(self
            .state
            .read()
            .deleted
            .values()
            .filter(|d| d.sync_state.is_pending())
            .cloned()
            .collect())
    }

    async fn update_deleted_entry_sync_state(
        &self,
        entry_id: &str,
        sync_state: SyncState,
    ) -> StoreResult<()> {
        self.write(entry_id, move |state| {
            match state.deleted.get_mut(entry_id) {
                Some(tombstone) => {
                    tombstone.sync_state = sync_state;
                    Ok(())
                }
                None => Err(StoreError::not_found("deleted entry", entry_id)),
            }
        })
        .await
    }

    async fn remove_deleted_entry(&self, entry_id: &str) -> StoreResult<()> {
        self.write(entry_id, move |state| {
            state.deleted.remove(entry_id);
            Ok(())
        })
        .await
    }

    fn subscribe_pending_entries(&self) -> StoreResult<watch::Receiver<Vec<Entry>>> {
        if let Some(error) = self.subscribe_faults.lock().pop_front() {
            return Err(error);
        }
        Ok(self.pending_entries_tx.subscribe())
    }

    fn subscribe_pending_deleted_ids(&self) -> StoreResult<watch::Receiver<Vec<String>>> {
        if let Some(error) = self.subscribe_faults.lock().pop_front() {
            return Err(error);
        }
        Ok(self.pending_deleted_tx.subscribe())
    }

    fn subscribe_pending_done_entries(&self) -> StoreResult<watch::Receiver<Vec<DoneEntry>>> {
        if let Some(error) = self.subscribe_faults.lock().pop_front() {
            return Err(error);
        }
        Ok(self.pending_done_tx.subscribe())
    }
}
