//! A mock remote service for testing.

use crate::api::RemoteApi;
use crate::error::{RemoteError, RemoteResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use tracket_model::{DeletedEntry, DoneEntry, Entry};

/// A scripted remote service.
///
/// Calls succeed by default: fetches return the configured entry set and
/// pushes are recorded and acknowledged. Errors can be queued per method
/// and are consumed one call at a time.
#[derive(Default)]
pub struct MockRemote {
    entries: Mutex<Vec<Entry>>,
    fetch_errors: Mutex<VecDeque<RemoteError>>,
    push_entry_errors: Mutex<VecDeque<RemoteError>>,
    push_done_errors: Mutex<VecDeque<RemoteError>>,
    push_deleted_errors: Mutex<VecDeque<RemoteError>>,
    pushed_entries: Mutex<Vec<Entry>>,
    pushed_done: Mutex<Vec<DoneEntry>>,
    pushed_deleted: Mutex<Vec<DeletedEntry>>,
}

impl MockRemote {
    /// Creates a new mock with an empty remote entry set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the entry set returned by `fetch_entries`.
    pub fn set_entries(&self, entries: Vec<Entry>) {
        *self.entries.lock() = entries;
    }

    /// Queues an error for the next `fetch_entries` call.
    pub fn enqueue_fetch_error(&self, error: RemoteError) {
        self.fetch_errors.lock().push_back(error);
    }

    /// Queues an error for the next `push_entry` call.
    pub fn enqueue_push_entry_error(&self, error: RemoteError) {
        self.push_entry_errors.lock().push_back(error);
    }

    /// Queues an error for the next `push_done_entry` call.
    pub fn enqueue_push_done_error(&self, error: RemoteError) {
        self.push_done_errors.lock().push_back(error);
    }

    /// Queues an error for the next `push_deleted_entry` call.
    pub fn enqueue_push_deleted_error(&self, error: RemoteError) {
        self.push_deleted_errors.lock().push_back(error);
    }

    /// Returns every entry successfully pushed so far.
    pub fn pushed_entries(&self) -> Vec<Entry> {
        self.pushed_entries.lock().clone()
    }

    /// Returns every completion record successfully pushed so far.
    pub fn pushed_done_entries(&self) -> Vec<DoneEntry> {
        self.pushed_done.lock().clone()
    }

    /// Returns every deletion successfully pushed so far.
    pub fn pushed_deleted_entries(&self) -> Vec<DeletedEntry> {
        self.pushed_deleted.lock().clone()
    }
}

#[async_trait]
impl RemoteApi for MockRemote {
    async fn fetch_entries(&self) -> RemoteResult<Vec<Entry>> {
        if let Some(error) = self.fetch_errors.lock().pop_front() {
            return Err(error);
        }
        Ok(self.entries.lock().clone())
    }

    async fn push_entry(&self, entry: &Entry) -> RemoteResult<()> {
        if let Some(error) = self.push_entry_errors.lock().pop_front() {
            return Err(error);
        }
        self.pushed_entries.lock().push(entry.clone());
        Ok(())
    }

    async fn push_done_entry(&self, done: &DoneEntry) -> RemoteResult<()> {
        if let Some(error) = self.push_done_errors.lock().pop_front() {
            return Err(error);
        }
        self.pushed_done.lock().push(done.clone());
        Ok(())
    }

    async fn push_deleted_entry(&self, tombstone: &DeletedEntry) -> RemoteResult<()> {
        if let Some(error) = self.push_deleted_errors.lock().pop_front() {
            return Err(error);
        }
        self.pushed_deleted.lock().push(tombstone.clone());
        Ok(())
    }
}
