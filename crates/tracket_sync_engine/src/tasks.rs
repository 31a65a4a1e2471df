//! Per-record sync tasks.
//!
//! Each task moves one record through push → acknowledge and translates
//! repository results into a [`SyncOutcome`]. A transient push failure
//! leaves all state untouched so the record is re-attempted on the next
//! cycle; a permanent push failure marks the record `Failed`.
//!
//! If the acknowledge step itself fails, its own classification wins
//! when transient (the overall verdict becomes retriable regardless of
//! the push result); a permanent acknowledge failure falls back to the
//! push verdict.

use crate::classify::{Classifier, CompositeClassifier};
use crate::error::{ErrorKind, SyncOutcome, SyncResult};
use crate::repo::SyncRepository;
use std::sync::Arc;
use tracing::debug;
use tracket_model::{DoneKey, Entry, SyncState};
use tracket_remote::RemoteApi;
use tracket_store::EntryStore;

/// Combines the push verdict with the result of the acknowledge step.
fn resolve_ack(
    classifier: &CompositeClassifier,
    ack: SyncResult<()>,
    push_outcome: SyncOutcome,
) -> SyncOutcome {
    match ack {
        Ok(()) => push_outcome,
        Err(error) => match classifier.classify(&error) {
            ErrorKind::Transient => SyncOutcome::transient(),
            ErrorKind::Permanent => push_outcome,
        },
    }
}

/// Syncs one pending entry.
pub struct EntrySyncTask<S, R> {
    repo: Arc<SyncRepository<S, R>>,
    classifier: CompositeClassifier,
}

impl<S: EntryStore, R: RemoteApi> EntrySyncTask<S, R> {
    /// Creates the task over the given repository.
    pub fn new(repo: Arc<SyncRepository<S, R>>) -> Self {
        Self {
            repo,
            classifier: CompositeClassifier::new(),
        }
    }

    /// Pushes the given entry and acknowledges the result locally.
    pub async fn run(&self, entry: &Entry) -> SyncOutcome {
        match self.repo.push_entry(entry).await {
            Ok(()) => {
                debug!(entry_id = %entry.id, "entry pushed");
                let ack = self
                    .repo
                    .update_entry_sync_state(&entry.id, SyncState::Synced)
                    .await;
                resolve_ack(&self.classifier, ack, SyncOutcome::Success)
            }
            Err(error) => match self.classifier.classify(&error) {
                ErrorKind::Transient => SyncOutcome::transient(),
                ErrorKind::Permanent => {
                    let ack = self
                        .repo
                        .update_entry_sync_state(&entry.id, SyncState::Failed)
                        .await;
                    resolve_ack(&self.classifier, ack, SyncOutcome::permanent())
                }
            },
        }
    }
}

/// Syncs one pending completion record.
pub struct DoneEntrySyncTask<S, R> {
    repo: Arc<SyncRepository<S, R>>,
    classifier: CompositeClassifier,
}

impl<S: EntryStore, R: RemoteApi> DoneEntrySyncTask<S, R> {
    /// Creates the task over the given repository.
    pub fn new(repo: Arc<SyncRepository<S, R>>) -> Self {
        Self {
            repo,
            classifier: CompositeClassifier::new(),
        }
    }

    /// Fetches the completion record, pushes it, and acknowledges.
    ///
    /// A record that is gone or no longer pending yields `Success`: the
    /// pending snapshot can lag a concurrent acknowledgment, and
    /// repeating a no-op must not alarm the scheduler.
    pub async fn run(&self, key: &DoneKey) -> SyncOutcome {
        let done = match self.repo.get_done_entry(key).await {
            Ok(Some(done)) => done,
            Ok(None) => return SyncOutcome::Success,
            Err(error) => return SyncOutcome::Error(self.classifier.classify(&error)),
        };

        if !done.sync_state.is_pending() {
            return SyncOutcome::Success;
        }

        match self.repo.push_done_entry(&done).await {
            Ok(()) => {
                debug!(entry_id = %key.entry_id, done_on = %key.done_on, "done entry pushed");
                let ack = self
                    .repo
                    .update_done_entry_sync_state(key, SyncState::Synced)
                    .await;
                resolve_ack(&self.classifier, ack, SyncOutcome::Success)
            }
            Err(error) => match self.classifier.classify(&error) {
                ErrorKind::Transient => SyncOutcome::transient(),
                ErrorKind::Permanent => {
                    let ack = self
                        .repo
                        .update_done_entry_sync_state(key, SyncState::Failed)
                        .await;
                    resolve_ack(&self.classifier, ack, SyncOutcome::permanent())
                }
            },
        }
    }
}

/// Propagates one pending deletion.
pub struct DeletedEntrySyncTask<S, R> {
    repo: Arc<SyncRepository<S, R>>,
    classifier: CompositeClassifier,
}

impl<S: EntryStore, R: RemoteApi> DeletedEntrySyncTask<S, R> {
    /// Creates the task over the given repository.
    pub fn new(repo: Arc<SyncRepository<S, R>>) -> Self {
        Self {
            repo,
            classifier: CompositeClassifier::new(),
        }
    }

    /// Fetches the tombstone, pushes the deletion, and acknowledges.
    ///
    /// Tombstone removal after remote acknowledgment belongs to the
    /// store's owner, not to this task.
    pub async fn run(&self, entry_id: &str) -> SyncOutcome {
        let tombstone = match self.repo.get_deleted_entry(entry_id).await {
            Ok(Some(tombstone)) => tombstone,
            Ok(None) => return SyncOutcome::Success,
            Err(error) => return SyncOutcome::Error(self.classifier.classify(&error)),
        };

        if !tombstone.sync_state.is_pending() {
            return SyncOutcome::Success;
        }

        match self.repo.push_deleted_entry(&tombstone).await {
            Ok(()) => {
                debug!(entry_id, "deletion pushed");
                let ack = self
                    .repo
                    .update_deleted_entry_sync_state(entry_id, SyncState::Synced)
                    .await;
                resolve_ack(&self.classifier, ack, SyncOutcome::Success)
            }
            Err(error) => match self.classifier.classify(&error) {
                ErrorKind::Transient => SyncOutcome::transient(),
                ErrorKind::Permanent => {
                    let ack = self
                        .repo
                        .update_deleted_entry_sync_state(entry_id, SyncState::Failed)
                        .await;
                    resolve_ack(&self.classifier, ack, SyncOutcome::permanent())
                }
            },
        }
    }
}
