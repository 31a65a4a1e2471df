//! Deletion tombstones.

use crate::state::SyncState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tombstone marking an entry as deleted, pending remote propagation.
///
/// Entries are not physically removed until the remote side acknowledges
/// the deletion; the tombstone carries the sync state in the meantime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedEntry {
    /// Identifier of the deleted entry.
    pub entry_id: String,
    /// The instant the entry was deleted locally.
    pub deleted_at: DateTime<Utc>,
    /// Synchronization state.
    pub sync_state: SyncState,
}

impl DeletedEntry {
    /// Creates a tombstone stamped with the current instant.
    pub fn new(entry_id: impl Into<String>) -> Self {
        Self {
            entry_id: entry_id.into(),
            deleted_at: Utc::now(),
            sync_state: SyncState::Pending,
        }
    }
}
