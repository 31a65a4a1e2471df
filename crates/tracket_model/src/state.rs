//! Sync state attached to locally-mutated records.

use serde::{Deserialize, Serialize};

/// The synchronization state of a local record.
///
/// Every record the user can mutate carries a `SyncState`. The sync engine
/// is the only component that moves records out of `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SyncState {
    /// The record has local changes that still need to be pushed.
    Pending,
    /// The record matches the remote copy.
    Synced,
    /// The remote side permanently rejected the record; manual
    /// intervention is required.
    Failed,
    /// The local write lost to a newer remote write during a pull.
    Conflict,
}

impl SyncState {
    /// Returns true if the record still needs a push.
    pub fn is_pending(&self) -> bool {
        matches!(self, SyncState::Pending)
    }

    /// Returns true if the record requires user attention.
    pub fn needs_attention(&self) -> bool {
        matches!(self, SyncState::Failed | SyncState::Conflict)
    }
}

impl Default for SyncState {
    fn default() -> Self {
        SyncState::Pending
    }
}
