//! Per-occurrence completion records.

use crate::state::SyncState;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Composite key for a completion record: which entry, on which day.
///
/// Recurring entries need an independent completion record per occurrence,
/// so the calendar date is part of the identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DoneKey {
    /// Identifier of the completed entry.
    pub entry_id: String,
    /// The calendar date the occurrence was completed for.
    pub done_on: NaiveDate,
}

impl DoneKey {
    /// Creates a new key.
    pub fn new(entry_id: impl Into<String>, done_on: NaiveDate) -> Self {
        Self {
            entry_id: entry_id.into(),
            done_on,
        }
    }
}

/// A record that an entry occurrence was completed on a calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoneEntry {
    /// Identifier of the completed entry.
    pub entry_id: String,
    /// The calendar date the occurrence was completed for.
    pub done_on: NaiveDate,
    /// The instant the completion was recorded; `None` for records that
    /// arrived without one.
    pub done_at: Option<DateTime<Utc>>,
    /// Whether the remote side has confirmed this completion.
    pub confirmed: bool,
    /// Synchronization state.
    pub sync_state: SyncState,
}

impl DoneEntry {
    /// Creates a completion record stamped with the current instant.
    pub fn new(entry_id: impl Into<String>, done_on: NaiveDate) -> Self {
        Self {
            entry_id: entry_id.into(),
            done_on,
            done_at: Some(Utc::now()),
            confirmed: false,
            sync_state: SyncState::Pending,
        }
    }

    /// Returns the composite key of this record.
    pub fn key(&self) -> DoneKey {
        DoneKey {
            entry_id: self.entry_id.clone(),
            done_on: self.done_on,
        }
    }
}
