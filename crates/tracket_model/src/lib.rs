//! # Tracket Model
//!
//! Domain records for the Tracket task/habit tracker.
//!
//! This crate provides:
//! - `Entry` for one-shot tasks and recurring habits
//! - `DoneEntry` for per-occurrence completion records
//! - `DeletedEntry` tombstones for deletion propagation
//! - `SyncState` attached to every locally-mutated record
//!
//! This is a pure data crate with no I/O operations.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod done;
mod entry;
mod state;
mod tombstone;

pub use done::{DoneEntry, DoneKey};
pub use entry::{Entry, Recurrence, Schedule};
pub use state::SyncState;
pub use tombstone::DeletedEntry;
