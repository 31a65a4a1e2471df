//! # Tracket Sync Engine
//!
//! Entry synchronization engine for Tracket.
//!
//! This crate provides:
//! - Error classification (transient vs permanent)
//! - Retry policy with exponential backoff
//! - Last-writer-wins conflict resolution
//! - Sync repository with pull-then-merge batching
//! - Per-record sync tasks with tri-state outcomes
//! - A long-lived sync manager over pending-record streams
//!
//! ## Architecture
//!
//! The engine reconciles a durable local store with a remote service
//! under unreliable connectivity:
//!
//! 1. The manager subscribes to snapshots of pending local records and
//!    hands each record to an external scheduler as an individual sync
//!    job.
//! 2. Sync tasks push one record each and acknowledge the result in the
//!    local store, returning Success / transient / permanent verdicts
//!    the scheduler uses for infrastructure-level retry.
//! 3. The periodic batch sync pulls the full remote set and merges it by
//!    recency, one record at a time.
//!
//! ## Key Invariants
//!
//! - Failures never escape the repository boundary untyped
//! - Transient failures re-attempt quietly; permanent failures land in
//!   an observable `Failed` or `Conflict` record state
//! - One bad record never aborts a batch merge
//! - Local-store writes are bounded by a global concurrency gate, and
//!   per-record merges are exclusive per identifier

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod classify;
mod config;
mod error;
mod locks;
mod manager;
mod repo;
mod resolve;
mod retry;
mod scheduler;
mod tasks;

pub use classify::{Classifier, CompositeClassifier, StorageClassifier, TransportClassifier};
pub use config::{RetryConfig, SyncConfig};
pub use error::{ErrorKind, SyncError, SyncOutcome, SyncResult};
pub use locks::{IdLocks, IdLockGuard, StoreGate, StorePermit};
pub use manager::SyncManager;
pub use repo::{MergeReport, SyncRepository};
pub use resolve::{newer_wins, should_replace_done_entry, should_replace_entry};
pub use retry::RetryPolicy;
pub use scheduler::{RecordingScheduler, ScheduleError, SyncJob, SyncScheduler};
pub use tasks::{DeletedEntrySyncTask, DoneEntrySyncTask, EntrySyncTask};
