//! External scheduler seam.
//!
//! The manager never runs record syncs inline; it hands jobs to an
//! external scheduler that owns delivery cadence and infrastructure-level
//! retry (re-enqueue with backoff, give-up) based on the
//! [`SyncOutcome`](crate::SyncOutcome) the tasks return.

use parking_lot::Mutex;
use std::time::Duration;
use thiserror::Error;
use tracket_model::{DoneKey, Entry};

/// One schedulable unit of sync work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncJob {
    /// Sync a pending entry (the record travels with the job).
    Entry(Entry),
    /// Sync a pending completion record.
    DoneEntry(DoneKey),
    /// Propagate a pending deletion.
    DeletedEntry(String),
}

impl SyncJob {
    /// The entry identifier this job concerns.
    pub fn entry_id(&self) -> &str {
        match self {
            SyncJob::Entry(entry) => &entry.id,
            SyncJob::DoneEntry(key) => &key.entry_id,
            SyncJob::DeletedEntry(entry_id) => entry_id,
        }
    }
}

/// A scheduling request was not accepted.
#[derive(Debug, Error)]
#[error("scheduling failed: {0}")]
pub struct ScheduleError(pub String);

/// Accepts sync work on behalf of the manager.
pub trait SyncScheduler: Send + Sync {
    /// Enqueues one record sync for prompt execution.
    fn schedule(&self, job: SyncJob) -> Result<(), ScheduleError>;

    /// Requests that a full batch sync run at the given cadence.
    fn schedule_periodic_sync(&self, every: Duration) -> Result<(), ScheduleError>;
}

/// A scheduler double that records what was requested.
#[derive(Default)]
pub struct RecordingScheduler {
    jobs: Mutex<Vec<SyncJob>>,
    periodic: Mutex<Option<Duration>>,
    rejected_ids: Mutex<Vec<String>>,
}

impl RecordingScheduler {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every job accepted so far, in order.
    pub fn jobs(&self) -> Vec<SyncJob> {
        self.jobs.lock().clone()
    }

    /// The periodic cadence requested, if any.
    pub fn periodic_interval(&self) -> Option<Duration> {
        *self.periodic.lock()
    }

    /// Rejects future jobs for the given entry identifier.
    pub fn reject_jobs_for(&self, entry_id: impl Into<String>) {
        self.rejected_ids.lock().push(entry_id.into());
    }
}

impl SyncScheduler for RecordingScheduler {
    fn schedule(&self, job: SyncJob) -> Result<(), ScheduleError> {
        if self
            .rejected_ids
            .lock()
            .iter()
            .any(|id| id == job.entry_id())
        {
            return Err(ScheduleError(format!(
                "queue rejected job for {}",
                job.entry_id()
            )));
        }
        self.jobs.lock().push(job);
        Ok(())
    }

    fn schedule_periodic_sync(&self, every: Duration) -> Result<(), ScheduleError> {
        *self.periodic.lock() = Some(every);
        Ok(())
    }
}
