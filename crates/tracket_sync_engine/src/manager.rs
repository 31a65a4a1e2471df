//! Long-lived sync coordination.

use crate::classify::{Classifier, CompositeClassifier};
use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::repo::SyncRepository;
use crate::retry::RetryPolicy;
use crate::scheduler::{SyncJob, SyncScheduler};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use tracket_model::{DoneEntry, Entry};
use tracket_remote::RemoteApi;
use tracket_store::EntryStore;

/// Long-lived coordinator for the sync engine.
///
/// On start it requests the periodic batch-sync trigger once, then runs
/// one subscription loop per pending-record stream. Every element of an
/// emitted snapshot is handed to the external scheduler as an individual
/// sync job; scheduling failures are logged and never stop the loop.
///
/// A failed subscription is classified: transient failures back off per
/// the retry policy and resubscribe, permanent failures stop that
/// stream's loop without any automatic resubscription.
pub struct SyncManager<S, R, Sch> {
    repo: Arc<SyncRepository<S, R>>,
    scheduler: Arc<Sch>,
    config: SyncConfig,
    classifier: CompositeClassifier,
    retry: RetryPolicy,
    started: AtomicBool,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl<S, R, Sch> SyncManager<S, R, Sch>
where
    S: EntryStore + 'static,
    R: RemoteApi + 'static,
    Sch: SyncScheduler + 'static,
{
    /// Creates a manager over the given repository and scheduler.
    pub fn new(repo: Arc<SyncRepository<S, R>>, scheduler: Arc<Sch>, config: SyncConfig) -> Self {
        let retry = RetryPolicy::new(config.retry.clone());
        Self {
            repo,
            scheduler,
            config,
            classifier: CompositeClassifier::new(),
            retry,
            started: AtomicBool::new(false),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Starts the manager. Calling it again while running is a no-op.
    pub fn start(self: &Arc<Self>) {
        if self.started.swap(true, Ordering::SeqCst) {
            debug!("sync manager already started");
            return;
        }
        info!("sync manager starting");

        if let Err(error) = self
            .scheduler
            .schedule_periodic_sync(self.config.sync_interval)
        {
            warn!(%error, "periodic batch sync not scheduled");
        }

        let mut tasks = self.tasks.lock();
        tasks.push(tokio::spawn(Arc::clone(self).subscription_loop(
            "pending entries",
            |repo| repo.pending_entries(),
            |entry: &Entry| SyncJob::Entry(entry.clone()),
        )));
        tasks.push(tokio::spawn(Arc::clone(self).subscription_loop(
            "pending deletions",
            |repo| repo.pending_deleted_ids(),
            |entry_id: &String| SyncJob::DeletedEntry(entry_id.clone()),
        )));
        tasks.push(tokio::spawn(Arc::clone(self).subscription_loop(
            "pending done entries",
            |repo| repo.pending_done_entries(),
            |done: &DoneEntry| SyncJob::DoneEntry(done.key()),
        )));
    }

    /// Stops the subscription loops. The manager can be started again.
    pub fn stop(&self) {
        let mut tasks = self.tasks.lock();
        if !tasks.is_empty() {
            info!("sync manager stopping");
            for task in tasks.drain(..) {
                task.abort();
            }
        }
        self.started.store(false, Ordering::SeqCst);
    }

    /// Runs one stream's subscribe-dispatch-recover loop.
    async fn subscription_loop<T, Sub, ToJob>(
        self: Arc<Self>,
        stream: &'static str,
        subscribe: Sub,
        to_job: ToJob,
    ) where
        T: Clone + PartialEq + Send + Sync + 'static,
        Sub: Fn(&SyncRepository<S, R>) -> SyncResult<watch::Receiver<Vec<T>>> + Send + 'static,
        ToJob: Fn(&T) -> SyncJob + Send + Sync + 'static,
    {
        let mut attempt: u32 = 0;
        debug!(stream, "subscription loop started");

        loop {
            let error = match subscribe(&self.repo) {
                Ok(rx) => {
                    attempt = 0;
                    self.drain_snapshots(stream, rx, &to_job).await
                }
                Err(error) => error,
            };

            let kind = self.classifier.classify(&error);
            warn!(stream, %error, ?kind, "subscription interrupted");

            if self.retry.should_retry(kind, attempt).await {
                attempt = attempt.saturating_add(1);
            } else {
                warn!(stream, "subscription stopped, no automatic resubscription");
                return;
            }
        }
    }

    /// Dispatches snapshots until the stream closes.
    ///
    /// Consecutive identical snapshots are no-ops; delivery is the
    /// current snapshot, not a queue of deltas.
    async fn drain_snapshots<T, ToJob>(
        &self,
        stream: &'static str,
        mut rx: watch::Receiver<Vec<T>>,
        to_job: &ToJob,
    ) -> SyncError
    where
        T: Clone + PartialEq,
        ToJob: Fn(&T) -> SyncJob,
    {
        let mut last: Option<Vec<T>> = None;

        loop {
            let snapshot = rx.borrow_and_update().clone();
            if last.as_ref() == Some(&snapshot) {
                debug!(stream, "identical snapshot skipped");
            } else {
                for element in &snapshot {
                    let job = to_job(element);
                    let entry_id = job.entry_id().to_string();
                    if let Err(error) = self.scheduler.schedule(job) {
                        warn!(stream, entry_id, %error, "record sync not scheduled");
                    }
                }
                if !snapshot.is_empty() {
                    debug!(stream, count = snapshot.len(), "snapshot dispatched");
                }
                last = Some(snapshot);
            }

            if rx.changed().await.is_err() {
                return SyncError::SubscriptionClosed { stream };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::RecordingScheduler;
    use std::time::Duration;
    use tracket_model::DeletedEntry;
    use tracket_remote::MockRemote;
    use tracket_store::{MemoryStore, StoreError};

    struct Fixture {
        store: Arc<MemoryStore>,
        scheduler: Arc<RecordingScheduler>,
        manager: Arc<SyncManager<MemoryStore, MockRemote, RecordingScheduler>>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let remote = Arc::new(MockRemote::new());
        let scheduler = Arc::new(RecordingScheduler::new());
        let config = SyncConfig::default();
        let repo = Arc::new(SyncRepository::new(
            Arc::clone(&store),
            Arc::clone(&remote),
            &config,
        ));
        let manager = Arc::new(SyncManager::new(
            Arc::clone(&repo),
            Arc::clone(&scheduler),
            config,
        ));
        Fixture {
            store,
            scheduler,
            manager,
        }
    }

    /// Lets the spawned subscription loops catch up.
    async fn settle() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn start_is_idempotent() {
        let f = fixture();
        f.manager.start();
        f.manager.start();
        settle().await;

        // The periodic trigger was requested exactly once.
        assert_eq!(
            f.scheduler.periodic_interval(),
            Some(Duration::from_secs(15 * 60))
        );
        // Only the three subscription loops exist.
        assert_eq!(f.manager.tasks.lock().len(), 3);

        f.manager.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn pending_entry_is_dispatched() {
        let f = fixture();
        f.manager.start();
        settle().await;

        let entry = Entry::task("dispatch me");
        f.store.upsert_entry(entry.clone()).await.unwrap();
        settle().await;

        let jobs = f.scheduler.jobs();
        assert_eq!(jobs, vec![SyncJob::Entry(entry)]);

        f.manager.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn identical_snapshot_is_not_redispatched() {
        let f = fixture();
        f.manager.start();
        settle().await;

        let pending = Entry::task("stay pending");
        f.store.upsert_entry(pending.clone()).await.unwrap();
        settle().await;
        assert_eq!(f.scheduler.jobs().len(), 1);

        // A write that does not change the pending set republishes an
        // identical snapshot; the manager must treat it as a no-op.
        let mut synced = Entry::task("zz already synced");
        synced.sync_state = tracket_model::SyncState::Synced;
        f.store.upsert_entry(synced).await.unwrap();
        settle().await;

        assert_eq!(f.scheduler.jobs().len(), 1);

        f.manager.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn deletion_and_done_streams_are_dispatched() {
        let f = fixture();
        f.manager.start();
        settle().await;

        f.store
            .put_deleted_entry(DeletedEntry::new("gone-1"))
            .await
            .unwrap();
        let done = tracket_model::DoneEntry::new(
            "habit-1",
            chrono::NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
        );
        f.store.upsert_done_entry(done.clone()).await.unwrap();
        settle().await;

        let jobs = f.scheduler.jobs();
        assert!(jobs.contains(&SyncJob::DeletedEntry("gone-1".into())));
        assert!(jobs.contains(&SyncJob::DoneEntry(done.key())));

        f.manager.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn schedule_failure_does_not_stop_the_loop() {
        let f = fixture();
        f.scheduler.reject_jobs_for("doomed");
        f.manager.start();
        settle().await;

        let mut doomed = Entry::task("rejected");
        doomed.id = "doomed".into();
        let fine = Entry::task("accepted");

        f.store.upsert_entry(doomed).await.unwrap();
        f.store.upsert_entry(fine.clone()).await.unwrap();
        settle().await;

        // The rejected job is dropped, the rest of the snapshot and
        // later snapshots still flow.
        let jobs = f.scheduler.jobs();
        assert!(jobs.iter().all(|j| j.entry_id() != "doomed"));
        assert!(jobs.contains(&SyncJob::Entry(fine)));

        f.manager.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn transient_subscribe_failure_backs_off_and_recovers() {
        let f = fixture();
        // All three loops hit a transient failure on first subscribe.
        for _ in 0..3 {
            f.store.inject_subscribe_error(StoreError::Timeout);
        }
        f.manager.start();
        settle().await;

        // Nothing is subscribed yet; the loops are sleeping out the
        // first backoff (2 s).
        let entry = Entry::task("after recovery");
        f.store.upsert_entry(entry.clone()).await.unwrap();
        assert!(f.scheduler.jobs().is_empty());

        tokio::time::sleep(Duration::from_secs(3)).await;
        settle().await;

        assert_eq!(f.scheduler.jobs(), vec![SyncJob::Entry(entry)]);

        f.manager.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn permanent_subscribe_failure_stops_the_loop() {
        let f = fixture();
        for _ in 0..3 {
            f.store
                .inject_subscribe_error(StoreError::Corrupted("bad page".into()));
        }
        f.manager.start();
        settle().await;

        // Even long after the failure, nothing resubscribes.
        tokio::time::sleep(Duration::from_secs(600)).await;
        f.store.upsert_entry(Entry::task("unseen")).await.unwrap();
        settle().await;

        assert!(f.scheduler.jobs().is_empty());

        f.manager.stop();
    }
}
