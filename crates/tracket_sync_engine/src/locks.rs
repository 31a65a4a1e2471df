//! Concurrency protection for the local store.
//!
//! Two mechanisms guard store access during merges:
//!
//! - [`StoreGate`] bounds how many store writes run at once, system-wide.
//! - [`IdLocks`] gives exclusive access per record identifier, so a user
//!   edit and an incoming merge for the same record cannot interleave.
//!
//! Both release on every exit path via RAII guards.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{OwnedMutexGuard, OwnedSemaphorePermit, Semaphore};

/// A counting gate bounding simultaneous local-store writes.
///
/// The underlying semaphore is FIFO-fair: with a single permit,
/// same-time-submitted writes run to completion in acquisition order,
/// one at a time.
#[derive(Debug)]
pub struct StoreGate {
    permits: Arc<Semaphore>,
}

impl StoreGate {
    /// Creates a gate with the given permit count (at least one).
    pub fn new(max_permits: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_permits.max(1))),
        }
    }

    /// Acquires one permit, waiting if the gate is full.
    pub async fn acquire(&self) -> StorePermit {
        // The semaphore is owned by the gate and never closed.
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .expect("store gate semaphore is never closed");
        StorePermit { _permit: permit }
    }

    /// Number of permits currently available.
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }
}

/// RAII permit for one gated store write.
#[derive(Debug)]
pub struct StorePermit {
    _permit: OwnedSemaphorePermit,
}

/// Per-identifier exclusive locks, created on demand.
///
/// A lock entry exists only while some holder or waiter references it;
/// the guard's drop evicts unreferenced entries, so the map is bounded
/// by the number of records with in-flight operations.
#[derive(Debug, Default)]
pub struct IdLocks {
    inner: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl IdLocks {
    /// Creates an empty lock map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the given identifier, waiting if another operation holds it.
    pub async fn lock(&self, id: &str) -> IdLockGuard<'_> {
        let mutex = {
            let mut map = self.inner.lock();
            Arc::clone(
                map.entry(id.to_string())
                    .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))),
            )
        };
        let guard = mutex.lock_owned().await;
        IdLockGuard {
            locks: self,
            id: id.to_string(),
            guard: Some(guard),
        }
    }

    /// Number of identifiers with a live lock entry.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns true if no identifier is locked or awaited.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    fn release(&self, id: &str) {
        let mut map = self.inner.lock();
        if let Some(mutex) = map.get(id) {
            // Only the map itself still references the mutex: no holder,
            // no waiter. Safe to evict.
            if Arc::strong_count(mutex) == 1 {
                map.remove(id);
            }
        }
    }
}

/// RAII guard for one identifier's exclusive lock.
#[derive(Debug)]
pub struct IdLockGuard<'a> {
    locks: &'a IdLocks,
    id: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for IdLockGuard<'_> {
    fn drop(&mut self) {
        // Release the mutex before checking for eviction; the owned
        // guard keeps an Arc alive until this point.
        self.guard.take();
        self.locks.release(&self.id);
    }
}
