//! Configuration for the sync engine.

use std::time::Duration;

/// Configuration for the sync manager and repository.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// How often the periodic batch sync should run.
    pub sync_interval: Duration,
    /// Maximum number of simultaneous local-store writes. One permit
    /// forces strictly sequential writes.
    pub max_concurrent_store_writes: usize,
    /// Retry configuration for the subscription recovery loop.
    pub retry: RetryConfig,
}

impl SyncConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self {
            sync_interval: Duration::from_secs(15 * 60),
            max_concurrent_store_writes: 1,
            retry: RetryConfig::default(),
        }
    }

    /// Sets the periodic batch-sync interval.
    pub fn with_sync_interval(mut self, interval: Duration) -> Self {
        self.sync_interval = interval;
        self
    }

    /// Sets the store write concurrency limit.
    pub fn with_max_concurrent_store_writes(mut self, permits: usize) -> Self {
        self.max_concurrent_store_writes = permits;
        self
    }

    /// Sets the retry configuration.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for retry backoff.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
}

impl RetryConfig {
    /// Creates the default configuration: 2 s initial, 5 min cap.
    pub fn new() -> Self {
        Self {
            initial_delay: Duration::from_millis(2000),
            max_delay: Duration::from_secs(300),
        }
    }

    /// Sets the initial delay.
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the maximum delay.
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Calculates the delay for a given attempt (0-indexed):
    /// `min(initial_delay * 2^min(attempt, 30), max_delay)`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.min(30);
        self.initial_delay.saturating_mul(factor).min(self.max_delay)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::new()
    }
}
