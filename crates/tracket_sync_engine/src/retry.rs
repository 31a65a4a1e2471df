//! Retry policy with exponential backoff.

use crate::config::RetryConfig;
use crate::error::ErrorKind;
use std::time::Duration;

/// Decides whether a failed operation should be retried, suspending the
/// caller for the backoff delay when it should.
///
/// Permanent errors never retry and incur no delay. Transient errors
/// always retry after `min(initial_delay * 2^min(attempt, 30), max_delay)`;
/// there is no attempt cap, the delay just stops growing. This policy
/// governs the manager's subscription recovery loop; per-record push
/// retries happen by re-delivery at the next snapshot or batch cycle.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    /// Creates a policy from the given configuration.
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Returns the delay the policy would apply for an attempt.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.config.delay_for_attempt(attempt)
    }

    /// Decides whether to retry, sleeping the backoff delay first when
    /// the answer is yes.
    ///
    /// Cancelling the caller tears down the pending timer; no delay
    /// survives an abandoned retry.
    pub async fn should_retry(&self, kind: ErrorKind, attempt: u32) -> bool {
        match kind {
            ErrorKind::Permanent => false,
            ErrorKind::Transient => {
                tokio::time::sleep(self.delay_for_attempt(attempt)).await;
                true
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}
