//! Batch pacing
//!
//! Bounds how much of the input one run covers and spaces out remote calls.

use crate::config::TransferConfig;
use std::ops::Range;
use std::time::Duration;

/// Run window and delays
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacingPolicy {
    /// Successful transfers per batch
    pub batch_size: usize,

    /// Batches per run; `None` runs to the end of the input
    pub batches_per_run: Option<usize>,

    /// Pause after each upload
    pub upload_delay: Duration,

    /// Pause after each folder create
    pub folder_settle_delay: Duration,
}

impl PacingPolicy {
    /// Build from the `[transfer]` section
    pub fn from_config(config: &TransferConfig) -> Self {
        Self {
            batch_size: config.batch_size.max(1),
            batches_per_run: config.batches_per_run,
            upload_delay: Duration::from_millis(config.upload_delay_ms),
            folder_settle_delay: Duration::from_millis(config.folder_settle_delay_ms),
        }
    }

    /// Policy with no delays, running to the end of the input
    pub fn immediate(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
            batches_per_run: None,
            upload_delay: Duration::ZERO,
            folder_settle_delay: Duration::ZERO,
        }
    }

    /// Indices this run covers, starting at `start` out of `total` records
    ///
    /// # Examples
    ///
    /// ```
    /// use ferry::core::transfer::PacingPolicy;
    ///
    /// let mut policy = PacingPolicy::immediate(50);
    /// policy.batches_per_run = Some(2);
    /// assert_eq!(policy.window(10, 1000), 10..110);
    /// assert_eq!(policy.window(950, 1000), 950..1000);
    /// ```
    pub fn window(&self, start: usize, total: usize) -> Range<usize> {
        let start = start.min(total);
        let end = match self.batches_per_run {
            Some(batches) => start
                .saturating_add(self.batch_size.saturating_mul(batches))
                .min(total),
            None => total,
        };
        start..end
    }
}

/// Counts successful transfers and applies the upload delay
#[derive(Debug)]
pub struct BatchPacer {
    policy: PacingPolicy,
    successes: usize,
}

impl BatchPacer {
    pub fn new(policy: PacingPolicy) -> Self {
        Self {
            policy,
            successes: 0,
        }
    }

    pub fn policy(&self) -> &PacingPolicy {
        &self.policy
    }

    /// Count one successful transfer; true when it completes a batch
    pub fn record_success(&mut self) -> bool {
        self.successes += 1;
        self.successes % self.policy.batch_size == 0
    }

    /// Successful transfers so far
    pub fn successes(&self) -> usize {
        self.successes
    }

    /// Completed batches so far
    pub fn batches_completed(&self) -> usize {
        self.successes / self.policy.batch_size
    }

    /// Sleep the configured upload delay
    pub async fn after_upload(&self) {
        if !self.policy.upload_delay.is_zero() {
            tokio::time::sleep(self.policy.upload_delay).await;
        }
    }
}
