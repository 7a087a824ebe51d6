//! Submission counters for operators.
//!
//! The log fallback reports success to the submitter even when nothing reached
//! the spreadsheet. These counters are how an operator notices that happening.

use crate::domain::storage::StoreError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Metrics tracking submission outcomes.
///
/// Cloning is cheap and all clones share the same counters.
#[derive(Debug, Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

#[derive(Debug, Default)]
struct MetricsInner {
    accepted: AtomicU64,
    rejected: AtomicU64,
    throttled: AtomicU64,
    /// Records routed to the log because credentials were missing or unusable
    fallback_configuration: AtomicU64,
    /// Records routed to the log because the remote write failed
    fallback_remote: AtomicU64,
    /// Limiter state access failed and the attempt was let through
    limiter_fail_open: AtomicU64,
}

impl Metrics {
    /// Create a new metrics tracker.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner::default()),
        }
    }

    pub(crate) fn record_accepted(&self) {
        self.inner.accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejected(&self) {
        self.inner.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_throttled(&self) {
        self.inner.throttled.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_fallback(&self, cause: &StoreError) {
        let counter = match cause {
            StoreError::Configuration(_) => &self.inner.fallback_configuration,
            StoreError::Remote(_) => &self.inner.fallback_remote,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_limiter_fail_open(&self) {
        self.inner.limiter_fail_open.fetch_add(1, Ordering::Relaxed);
    }

    pub fn accepted(&self) -> u64 {
        self.inner.accepted.load(Ordering::Relaxed)
    }

    pub fn rejected(&self) -> u64 {
        self.inner.rejected.load(Ordering::Relaxed)
    }

    pub fn throttled(&self) -> u64 {
        self.inner.throttled.load(Ordering::Relaxed)
    }

    pub fn fallback_configuration(&self) -> u64 {
        self.inner.fallback_configuration.load(Ordering::Relaxed)
    }

    pub fn fallback_remote(&self) -> u64 {
        self.inner.fallback_remote.load(Ordering::Relaxed)
    }

    pub fn limiter_fail_open(&self) -> u64 {
        self.inner.limiter_fail_open.load(Ordering::Relaxed)
    }

    /// Get a snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            accepted: self.accepted(),
            rejected: self.rejected(),
            throttled: self.throttled(),
            fallback_configuration: self.fallback_configuration(),
            fallback_remote: self.fallback_remote(),
            limiter_fail_open: self.limiter_fail_open(),
        }
    }

    /// Reset all metrics to zero.
    pub fn reset(&self) {
        for counter in [
            &self.inner.accepted,
            &self.inner.rejected,
            &self.inner.throttled,
            &self.inner.fallback_configuration,
            &self.inner.fallback_remote,
            &self.inner.limiter_fail_open,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time snapshot of metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub accepted: u64,
    pub rejected: u64,
    pub throttled: u64,
    pub fallback_configuration: u64,
    pub fallback_remote: u64,
    pub limiter_fail_open: u64,
}

impl MetricsSnapshot {
    /// Total records that went to the log instead of the spreadsheet.
    pub fn fallback_total(&self) -> u64 {
        self.fallback_configuration
            .saturating_add(self.fallback_remote)
    }

    /// Share of accepted submissions that were only logged (0.0 to 1.0).
    ///
    /// Returns 0.0 if nothing has been accepted. Anything above zero means the
    /// spreadsheet is missing leads.
    pub fn fallback_rate(&self) -> f64 {
        if self.accepted == 0 {
            0.0
        } else {
            self.fallback_total() as f64 / self.accepted as f64
        }
    }
}
