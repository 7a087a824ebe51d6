//! Log fallback for inquiries the spreadsheet could not take.
//!
//! This is a deliberate availability-over-durability choice. A lead that fails
//! to reach the spreadsheet is written in full to the operational log and the
//! submitter is told it was received. Operators must watch for these records
//! (the `thrive_inquiry::fallback` target, or the fallback counters in
//! [`Metrics`]) since nothing else will surface a broken backend.

use crate::application::metrics::Metrics;
use crate::domain::inquiry::InquiryInput;
use crate::domain::storage::{StorageResult, StoreError};

/// Log target for fallback records.
pub const FALLBACK_TARGET: &str = "thrive_inquiry::fallback";

/// Writes inquiries to the operational log.
#[derive(Debug, Clone, Default)]
pub struct LogFallback {
    metrics: Metrics,
}

impl LogFallback {
    pub fn new(metrics: Metrics) -> Self {
        Self { metrics }
    }

    /// Log the full record and report it as accepted.
    ///
    /// Configuration failures are logged at ERROR since they will not resolve
    /// without an operator. Remote failures are logged at WARN.
    pub fn record(&self, inquiry: &InquiryInput, cause: &StoreError) -> StorageResult {
        let submitted_at = inquiry.submitted_at().to_rfc3339();
        match cause {
            StoreError::Configuration(_) => tracing::error!(
                target: FALLBACK_TARGET,
                kind = cause.kind(),
                error = %cause,
                submitted_at = %submitted_at,
                name = inquiry.name(),
                email = inquiry.email(),
                phone = inquiry.phone(),
                goals = inquiry.goals(),
                notes = inquiry.notes(),
                user_agent = inquiry.user_agent(),
                "inquiry saved to log: spreadsheet storage not configured"
            ),
            StoreError::Remote(_) => tracing::warn!(
                target: FALLBACK_TARGET,
                kind = cause.kind(),
                error = %cause,
                submitted_at = %submitted_at,
                name = inquiry.name(),
                email = inquiry.email(),
                phone = inquiry.phone(),
                goals = inquiry.goals(),
                notes = inquiry.notes(),
                user_agent = inquiry.user_agent(),
                "inquiry saved to log: spreadsheet write failed"
            ),
        }
        self.metrics.record_fallback(cause);
        StorageResult::fallback()
    }
}
