//! Submission orchestration: throttle, validate, persist, report.

use crate::application::limiter::{LimitDecision, SubmissionLimiter};
use crate::application::metrics::Metrics;
use crate::application::ports::{InquiryStore, Storage};
use crate::application::registry::SessionState;
use crate::domain::inquiry::{InquiryInput, SessionId};
use crate::domain::validation::validate;
use std::sync::Arc;
use std::time::Duration;

/// Notice shown after an accepted submission.
pub const ACCEPTED_NOTICE: &str = "Inquiry received. Thank you! We'll be in touch shortly.";

/// Notice shown when a session submits again too quickly.
pub const THROTTLED_NOTICE: &str = "Please wait a few seconds before submitting again.";

/// What the submitter is told.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The inquiry was recorded (possibly only in the operational log)
    Accepted,
    /// The inquiry was refused; the reason is shown inline
    Rejected(String),
    /// The session must wait before submitting again
    Throttled { retry_after: Duration },
}

impl Outcome {
    /// User-facing text for the presentation layer.
    pub fn notice(&self) -> &str {
        match self {
            Outcome::Accepted => ACCEPTED_NOTICE,
            Outcome::Rejected(reason) => reason,
            Outcome::Throttled { .. } => THROTTLED_NOTICE,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Outcome::Accepted)
    }
}

/// Runs one inquiry through the pipeline.
///
/// Order matters: the throttle runs before validation, so a session hammering
/// the form with invalid input is still slowed down. There are no retries here;
/// the store's own fallback is the only substitute path.
#[derive(Debug, Clone)]
pub struct SubmissionOrchestrator<S>
where
    S: Storage<SessionId, SessionState> + Clone,
{
    limiter: SubmissionLimiter<S>,
    store: Arc<dyn InquiryStore>,
    metrics: Metrics,
}

impl<S> SubmissionOrchestrator<S>
where
    S: Storage<SessionId, SessionState> + Clone,
{
    pub fn new(limiter: SubmissionLimiter<S>, store: Arc<dyn InquiryStore>, metrics: Metrics) -> Self {
        Self {
            limiter,
            store,
            metrics,
        }
    }

    /// Submit an inquiry on behalf of `session`.
    pub fn submit(&self, input: InquiryInput, session: &SessionId) -> Outcome {
        if let LimitDecision::Throttle { retry_after } = self.limiter.check(session) {
            self.metrics.record_throttled();
            return Outcome::Throttled { retry_after };
        }

        if let Err(err) = validate(&input) {
            self.metrics.record_rejected();
            tracing::info!(session = %session, reason = err.reason(), "inquiry rejected");
            return Outcome::Rejected(err.reason().to_string());
        }

        let result = self.store.save_inquiry(&input);
        if result.ok {
            self.metrics.record_accepted();
            tracing::info!(session = %session, message = %result.message, "inquiry accepted");
            Outcome::Accepted
        } else {
            self.metrics.record_rejected();
            tracing::warn!(session = %session, message = %result.message, "inquiry not recorded");
            Outcome::Rejected(result.message)
        }
    }

    pub fn limiter(&self) -> &SubmissionLimiter<S> {
        &self.limiter
    }

    pub fn store(&self) -> &Arc<dyn InquiryStore> {
        &self.store
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}
