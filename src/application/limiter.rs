//! Per-session submission rate limiting.
//!
//! The limiter is advisory anti-abuse, not a security control. If session
//! state cannot be read or written it fails open and lets the attempt through.

use crate::application::metrics::Metrics;
use crate::application::ports::Storage;
use crate::application::registry::{SessionRegistry, SessionState};
use crate::domain::{inquiry::SessionId, policy::PolicyDecision};
use std::panic;
use std::time::Duration;

/// Decision about a submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitDecision {
    /// Let the submission proceed
    Allow,
    /// Too soon after the last accepted submission
    Throttle { retry_after: Duration },
}

impl LimitDecision {
    pub fn is_allow(&self) -> bool {
        matches!(self, LimitDecision::Allow)
    }
}

/// Coordinates throttling decisions across sessions.
#[derive(Debug, Clone)]
pub struct SubmissionLimiter<S>
where
    S: Storage<SessionId, SessionState> + Clone,
{
    registry: SessionRegistry<S>,
    metrics: Metrics,
}

impl<S> SubmissionLimiter<S>
where
    S: Storage<SessionId, SessionState> + Clone,
{
    pub fn new(registry: SessionRegistry<S>, metrics: Metrics) -> Self {
        Self { registry, metrics }
    }

    /// Check a submission attempt for `session`.
    ///
    /// Records the attempt as the session's last accepted submission only
    /// when it is allowed.
    ///
    /// # Fail-Safe Behavior
    /// If the state accessor panics the attempt is allowed, a warning is
    /// logged and `limiter_fail_open` is incremented.
    pub fn check(&self, session: &SessionId) -> LimitDecision {
        let result = panic::catch_unwind(panic::AssertUnwindSafe(|| {
            self.registry
                .with_session(session, |state, now| state.policy.register_attempt(now))
        }));

        match result {
            Ok(PolicyDecision::Allow) => LimitDecision::Allow,
            Ok(PolicyDecision::Throttle { retry_after }) => {
                tracing::debug!(
                    session = %session,
                    retry_after_ms = retry_after.as_millis() as u64,
                    "submission throttled"
                );
                LimitDecision::Throttle { retry_after }
            }
            Err(_) => {
                self.metrics.record_limiter_fail_open();
                tracing::warn!(
                    session = %session,
                    "session state unavailable, allowing submission"
                );
                LimitDecision::Allow
            }
        }
    }

    /// Boolean form of [`check`](Self::check).
    pub fn allow(&self, session: &SessionId) -> bool {
        self.check(session).is_allow()
    }

    /// Get a reference to the registry.
    pub fn registry(&self) -> &SessionRegistry<S> {
        &self.registry
    }

    /// Get a reference to the metrics.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}
