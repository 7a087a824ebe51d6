//! Submission throttling policy.
//!
//! A session may submit at most once per minimum interval. The policy only
//! tracks the last *accepted* attempt: a throttled attempt does not push the
//! window forward, so a visitor who waits out the interval always gets through.

use std::time::{Duration, Instant};
use thiserror::Error;

/// Default minimum interval between accepted submissions from one session.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_secs(6);

/// Decision made by the throttling policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyDecision {
    /// Accept the attempt and record it
    Allow,
    /// Reject the attempt; the session may retry after the given delay
    Throttle { retry_after: Duration },
}

impl PolicyDecision {
    /// Check if this decision is Allow.
    pub fn is_allow(&self) -> bool {
        matches!(self, PolicyDecision::Allow)
    }

    /// Check if this decision is Throttle.
    pub fn is_throttle(&self) -> bool {
        matches!(self, PolicyDecision::Throttle { .. })
    }
}

/// Invalid policy configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("minimum submission interval must be greater than zero")]
    ZeroInterval,
}

/// Minimum-interval policy: one accepted submission per `min_interval`.
///
/// # Example
/// ```
/// use thrive_inquiry::MinIntervalPolicy;
/// use std::time::{Duration, Instant};
///
/// let mut policy = MinIntervalPolicy::new(Duration::from_secs(6)).unwrap();
/// let now = Instant::now();
///
/// assert!(policy.register_attempt(now).is_allow());
/// assert!(policy.register_attempt(now + Duration::from_secs(2)).is_throttle());
/// assert!(policy.register_attempt(now + Duration::from_secs(6)).is_allow());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinIntervalPolicy {
    min_interval: Duration,
    last_accepted: Option<Instant>,
}

impl MinIntervalPolicy {
    /// Create a policy with no recorded submissions.
    ///
    /// # Errors
    /// Returns `PolicyError::ZeroInterval` if `min_interval` is zero.
    pub fn new(min_interval: Duration) -> Result<Self, PolicyError> {
        if min_interval.is_zero() {
            return Err(PolicyError::ZeroInterval);
        }
        Ok(Self {
            min_interval,
            last_accepted: None,
        })
    }

    /// Register a submission attempt at `now`.
    ///
    /// A session with no previous accepted attempt is always allowed. The
    /// recorded timestamp only moves when the attempt is allowed.
    pub fn register_attempt(&mut self, now: Instant) -> PolicyDecision {
        if let Some(last) = self.last_accepted {
            let elapsed = now.saturating_duration_since(last);
            if elapsed < self.min_interval {
                return PolicyDecision::Throttle {
                    retry_after: self.min_interval - elapsed,
                };
            }
        }
        self.last_accepted = Some(now);
        PolicyDecision::Allow
    }

    /// When the last accepted attempt happened, if any.
    pub fn last_accepted(&self) -> Option<Instant> {
        self.last_accepted
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Forget the last accepted attempt.
    pub fn reset(&mut self) {
        self.last_accepted = None;
    }
}

impl Default for MinIntervalPolicy {
    fn default() -> Self {
        Self {
            min_interval: DEFAULT_MIN_INTERVAL,
            last_accepted: None,
        }
    }
}
