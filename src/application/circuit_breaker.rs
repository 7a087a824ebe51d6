//! Circuit breaker guarding the remote spreadsheet write.
//!
//! When the backend keeps failing, every submitter would otherwise wait for the
//! full request timeout before landing in the log fallback. Once the circuit
//! opens, writes skip the remote call and go straight to the fallback until the
//! recovery timeout has passed.

use crate::application::ports::Clock;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Circuit breaker states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Remote writes are attempted normally
    Closed = 0,
    /// Remote writes are skipped
    Open = 1,
    /// One trial write is in flight; other writes are skipped
    HalfOpen = 2,
}

impl From<u8> for CircuitState {
    fn from(value: u8) -> Self {
        match value {
            1 => CircuitState::Open,
            2 => CircuitState::HalfOpen,
            _ => CircuitState::Closed,
        }
    }
}

/// Configuration for circuit breaker behavior.
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive remote failures before the circuit opens
    pub failure_threshold: u32,
    /// How long the circuit stays open before a trial write
    pub recovery_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            recovery_timeout: Duration::from_secs(30),
        }
    }
}

/// Lock-free circuit breaker.
#[derive(Debug)]
pub struct CircuitBreaker {
    state: AtomicU8,
    consecutive_failures: AtomicU64,
    last_failure_nanos: AtomicU64,
    config: CircuitBreakerConfig,
    clock: Arc<dyn Clock>,
    /// Reference point for the stored failure timestamp
    epoch: Instant,
}

impl CircuitBreaker {
    /// Create a circuit breaker with the given configuration and clock.
    pub fn new(config: CircuitBreakerConfig, clock: Arc<dyn Clock>) -> Self {
        let epoch = clock.now();
        Self {
            state: AtomicU8::new(CircuitState::Closed as u8),
            consecutive_failures: AtomicU64::new(0),
            last_failure_nanos: AtomicU64::new(0),
            config,
            clock,
            epoch,
        }
    }

    /// Get the current circuit state.
    pub fn state(&self) -> CircuitState {
        CircuitState::from(self.state.load(Ordering::Acquire))
    }

    /// Whether a remote write should be attempted now.
    ///
    /// After the recovery timeout exactly one caller gets `true` and becomes
    /// the trial. Everyone else gets `false` until the trial's outcome is
    /// recorded with `record_success`, `record_failure` or `release_trial`.
    pub fn allow_request(&self) -> bool {
        match self.state() {
            CircuitState::Closed => true,
            CircuitState::HalfOpen => false,
            CircuitState::Open => {
                let since_failure = self
                    .clock
                    .now()
                    .saturating_duration_since(self.last_failure_time());
                if since_failure < self.config.recovery_timeout {
                    return false;
                }
                // The caller that moves Open -> HalfOpen owns the trial
                self.state
                    .compare_exchange(
                        CircuitState::Open as u8,
                        CircuitState::HalfOpen as u8,
                        Ordering::AcqRel,
                        Ordering::Acquire,
                    )
                    .is_ok()
            }
        }
    }

    /// Record a successful remote write.
    pub fn record_success(&self) {
        self.consecutive_failures.store(0, Ordering::Release);
        if self.state() == CircuitState::HalfOpen {
            self.state
                .store(CircuitState::Closed as u8, Ordering::Release);
        }
    }

    /// Record a failed remote write.
    pub fn record_failure(&self) {
        let failures = self.consecutive_failures.fetch_add(1, Ordering::AcqRel) + 1;

        let nanos = self
            .clock
            .now()
            .saturating_duration_since(self.epoch)
            .as_nanos()
            .try_into()
            .unwrap_or(u64::MAX);
        self.last_failure_nanos.store(nanos, Ordering::Release);

        match self.state() {
            CircuitState::HalfOpen => {
                self.state.store(CircuitState::Open as u8, Ordering::Release);
            }
            CircuitState::Closed if failures >= u64::from(self.config.failure_threshold) => {
                self.state.store(CircuitState::Open as u8, Ordering::Release);
                tracing::error!(
                    failures,
                    recovery_secs = self.config.recovery_timeout.as_secs(),
                    "spreadsheet writes failing repeatedly, skipping remote until recovery"
                );
            }
            _ => {}
        }
    }

    /// End a trial that said nothing about the backend's health.
    ///
    /// The circuit goes back to Open without a new failure timestamp, so the
    /// next caller may start another trial straight away.
    pub fn release_trial(&self) {
        let _ = self.state.compare_exchange(
            CircuitState::HalfOpen as u8,
            CircuitState::Open as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }

    fn last_failure_time(&self) -> Instant {
        self.epoch + Duration::from_nanos(self.last_failure_nanos.load(Ordering::Acquire))
    }

    /// Get the number of consecutive failures.
    pub fn consecutive_failures(&self) -> u64 {
        self.consecutive_failures.load(Ordering::Acquire)
    }

    /// Reset the circuit breaker to closed state.
    pub fn reset(&self) {
        self.state
            .store(CircuitState::Closed as u8, Ordering::Release);
        self.consecutive_failures.store(0, Ordering::Release);
    }
}
