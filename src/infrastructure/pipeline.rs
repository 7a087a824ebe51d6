//! Builder wiring the production submission pipeline.

use crate::application::circuit_breaker::CircuitBreakerConfig;
use crate::application::limiter::SubmissionLimiter;
use crate::application::metrics::Metrics;
use crate::application::orchestrator::SubmissionOrchestrator;
use crate::application::ports::{Clock, InquiryStore};
use crate::application::registry::{SessionRegistry, SessionState};
use crate::domain::inquiry::SessionId;
use crate::domain::policy::{MinIntervalPolicy, PolicyError};
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::config::SiteConfig;
use crate::infrastructure::google::GoogleSheetsBackend;
use crate::infrastructure::spreadsheet::SpreadsheetStore;
use crate::infrastructure::storage::ShardedStorage;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Session storage used by the built pipeline.
pub type SessionStorage = Arc<ShardedStorage<SessionId, SessionState>>;

/// Error returned when building a [`SubmissionOrchestrator`] fails.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("invalid submission interval: {0}")]
    Policy(#[from] PolicyError),
    #[error("failed to create HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Builder for [`SubmissionOrchestrator`].
#[derive(Debug)]
pub struct SubmissionOrchestratorBuilder {
    config: SiteConfig,
    clock: Option<Arc<dyn Clock>>,
    store: Option<Arc<dyn InquiryStore>>,
    min_interval: Option<Duration>,
    metrics: Option<Metrics>,
}

impl SubmissionOrchestratorBuilder {
    /// Use `config` for the interval, sheet name, credentials and timeouts.
    pub fn with_config(mut self, config: SiteConfig) -> Self {
        self.config = config;
        self
    }

    /// Set a custom clock (mainly for testing).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Use `store` instead of the spreadsheet store built from config.
    pub fn with_store(mut self, store: Arc<dyn InquiryStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Override the configured minimum interval between accepted submissions.
    ///
    /// The interval is validated when `build()` is called.
    pub fn with_min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = Some(interval);
        self
    }

    /// Share counters with the caller.
    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Build the orchestrator.
    ///
    /// # Errors
    /// - `BuildError::Policy` if the interval is zero
    /// - `BuildError::HttpClient` if the default store's HTTP client cannot be created
    pub fn build(self) -> Result<SubmissionOrchestrator<SessionStorage>, BuildError> {
        let interval = self.min_interval.unwrap_or(self.config.min_submit_interval);
        let template = MinIntervalPolicy::new(interval)?;

        let metrics = self.metrics.unwrap_or_default();
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock::new()));

        let store = match self.store {
            Some(store) => store,
            None => {
                let backend = GoogleSheetsBackend::new(self.config.request_timeout)?;
                Arc::new(SpreadsheetStore::with_parts(
                    &self.config,
                    backend,
                    metrics.clone(),
                    CircuitBreakerConfig::default(),
                    clock.clone(),
                ))
            }
        };

        tracing::debug!(
            min_interval_ms = interval.as_millis() as u64,
            store = ?store,
            "submission pipeline ready"
        );

        let registry = SessionRegistry::new(Arc::new(ShardedStorage::new()), clock, template);
        let limiter = SubmissionLimiter::new(registry, metrics.clone());
        Ok(SubmissionOrchestrator::new(limiter, store, metrics))
    }
}

impl SubmissionOrchestrator<SessionStorage> {
    /// Create a builder for the pipeline.
    ///
    /// Defaults:
    /// - Config: `SiteConfig::default()`
    /// - Interval: the config's `SUBMIT_INTERVAL` (6 seconds)
    /// - Store: spreadsheet store over the Google Sheets backend, with log fallback
    /// - Clock: system monotonic clock
    pub fn builder() -> SubmissionOrchestratorBuilder {
        SubmissionOrchestratorBuilder {
            config: SiteConfig::default(),
            clock: None,
            store: None,
            min_interval: None,
            metrics: None,
        }
    }
}
