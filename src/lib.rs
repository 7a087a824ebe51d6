//! # thrive-inquiry
//!
//! The inquiry pipeline behind a small coaching business's website. A visitor
//! fills in a form; the pipeline throttles repeat submissions per session,
//! validates the fields, and appends the lead to a Google Sheet. When the sheet
//! is not configured or unreachable the lead is written in full to the log and
//! the visitor is still told it was received.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use thrive_inquiry::{InquiryForm, InquiryInput, Outcome, SessionId, SiteConfig, SubmissionOrchestrator};
//!
//! let config = SiteConfig::load(".streamlit/secrets.toml").unwrap();
//! let pipeline = SubmissionOrchestrator::builder()
//!     .with_config(config)
//!     .build()
//!     .unwrap();
//!
//! let form = InquiryForm {
//!     name: "Jane".to_string(),
//!     email: "jane@x.com".to_string(),
//!     goals: "get fit".to_string(),
//!     ..InquiryForm::default()
//! };
//!
//! match pipeline.submit(InquiryInput::from(form), &SessionId::new("visitor-1")) {
//!     Outcome::Accepted => println!("thanks!"),
//!     other => println!("{}", other.notice()),
//! }
//! ```
//!
//! ## Pipeline
//!
//! Every submission goes through the same three steps, in this order:
//!
//! 1. **Throttle**: one accepted attempt per session every 6 seconds
//!    (`SUBMIT_INTERVAL`). Throttled attempts are not validated or stored.
//! 2. **Validate**: honeypot empty, name present, plausible email, no field over
//!    5000 characters. The first failing rule is reported.
//! 3. **Store**: one row per inquiry in the first worksheet of the configured
//!    spreadsheet, header written on first use.
//!
//! A rejected attempt still consumes the session's interval.
//!
//! ## Log fallback
//!
//! The spreadsheet store never fails a submission. Missing credentials and
//! remote errors send the full record to the `thrive_inquiry::fallback` log
//! target (ERROR for configuration problems, WARN for remote ones) and count it
//! in [`Metrics`]. Watch [`MetricsSnapshot::fallback_rate`]: anything above zero
//! means leads are only in the log.
//!
//! After repeated remote failures a circuit breaker skips the remote call for a
//! while, so visitors are not kept waiting on a dead backend.
//!
//! ## Session state
//!
//! Throttling state lives in memory, keyed by [`SessionId`]. Hosts serving many
//! visitors should periodically drop idle sessions:
//!
//! ```rust,no_run
//! # use thrive_inquiry::SubmissionOrchestrator;
//! # use std::time::Duration;
//! # let pipeline = SubmissionOrchestrator::builder().build().unwrap();
//! let removed = pipeline.limiter().registry().cleanup_idle(Duration::from_secs(3600));
//! ```

// Domain layer - pure business logic
pub mod domain;

// Application layer - orchestration
pub mod application;

// Infrastructure layer - external adapters
pub mod infrastructure;

// Re-export commonly used types for convenience
pub use domain::{
    catalog::{ServiceCatalog, ServiceOffering},
    inquiry::{InquiryForm, InquiryInput, SessionId},
    policy::{MinIntervalPolicy, PolicyDecision, PolicyError, DEFAULT_MIN_INTERVAL},
    storage::{StorageResult, StoreError, FALLBACK_MESSAGE},
    validation::{validate, ValidationError, MAX_TEXT_LEN},
};

pub use application::{
    circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState},
    limiter::{LimitDecision, SubmissionLimiter},
    metrics::{Metrics, MetricsSnapshot},
    orchestrator::{Outcome, SubmissionOrchestrator, ACCEPTED_NOTICE, THROTTLED_NOTICE},
    ports::{Clock, InquiryStore, SheetBackend, Storage, Worksheet},
    registry::{SessionRegistry, SessionState},
};

pub use infrastructure::{
    catalog::CatalogError,
    clock::SystemClock,
    config::{ConfigError, SiteConfig},
    fallback::{LogFallback, FALLBACK_TARGET},
    google::GoogleSheetsBackend,
    pipeline::{BuildError, SessionStorage, SubmissionOrchestratorBuilder},
    spreadsheet::SpreadsheetStore,
    storage::ShardedStorage,
};
