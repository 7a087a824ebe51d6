//! Spreadsheet-backed inquiry store.
//!
//! Each inquiry becomes one row in the first worksheet of a named spreadsheet.
//! Failures never reach the submitter: the write path is
//!
//! 1. no credentials → `StoreError::Configuration` → log fallback
//! 2. circuit open → `StoreError::Remote` → log fallback (no network call)
//! 3. open worksheet, write header if empty, append row
//! 4. any `StoreError` from step 3 → log fallback
//!
//! so `save_inquiry` always returns `ok == true`. What that promises is that the
//! record was *accepted*, not that it reached the spreadsheet.

use crate::application::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
use crate::application::metrics::Metrics;
use crate::application::ports::{Clock, InquiryStore, SheetBackend};
use crate::domain::inquiry::InquiryInput;
use crate::domain::storage::{StorageResult, StoreError};
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::config::SiteConfig;
use crate::infrastructure::fallback::LogFallback;
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;
use std::sync::Arc;

/// Column headers written to an empty worksheet.
pub const HEADER: [&str; 8] = [
    "timestamp_utc",
    "name",
    "email",
    "phone",
    "goals",
    "notes",
    "source",
    "user_agent",
];

/// Message reported for a row that reached the spreadsheet.
pub const SAVED_MESSAGE: &str = "Saved to Google Sheet.";

/// Inquiry store writing to a remote spreadsheet, with log fallback.
pub struct SpreadsheetStore<B: SheetBackend> {
    backend: B,
    sheet_name: String,
    credentials_json: Option<String>,
    source: String,
    fallback: LogFallback,
    breaker: CircuitBreaker,
}

impl<B: SheetBackend> SpreadsheetStore<B> {
    /// Create a store for the sheet and credentials named in `config`.
    pub fn new(config: &SiteConfig, backend: B) -> Self {
        Self::with_parts(
            config,
            backend,
            Metrics::new(),
            CircuitBreakerConfig::default(),
            Arc::new(SystemClock::new()),
        )
    }

    /// Create a store sharing `metrics`, with a custom breaker and clock.
    pub fn with_parts(
        config: &SiteConfig,
        backend: B,
        metrics: Metrics,
        breaker: CircuitBreakerConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            backend,
            sheet_name: config.sheet_name.clone(),
            credentials_json: config.credentials().map(str::to_string),
            source: config.source.clone(),
            fallback: LogFallback::new(metrics),
            breaker: CircuitBreaker::new(breaker, clock),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn circuit_state(&self) -> CircuitState {
        self.breaker.state()
    }

    /// The remote write path. Any error here is handed to the fallback.
    fn write_remote(&self, inquiry: &InquiryInput) -> Result<(), StoreError> {
        let credentials = self.credentials_json.as_deref().ok_or_else(|| {
            StoreError::Configuration("missing GOOGLE_SERVICE_ACCOUNT_JSON".to_string())
        })?;

        if !self.breaker.allow_request() {
            return Err(StoreError::Remote(
                "circuit open after repeated failures, remote write skipped".to_string(),
            ));
        }

        let result = self.append(credentials, inquiry);
        match &result {
            Ok(()) => self.breaker.record_success(),
            Err(StoreError::Remote(_)) => self.breaker.record_failure(),
            // Says nothing about backend health; let another write try
            Err(StoreError::Configuration(_)) => self.breaker.release_trial(),
        }
        result
    }

    fn append(&self, credentials: &str, inquiry: &InquiryInput) -> Result<(), StoreError> {
        let mut worksheet = self.backend.open_worksheet(credentials, &self.sheet_name)?;
        if worksheet.is_empty()? {
            let header: Vec<String> = HEADER.iter().map(|h| h.to_string()).collect();
            worksheet.append_row(&header)?;
        }
        worksheet.append_row(&self.row(inquiry, Utc::now()))
    }

    /// Build the row for `inquiry`, timestamped at write time.
    pub fn row(&self, inquiry: &InquiryInput, written_at: DateTime<Utc>) -> Vec<String> {
        vec![
            written_at.to_rfc3339_opts(SecondsFormat::Micros, false),
            inquiry.name().to_string(),
            inquiry.email().to_string(),
            inquiry.phone().to_string(),
            inquiry.goals().to_string(),
            inquiry.notes().to_string(),
            self.source.clone(),
            inquiry.user_agent().to_string(),
        ]
    }
}

impl<B: SheetBackend> InquiryStore for SpreadsheetStore<B> {
    fn save_inquiry(&self, inquiry: &InquiryInput) -> StorageResult {
        match self.write_remote(inquiry) {
            Ok(()) => StorageResult::saved(SAVED_MESSAGE),
            // Catch remote failure, log, report success
            Err(cause) => self.fallback.record(inquiry, &cause),
        }
    }
}

impl<B: SheetBackend> fmt::Debug for SpreadsheetStore<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpreadsheetStore")
            .field("backend", &self.backend)
            .field("sheet_name", &self.sheet_name)
            .field("has_credentials", &self.credentials_json.is_some())
            .field("source", &self.source)
            .field("circuit", &self.breaker.state())
            .finish_non_exhaustive()
    }
}
