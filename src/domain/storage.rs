//! Outcome and failure types for persisting inquiries.

use thiserror::Error;

/// Message reported when a record was accepted through log fallback.
pub const FALLBACK_MESSAGE: &str = "saved locally (fallback)";

/// Result of handing an inquiry to an [`InquiryStore`](crate::InquiryStore).
///
/// `ok == true` means the record was durably written *or* explicitly accepted
/// through fallback logging. `ok == false` means nothing was recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageResult {
    pub ok: bool,
    pub message: String,
}

impl StorageResult {
    /// The record was written.
    pub fn saved(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    /// The remote write failed and the record went to the operational log instead.
    pub fn fallback() -> Self {
        Self::saved(FALLBACK_MESSAGE)
    }

    /// Nothing was recorded.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

/// Failure on the remote write path.
///
/// The two kinds are logged differently: a configuration problem will not go
/// away on its own and needs an operator, a remote problem may be transient.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Credentials or target missing or unusable
    #[error("storage not configured: {0}")]
    Configuration(String),
    /// Auth, network, HTTP status or quota failure from the backend
    #[error("remote write failed: {0}")]
    Remote(String),
}

impl StoreError {
    /// Short kind label for structured logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::Configuration(_) => "configuration",
            StoreError::Remote(_) => "remote",
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, StoreError::Configuration(_))
    }
}
