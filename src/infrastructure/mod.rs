//! Infrastructure layer - external adapters and integrations.
//!
//! This layer provides adapters for:
//! - Clock abstraction (system time vs mock)
//! - Session storage (sharded maps)
//! - Site configuration and the service catalog file
//! - Google Sheets, and the spreadsheet store with its log fallback
//! - The pipeline builder

pub mod catalog;
pub mod clock;
pub mod config;
pub mod fallback;
pub mod google;
pub mod pipeline;
pub mod spreadsheet;
pub mod storage;

/// Mock implementations for testing.
///
/// Only available during test builds or with the `test-helpers` feature.
/// To use these mocks in integration tests, add to your `Cargo.toml`:
/// ```toml
/// [dev-dependencies]
/// thrive-inquiry = { version = "*", features = ["test-helpers"] }
/// ```
#[cfg(any(test, feature = "test-helpers"))]
pub mod mocks;
