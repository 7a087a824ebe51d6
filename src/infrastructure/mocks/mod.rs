//! Test doubles for the infrastructure adapters.
//!
//! Available in unit tests and, with the `test-helpers` feature, to
//! integration tests and downstream crates.

pub mod clock;
pub mod layer;
pub mod sheet;
pub mod store;

pub use clock::MockClock;
pub use layer::{CapturedEvent, MockCaptureLayer};
pub use sheet::MemorySheetBackend;
pub use store::RecordingStore;
