//! Application layer - orchestration of domain logic.
//!
//! This layer coordinates the domain rules and manages runtime state:
//! - Session registry (per-session throttling state)
//! - Submission limiter (throttle decisions, fail-open)
//! - Circuit breaker (guards the remote spreadsheet write)
//! - Submission orchestrator (throttle, validate, persist, report)
//! - Metrics for operators
//!
//! ## Ports
//!
//! The application layer defines ports (traits) that infrastructure
//! adapters must implement. This keeps the application layer independent
//! from infrastructure details.

pub mod circuit_breaker;
pub mod limiter;
pub mod metrics;
pub mod orchestrator;
pub mod ports;
pub mod registry;
