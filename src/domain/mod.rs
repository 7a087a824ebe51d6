//! Domain layer - pure business logic with no I/O.
//!
//! This layer contains the core concepts and rules of the inquiry pipeline:
//! - Inquiry records and their trimming invariant
//! - Field validation rules
//! - The minimum-interval throttling policy
//! - Storage outcomes and failure kinds
//! - The service catalog content model
//!
//! All types in this layer are pure and easily testable.

pub mod catalog;
pub mod inquiry;
pub mod policy;
pub mod storage;
pub mod validation;
