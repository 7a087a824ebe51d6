//! Ports (interfaces) for the application layer.
//!
//! In hexagonal architecture, ports define the interfaces that the application
//! layer needs. Infrastructure adapters implement these ports.

use crate::domain::inquiry::InquiryInput;
use crate::domain::storage::{StorageResult, StoreError};
use std::fmt::Debug;
use std::hash::Hash;
use std::time::Instant;

/// Port for obtaining current time.
///
/// Infrastructure provides concrete implementations (SystemClock, MockClock).
pub trait Clock: Send + Sync + Debug {
    /// Get the current instant.
    fn now(&self) -> Instant;
}

/// Port for concurrent key-value storage of per-session state.
///
/// Infrastructure provides concrete implementations (ShardedStorage).
pub trait Storage<K, V>: Send + Sync + Debug
where
    K: Hash + Eq + Clone + Send + Sync,
    V: Send + Sync,
{
    /// Access an entry with mutable access, creating it if necessary.
    ///
    /// The entry stays locked for the duration of `accessor`, so a
    /// read-then-write inside it is atomic with respect to other callers.
    fn with_entry_mut<F, R>(&self, key: K, factory: impl FnOnce() -> V, accessor: F) -> R
    where
        F: FnOnce(&mut V) -> R;

    /// Get the number of entries in the storage.
    fn len(&self) -> usize;

    /// Check if the storage is empty.
    fn is_empty(&self) -> bool;

    /// Clear all entries from the storage.
    fn clear(&self);

    /// Remove entries for which the predicate returns false.
    fn retain<F>(&self, f: F)
    where
        F: FnMut(&K, &mut V) -> bool;
}

/// Port for persisting a submitted inquiry.
///
/// Implementations decide their own failure policy. The spreadsheet adapter,
/// for example, never returns `ok == false`: remote failures are routed to the
/// operational log and reported as accepted.
pub trait InquiryStore: Send + Sync + Debug {
    fn save_inquiry(&self, inquiry: &InquiryInput) -> StorageResult;
}

/// Port for reaching a named remote spreadsheet.
///
/// `open_worksheet` authenticates with the given service credentials and
/// returns a handle on the first worksheet of the spreadsheet called
/// `sheet_name`.
pub trait SheetBackend: Send + Sync + Debug {
    fn open_worksheet(
        &self,
        credentials_json: &str,
        sheet_name: &str,
    ) -> Result<Box<dyn Worksheet>, StoreError>;
}

/// An opened worksheet that rows can be appended to.
pub trait Worksheet {
    /// Whether the header row (`A1:H1`) is blank, meaning no header has
    /// been written yet. Rows further down are not inspected.
    fn is_empty(&mut self) -> Result<bool, StoreError>;

    /// Append one row after the last non-empty row.
    fn append_row(&mut self, row: &[String]) -> Result<(), StoreError>;
}
