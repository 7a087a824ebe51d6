//! Recording inquiry store.

use crate::application::ports::InquiryStore;
use crate::domain::inquiry::InquiryInput;
use crate::domain::storage::StorageResult;
use std::sync::{Arc, Mutex, MutexGuard};

/// Store that remembers every inquiry it was handed and returns a fixed result.
///
/// Clones share the same record.
#[derive(Debug, Clone)]
pub struct RecordingStore {
    result: StorageResult,
    saved: Arc<Mutex<Vec<InquiryInput>>>,
}

impl RecordingStore {
    /// A store that reports every save as written.
    pub fn new() -> Self {
        Self::returning(StorageResult::saved("recorded"))
    }

    pub fn returning(result: StorageResult) -> Self {
        Self {
            result,
            saved: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Number of `save_inquiry` calls.
    pub fn calls(&self) -> usize {
        self.lock().len()
    }

    /// Inquiries received, in call order.
    pub fn saved(&self) -> Vec<InquiryInput> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<InquiryInput>> {
        self.saved
            .lock()
            .expect("RecordingStore mutex poisoned - a test thread panicked while holding the lock")
    }
}

impl Default for RecordingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InquiryStore for RecordingStore {
    fn save_inquiry(&self, inquiry: &InquiryInput) -> StorageResult {
        self.lock().push(inquiry.clone());
        self.result.clone()
    }
}
