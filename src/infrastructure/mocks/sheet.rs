//! In-memory spreadsheet backend.

use crate::application::ports::{SheetBackend, Worksheet};
use crate::domain::storage::StoreError;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct SheetState {
    rows: Vec<Vec<String>>,
    opened: Vec<String>,
    failure: Option<StoreError>,
}

/// Backend holding a single worksheet in memory.
///
/// Clones share the worksheet, so a test keeps one clone for assertions and
/// hands the other to the store under test. `fail_with` makes every later
/// `open_worksheet` call fail until `recover` is called.
#[derive(Debug, Clone, Default)]
pub struct MemorySheetBackend {
    state: Arc<Mutex<SheetState>>,
}

impl MemorySheetBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows written so far, header included.
    pub fn rows(&self) -> Vec<Vec<String>> {
        self.lock().rows.clone()
    }

    /// Spreadsheet names passed to `open_worksheet`, in call order.
    pub fn opened_sheets(&self) -> Vec<String> {
        self.lock().opened.clone()
    }

    pub fn fail_with(&self, error: StoreError) {
        self.lock().failure = Some(error);
    }

    pub fn recover(&self) {
        self.lock().failure = None;
    }

    fn lock(&self) -> MutexGuard<'_, SheetState> {
        lock(&self.state)
    }
}

impl SheetBackend for MemorySheetBackend {
    fn open_worksheet(
        &self,
        _credentials_json: &str,
        sheet_name: &str,
    ) -> Result<Box<dyn Worksheet>, StoreError> {
        let mut state = self.lock();
        state.opened.push(sheet_name.to_string());
        if let Some(err) = &state.failure {
            return Err(err.clone());
        }
        Ok(Box::new(MemoryWorksheet {
            state: Arc::clone(&self.state),
        }))
    }
}

struct MemoryWorksheet {
    state: Arc<Mutex<SheetState>>,
}

impl Worksheet for MemoryWorksheet {
    fn is_empty(&mut self) -> Result<bool, StoreError> {
        Ok(lock(&self.state).rows.is_empty())
    }

    fn append_row(&mut self, row: &[String]) -> Result<(), StoreError> {
        lock(&self.state).rows.push(row.to_vec());
        Ok(())
    }
}

fn lock(state: &Mutex<SheetState>) -> MutexGuard<'_, SheetState> {
    state
        .lock()
        .expect("MemorySheetBackend mutex poisoned - a test thread panicked while holding the lock")
}
