use crate::store::LogStore;
use apitrail_core::{RequestLog, TrailError};
use std::sync::Mutex;

/// In-process store, used by embedded deployments and as a test double.
///
/// Records are appended in save order; no cross-request ordering beyond
/// that is guaranteed or needed.
pub struct MemoryStore {
    records: Mutex<Vec<RequestLog>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of all saved records.
    pub fn records(&self) -> Vec<RequestLog> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LogStore for MemoryStore {
    fn save(&self, record: &RequestLog) -> Result<(), TrailError> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| TrailError::Store("memory store lock poisoned".to_string()))?;
        records.push(record.clone());
        Ok(())
    }
}
