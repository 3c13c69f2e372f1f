use crate::file::FileStore;
use crate::memory::MemoryStore;
use apitrail_core::config::{StoreBackend, StoreConfig};
use apitrail_core::{RequestLog, TrailError};
use std::sync::Arc;
use tracing::info;

/// The durable store boundary.
///
/// `save` is blocking from the interceptor's perspective and may fail; the
/// interceptor never retries or queues — a rejected record is dropped.
pub trait LogStore: Send + Sync {
    fn save(&self, record: &RequestLog) -> Result<(), TrailError>;
}

/// Construct the configured store backend.
pub fn from_config(config: &StoreConfig) -> anyhow::Result<Arc<dyn LogStore>> {
    match config.backend {
        StoreBackend::Memory => {
            info!(backend = "memory", "Log store opened");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::File => {
            let store = FileStore::open(config.file.clone())?;
            info!(backend = "file", path = %config.file.path.display(), "Log store opened");
            Ok(Arc::new(store))
        }
    }
}
