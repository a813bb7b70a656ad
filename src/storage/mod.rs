//! Durable storage for the notebook: gateways, backups, data directory

pub mod backup;
pub mod data_dir;
pub mod file;
pub mod persister;

pub use file::FileGateway;
pub use persister::{Persister, RetryPolicy};

use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{StorageError, StorageResult};

/// Where the serialized notebook lives
///
/// The store treats the payload as an opaque string. `save` is best-effort:
/// the caller logs failures and never rolls back in-memory state.
pub trait PersistenceGateway: Send + 'static {
    /// Read the stored payload; `None` when nothing has been saved yet
    fn load(&mut self) -> StorageResult<Option<String>>;

    /// Replace the stored payload
    fn save(&mut self, data: &str) -> StorageResult<()>;
}

#[derive(Debug, Default)]
struct MemorySlot {
    data: Option<String>,
    saves: usize,
    failures_pending: usize,
}

/// In-memory gateway; clones share the same slot
#[derive(Debug, Clone, Default)]
pub struct MemoryGateway {
    slot: Arc<Mutex<MemorySlot>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a payload already stored
    pub fn with_data(data: impl Into<String>) -> Self {
        let gateway = Self::default();
        gateway.lock().data = Some(data.into());
        gateway
    }

    /// Current stored payload
    pub fn contents(&self) -> Option<String> {
        self.lock().data.clone()
    }

    /// Number of successful saves so far
    pub fn save_count(&self) -> usize {
        self.lock().saves
    }

    /// Make the next `n` saves fail
    pub fn fail_next_saves(&self, n: usize) {
        self.lock().failures_pending = n;
    }

    fn lock(&self) -> MutexGuard<'_, MemorySlot> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PersistenceGateway for MemoryGateway {
    fn load(&mut self) -> StorageResult<Option<String>> {
        Ok(self.lock().data.clone())
    }

    fn save(&mut self, data: &str) -> StorageResult<()> {
        let mut slot = self.lock();
        if slot.failures_pending > 0 {
            slot.failures_pending -= 1;
            return Err(StorageError::io(
                "memory gateway write",
                io::Error::other("injected failure"),
            ));
        }
        slot.data = Some(data.to_string());
        slot.saves += 1;
        Ok(())
    }
}
