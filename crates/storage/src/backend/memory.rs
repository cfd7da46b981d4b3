//! In-memory backend.

use parking_lot::RwLock;
use std::collections::HashMap;

use vellum_core::{Result, VersionId};

use super::traits::StorageBackend;

/// HashMap-backed storage; contents vanish with the value.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    records: RwLock<HashMap<VersionId, Vec<u8>>>,
}

impl MemoryBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Check if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl StorageBackend for MemoryBackend {
    fn put(&self, id: &VersionId, bytes: &[u8]) -> Result<()> {
        self.records.write().insert(*id, bytes.to_vec());
        Ok(())
    }

    fn get(&self, id: &VersionId) -> Result<Option<Vec<u8>>> {
        Ok(self.records.read().get(id).cloned())
    }

    fn remove(&self, id: &VersionId) -> Result<bool> {
        Ok(self.records.write().remove(id).is_some())
    }

    fn keys(&self) -> Result<Vec<VersionId>> {
        Ok(self.records.read().keys().copied().collect())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
