//! In-memory blob store for tests and ephemeral nodes.

use crate::domain::{Resource, StorageError};
use crate::ports::BlobStore;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Volatile `BlobStore` backed by a map.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    data: RwLock<HashMap<Resource, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once the resource has been written.
    pub fn contains(&self, resource: Resource) -> bool {
        self.data.read().contains_key(&resource)
    }
}

impl BlobStore for MemoryBlobStore {
    fn read(&self, resource: Resource) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.data.read().get(&resource).cloned())
    }

    fn write(&self, resource: Resource, bytes: &[u8]) -> Result<(), StorageError> {
        self.data.write().insert(resource, bytes.to_vec());
        Ok(())
    }
}
