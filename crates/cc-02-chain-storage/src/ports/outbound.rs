//! # Outbound Ports (Driven Ports)
//!
//! The storage medium the node requires the host to provide.
//!
//! Production: `FileBlobStore`
//! Testing: `MemoryBlobStore`

use crate::domain::{Resource, StorageError};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Abstract whole-blob store over the node's named resources.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; callers serialize mutations to a
/// given resource themselves.
pub trait BlobStore: Send + Sync {
    /// Read the entire resource. `Ok(None)` if it has never been written.
    fn read(&self, resource: Resource) -> Result<Option<Vec<u8>>, StorageError>;

    /// Replace the entire resource with `bytes`.
    fn write(&self, resource: Resource, bytes: &[u8]) -> Result<(), StorageError>;
}

/// Read and decode a JSON resource. Absent or blank resources read as `None`.
pub fn read_json<T: DeserializeOwned>(
    store: &dyn BlobStore,
    resource: Resource,
) -> Result<Option<T>, StorageError> {
    let Some(bytes) = store.read(resource)? else {
        return Ok(None);
    };
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|source| StorageError::Corrupt { resource, source })
}

/// Encode and write a JSON resource wholesale.
pub fn write_json<T: Serialize + ?Sized>(
    store: &dyn BlobStore,
    resource: Resource,
    value: &T,
) -> Result<(), StorageError> {
    let bytes =
        serde_json::to_vec(value).map_err(|source| StorageError::Serialization { resource, source })?;
    store.write(resource, &bytes)
}
