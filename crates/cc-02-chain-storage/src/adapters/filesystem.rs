//! # File-Backed Blob Store
//!
//! One JSON file per resource inside a data directory:
//!
//! ```text
//! <data_dir>/chain.json
//! <data_dir>/pending-pool.json
//! ```
//!
//! Writes go to `<name>.json.tmp` and are renamed over the target, so a crash
//! mid-write leaves the previous version readable.

use crate::domain::{Resource, StorageError};
use crate::ports::BlobStore;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Production `BlobStore` over the local filesystem.
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StorageError::Io {
            resource: Resource::Chain,
            source,
        })?;
        tracing::debug!(dir = %dir.display(), "Opened file blob store");
        Ok(Self { dir })
    }

    /// Directory holding the resource files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a resource's file.
    pub fn path_of(&self, resource: Resource) -> PathBuf {
        self.dir.join(resource.file_name())
    }
}

impl BlobStore for FileBlobStore {
    fn read(&self, resource: Resource) -> Result<Option<Vec<u8>>, StorageError> {
        match fs::read(self.path_of(resource)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { resource, source }),
        }
    }

    fn write(&self, resource: Resource, bytes: &[u8]) -> Result<(), StorageError> {
        let target = self.path_of(resource);
        let tmp = target.with_extension("json.tmp");
        let io = |source| StorageError::Io { resource, source };

        let mut file = fs::File::create(&tmp).map_err(io)?;
        file.write_all(bytes).map_err(io)?;
        file.sync_all().map_err(io)?;
        drop(file);
        fs::rename(&tmp, &target).map_err(io)?;

        tracing::trace!(%resource, bytes = bytes.len(), "Resource written");
        Ok(())
    }
}
