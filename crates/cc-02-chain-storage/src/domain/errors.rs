//! # Domain Errors
//!
//! Storage failures are fatal to the operation that hit them and are
//! surfaced to the caller, never swallowed.

use super::Resource;
use thiserror::Error;

/// Errors from reading or writing a persisted resource.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying I/O failed.
    #[error("I/O error on {resource}: {source}")]
    Io {
        resource: Resource,
        #[source]
        source: std::io::Error,
    },

    /// The stored bytes are not the expected record type.
    #[error("Corrupt {resource} resource: {source}")]
    Corrupt {
        resource: Resource,
        #[source]
        source: serde_json::Error,
    },

    /// The value could not be serialized for writing.
    #[error("Failed to serialize {resource}: {source}")]
    Serialization {
        resource: Resource,
        #[source]
        source: serde_json::Error,
    },
}

impl StorageError {
    /// The resource the failure concerns.
    pub fn resource(&self) -> Resource {
        match self {
            Self::Io { resource, .. }
            | Self::Corrupt { resource, .. }
            | Self::Serialization { resource, .. } => *resource,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_names_resource() {
        let err = StorageError::Io {
            resource: Resource::PendingPool,
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.resource(), Resource::PendingPool);
        assert!(err.to_string().contains("pending-pool"));
    }
}
