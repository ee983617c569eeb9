//! # Chain Storage (cc-02)
//!
//! The durable medium behind the node: an abstract blob store exposing
//! read-whole / write-whole operations over two named resources, `chain`
//! and `pending-pool`.
//!
//! ## Invariants
//!
//! | ID | Invariant | Enforcement |
//! |----|-----------|-------------|
//! | 1 | Whole-resource writes | `BlobStore::write` replaces the entire resource |
//! | 2 | Crash safety | `FileBlobStore` writes a temp file then renames over the target |
//! | 3 | Absent is not empty | A missing resource reads as `None`, never as an error |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Resource names and errors
//! - `ports/` - `BlobStore` driven port plus typed JSON helpers
//! - `adapters/` - File-backed and in-memory stores

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::{FileBlobStore, MemoryBlobStore};
pub use domain::{Resource, StorageError};
pub use ports::{read_json, write_json, BlobStore};
