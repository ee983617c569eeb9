//! Ports for the Chain Storage subsystem.

pub mod outbound;

pub use outbound::{read_json, write_json, BlobStore};
