//! # Domain Layer - Chain Storage

pub mod errors;
pub mod resource;

pub use errors::StorageError;
pub use resource::Resource;
