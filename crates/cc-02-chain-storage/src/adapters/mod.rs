//! Storage adapters.

pub mod filesystem;
pub mod memory;

pub use filesystem::FileBlobStore;
pub use memory::MemoryBlobStore;
