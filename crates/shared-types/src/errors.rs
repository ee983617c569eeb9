//! # Error Types
//!
//! Errors raised while encoding or decoding shared records.

use thiserror::Error;

/// Errors converting a block to or from its canonical form.
#[derive(Debug, Error)]
pub enum BlockModelError {
    /// The bytes are not a well-formed block record.
    #[error("Block serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors decoding or encoding a wire message.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The line is not valid JSON or lacks a recognised `type`.
    #[error("Malformed message: {0}")]
    Malformed(#[source] serde_json::Error),

    /// The message could not be rendered.
    #[error("Failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),
}
