//! Error types for the proof-of-work engine.

use thiserror::Error;

/// Errors from configuring or running a nonce search.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PowError {
    /// Difficulty outside 1..=64 hex digits.
    #[error("Invalid difficulty {0}: must be between 1 and 64")]
    InvalidDifficulty(u8),

    /// The whole nonce space was searched without a hit.
    #[error("Nonce space exhausted at difficulty {0}")]
    Exhausted(u8),

    /// A worker thread panicked.
    #[error("Mining worker failed")]
    WorkerFailed,
}
