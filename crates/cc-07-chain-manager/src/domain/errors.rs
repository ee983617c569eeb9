//! # Chain Manager Errors
//!
//! Validation rejections are not errors: they come back as
//! `BlockOutcome::Rejected` / `TransactionOutcome::rejected`. `ChainError`
//! covers failures that abort the operation itself.

use cc_02_chain_storage::StorageError;
use cc_03_proof_of_work::PowError;
use cc_06_mempool::MempoolError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChainError {
    /// Reading or writing the `chain` resource failed.
    #[error("Chain storage failed: {0}")]
    Storage(#[from] StorageError),

    /// The pending pool could not be updated.
    #[error(transparent)]
    Mempool(#[from] MempoolError),

    /// Mining the genesis block failed.
    #[error("Genesis mining failed: {0}")]
    Mining(#[from] PowError),

    /// A blocking worker panicked or was cancelled.
    #[error("Worker task failed: {0}")]
    Worker(String),

    /// The chain has not been initialized.
    #[error("Chain is empty; initialize must run first")]
    EmptyChain,
}

/// The bootstrap chain source could not produce a chain.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Chain source unavailable: {0}")]
pub struct SourceUnavailable(pub String);
