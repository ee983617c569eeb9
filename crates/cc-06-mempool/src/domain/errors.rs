//! Transaction pool errors.

use cc_02_chain_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MempoolError {
    /// Reading or writing the `pending-pool` resource failed.
    #[error("Pending pool storage failed: {0}")]
    Storage(#[from] StorageError),
}
