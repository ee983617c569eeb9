//! # Inbound Ports
//!
//! The API the chain manager calls when a mined block arrives.

use async_trait::async_trait;
use shared_types::Transaction;

/// Decides whether a principal transaction was authorised by its sender.
///
/// Implementations return `false` for any failure (bad key, bad signature,
/// unreachable service); they never abort block processing.
#[async_trait]
pub trait TransactionAuthenticator: Send + Sync {
    /// `public_key` is the hex SEC1 key the block carries for its signer.
    async fn authenticate(&self, transaction: &Transaction, public_key: &str) -> bool;
}
