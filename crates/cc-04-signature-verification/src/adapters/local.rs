//! In-process ECDSA authenticator.

use crate::domain::ecdsa::verify_transaction;
use crate::ports::inbound::TransactionAuthenticator;
use async_trait::async_trait;
use shared_types::Transaction;

/// Checks the transaction's signature locally against the block's key.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalEcdsaAuthenticator;

impl LocalEcdsaAuthenticator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TransactionAuthenticator for LocalEcdsaAuthenticator {
    async fn authenticate(&self, transaction: &Transaction, public_key: &str) -> bool {
        verify_transaction(transaction, public_key)
    }
}
