//! # Inbound Ports (Driving Ports)
//!
//! The ledger operations the protocol dispatcher drives.

use crate::domain::errors::ChainError;
use crate::domain::outcomes::{Assets, BlockOutcome, TransactionOutcome, Work};
use async_trait::async_trait;
use serde_json::Value;
use shared_types::{Block, Transaction};

#[async_trait]
pub trait LedgerApi: Send + Sync {
    /// Snapshot of the full chain.
    async fn chain(&self) -> Vec<Block>;

    /// The tail block.
    async fn latest_block(&self) -> Result<Block, ChainError>;

    async fn balance(&self, address: &str) -> f64;

    async fn user_assets(&self, address: &str) -> Assets;

    /// Run the validation pipeline on a candidate block.
    async fn add_block(
        &self,
        block: Block,
        proof: String,
        from_miner: bool,
    ) -> Result<BlockOutcome, ChainError>;

    /// Admit a transfer to the pending pool.
    async fn add_transaction(
        &self,
        transaction: Transaction,
        metadata: Value,
        public_key: String,
    ) -> Result<TransactionOutcome, ChainError>;

    /// Hand the head of the pending pool to a miner, at most once.
    async fn next_work(&self) -> Result<Work, ChainError>;
}
