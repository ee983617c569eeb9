//! # Protocol Dispatcher
//!
//! Maps each inbound message to one subsystem operation.
//!
//! | Message | Operation | Reply |
//! |---------|-----------|-------|
//! | `requestBlockchain` | chain snapshot | `sendBlockchain` |
//! | `spreadBlock` | `add_block(.., from_miner = false)` | - |
//! | `getPeers` | list known peers, then learn the requester | `sendPeers` |
//! | `mineRequest` | take pool head + tail block | `mineResponse` |
//! | `newBlock` | `add_block(.., from_miner = true)` | - |
//! | `newTransaction` | `add_transaction` | - |
//! | `getBalance` | balance replay | `dataResponse` |
//! | `getNFTs` | asset scan | `dataResponse` |
//! | `sendPeers` (unsolicited) | merge into registry | - |
//! | `sendBlockchain`, `mineResponse`, `dataResponse` | ignored | - |
//!
//! Validation rejections are logged, never sent back.

use std::sync::Arc;

use cc_01_peer_registry::PeerRegistry;
use cc_05_gossip::FrameError;
use cc_07_chain_manager::{BlockOutcome, ChainError, LedgerApi};
use serde_json::Value;
use shared_types::Message;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    /// The message could not be read or decoded.
    #[error("Malformed message: {0}")]
    Malformed(#[from] FrameError),

    /// The ledger operation itself failed (e.g. storage).
    #[error("Ledger operation failed: {0}")]
    Ledger(#[from] ChainError),
}

/// Routes messages from any connection. Cheap to clone.
#[derive(Clone)]
pub struct Dispatcher {
    ledger: Arc<dyn LedgerApi>,
    registry: Arc<PeerRegistry>,
}

impl Dispatcher {
    pub fn new(ledger: Arc<dyn LedgerApi>, registry: Arc<PeerRegistry>) -> Self {
        Self { ledger, registry }
    }

    /// Handle one message; returns the reply to write, if the type has one.
    #[tracing::instrument(skip_all, fields(kind = message.kind()))]
    pub async fn dispatch(&self, message: Message) -> Result<Option<Message>, DispatchError> {
        let reply = match message {
            Message::RequestBlockchain => Some(Message::SendBlockchain {
                blockchain: self.ledger.chain().await,
            }),

            Message::SpreadBlock { data } => {
                let outcome = self.ledger.add_block(data.new_block, data.proof, false).await?;
                log_block_outcome(&outcome, "peer");
                None
            }

            Message::GetPeers { requester } => {
                let peers = self.registry.peers();
                self.registry.learn(requester);
                Some(Message::SendPeers { peers })
            }

            Message::MineRequest => {
                let work = self.ledger.next_work().await?;
                Some(Message::MineResponse {
                    transaction: work.transaction,
                    latest_block: work.latest_block,
                })
            }

            Message::NewBlock { blocks } => {
                tracing::debug!(miner = %blocks.miner, "Mined block submitted");
                let outcome = self.ledger.add_block(blocks.newblock, blocks.proof, true).await?;
                log_block_outcome(&outcome, "miner");
                None
            }

            Message::NewTransaction {
                transaction,
                data,
                public_key,
            } => {
                let outcome = self
                    .ledger
                    .add_transaction(transaction.into_transaction(), data, public_key)
                    .await?;
                if !outcome.accepted {
                    tracing::info!(reason = ?outcome.reason, "Transaction not queued");
                }
                None
            }

            Message::GetBalance { data } => Some(Message::DataResponse {
                data: Value::from(self.ledger.balance(&data).await),
            }),

            Message::GetNfts { address } => Some(Message::DataResponse {
                data: Value::Array(self.ledger.user_assets(&address).await),
            }),

            Message::SendPeers { peers } => {
                self.registry.merge(peers);
                None
            }

            Message::SendBlockchain { .. }
            | Message::MineResponse { .. }
            | Message::DataResponse { .. } => {
                tracing::debug!("Ignoring unsolicited reply");
                None
            }
        };
        Ok(reply)
    }
}

fn log_block_outcome(outcome: &BlockOutcome, origin: &str) {
    match outcome {
        BlockOutcome::Accepted { index, hash } => {
            tracing::info!(index, %hash, origin, "Block committed")
        }
        BlockOutcome::Rejected(reason) => {
            tracing::info!(%reason, origin, "Block not committed")
        }
    }
}
