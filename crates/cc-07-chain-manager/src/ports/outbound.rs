//! # Outbound Ports (Driven Ports)
//!
//! What the chain manager needs from the network. Implemented by the node
//! runtime on top of the gossip subsystem.

use crate::domain::errors::SourceUnavailable;
use async_trait::async_trait;
use shared_types::{Block, BlockAnnouncement};

/// Relays an accepted block to peers.
#[async_trait]
pub trait BlockBroadcaster: Send + Sync {
    /// Must not wait for delivery; failures are the adapter's to log.
    async fn announce(&self, announcement: BlockAnnouncement);
}

/// A whole chain fetched from elsewhere.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteChain {
    /// Where it came from, for logging.
    pub source: String,
    pub blocks: Vec<Block>,
}

/// Supplies a candidate chain at bootstrap.
#[async_trait]
pub trait ChainSource: Send + Sync {
    async fn fetch_chain(&self) -> Result<RemoteChain, SourceUnavailable>;
}
