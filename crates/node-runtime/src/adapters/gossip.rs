//! Chain-manager outbound ports backed by the gossip subsystem.

use async_trait::async_trait;
use cc_05_gossip::{GossipError, GossipService};
use cc_07_chain_manager::{BlockBroadcaster, ChainSource, RemoteChain, SourceUnavailable};
use shared_types::{BlockAnnouncement, Message};

/// Relays accepted blocks as `spreadBlock` to every known peer.
///
/// The fan-out runs on its own task; `announce` returns once it is spawned.
#[derive(Debug, Clone)]
pub struct GossipBroadcaster {
    gossip: GossipService,
}

impl GossipBroadcaster {
    pub fn new(gossip: GossipService) -> Self {
        Self { gossip }
    }
}

#[async_trait]
impl BlockBroadcaster for GossipBroadcaster {
    async fn announce(&self, announcement: BlockAnnouncement) {
        let gossip = self.gossip.clone();
        tokio::spawn(async move {
            let index = announcement.new_block.index;
            let report = gossip
                .broadcast(Message::SpreadBlock { data: announcement })
                .await;
            if report.is_complete() {
                tracing::debug!(index, delivered = report.delivered.len(), "Block announced");
            } else {
                tracing::warn!(
                    index,
                    delivered = report.delivered.len(),
                    failed = report.failed.len(),
                    "Block announcement partially delivered"
                );
            }
        });
    }
}

/// Fetches the chain of a random known peer.
#[derive(Debug, Clone)]
pub struct GossipChainSource {
    gossip: GossipService,
}

impl GossipChainSource {
    pub fn new(gossip: GossipService) -> Self {
        Self { gossip }
    }
}

#[async_trait]
impl ChainSource for GossipChainSource {
    async fn fetch_chain(&self) -> Result<RemoteChain, SourceUnavailable> {
        match self.gossip.fetch_chain_from_random_peer().await {
            Ok((peer, blocks)) => Ok(RemoteChain {
                source: peer.to_string(),
                blocks,
            }),
            Err(GossipError::NoPeers) => Err(SourceUnavailable("no known peers".into())),
            Err(e) => Err(SourceUnavailable(e.to_string())),
        }
    }
}
