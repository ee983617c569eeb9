//! # Gossip Service
//!
//! Opens one short-lived outbound connection per exchange. Request/reply
//! exchanges (`getPeers`, `requestBlockchain`) read exactly one reply line
//! before closing.

use crate::domain::config::GossipConfig;
use crate::domain::errors::{FrameError, GossipError};
use crate::domain::report::{BroadcastReport, PeerFailure};
use crate::framing::{read_message, write_message};
use cc_01_peer_registry::PeerRegistry;
use shared_types::{Block, Message, PeerAddress};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::task::JoinSet;

/// Outbound gossip over the peers in a registry.
#[derive(Debug, Clone)]
pub struct GossipService {
    registry: Arc<PeerRegistry>,
    config: GossipConfig,
}

impl GossipService {
    pub fn new(registry: Arc<PeerRegistry>, config: GossipConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &Arc<PeerRegistry> {
        &self.registry
    }

    pub fn config(&self) -> GossipConfig {
        self.config
    }

    // =========================================================================
    // SINGLE-PEER EXCHANGES
    // =========================================================================

    /// Deliver `message` to `peer` and close.
    pub async fn send(&self, peer: &PeerAddress, message: &Message) -> Result<(), GossipError> {
        let mut stream = self.connect(peer).await?;
        bounded(peer, "writing to", self.config.io_timeout, async {
            write_message(&mut stream, message).await?;
            stream.shutdown().await?;
            Ok::<(), FrameError>(())
        })
        .await
    }

    /// Send `message` and wait for one reply.
    pub async fn request(
        &self,
        peer: &PeerAddress,
        message: &Message,
    ) -> Result<Message, GossipError> {
        let mut stream = self.connect(peer).await?;
        bounded(peer, "writing to", self.config.io_timeout, async {
            write_message(&mut stream, message).await
        })
        .await?;

        let mut reader = BufReader::new(stream);
        let reply = bounded(peer, "awaiting reply from", self.config.io_timeout, async {
            read_message(&mut reader).await
        })
        .await?;
        reply.ok_or_else(|| GossipError::Closed { peer: peer.clone() })
    }

    async fn connect(&self, peer: &PeerAddress) -> Result<TcpStream, GossipError> {
        let target = (peer.host.as_str(), peer.port);
        match tokio::time::timeout(self.config.connect_timeout, TcpStream::connect(target)).await
        {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(source)) => Err(GossipError::Connect {
                peer: peer.clone(),
                source,
            }),
            Err(_) => Err(GossipError::Timeout {
                peer: peer.clone(),
                phase: "connecting to",
            }),
        }
    }

    // =========================================================================
    // GOSSIP OPERATIONS
    // =========================================================================

    /// Send `message` to every known peer concurrently.
    pub async fn broadcast(&self, message: Message) -> BroadcastReport {
        let peers = self.registry.peers();
        let kind = message.kind();
        let message = Arc::new(message);
        let mut tasks = JoinSet::new();
        for peer in peers {
            let service = self.clone();
            let message = Arc::clone(&message);
            tasks.spawn(async move {
                let outcome = service.send(&peer, &message).await;
                (peer, outcome)
            });
        }

        let mut report = BroadcastReport::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((peer, Ok(()))) => report.delivered.push(peer),
                Ok((peer, Err(e))) => {
                    tracing::warn!(%peer, kind, error = %e, "Broadcast delivery failed");
                    report.failed.push(PeerFailure {
                        peer,
                        reason: e.to_string(),
                    });
                }
                Err(e) => tracing::error!(kind, error = %e, "Broadcast task aborted"),
            }
        }
        tracing::info!(
            kind,
            delivered = report.delivered.len(),
            failed = report.failed.len(),
            "Broadcast finished"
        );
        report
    }

    /// Ask one random known peer who it knows and merge the answer.
    ///
    /// Returns how many new peers were learned.
    pub async fn discover_peers(&self) -> Result<usize, GossipError> {
        let peer = self.registry.random_peer().ok_or(GossipError::NoPeers)?;
        let request = Message::GetPeers {
            requester: self.registry.self_address().clone(),
        };
        match self.request(&peer, &request).await? {
            Message::SendPeers { peers } => {
                let added = self.registry.merge(peers);
                tracing::info!(%peer, added, known = self.registry.len(), "Peer discovery finished");
                Ok(added)
            }
            other => Err(GossipError::UnexpectedReply {
                peer,
                expected: "sendPeers",
                got: other.kind(),
            }),
        }
    }

    /// Fetch `peer`'s full chain.
    pub async fn fetch_chain(&self, peer: &PeerAddress) -> Result<Vec<Block>, GossipError> {
        match self.request(peer, &Message::RequestBlockchain).await? {
            Message::SendBlockchain { blockchain } => {
                tracing::debug!(%peer, length = blockchain.len(), "Fetched remote chain");
                Ok(blockchain)
            }
            other => Err(GossipError::UnexpectedReply {
                peer: peer.clone(),
                expected: "sendBlockchain",
                got: other.kind(),
            }),
        }
    }

    /// Fetch the chain of one random known peer.
    pub async fn fetch_chain_from_random_peer(
        &self,
    ) -> Result<(PeerAddress, Vec<Block>), GossipError> {
        let peer = self.registry.random_peer().ok_or(GossipError::NoPeers)?;
        let chain = self.fetch_chain(&peer).await?;
        Ok((peer, chain))
    }
}

/// Run a framed I/O step under `limit`, tagging failures with the peer.
async fn bounded<T, F>(
    peer: &PeerAddress,
    phase: &'static str,
    limit: Duration,
    step: F,
) -> Result<T, GossipError>
where
    F: Future<Output = Result<T, FrameError>>,
{
    match tokio::time::timeout(limit, step).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(source)) => Err(GossipError::Frame {
            peer: peer.clone(),
            source,
        }),
        Err(_) => Err(GossipError::Timeout {
            peer: peer.clone(),
            phase,
        }),
    }
}
