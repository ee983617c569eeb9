//! # Peer Registry
//!
//! A capped set of `PeerAddress` values keyed by (host, port).

use super::errors::RegistryError;
use crate::ports::outbound::PeerDirectory;
use parking_lot::RwLock;
use rand::seq::IteratorRandom;
use shared_types::PeerAddress;
use std::collections::{BTreeSet, HashSet};

/// Default registry capacity.
pub const DEFAULT_MAX_PEERS: usize = 128;

/// Registry configuration.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// This node's advertised address.
    pub self_address: PeerAddress,
    /// Addresses that are never peers (e.g. wallet-only endpoints).
    pub reserved: Vec<PeerAddress>,
    pub max_peers: usize,
}

impl RegistryConfig {
    pub fn new(self_address: PeerAddress) -> Self {
        Self {
            self_address,
            reserved: Vec::new(),
            max_peers: DEFAULT_MAX_PEERS,
        }
    }
}

/// Result of offering one address to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Added,
    AlreadyKnown,
    SelfAddress,
    Reserved,
    Full,
}

/// Known peers of this node.
#[derive(Debug)]
pub struct PeerRegistry {
    self_address: PeerAddress,
    reserved: HashSet<PeerAddress>,
    max_peers: usize,
    peers: RwLock<BTreeSet<PeerAddress>>,
}

impl PeerRegistry {
    pub fn new(config: RegistryConfig) -> Result<Self, RegistryError> {
        if config.max_peers == 0 {
            return Err(RegistryError::InvalidCapacity);
        }
        Ok(Self {
            self_address: config.self_address,
            reserved: config.reserved.into_iter().collect(),
            max_peers: config.max_peers,
            peers: RwLock::new(BTreeSet::new()),
        })
    }

    pub fn self_address(&self) -> &PeerAddress {
        &self.self_address
    }

    /// Offer a single address.
    pub fn learn(&self, peer: PeerAddress) -> Admission {
        if peer == self.self_address {
            return Admission::SelfAddress;
        }
        if self.reserved.contains(&peer) {
            return Admission::Reserved;
        }
        let mut peers = self.peers.write();
        if peers.contains(&peer) {
            return Admission::AlreadyKnown;
        }
        if peers.len() >= self.max_peers {
            tracing::warn!(%peer, max = self.max_peers, "Peer registry full, dropping peer");
            return Admission::Full;
        }
        tracing::debug!(%peer, "Learned peer");
        peers.insert(peer);
        Admission::Added
    }

    /// Merge a peer list; returns how many addresses were new.
    pub fn merge<I>(&self, peers: I) -> usize
    where
        I: IntoIterator<Item = PeerAddress>,
    {
        let added = peers
            .into_iter()
            .filter(|peer| self.learn(peer.clone()) == Admission::Added)
            .count();
        if added > 0 {
            tracing::info!(added, known = self.len(), "Merged peer list");
        }
        added
    }

    /// Snapshot of the known peers, sorted.
    pub fn peers(&self) -> Vec<PeerAddress> {
        self.peers.read().iter().cloned().collect()
    }

    /// One known peer chosen uniformly at random.
    pub fn random_peer(&self) -> Option<PeerAddress> {
        self.peers
            .read()
            .iter()
            .choose(&mut rand::thread_rng())
            .cloned()
    }

    pub fn contains(&self, peer: &PeerAddress) -> bool {
        self.peers.read().contains(peer)
    }

    pub fn len(&self) -> usize {
        self.peers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.read().is_empty()
    }

    /// Seed from the peer directory, skipping entries run by `operator`.
    pub async fn seed_from_directory(
        &self,
        directory: &dyn PeerDirectory,
        operator: &str,
    ) -> Result<usize, RegistryError> {
        let entries = directory.lookup().await?;
        let candidates = entries
            .into_iter()
            .filter(|entry| entry.user != operator)
            .map(|entry| entry.address());
        Ok(self.merge(candidates))
    }
}
