//! # Subsystem Container
//!
//! Builds every subsystem from a `NodeConfig` and wires them together.
//!
//! ## Initialization Order
//!
//! ```text
//! Level 0: Chain Storage, Proof of Work, Signature Verification
//! Level 1: Peer Registry, Transaction Pool
//! Level 2: Gossip (registry)
//! Level 3: Chain Manager (storage, PoW, signatures, pool, gossip adapters)
//! ```
//!
//! ## Thread Safety
//!
//! Everything is shared through `Arc`; each subsystem serializes its own
//! mutations internally.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use cc_01_peer_registry::{HttpPeerDirectory, PeerRegistry, RegistryConfig};
use cc_02_chain_storage::{BlobStore, FileBlobStore};
use cc_03_proof_of_work::ProofOfWork;
use cc_04_signature_verification::{
    AttestationClient, LocalEcdsaAuthenticator, TransactionAuthenticator,
};
use cc_05_gossip::{GossipConfig, GossipService};
use cc_06_mempool::TransactionPool;
use cc_07_chain_manager::{ChainManager, ChainManagerConfig, Collaborators};

use crate::adapters::{GossipBroadcaster, GossipChainSource};
use crate::container::config::{NodeConfig, SignatureMode};

/// All subsystem instances of one node.
pub struct SubsystemContainer {
    pub config: NodeConfig,
    pub registry: Arc<PeerRegistry>,
    pub gossip: GossipService,
    pub pool: Arc<TransactionPool>,
    pub chain: Arc<ChainManager>,
    /// Present only when a peer-directory URL is configured.
    pub directory: Option<HttpPeerDirectory>,
}

impl SubsystemContainer {
    /// Build with file-backed storage under `config.storage.data_dir`.
    pub fn new(config: NodeConfig) -> Result<Self> {
        let store = FileBlobStore::open(config.storage.data_dir.clone()).with_context(|| {
            format!(
                "Failed to open data directory {}",
                config.storage.data_dir.display()
            )
        })?;
        Self::with_store(config, Arc::new(store))
    }

    /// Build on top of an existing blob store.
    pub fn with_store(config: NodeConfig, store: Arc<dyn BlobStore>) -> Result<Self> {
        // Level 0
        let pow = ProofOfWork::with_zeros(config.consensus.difficulty)
            .context("Invalid consensus.difficulty")?;
        let authenticator = build_authenticator(&config)?;

        // Level 1
        let registry = Arc::new(
            PeerRegistry::new(RegistryConfig {
                self_address: config.self_address(),
                reserved: config.reserved_peers()?,
                max_peers: config.network.max_peers,
            })
            .context("Invalid peer registry configuration")?,
        );
        registry.merge(config.seed_peers()?);
        let pool = Arc::new(
            TransactionPool::open(Arc::clone(&store)).context("Failed to load pending pool")?,
        );

        // Level 2
        let gossip = GossipService::new(
            Arc::clone(&registry),
            GossipConfig {
                connect_timeout: config.connect_timeout(),
                io_timeout: config.io_timeout(),
            },
        );
        let directory = config
            .services
            .peer_directory_url
            .as_ref()
            .map(|url| HttpPeerDirectory::new(url.clone(), config.io_timeout()))
            .transpose()
            .context("Failed to build peer directory client")?;

        // Level 3
        let chain = Arc::new(ChainManager::new(
            ChainManagerConfig {
                pow,
                operator: config.node.operator.clone(),
                mining_workers: config.consensus.mining_workers.max(1),
            },
            Collaborators {
                store,
                pool: Arc::clone(&pool),
                authenticator,
                broadcaster: Arc::new(GossipBroadcaster::new(gossip.clone())),
                source: Arc::new(GossipChainSource::new(gossip.clone())),
            },
        ));

        info!(
            self_address = %config.self_address(),
            seeds = registry.len(),
            difficulty = config.consensus.difficulty,
            signature_mode = ?config.services.signature_mode,
            "Subsystems initialized"
        );

        Ok(Self {
            config,
            registry,
            gossip,
            pool,
            chain,
            directory,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.config.storage.data_dir
    }
}

fn build_authenticator(config: &NodeConfig) -> Result<Arc<dyn TransactionAuthenticator>> {
    match config.services.signature_mode {
        SignatureMode::Local => Ok(Arc::new(LocalEcdsaAuthenticator::new())),
        SignatureMode::Attestation => {
            let url = config
                .services
                .attestation_url
                .clone()
                .context("services.attestation_url is required in attestation mode")?;
            let client = AttestationClient::new(url, config.io_timeout())
                .context("Failed to build attestation client")?;
            Ok(Arc::new(client))
        }
    }
}
