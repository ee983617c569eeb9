//! # Node Runtime Library
//!
//! Wires the subsystems into a running node. The binary entry point is
//! `main.rs`; everything here is exposed for integration tests.
//!
//! ## Modules
//!
//! - `container/` - configuration and subsystem construction
//! - `adapters/` - chain-manager ports implemented over gossip
//! - `handlers/` - the protocol dispatcher
//! - `wiring/` - the TCP listener feeding the dispatcher
//!
//! ## Startup Sequence
//!
//! 1. Seed the peer registry (config seeds, else the peer directory)
//! 2. Run one round of peer discovery
//! 3. Initialize the chain (bootstrap from a peer, local load, or genesis)
//! 4. Bind the listener and start accepting connections

pub mod adapters;
pub mod container;
pub mod handlers;
pub mod wiring;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::container::{NodeConfig, SubsystemContainer};
use crate::handlers::Dispatcher;
use crate::wiring::NodeListener;

/// A node: its subsystems plus the listener lifecycle.
pub struct NodeRuntime {
    container: Arc<SubsystemContainer>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl NodeRuntime {
    /// Build a node with file-backed storage.
    pub fn new(config: NodeConfig) -> Result<Self> {
        Ok(Self::from_container(SubsystemContainer::new(config)?))
    }

    pub fn from_container(container: SubsystemContainer) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            container: Arc::new(container),
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Run the startup sequence; returns the address the listener bound.
    pub async fn start(&self) -> Result<SocketAddr> {
        let config = &self.container.config;
        info!("===========================================");
        info!("  Coders-Chain Node v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");

        self.bootstrap_peers().await;

        let origin = self
            .container
            .chain
            .initialize(config.node.force_bootstrap)
            .await
            .context("Failed to initialize chain")?;
        info!(
            ?origin,
            length = self.container.chain.len().await,
            pending = self.container.pool.len(),
            "Chain ready"
        );

        let dispatcher = Dispatcher::new(
            self.container.chain.clone(),
            Arc::clone(&self.container.registry),
        );
        let bind_addr = format!("{}:{}", config.network.listen_host, config.network.p2p_port);
        let listener = NodeListener::bind(&bind_addr, dispatcher, config.io_timeout())
            .await
            .with_context(|| format!("Failed to bind {bind_addr}"))?;
        let local = listener.local_addr()?;
        tokio::spawn(listener.run(self.shutdown_rx.clone()));

        info!(%local, data_dir = %self.container.data_dir().display(), "Node started");
        Ok(local)
    }

    async fn bootstrap_peers(&self) {
        let registry = &self.container.registry;
        if registry.is_empty() {
            if let Some(directory) = &self.container.directory {
                match registry
                    .seed_from_directory(directory, &self.container.config.node.operator)
                    .await
                {
                    Ok(added) => info!(added, "Seeded peers from directory"),
                    Err(e) => warn!(error = %e, "Peer directory lookup failed"),
                }
            }
        }
        if registry.is_empty() {
            info!("No peers known; running standalone");
            return;
        }
        if let Err(e) = self.container.gossip.discover_peers().await {
            warn!(error = %e, "Initial peer discovery failed");
        }
    }

    /// Stop accepting connections.
    pub fn shutdown(&self) {
        info!("Initiating shutdown...");
        if self.shutdown_tx.send(true).is_err() {
            warn!("Listener already stopped");
        }
    }

    pub fn container(&self) -> Arc<SubsystemContainer> {
        Arc::clone(&self.container)
    }
}
