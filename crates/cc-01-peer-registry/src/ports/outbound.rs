//! # Outbound Ports

use crate::domain::errors::RegistryError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_types::PeerAddress;

/// One row of the peer-directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub host: String,
    pub port: u16,
    /// Identity of the node's operator.
    #[serde(default)]
    pub user: String,
}

impl DirectoryEntry {
    pub fn address(&self) -> PeerAddress {
        PeerAddress::new(self.host.clone(), self.port)
    }
}

/// Remote lookup returning candidate peers.
#[async_trait]
pub trait PeerDirectory: Send + Sync {
    async fn lookup(&self) -> Result<Vec<DirectoryEntry>, RegistryError>;
}
