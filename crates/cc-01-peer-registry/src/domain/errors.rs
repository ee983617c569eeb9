//! Domain errors for the peer registry.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A registry must be able to hold at least one peer.
    #[error("max_peers must be at least 1")]
    InvalidCapacity,

    /// The peer-directory service could not be reached.
    #[error("Peer directory unreachable: {0}")]
    DirectoryUnavailable(String),

    /// The peer-directory service answered with something other than a peer list.
    #[error("Peer directory returned an invalid listing: {0}")]
    InvalidListing(String),
}
