//! # Peer Registry Subsystem (cc-01)
//!
//! Tracks the set of peer nodes this node knows about.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): the registry set and its admission rules
//! - **Ports Layer** (`ports/`): `PeerDirectory`, the driven port for the
//!   remote peer-directory lookup
//! - **Adapters** (`adapters/`): HTTP implementation of `PeerDirectory`
//!
//! ## Admission Rules
//!
//! | Candidate | Outcome |
//! |-----------|---------|
//! | already known (same host and port) | no change |
//! | the node's own advertised address | never added |
//! | a reserved pseudo-peer (e.g. a wallet endpoint) | never added |
//! | registry at `max_peers` | dropped, logged |
//!
//! Entries never expire.

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::HttpPeerDirectory;
pub use domain::errors::RegistryError;
pub use domain::registry::{Admission, PeerRegistry, RegistryConfig, DEFAULT_MAX_PEERS};
pub use ports::outbound::{DirectoryEntry, PeerDirectory};
