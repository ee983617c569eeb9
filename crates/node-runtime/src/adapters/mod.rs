//! # Adapter Implementations
//!
//! Concrete implementations of the chain manager's outbound ports:
//!
//! | Port | Adapter | Backed by |
//! |------|---------|-----------|
//! | `BlockBroadcaster` | `GossipBroadcaster` | cc-05 broadcast |
//! | `ChainSource` | `GossipChainSource` | cc-05 chain fetch from a random peer |

pub mod gossip;

pub use gossip::{GossipBroadcaster, GossipChainSource};
