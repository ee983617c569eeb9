//! # Shared Types Crate
//!
//! Record layouts shared by every subsystem of the node, and the one place
//! where the canonical block hash is defined.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: `Block`, `Transaction`, `PendingEntry` and
//!   `PeerAddress` are defined here and nowhere else.
//! - **Canonical Hashing**: A block's identity is the SHA-256 of its canonical
//!   form (sorted-key JSON), so field order never affects the digest.
//! - **Closed Message Set**: The wire protocol is a tagged enum decoded once at
//!   the connection boundary and matched exhaustively by the dispatcher.

pub mod entities;
pub mod errors;
pub mod hashing;
pub mod protocol;

pub use entities::*;
pub use errors::*;
pub use hashing::{compute_hash, from_canonical_form, to_canonical_form};
pub use protocol::*;
