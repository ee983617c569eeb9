//! # Gossip Subsystem (cc-05)
//!
//! Outbound side of the node protocol: fire-and-forget block broadcast,
//! "who do you know" peer exchange, and whole-chain fetch at bootstrap.
//!
//! ## Framing
//!
//! One JSON [`Message`](shared_types::Message) per `\n`-terminated line, at
//! most [`MAX_MESSAGE_BYTES`](shared_types::MAX_MESSAGE_BYTES) long. The same
//! framing is used by the inbound listener in `node-runtime`.
//!
//! ## Failure Model
//!
//! Every connect, write and read is bounded by a timeout. A broadcast sends
//! to all peers concurrently; each peer's failure is recorded in the
//! [`BroadcastReport`] and never affects delivery to the others. Nothing is
//! retried.

pub mod domain;
pub mod framing;
pub mod service;

pub use domain::config::GossipConfig;
pub use domain::errors::{FrameError, GossipError};
pub use domain::report::{BroadcastReport, PeerFailure};
pub use framing::{read_message, write_message};
pub use service::GossipService;
