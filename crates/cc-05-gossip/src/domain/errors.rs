//! # Gossip Errors

use shared_types::errors::ProtocolError;
use shared_types::PeerAddress;
use thiserror::Error;

/// Errors reading or writing one framed message.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The line exceeds the maximum message size; the stream is unusable.
    #[error("Message exceeds {limit} bytes")]
    TooLong { limit: usize },

    /// The line is not a recognised message; the stream is still usable.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl FrameError {
    /// True if the connection can keep being read after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, FrameError::Protocol(ProtocolError::Malformed(_)))
    }
}

/// Failures talking to one peer.
#[derive(Debug, Error)]
pub enum GossipError {
    #[error("Failed to connect to {peer}: {source}")]
    Connect {
        peer: PeerAddress,
        #[source]
        source: std::io::Error,
    },

    #[error("Timed out {phase} {peer}")]
    Timeout {
        peer: PeerAddress,
        phase: &'static str,
    },

    #[error("Framing error with {peer}: {source}")]
    Frame {
        peer: PeerAddress,
        #[source]
        source: FrameError,
    },

    #[error("{peer} closed the connection before replying")]
    Closed { peer: PeerAddress },

    #[error("{peer} replied with {got}, expected {expected}")]
    UnexpectedReply {
        peer: PeerAddress,
        expected: &'static str,
        got: &'static str,
    },

    #[error("No known peers")]
    NoPeers,
}

impl GossipError {
    /// The peer involved, if any.
    pub fn peer(&self) -> Option<&PeerAddress> {
        match self {
            Self::Connect { peer, .. }
            | Self::Timeout { peer, .. }
            | Self::Frame { peer, .. }
            | Self::Closed { peer }
            | Self::UnexpectedReply { peer, .. } => Some(peer),
            Self::NoPeers => None,
        }
    }
}
