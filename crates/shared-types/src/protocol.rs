//! # Wire Protocol
//!
//! Every message on a node connection is one JSON record per line, with a
//! required `type` field naming the operation.
//!
//! | Request | Reply |
//! |---------|-------|
//! | `requestBlockchain` | `sendBlockchain` |
//! | `spreadBlock` | - |
//! | `getPeers` | `sendPeers` |
//! | `mineRequest` | `mineResponse` |
//! | `newBlock` | - |
//! | `newTransaction` | - |
//! | `getBalance` | `dataResponse` |
//! | `getNFTs` | `dataResponse` |

use crate::entities::{Block, PeerAddress, PendingEntry, Transaction};
use crate::errors::ProtocolError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Longest accepted message line, in bytes.
pub const MAX_MESSAGE_BYTES: usize = 16 * 1024 * 1024;

/// A block relayed between peers after acceptance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockAnnouncement {
    #[serde(rename = "newBlock")]
    pub new_block: Block,
    /// Digest claimed by the origin.
    pub proof: String,
}

/// A block submitted by a mining client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinedBlock {
    pub newblock: Block,
    /// Digest claimed by the miner.
    pub proof: String,
    /// Miner identity.
    #[serde(default)]
    pub miner: String,
}

/// A transfer as submitted by a wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletTransaction {
    pub from: String,
    pub to: String,
    pub amount: f64,
    #[serde(default)]
    pub signature: String,
    #[serde(default)]
    pub data: Value,
}

impl WalletTransaction {
    /// Convert to the chain's transaction record.
    pub fn into_transaction(self) -> Transaction {
        Transaction {
            from_address: self.from,
            to_address: self.to,
            amount: self.amount,
            signature: self.signature,
            data: self.data,
        }
    }
}

/// The closed set of messages a node sends or receives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Message {
    /// Ask a peer for its full chain.
    RequestBlockchain,
    /// Full chain reply.
    SendBlockchain { blockchain: Vec<Block> },
    /// Peer-to-peer relay of an accepted block.
    SpreadBlock { data: BlockAnnouncement },
    /// "Who do you know": carries the requester's own address.
    GetPeers { requester: PeerAddress },
    /// Known-peer list reply.
    SendPeers { peers: Vec<PeerAddress> },
    /// A miner asks for work.
    MineRequest,
    /// Work handed to a miner; `transaction` is null when the pool is empty.
    MineResponse {
        transaction: Option<PendingEntry>,
        #[serde(rename = "latestBlock")]
        latest_block: Block,
    },
    /// A miner submits a solved block.
    NewBlock { blocks: MinedBlock },
    /// A wallet submits a transfer.
    NewTransaction {
        transaction: WalletTransaction,
        #[serde(default)]
        data: Value,
        #[serde(rename = "publicKey", default)]
        public_key: String,
    },
    /// Balance query; `data` holds the address.
    GetBalance { data: String },
    /// Asset query for an address.
    #[serde(rename = "getNFTs")]
    GetNfts { address: String },
    /// Generic query reply.
    DataResponse { data: Value },
}

impl Message {
    /// Wire name of the message type.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::RequestBlockchain => "requestBlockchain",
            Message::SendBlockchain { .. } => "sendBlockchain",
            Message::SpreadBlock { .. } => "spreadBlock",
            Message::GetPeers { .. } => "getPeers",
            Message::SendPeers { .. } => "sendPeers",
            Message::MineRequest => "mineRequest",
            Message::MineResponse { .. } => "mineResponse",
            Message::NewBlock { .. } => "newBlock",
            Message::NewTransaction { .. } => "newTransaction",
            Message::GetBalance { .. } => "getBalance",
            Message::GetNfts { .. } => "getNFTs",
            Message::DataResponse { .. } => "dataResponse",
        }
    }

    /// Decode one message line.
    pub fn decode(line: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(line.trim()).map_err(ProtocolError::Malformed)
    }

    /// Encode as one newline-terminated line.
    pub fn encode_line(&self) -> Result<String, ProtocolError> {
        let mut line = serde_json::to_string(self).map_err(ProtocolError::Encode)?;
        line.push('\n');
        Ok(line)
    }
}
