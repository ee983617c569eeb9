//! # Core Domain Entities
//!
//! ## Clusters
//!
//! - **Chain**: `Block`, `Transaction`
//! - **Pool**: `PendingEntry`
//! - **Networking**: `PeerAddress`
//!
//! Field names serialize in camelCase to stay wire-compatible with existing
//! wallets, miners and peers.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Share of a principal transfer charged as gas (split node/miner).
pub const FEE_RATE: f64 = 0.15;

/// Number of transactions in a mined block: principal + two gas transfers.
pub const MINED_BLOCK_TX_COUNT: usize = 3;

/// Index of the principal transfer inside a mined block.
pub const PRINCIPAL_TX: usize = 0;
/// Index of the gas transfer paid to the node operator.
pub const OPERATOR_GAS_TX: usize = 1;
/// Index of the gas transfer paid to the miner.
pub const MINER_GAS_TX: usize = 2;

/// `previousHash` of the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";

/// Gas owed to each of the operator and the miner for a principal `amount`.
#[inline]
pub fn gas_share(amount: f64) -> f64 {
    amount * FEE_RATE / 2.0
}

/// Total a sender must hold to submit a transfer of `amount`.
#[inline]
pub fn required_funds(amount: f64) -> f64 {
    amount + amount * FEE_RATE
}

// =============================================================================
// CLUSTER A: THE CHAIN
// =============================================================================

/// A value transfer between two identities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Sender identity.
    pub from_address: String,
    /// Receiver identity.
    pub to_address: String,
    /// Transferred amount (non-negative).
    pub amount: f64,
    /// Hex-encoded signature; required for the principal transaction.
    #[serde(default)]
    pub signature: String,
    /// Opaque application payload (e.g. an NFT record).
    #[serde(default)]
    pub data: Value,
}

/// The fields a wallet signs, in canonical form.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SigningPayload<'a> {
    from_address: &'a str,
    to_address: &'a str,
    amount: f64,
    data: &'a Value,
}

impl Transaction {
    /// Create an unsigned transfer without payload.
    pub fn new(from: impl Into<String>, to: impl Into<String>, amount: f64) -> Self {
        Self {
            from_address: from.into(),
            to_address: to.into(),
            amount,
            signature: String::new(),
            data: Value::Null,
        }
    }

    /// Attach an application payload.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    /// Attach a hex-encoded signature.
    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = signature.into();
        self
    }

    /// Bytes covered by the sender's signature.
    ///
    /// Only sender, receiver, amount and payload are signed; the signature
    /// itself and any block-level fields are excluded.
    pub fn signing_payload(&self) -> Vec<u8> {
        let payload = SigningPayload {
            from_address: &self.from_address,
            to_address: &self.to_address,
            amount: self.amount,
            data: &self.data,
        };
        let value = serde_json::to_value(&payload).unwrap_or(Value::Null);
        crate::hashing::canonical_bytes(&value)
    }

    /// True if the transaction carries a signature.
    pub fn is_signed(&self) -> bool {
        !self.signature.is_empty()
    }
}

/// A block of the chain.
///
/// Immutable once its hash has been computed; integrity is by hash linkage
/// (`previous_hash`), `index` is informational.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Position in the chain.
    pub index: u64,
    /// Ordered transactions: principal, operator gas, miner gas.
    pub transactions: Vec<Transaction>,
    /// Creation time, milliseconds since the Unix epoch.
    pub timestamp: u64,
    /// Hex digest of the previous block.
    pub previous_hash: String,
    /// Proof-of-work counter.
    #[serde(default)]
    pub nonce: u64,
    /// Free-form metadata.
    #[serde(default)]
    pub data: Value,
    /// Hex SEC1 public key of the principal transaction's signer.
    #[serde(default)]
    pub public_key: String,
}

impl Block {
    /// Create a block with nonce 0, no metadata and no signer key.
    pub fn new(
        index: u64,
        transactions: Vec<Transaction>,
        timestamp: u64,
        previous_hash: impl Into<String>,
    ) -> Self {
        Self {
            index,
            transactions,
            timestamp,
            previous_hash: previous_hash.into(),
            nonce: 0,
            data: Value::Null,
            public_key: String::new(),
        }
    }

    /// The genesis block for an operator, before mining.
    pub fn genesis(timestamp: u64, operator: &str) -> Self {
        let mut block = Self::new(0, Vec::new(), timestamp, GENESIS_PREVIOUS_HASH);
        block.data = Value::String(operator.to_string());
        block
    }

    /// Attach block metadata.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    /// Attach the principal signer's key.
    pub fn with_public_key(mut self, public_key: impl Into<String>) -> Self {
        self.public_key = public_key.into();
        self
    }

    /// The principal transfer, if present.
    pub fn principal(&self) -> Option<&Transaction> {
        self.transactions.get(PRINCIPAL_TX)
    }

    /// Hex digest of this block. See [`crate::compute_hash`].
    pub fn hash(&self) -> String {
        crate::hashing::compute_hash(self)
    }
}

// =============================================================================
// CLUSTER B: THE POOL
// =============================================================================

/// A submitted transaction waiting to be handed to a miner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingEntry {
    /// Index the mined block is expected to take.
    pub index: u64,
    /// The principal transfer.
    pub transaction: Transaction,
    /// Submission time, milliseconds since the Unix epoch.
    pub timestamp: u64,
    /// Block-level metadata supplied by the wallet.
    #[serde(default)]
    pub data: Value,
    /// Identity of the node that accepted the submission.
    pub node: String,
    /// Hex SEC1 public key of the sender.
    #[serde(default)]
    pub public_key: String,
}

// =============================================================================
// CLUSTER C: NETWORKING
// =============================================================================

/// Network address of a peer node; equality is by (host, port).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PeerAddress {
    /// Hostname or IP literal.
    pub host: String,
    /// TCP port.
    pub port: u16,
}

impl PeerAddress {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Parse `"host:port"`.
    pub fn parse(s: &str) -> Option<Self> {
        let (host, port) = s.rsplit_once(':')?;
        if host.is_empty() {
            return None;
        }
        Some(Self::new(host, port.parse().ok()?))
    }
}

impl fmt::Display for PeerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
