//! Outcome types returned by the ledger API.

use serde_json::Value;
use shared_types::{Block, PendingEntry};
use std::fmt;

/// Why a block was refused.
#[derive(Debug, Clone, PartialEq)]
pub enum RejectionReason {
    PreviousHashMismatch { expected: String, found: String },
    InvalidProof,
    InvalidSignature,
    WrongTransactionCount { found: usize },
    TooManyTransactions { found: usize },
    GasMismatch { expected: f64, operator: f64, miner: f64 },
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PreviousHashMismatch { expected, found } => {
                write!(f, "previous hash {found} does not match tail {expected}")
            }
            Self::InvalidProof => write!(f, "invalid proof of work"),
            Self::InvalidSignature => write!(f, "principal transaction signature invalid"),
            Self::WrongTransactionCount { found } => {
                write!(f, "expected 3 transactions, found {found}")
            }
            Self::TooManyTransactions { found } => {
                write!(f, "too many transactions ({found})")
            }
            Self::GasMismatch {
                expected,
                operator,
                miner,
            } => write!(
                f,
                "gas split {operator}/{miner} does not match expected {expected}"
            ),
        }
    }
}

/// Result of `add_block`.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockOutcome {
    Accepted { index: u64, hash: String },
    Rejected(RejectionReason),
}

impl BlockOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

/// Why a transaction was refused.
#[derive(Debug, Clone, PartialEq)]
pub enum TransactionRejection {
    NonPositiveAmount,
    MissingSignature,
    EmptyRecipient,
    SelfSpend,
    OperatorRecipient,
    InsufficientFunds { balance: f64, required: f64 },
}

impl fmt::Display for TransactionRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveAmount => write!(f, "amount must be positive"),
            Self::MissingSignature => write!(f, "transaction is not signed"),
            Self::EmptyRecipient => write!(f, "recipient is empty"),
            Self::SelfSpend => write!(f, "sender and recipient are the same"),
            Self::OperatorRecipient => write!(f, "the node operator cannot receive transfers"),
            Self::InsufficientFunds { balance, required } => {
                write!(f, "balance {balance} is below required {required}")
            }
        }
    }
}

/// Result of `add_transaction`.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionOutcome {
    pub accepted: bool,
    pub reason: Option<TransactionRejection>,
}

impl TransactionOutcome {
    pub fn accepted() -> Self {
        Self {
            accepted: true,
            reason: None,
        }
    }

    pub fn rejected(reason: TransactionRejection) -> Self {
        Self {
            accepted: false,
            reason: Some(reason),
        }
    }
}

/// Where the chain in use after `initialize` came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainOrigin {
    /// Adopted from the named peer.
    Peer(String),
    /// Loaded from local storage.
    Local,
    /// Freshly mined genesis block.
    Genesis,
}

/// Work handed to a mining client.
#[derive(Debug, Clone, PartialEq)]
pub struct Work {
    pub transaction: Option<PendingEntry>,
    pub latest_block: Block,
}

/// Non-null payloads, as returned by asset queries.
pub type Assets = Vec<Value>;
