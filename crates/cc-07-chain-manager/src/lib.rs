//! # Chain Manager Subsystem (cc-07)
//!
//! Owns the node's canonical chain and enforces every ledger rule.
//!
//! ## Block Validation Pipeline
//!
//! Short-circuits at the first failure, in this order:
//!
//! | Step | Check | Rejection |
//! |------|-------|-----------|
//! | 1 | `previousHash` equals the hash of the current tail | `PreviousHashMismatch` |
//! | 2 | claimed proof meets the difficulty and equals the block hash | `InvalidProof` |
//! | 3 | principal transaction authorised by `publicKey` | `InvalidSignature` |
//! | 4 | fewer than three transactions | `WrongTransactionCount` |
//! | 5 | more than three transactions | `TooManyTransactions` |
//! | 6 | both gas transfers equal `principal * 0.15 / 2` | `GasMismatch` |
//!
//! An accepted block is appended, the whole chain is persisted, and only
//! blocks submitted by a mining client are broadcast to peers.
//!
//! ## Concurrency
//!
//! The chain lives behind one async mutex held across read-validate-write,
//! so two concurrently submitted blocks can never both extend the same tail.
//!
//! ## Crate Structure
//!
//! - `domain/` - pure ledger rules and outcome types
//! - `ports/` - `LedgerApi` (inbound), `BlockBroadcaster` / `ChainSource` (outbound)
//! - `service.rs` - `ChainManager`, the stateful implementation

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::errors::{ChainError, SourceUnavailable};
pub use domain::ledger::{assets_of, balance_of, validate_chain, ChainFault};
pub use domain::outcomes::{
    Assets, BlockOutcome, ChainOrigin, RejectionReason, TransactionOutcome, TransactionRejection,
    Work,
};
pub use ports::inbound::LedgerApi;
pub use ports::outbound::{BlockBroadcaster, ChainSource, RemoteChain};
pub use service::{ChainManager, ChainManagerConfig, Collaborators};
