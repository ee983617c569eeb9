//! # Proof-of-Work Engine (cc-03)
//!
//! Computes and verifies difficulty-bounded block hashes.
//!
//! ## Difficulty
//!
//! Difficulty is the minimum number of leading `'0'` characters in a block's
//! lowercase hex digest. Each extra digit multiplies expected work by 16.
//!
//! ## Operations
//!
//! | Operation | Behaviour |
//! |-----------|-----------|
//! | `mine` | Sequential search from nonce 0 upwards |
//! | `mine_parallel` | Nonce space interleaved across worker threads, first hit wins |
//! | `verify` | Claimed digest has the zeros AND equals the recomputed hash |
//!
//! The validator does not care which nonce was used, only that the predicate
//! holds for the claimed digest.

pub mod domain;

pub use domain::{meets_difficulty, Difficulty, PowError, ProofOfWork, Solution};

/// Difficulty the reference network runs at.
pub const DEFAULT_DIFFICULTY: u8 = 2;
