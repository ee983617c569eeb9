//! # Domain Layer - Proof of Work

pub mod difficulty;
pub mod errors;
pub mod miner;

pub use difficulty::{meets_difficulty, Difficulty};
pub use errors::PowError;
pub use miner::{ProofOfWork, Solution};
