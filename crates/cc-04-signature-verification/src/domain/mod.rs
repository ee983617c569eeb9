//! # Domain Layer - Signature Verification

pub mod ecdsa;
pub mod errors;
