//! # Signature Verification Subsystem (cc-04)
//!
//! Decides whether a block's principal transaction was authorised by its
//! sender.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): secp256k1 ECDSA over the transaction's
//!   signing payload, no I/O
//! - **Ports Layer** (`ports/`): `TransactionAuthenticator` trait consumed by
//!   the chain manager
//! - **Adapters** (`adapters/`): local ECDSA authenticator and the HTTP
//!   attestation-service client
//!
//! ## Security Notes
//!
//! - Only sender, receiver, amount and payload are signed, never the block
//! - Malformed keys or signatures yield `false`, never a fault that aborts
//!   block processing
//! - High-S signatures are rejected (malleability)

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::{AttestationClient, LocalEcdsaAuthenticator};
pub use domain::ecdsa::{
    public_key_hex, sign_payload, sign_transaction, verify, verify_detailed, verify_transaction,
};
pub use domain::errors::SignatureError;
pub use ports::inbound::TransactionAuthenticator;
