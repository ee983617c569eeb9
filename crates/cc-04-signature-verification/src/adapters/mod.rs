//! # Adapters

pub mod attestation;
pub mod local;

pub use attestation::AttestationClient;
pub use local::LocalEcdsaAuthenticator;
