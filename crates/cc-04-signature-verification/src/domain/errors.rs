//! # Signature Errors

use thiserror::Error;

/// Reasons a signature check fails.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// No signature was supplied.
    #[error("Missing signature")]
    MissingSignature,

    /// The signature is not valid hex, DER or 64-byte compact form.
    #[error("Invalid signature format")]
    InvalidFormat,

    /// The public key is not a valid SEC1 secp256k1 point.
    #[error("Invalid public key")]
    InvalidPublicKey,

    /// Signature has a high S value.
    #[error("Malleable signature (high S value)")]
    MalleableSignature,

    /// Signature does not match payload and key.
    #[error("Signature verification failed")]
    VerificationFailed,

    /// The attestation service could not be reached or refused.
    #[error("Attestation failed: {0}")]
    Attestation(String),
}
