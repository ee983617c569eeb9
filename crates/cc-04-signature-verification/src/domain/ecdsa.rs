//! # ECDSA Verification (secp256k1)
//!
//! Pure domain logic: a wallet signs the canonical signing payload of its
//! transaction (SHA-256 digest, secp256k1 ECDSA) and ships the signature as
//! hex, either DER or 64-byte compact `r || s`. The public key is SEC1 hex,
//! compressed or uncompressed.
//!
//! ## Security Notes
//!
//! - **Malleability**: high-S signatures are rejected outright
//! - Any malformed input is a failed verification, never a panic

use super::errors::SignatureError;
use k256::ecdsa::signature::{Signer, Verifier};
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};
use shared_types::Transaction;

/// Compact `r || s` signature length.
const COMPACT_SIGNATURE_LEN: usize = 64;

// =============================================================================
// VERIFICATION
// =============================================================================

/// True iff `signature_hex` is a valid signature of `payload` under
/// `public_key_hex`.
pub fn verify(payload: &[u8], public_key_hex: &str, signature_hex: &str) -> bool {
    verify_detailed(payload, public_key_hex, signature_hex).is_ok()
}

/// Like [`verify`], but says why a signature was refused.
pub fn verify_detailed(
    payload: &[u8],
    public_key_hex: &str,
    signature_hex: &str,
) -> Result<(), SignatureError> {
    if signature_hex.is_empty() {
        return Err(SignatureError::MissingSignature);
    }
    let key = parse_public_key(public_key_hex)?;
    let signature = parse_signature(signature_hex)?;

    // normalize_s returns Some only when S was in the upper half.
    if signature.normalize_s().is_some() {
        return Err(SignatureError::MalleableSignature);
    }

    key.verify(payload, &signature)
        .map_err(|_| SignatureError::VerificationFailed)
}

/// Verify a transaction's own signature against the sender's public key.
pub fn verify_transaction(transaction: &Transaction, public_key_hex: &str) -> bool {
    let outcome = verify_detailed(
        &transaction.signing_payload(),
        public_key_hex,
        &transaction.signature,
    );
    if let Err(reason) = &outcome {
        tracing::debug!(from = %transaction.from_address, %reason, "Transaction signature refused");
    }
    outcome.is_ok()
}

fn parse_public_key(public_key_hex: &str) -> Result<VerifyingKey, SignatureError> {
    let bytes = hex::decode(public_key_hex.trim()).map_err(|_| SignatureError::InvalidPublicKey)?;
    VerifyingKey::from_sec1_bytes(&bytes).map_err(|_| SignatureError::InvalidPublicKey)
}

fn parse_signature(signature_hex: &str) -> Result<Signature, SignatureError> {
    let bytes = hex::decode(signature_hex.trim()).map_err(|_| SignatureError::InvalidFormat)?;
    if bytes.len() == COMPACT_SIGNATURE_LEN {
        Signature::from_slice(&bytes).map_err(|_| SignatureError::InvalidFormat)
    } else {
        Signature::from_der(&bytes).map_err(|_| SignatureError::InvalidFormat)
    }
}

// =============================================================================
// SIGNING (wallet side)
// =============================================================================

/// DER hex signature of `payload`.
pub fn sign_payload(key: &SigningKey, payload: &[u8]) -> String {
    let signature: Signature = key.sign(payload);
    hex::encode(signature.to_der().as_bytes())
}

/// Sign `transaction` in place of any existing signature.
pub fn sign_transaction(key: &SigningKey, transaction: Transaction) -> Transaction {
    let signature = sign_payload(key, &transaction.signing_payload());
    transaction.with_signature(signature)
}

/// Compressed SEC1 hex of the key's public half.
pub fn public_key_hex(key: &SigningKey) -> String {
    hex::encode(key.verifying_key().to_encoded_point(true).as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn key(seed: u8) -> SigningKey {
        SigningKey::from_slice(&[seed; 32]).unwrap()
    }

    #[test]
    fn test_sign_then_verify() {
        let sk = key(7);
        let sig = sign_payload(&sk, b"hello");
        assert!(verify(b"hello", &public_key_hex(&sk), &sig));
    }

    #[test]
    fn test_compact_signature_accepted() {
        let sk = key(7);
        let signature: Signature = sk.sign(b"hello");
        let compact = hex::encode(signature.to_bytes());
        assert!(verify(b"hello", &public_key_hex(&sk), &compact));
    }

    #[test]
    fn test_uncompressed_public_key_accepted() {
        let sk = key(9);
        let uncompressed = hex::encode(sk.verifying_key().to_encoded_point(false).as_bytes());
        let sig = sign_payload(&sk, b"payload");
        assert!(verify(b"payload", &uncompressed, &sig));
    }

    #[test]
    fn test_wrong_key_rejected() {
        let sig = sign_payload(&key(7), b"hello");
        assert_eq!(
            verify_detailed(b"hello", &public_key_hex(&key(8)), &sig),
            Err(SignatureError::VerificationFailed)
        );
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let sk = key(7);
        let sig = sign_payload(&sk, b"hello");
        assert!(!verify(b"hellO", &public_key_hex(&sk), &sig));
    }

    #[test]
    fn test_malformed_inputs_are_false_not_panics() {
        let sk = key(7);
        let pk = public_key_hex(&sk);
        let sig = sign_payload(&sk, b"x");
        assert_eq!(
            verify_detailed(b"x", &pk, ""),
            Err(SignatureError::MissingSignature)
        );
        assert_eq!(
            verify_detailed(b"x", &pk, "zz"),
            Err(SignatureError::InvalidFormat)
        );
        assert_eq!(
            verify_detailed(b"x", &pk, "3045"),
            Err(SignatureError::InvalidFormat)
        );
        assert_eq!(
            verify_detailed(b"x", "not-hex", &sig),
            Err(SignatureError::InvalidPublicKey)
        );
        assert_eq!(
            verify_detailed(b"x", "02ab", &sig),
            Err(SignatureError::InvalidPublicKey)
        );
    }

    #[test]
    fn test_high_s_signature_rejected() {
        let sk = key(7);
        let low: Signature = sk.sign(b"hello");
        let (r, s) = low.split_scalars();
        let high = Signature::from_scalars(r, -*s).unwrap();
        let high_hex = hex::encode(high.to_bytes());
        assert_eq!(
            verify_detailed(b"hello", &public_key_hex(&sk), &high_hex),
            Err(SignatureError::MalleableSignature)
        );
    }

    #[test]
    fn test_transaction_signature_covers_amount_and_data() {
        let sk = key(3);
        let pk = public_key_hex(&sk);
        let tx = sign_transaction(
            &sk,
            Transaction::new("alice", "bob", 10.0).with_data(json!({"nft": "cat"})),
        );
        assert!(verify_transaction(&tx, &pk));

        let mut inflated = tx.clone();
        inflated.amount = 11.0;
        assert!(!verify_transaction(&inflated, &pk));

        let mut swapped = tx.clone();
        swapped.data = json!({"nft": "dog"});
        assert!(!verify_transaction(&swapped, &pk));
    }

    #[test]
    fn test_unsigned_transaction_rejected() {
        let tx = Transaction::new("alice", "bob", 1.0);
        assert!(!verify_transaction(&tx, &public_key_hex(&key(3))));
    }
}
