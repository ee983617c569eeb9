//! # Canonical Hashing
//!
//! A block's identity hash is SHA-256 over its canonical form, rendered as
//! lowercase hex. The canonical form is compact JSON with object keys sorted
//! at every depth, so two semantically identical blocks hash identically no
//! matter how their fields were ordered on the wire.

use crate::entities::Block;
use crate::errors::BlockModelError;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Recursively rebuild `value` with sorted object keys.
fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<&String, Value> =
                map.iter().map(|(k, v)| (k, sort_keys(v))).collect();
            let mut out = Map::with_capacity(sorted.len());
            for (k, v) in sorted {
                out.insert(k.clone(), v);
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}

/// Compact sorted-key JSON bytes of an arbitrary value.
pub(crate) fn canonical_bytes(value: &Value) -> Vec<u8> {
    sort_keys(value).to_string().into_bytes()
}

/// Serialize a block to its canonical byte form.
pub fn to_canonical_form(block: &Block) -> Result<Vec<u8>, BlockModelError> {
    let value = serde_json::to_value(block)?;
    Ok(canonical_bytes(&value))
}

/// Parse a block from bytes produced by [`to_canonical_form`] (or any JSON
/// rendering of the same fields).
pub fn from_canonical_form(bytes: &[u8]) -> Result<Block, BlockModelError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Lowercase hex SHA-256 of the block's canonical form.
pub fn compute_hash(block: &Block) -> String {
    // Block holds only strings, integers, finite-or-null floats and JSON
    // values, so conversion to a Value cannot fail.
    let value = serde_json::to_value(block).unwrap_or(Value::Null);
    sha256_hex(&canonical_bytes(&value))
}

/// Lowercase hex SHA-256 of raw bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}
