//! Request fingerprinting for idempotent retries.

use std::fmt;

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Failure while fingerprinting a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadHashError {
    message: String,
}

impl fmt::Display for PayloadHashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to serialise canonical JSON payload: {}", self.message)
    }
}

impl std::error::Error for PayloadHashError {}

/// SHA-256 of a canonicalised JSON payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PayloadHash([u8; 32]);

impl PayloadHash {
    /// Wrap raw digest bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw digest bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hexadecimal form.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for PayloadHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Canonicalise a JSON value and compute its SHA-256 hash.
///
/// Object keys are sorted recursively, arrays keep their order, and the result
/// is serialised compactly before hashing.
///
/// ```
/// # use admin_gateway::domain::idempotency::canonicalize_and_hash;
/// # use serde_json::json;
/// let a = canonicalize_and_hash(&json!({"quantity": 3, "label": "beta"})).expect("hash");
/// let b = canonicalize_and_hash(&json!({"label": "beta", "quantity": 3})).expect("hash");
/// assert_eq!(a, b);
/// ```
pub fn canonicalize_and_hash(value: &Value) -> Result<PayloadHash, PayloadHashError> {
    let bytes = serde_json::to_vec(&canonicalize(value)).map_err(|err| PayloadHashError {
        message: err.to_string(),
    })?;
    Ok(PayloadHash(Sha256::digest(&bytes).into()))
}

fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by_key(|(key, _)| key.as_str());
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, nested)| (key.clone(), canonicalize(nested)))
                    .collect::<Map<String, Value>>(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}
