//! Idempotency primitives for retry-safe invitation generation.
//!
//! - [`IdempotencyKey`]: validated UUID sent by clients in the
//!   `Idempotency-Key` header.
//! - [`PayloadHash`]: SHA-256 of the canonicalised request body, used to tell
//!   a genuine retry from a conflicting reuse of the same key.
//!
//! Canonicalisation sorts object keys recursively and serialises compact JSON
//! before hashing, so whitespace and key order do not affect the fingerprint.

mod key;
mod payload;

pub use key::{IDEMPOTENCY_KEY_HEADER, IdempotencyKey, IdempotencyKeyValidationError};
pub use payload::{PayloadHash, PayloadHashError, canonicalize_and_hash};
