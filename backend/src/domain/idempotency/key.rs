//! Idempotency key validation.

use std::fmt;

use uuid::Uuid;

/// HTTP header carrying the idempotency key.
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

/// Validation errors for [`IdempotencyKey`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdempotencyKeyValidationError {
    /// The key string was empty.
    EmptyKey,
    /// The key string was not a valid UUID.
    InvalidKey,
}

impl fmt::Display for IdempotencyKeyValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyKey => write!(f, "{IDEMPOTENCY_KEY_HEADER} header must not be empty"),
            Self::InvalidKey => write!(f, "{IDEMPOTENCY_KEY_HEADER} header must be a valid UUID"),
        }
    }
}

impl std::error::Error for IdempotencyKeyValidationError {}

/// Client-provided idempotency key.
///
/// # Example
///
/// ```
/// # use admin_gateway::domain::idempotency::IdempotencyKey;
/// let key = IdempotencyKey::new("550e8400-e29b-41d4-a716-446655440000")
///     .expect("valid UUID");
/// assert_eq!(key.as_ref(), "550e8400-e29b-41d4-a716-446655440000");
/// assert!(IdempotencyKey::new(" 550e8400-e29b-41d4-a716-446655440000").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdempotencyKey(Uuid, String);

impl IdempotencyKey {
    /// Validate and construct a key from its textual form.
    ///
    /// Surrounding whitespace is rejected rather than trimmed so that two
    /// retries only match when the client sent byte-identical keys.
    pub fn new(key: impl AsRef<str>) -> Result<Self, IdempotencyKeyValidationError> {
        let raw = key.as_ref();
        if raw.is_empty() {
            return Err(IdempotencyKeyValidationError::EmptyKey);
        }
        if raw.trim() != raw {
            return Err(IdempotencyKeyValidationError::InvalidKey);
        }
        let parsed = Uuid::parse_str(raw).map_err(|_| IdempotencyKeyValidationError::InvalidKey)?;
        Ok(Self(parsed, raw.to_owned()))
    }

    /// Generate a random key.
    pub fn random() -> Self {
        let uuid = Uuid::new_v4();
        Self(uuid, uuid.to_string())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl AsRef<str> for IdempotencyKey {
    fn as_ref(&self) -> &str {
        self.1.as_str()
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}
