//! Conversion of parameter failures into `invalid_argument` errors.
//!
//! Every validation failure carries `details: {field, code, value?}` so
//! clients can highlight the offending parameter.

use pagination::PageRequestError;
use serde_json::{Map, Value, json};

use crate::domain::{
    Error, IdempotencyKeyValidationError, InvitationValidationError, TimeRangeError,
    UserValidationError, idempotency::IDEMPOTENCY_KEY_HEADER,
};

/// Builder for validation errors with field context.
struct ValidationError {
    field: String,
    message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn with_code(self, code: &str, value: Option<Value>) -> Error {
        let mut details = Map::new();
        details.insert("field".into(), json!(self.field));
        details.insert("code".into(), json!(code));
        if let Some(value) = value {
            details.insert("value".into(), value);
        }
        Error::invalid_argument(self.message).with_details(Value::Object(details))
    }
}

pub(super) fn page_error(err: &PageRequestError) -> Error {
    ValidationError::new(err.field(), err.to_string())
        .with_code(err.code(), err.value().map(|value| json!(value)))
}

pub(super) fn time_range_error(err: &TimeRangeError) -> Error {
    ValidationError::new(err.field(), err.to_string())
        .with_code(err.code(), err.value().map(|value| json!(value)))
}

pub(super) fn invitation_error(err: &InvitationValidationError) -> Error {
    let value = match err {
        InvitationValidationError::QuantityNotPositive { value }
        | InvitationValidationError::QuantityTooLarge { value, .. } => Some(json!(value)),
        InvitationValidationError::ExpiryNotInFuture { value } => Some(json!(value.to_rfc3339())),
        InvitationValidationError::InvalidQuota { value } if value.is_finite() => {
            Some(json!(value))
        }
        _ => None,
    };
    ValidationError::new(err.field(), err.to_string()).with_code(err.code(), value)
}

pub(super) fn search_error(err: &UserValidationError, raw: &str) -> Error {
    let code = match err {
        UserValidationError::SearchTooLong { .. } => "search_too_long",
        _ => "empty_search",
    };
    ValidationError::new("search", err.to_string()).with_code(code, Some(json!(raw)))
}

pub(super) fn idempotency_key_error(err: &IdempotencyKeyValidationError, raw: &str) -> Error {
    ValidationError::new(IDEMPOTENCY_KEY_HEADER, err.to_string())
        .with_code("invalid_idempotency_key", Some(json!(raw)))
}

pub(super) fn invalid_timestamp(field: &str, raw: &str) -> Error {
    ValidationError::new(field, format!("{field} must be an RFC 3339 timestamp"))
        .with_code("invalid_timestamp", Some(json!(raw)))
}

pub(super) fn missing_field(field: &str) -> Error {
    ValidationError::new(field, format!("missing required field: {field}"))
        .with_code("missing_field", None)
}

pub(crate) fn invalid_body(message: impl Into<String>) -> Error {
    ValidationError::new("body", message).with_code("invalid_body", None)
}

pub(crate) fn body_too_large(limit: usize) -> Error {
    ValidationError::new("body", format!("request body exceeds {limit} bytes"))
        .with_code("body_too_large", Some(json!(limit)))
}
