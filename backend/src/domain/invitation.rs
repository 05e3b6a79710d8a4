//! Invitation codes and the validated batch request that creates them.
//!
//! Codes are issued in batches by the invitation store. Listing never mutates
//! a code; the `expired` state is derived when a code is observed after its
//! expiry instant.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;

/// Maximum number of characters in an invitation label.
pub const LABEL_MAX: usize = 32;

/// Validation errors raised while building an [`InvitationBatch`].
#[derive(Debug, Clone, PartialEq)]
pub enum InvitationValidationError {
    QuantityNotPositive { value: i64 },
    QuantityTooLarge { value: i64, max: u32 },
    ExpiryNotInFuture { value: DateTime<Utc> },
    InvalidQuota { value: f64 },
    EmptyLabel,
    LabelTooLong { max: usize },
    LabelInvalidCharacters,
}

impl InvitationValidationError {
    /// Request field the failure refers to.
    pub const fn field(&self) -> &'static str {
        match self {
            Self::QuantityNotPositive { .. } | Self::QuantityTooLarge { .. } => "quantity",
            Self::ExpiryNotInFuture { .. } => "expiry",
            Self::InvalidQuota { .. } => "quota",
            Self::EmptyLabel | Self::LabelTooLong { .. } | Self::LabelInvalidCharacters => "label",
        }
    }

    /// Stable machine-readable code for the failure.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::QuantityNotPositive { .. } => "quantity_not_positive",
            Self::QuantityTooLarge { .. } => "quantity_too_large",
            Self::ExpiryNotInFuture { .. } => "expiry_not_in_future",
            Self::InvalidQuota { .. } => "invalid_quota",
            Self::EmptyLabel => "empty_label",
            Self::LabelTooLong { .. } => "label_too_long",
            Self::LabelInvalidCharacters => "label_invalid_characters",
        }
    }
}

impl fmt::Display for InvitationValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QuantityNotPositive { value } => {
                write!(f, "quantity must be positive, got {value}")
            }
            Self::QuantityTooLarge { value, max } => {
                write!(f, "quantity must be at most {max}, got {value}")
            }
            Self::ExpiryNotInFuture { value } => {
                write!(f, "expiry must be in the future, got {}", value.to_rfc3339())
            }
            Self::InvalidQuota { value } => {
                write!(f, "quota must be a finite, non-negative number, got {value}")
            }
            Self::EmptyLabel => write!(f, "label must not be empty"),
            Self::LabelTooLong { max } => write!(f, "label must be at most {max} characters"),
            Self::LabelInvalidCharacters => write!(
                f,
                "label may only contain letters, numbers, hyphens, or underscores",
            ),
        }
    }
}

impl std::error::Error for InvitationValidationError {}

/// Batch label, also used as the prefix of generated codes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InvitationLabel(String);

impl InvitationLabel {
    /// Validate and construct a label.
    pub fn new(label: impl Into<String>) -> Result<Self, InvitationValidationError> {
        let label = label.into();
        if label.is_empty() {
            return Err(InvitationValidationError::EmptyLabel);
        }
        if label.chars().count() > LABEL_MAX {
            return Err(InvitationValidationError::LabelTooLong { max: LABEL_MAX });
        }
        if !label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(InvitationValidationError::LabelInvalidCharacters);
        }
        Ok(Self(label))
    }
}

impl AsRef<str> for InvitationLabel {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for InvitationLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<InvitationLabel> for String {
    fn from(value: InvitationLabel) -> Self {
        value.0
    }
}

impl TryFrom<String> for InvitationLabel {
    type Error = InvitationValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Quota credited to the account that redeems a code.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Quota(f64);

impl Quota {
    /// Validate a quota amount.
    pub fn new(value: f64) -> Result<Self, InvitationValidationError> {
        if value.is_finite() && value >= 0.0 {
            Ok(Self(value))
        } else {
            Err(InvitationValidationError::InvalidQuota { value })
        }
    }

    /// Raw amount.
    pub const fn get(self) -> f64 {
        self.0
    }
}

impl From<Quota> for f64 {
    fn from(value: Quota) -> Self {
        value.0
    }
}

impl TryFrom<f64> for Quota {
    type Error = InvitationValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Validated request to create a batch of invitation codes.
#[derive(Debug, Clone, PartialEq)]
pub struct InvitationBatch {
    quantity: u32,
    expires_at: Option<DateTime<Utc>>,
    quota: Option<Quota>,
    label: Option<InvitationLabel>,
}

/// Raw batch fields as supplied by a client, before validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvitationBatchDraft {
    pub quantity: i64,
    pub expires_at: Option<DateTime<Utc>>,
    pub quota: Option<f64>,
    pub label: Option<String>,
}

impl InvitationBatch {
    /// Validate a draft against the configured batch maximum and the current
    /// instant.
    ///
    /// # Examples
    /// ```
    /// use admin_gateway::domain::{InvitationBatch, InvitationBatchDraft};
    /// use chrono::Utc;
    ///
    /// let draft = InvitationBatchDraft { quantity: 3, ..Default::default() };
    /// let batch = InvitationBatch::new(draft, 100, Utc::now()).expect("valid batch");
    /// assert_eq!(batch.quantity(), 3);
    /// ```
    pub fn new(
        draft: InvitationBatchDraft,
        max_quantity: u32,
        now: DateTime<Utc>,
    ) -> Result<Self, InvitationValidationError> {
        let InvitationBatchDraft {
            quantity,
            expires_at,
            quota,
            label,
        } = draft;

        if quantity <= 0 {
            return Err(InvitationValidationError::QuantityNotPositive { value: quantity });
        }
        let quantity = u32::try_from(quantity)
            .ok()
            .filter(|q| *q <= max_quantity)
            .ok_or(InvitationValidationError::QuantityTooLarge {
                value: quantity,
                max: max_quantity,
            })?;
        if let Some(value) = expires_at.filter(|expiry| *expiry <= now) {
            return Err(InvitationValidationError::ExpiryNotInFuture { value });
        }

        Ok(Self {
            quantity,
            expires_at,
            quota: quota.map(Quota::new).transpose()?,
            label: label.map(InvitationLabel::new).transpose()?,
        })
    }

    /// Number of codes to create.
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Instant after which unused codes stop being redeemable.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Quota granted on redemption.
    pub fn quota(&self) -> Option<Quota> {
        self.quota
    }

    /// Label shared by every code in the batch.
    pub fn label(&self) -> Option<&InvitationLabel> {
        self.label.as_ref()
    }
}

/// Usage state of an invitation code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    Unused,
    Used,
    Expired,
}

/// A single registration token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationCode {
    code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<InvitationLabel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    quota: Option<Quota>,
    created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<DateTime<Utc>>,
    status: InvitationStatus,
    batch_quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    redeemed_by: Option<UserId>,
}

impl InvitationCode {
    /// Issue a fresh, unused code belonging to `batch`.
    pub fn issue(code: impl Into<String>, batch: &InvitationBatch, now: DateTime<Utc>) -> Self {
        Self {
            code: code.into(),
            label: batch.label.clone(),
            quota: batch.quota,
            created_at: now,
            expires_at: batch.expires_at,
            status: InvitationStatus::Unused,
            batch_quantity: batch.quantity,
            redeemed_by: None,
        }
    }

    /// Mark the code as consumed by `user`.
    pub fn redeem(mut self, user: UserId) -> Self {
        self.status = InvitationStatus::Used;
        self.redeemed_by = Some(user);
        self
    }

    /// The code as seen at `now`: unused codes past their expiry report
    /// [`InvitationStatus::Expired`].
    pub fn observed_at(mut self, now: DateTime<Utc>) -> Self {
        if self.status == InvitationStatus::Unused
            && self.expires_at.is_some_and(|expiry| expiry <= now)
        {
            self.status = InvitationStatus::Expired;
        }
        self
    }

    pub fn code(&self) -> &str {
        self.code.as_str()
    }

    pub fn label(&self) -> Option<&InvitationLabel> {
        self.label.as_ref()
    }

    pub fn quota(&self) -> Option<Quota> {
        self.quota
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn status(&self) -> InvitationStatus {
        self.status
    }

    pub fn batch_quantity(&self) -> u32 {
        self.batch_quantity
    }

    pub fn redeemed_by(&self) -> Option<&UserId> {
        self.redeemed_by.as_ref()
    }
}
