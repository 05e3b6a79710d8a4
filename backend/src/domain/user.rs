//! Registered user records as exposed to administrators.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::invitation::Quota;

/// Maximum length of a username.
pub const USERNAME_MAX: usize = 64;
/// Maximum length of a username search term after trimming.
pub const SEARCH_MAX: usize = 64;

/// Validation errors for user identifiers, names and search terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyId,
    InvalidId,
    EmptyUsername,
    UsernameTooLong { max: usize },
    EmptySearch,
    SearchTooLong { max: usize },
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::UsernameTooLong { max } => {
                write!(f, "username must be at most {max} characters")
            }
            Self::EmptySearch => write!(f, "search must not be blank"),
            Self::SearchTooLong { max } => write!(f, "search must be at most {max} characters"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid, String);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    /// Wrap an already parsed UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid, uuid.to_string())
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    fn from_owned(id: String) -> Result<Self, UserValidationError> {
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::InvalidId);
        }

        let parsed = Uuid::parse_str(&id).map_err(|_| UserValidationError::InvalidId)?;
        Ok(Self(parsed, id))
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.1.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        let UserId(_, raw) = value;
        raw
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Login name of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`].
    pub fn new(username: impl Into<String>) -> Result<Self, UserValidationError> {
        let username = username.into();
        if username.trim().is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        if username.chars().count() > USERNAME_MAX {
            return Err(UserValidationError::UsernameTooLong { max: USERNAME_MAX });
        }
        Ok(Self(username))
    }

    /// Case-insensitive substring match against a search term.
    pub fn matches(&self, search: &UserSearch) -> bool {
        self.0.to_lowercase().contains(&search.folded)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Trimmed, case-folded username filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSearch {
    raw: String,
    folded: String,
}

impl UserSearch {
    /// Validate a raw search parameter.
    ///
    /// # Examples
    /// ```
    /// use admin_gateway::domain::UserSearch;
    ///
    /// let search = UserSearch::new("  Ada ").expect("valid search");
    /// assert_eq!(search.as_ref(), "Ada");
    /// assert!(UserSearch::new("   ").is_err());
    /// ```
    pub fn new(raw: &str) -> Result<Self, UserValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptySearch);
        }
        if trimmed.chars().count() > SEARCH_MAX {
            return Err(UserValidationError::SearchTooLong { max: SEARCH_MAX });
        }
        Ok(Self {
            raw: trimmed.to_owned(),
            folded: trimmed.to_lowercase(),
        })
    }
}

impl AsRef<str> for UserSearch {
    fn as_ref(&self) -> &str {
        self.raw.as_str()
    }
}

/// A registered account.
///
/// ## Invariants
/// - `id` is a valid UUID string.
/// - `username` is non-blank and at most [`USERNAME_MAX`] characters.
/// - `quota` is finite and non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct UserRecord {
    id: UserId,
    username: Username,
    is_admin: bool,
    quota: Quota,
    registered_at: DateTime<Utc>,
}

impl UserRecord {
    /// Build a record from validated components.
    pub fn new(
        id: UserId,
        username: Username,
        is_admin: bool,
        quota: Quota,
        registered_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            username,
            is_admin,
            quota,
            registered_at,
        }
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    pub fn quota(&self) -> Quota {
        self.quota
    }

    pub fn registered_at(&self) -> DateTime<Utc> {
        self.registered_at
    }
}

#[cfg(test)]
mod tests;
