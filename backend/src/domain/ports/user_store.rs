//! Driven port for reading registered users.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{UserRecord, UserSearch};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user store adapters.
    pub enum UserStoreError {
        /// The store could not be reached.
        Unavailable { message: String } => "user store unavailable: {message}",
        /// Query failed during execution or row conversion.
        Query { message: String } => "user store query failed: {message}",
    }
}

/// Filtered page selection over users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserListRequest {
    pub page: PageRequest,
    pub search: Option<UserSearch>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Users in registration order, optionally narrowed by username.
    async fn list(&self, request: &UserListRequest) -> Result<Page<UserRecord>, UserStoreError>;
}

/// Fixture implementation with no registered users.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUserStore;

#[async_trait]
impl UserStore for FixtureUserStore {
    async fn list(&self, request: &UserListRequest) -> Result<Page<UserRecord>, UserStoreError> {
        Ok(Page::new(Vec::new(), &request.page, 0))
    }
}
