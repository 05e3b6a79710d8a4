//! Driven port deciding whether a presented credential belongs to an
//! administrator.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised while reaching an authorisation decision.
    pub enum AdminAuthorizerError {
        /// The decision backend could not be reached.
        Unavailable { message: String } => "authorisation backend unavailable: {message}",
    }
}

/// Outcome of an authorisation check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminDecision {
    /// The credential identifies an administrator.
    Granted { subject: String },
    /// The credential is unknown or lacks admin rights.
    Denied,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdminAuthorizer: Send + Sync {
    /// Decide on a bearer token taken from the request.
    async fn authorize(&self, bearer_token: &str) -> Result<AdminDecision, AdminAuthorizerError>;
}
