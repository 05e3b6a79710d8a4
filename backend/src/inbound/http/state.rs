//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only depend
//! on the dispatch layer and the authorisation port, and remain testable
//! without I/O.

use std::sync::Arc;

use crate::domain::admin::AdminDispatcher;
use crate::domain::ports::AdminAuthorizer;

/// Dependency bundle for the admin HTTP surface.
#[derive(Clone)]
pub struct HttpState {
    pub dispatcher: Arc<AdminDispatcher>,
    pub authorizer: Arc<dyn AdminAuthorizer>,
}

impl HttpState {
    /// Bundle a dispatcher with the authoriser guarding it.
    pub fn new(dispatcher: AdminDispatcher, authorizer: Arc<dyn AdminAuthorizer>) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            authorizer,
        }
    }
}
