//! Entry point of the admin dispatch layer.

use serde_json::{Value, json};
use tracing::{debug, error, info, warn};

use super::handlers::HandlerContext;
use super::request::AdminRequest;
use super::routes::{RouteMatch, RouteTable};
use super::state::{AdminSettings, AdminState};
use crate::domain::{Error, ErrorCode};

/// Routes admin requests to their handlers.
///
/// Holds only immutable state, so one instance serves every worker.
#[derive(Clone)]
pub struct AdminDispatcher {
    state: AdminState,
    routes: RouteTable,
}

impl AdminDispatcher {
    /// Build a dispatcher over the admin route table.
    pub fn new(state: AdminState) -> Self {
        Self {
            state,
            routes: RouteTable::admin(),
        }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn settings(&self) -> &AdminSettings {
        self.state.settings()
    }

    /// Resolve, validate and execute one request.
    ///
    /// Unknown paths yield `not_found`; known paths with another method yield
    /// `method_not_allowed` with the accepted methods in
    /// `details.allowed`.
    pub async fn dispatch(&self, request: &AdminRequest) -> Result<Value, Error> {
        let route = match self.routes.lookup(request.method(), request.path()) {
            RouteMatch::Found(route) => route,
            RouteMatch::MethodNotAllowed { allowed } => {
                let allowed: Vec<&str> = allowed.iter().map(|method| method.as_str()).collect();
                info!(
                    method = %request.method(),
                    path = request.path(),
                    "admin method not allowed"
                );
                return Err(Error::method_not_allowed(format!(
                    "{} does not accept {}",
                    request.path(),
                    request.method()
                ))
                .with_details(json!({ "allowed": allowed })));
            }
            RouteMatch::NotFound => {
                info!(path = request.path(), "unknown admin route");
                return Err(Error::not_found(format!(
                    "no admin route matches {}",
                    request.path()
                )));
            }
        };

        let operation = route.operation_id();
        debug!(operation, method = %request.method(), "dispatching admin request");
        let ctx = HandlerContext {
            state: &self.state,
            request,
        };
        let result = (route.handler())(ctx).await;
        match &result {
            Ok(_) => debug!(operation, "admin request completed"),
            Err(err) => log_failure(operation, err),
        }
        result
    }
}

fn log_failure(operation: &str, err: &Error) {
    let trace_id = err.trace_id().unwrap_or_default();
    match err.code() {
        ErrorCode::ServiceUnavailable => {
            warn!(operation, trace_id, code = %err.code(), message = err.message(), "collaborator failure");
        }
        ErrorCode::InternalError => {
            error!(operation, trace_id, message = err.message(), "internal admin failure");
        }
        code => {
            info!(operation, trace_id, %code, message = err.message(), "admin request rejected");
        }
    }
}

#[cfg(test)]
mod tests;
