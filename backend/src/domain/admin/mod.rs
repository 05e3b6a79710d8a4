//! Admin dispatch layer.
//!
//! Maps authenticated administrative requests onto collaborator ports:
//!
//! 1. an inbound adapter converts its request into an [`AdminRequest`];
//! 2. [`AdminDispatcher::dispatch`] resolves method and path against the
//!    static [`RouteTable`], yielding `not_found` or `method_not_allowed`
//!    when nothing matches;
//! 3. the handler validates query and body parameters and calls one port,
//!    bounded by the configured collaborator timeout;
//! 4. the result is serialised to JSON, or the failure is mapped onto the
//!    [`ErrorCode`](crate::domain::ErrorCode) taxonomy.
//!
//! Authorisation happens before dispatch, in the inbound adapter.

mod dispatcher;
pub mod handlers;
mod request;
mod routes;
pub mod schemas;
mod state;
mod validation;

pub use dispatcher::AdminDispatcher;
pub use handlers::{HandlerContext, HandlerFuture, HandlerResult};
pub use request::{AdminRequest, Method};
pub use routes::{Handler, Route, RouteMatch, RouteTable};
pub use state::{AdminPorts, AdminSettings, AdminState, DEFAULT_MAX_BODY_BYTES};
pub(crate) use state::timeout_millis;
pub(crate) use validation::{body_too_large, invalid_body};
