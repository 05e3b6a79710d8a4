//! Collaborator ports consumed by the admin dispatch layer.
//!
//! Each port is an async trait with a `thiserror` error enum generated by
//! [`define_port_error!`]. Adapters live under `crate::outbound`; fixtures
//! here answer with empty data for tests that do not exercise a port.

mod macros;
pub(crate) use macros::define_port_error;

mod admin_authorizer;
mod analytics_service;
mod invitation_store;
mod user_store;

#[cfg(test)]
pub use admin_authorizer::MockAdminAuthorizer;
pub use admin_authorizer::{AdminAuthorizer, AdminAuthorizerError, AdminDecision};
#[cfg(test)]
pub use analytics_service::MockAnalyticsService;
pub use analytics_service::{AnalyticsService, AnalyticsServiceError, FixtureAnalyticsService};
#[cfg(test)]
pub use invitation_store::MockInvitationStore;
pub use invitation_store::{
    CreateInvitationsRequest, FixtureInvitationStore, IdempotencyFingerprint, InvitationStore,
    InvitationStoreError,
};
#[cfg(test)]
pub use user_store::MockUserStore;
pub use user_store::{FixtureUserStore, UserListRequest, UserStore, UserStoreError};
