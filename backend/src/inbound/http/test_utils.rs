//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use mockable::DefaultClock;

use crate::domain::admin::{AdminDispatcher, AdminPorts, AdminSettings, AdminState};
use crate::domain::ports::{
    AdminAuthorizer, FixtureAnalyticsService, FixtureInvitationStore, FixtureUserStore,
};

use super::state::HttpState;

/// Build HTTP state over fixture collaborators and the given authoriser.
pub fn http_state(authorizer: Arc<dyn AdminAuthorizer>) -> HttpState {
    let ports = AdminPorts {
        analytics: Arc::new(FixtureAnalyticsService),
        invitations: Arc::new(FixtureInvitationStore),
        users: Arc::new(FixtureUserStore),
    };
    let state = AdminState::new(ports, AdminSettings::default(), Arc::new(DefaultClock));
    HttpState::new(AdminDispatcher::new(state), authorizer)
}
