//! Builders wiring collaborator adapters into the HTTP state.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use tracing::info;

use admin_gateway::domain::admin::{AdminDispatcher, AdminPorts, AdminState};
use admin_gateway::domain::ports::UserStore;
use admin_gateway::inbound::http::state::HttpState;
use admin_gateway::outbound::memory::{
    InMemoryAnalytics, InMemoryInvitationStore, InMemoryUserStore, UserSeedError,
};
use admin_gateway::outbound::static_token::StaticTokenAuthorizer;

use super::ServerConfig;

fn build_user_store(config: &ServerConfig) -> Result<Arc<dyn UserStore>, UserSeedError> {
    match &config.users_file {
        Some(path) => {
            let store = InMemoryUserStore::from_json_file(path)?;
            info!(path = %path.display(), "user seed loaded");
            Ok(Arc::new(store))
        }
        None => {
            info!("no user seed configured; user list starts empty");
            Ok(Arc::new(InMemoryUserStore::default()))
        }
    }
}

/// Assemble the dispatcher and authoriser from configuration.
///
/// # Errors
/// Returns [`std::io::Error`] when the user seed cannot be loaded.
pub(crate) fn build_http_state(config: &ServerConfig) -> std::io::Result<HttpState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let users = build_user_store(config).map_err(std::io::Error::other)?;
    let ports = AdminPorts {
        analytics: Arc::new(InMemoryAnalytics::new(clock.clone())),
        invitations: Arc::new(InMemoryInvitationStore::new(clock.clone())),
        users,
    };
    let state = AdminState::new(ports, config.admin_settings, clock);
    let authorizer = StaticTokenAuthorizer::new(config.admin_token.as_str());
    Ok(HttpState::new(
        AdminDispatcher::new(state),
        Arc::new(authorizer),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use admin_gateway::domain::admin::AdminSettings;
    use rstest::rstest;
    use zeroize::Zeroizing;

    fn config(users_file: Option<std::path::PathBuf>) -> ServerConfig {
        ServerConfig {
            bind_addr: "127.0.0.1:0".parse().expect("valid address"),
            admin_token: Zeroizing::new("s3cret".to_owned()),
            admin_settings: AdminSettings::default(),
            users_file,
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    #[rstest]
    fn builds_without_seed() {
        let state = build_http_state(&config(None)).expect("state");
        assert_eq!(state.dispatcher.routes().routes().len(), 8);
    }

    #[rstest]
    fn missing_seed_fails_start_up() {
        let dir = tempfile::tempdir().expect("temp dir");
        let result = build_http_state(&config(Some(dir.path().join("absent.json"))));
        assert!(result.is_err());
    }
}
