//! Gateway configuration loaded via OrthoConfig and the server config built
//! from it.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use admin_gateway::domain::TimeWindowLimits;
use admin_gateway::domain::admin::AdminSettings;
use ortho_config::OrthoConfig;
use pagination::{PageLimits, PageLimitsError};
use serde::Deserialize;
use thiserror::Error;
use zeroize::Zeroizing;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Configuration values for the admin gateway.
///
/// Layered from CLI flags, `ADMIN_GATEWAY_*` environment variables and
/// configuration files.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ADMIN_GATEWAY")]
pub struct AdminGatewaySettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// Bearer token granting admin access.
    pub admin_token: Option<String>,
    #[ortho_config(default = 20)]
    pub default_page_size: u32,
    #[ortho_config(default = 100)]
    pub max_page_size: u32,
    #[ortho_config(default = 100)]
    pub max_invitation_batch: u32,
    #[ortho_config(default = 7)]
    pub default_analytics_window_days: u32,
    #[ortho_config(default = 90)]
    pub max_analytics_window_days: u32,
    #[ortho_config(default = 5000)]
    pub collaborator_timeout_ms: u64,
    /// Largest admin request body accepted, in bytes.
    #[ortho_config(default = 65536)]
    pub max_body_bytes: usize,
    /// JSON array of user records loaded at start-up.
    pub users_file: Option<PathBuf>,
}

/// Start-up configuration failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid bind address {value}: {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("admin token must be configured")]
    MissingAdminToken,
    #[error("invalid page limits: {0}")]
    PageLimits(#[from] PageLimitsError),
    #[error("analytics window must satisfy 1 <= default ({default}) <= max ({max})")]
    AnalyticsWindow { default: u32, max: u32 },
    #[error("{field} must be positive")]
    NotPositive { field: &'static str },
}

impl AdminGatewaySettings {
    /// Parsed listen address, defaulting to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| ConfigError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    /// Configured admin token; blank tokens count as missing.
    pub fn admin_token(&self) -> Result<Zeroizing<String>, ConfigError> {
        self.admin_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| Zeroizing::new(token.to_owned()))
            .ok_or(ConfigError::MissingAdminToken)
    }

    /// Limits applied by the dispatch layer.
    pub fn admin_settings(&self) -> Result<AdminSettings, ConfigError> {
        let page_limits = PageLimits::new(self.default_page_size, self.max_page_size)?;
        let window_limits = TimeWindowLimits::new(
            self.default_analytics_window_days,
            self.max_analytics_window_days,
        )
        .ok_or(ConfigError::AnalyticsWindow {
            default: self.default_analytics_window_days,
            max: self.max_analytics_window_days,
        })?;
        if self.max_invitation_batch == 0 {
            return Err(ConfigError::NotPositive {
                field: "max_invitation_batch",
            });
        }
        if self.collaborator_timeout_ms == 0 {
            return Err(ConfigError::NotPositive {
                field: "collaborator_timeout_ms",
            });
        }
        if self.max_body_bytes == 0 {
            return Err(ConfigError::NotPositive {
                field: "max_body_bytes",
            });
        }
        Ok(AdminSettings {
            page_limits,
            window_limits,
            max_invitation_batch: self.max_invitation_batch,
            collaborator_timeout: Duration::from_millis(self.collaborator_timeout_ms),
            max_body_bytes: self.max_body_bytes,
        })
    }
}

/// Validated inputs for [`super::create_server`].
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) admin_token: Zeroizing<String>,
    pub(crate) admin_settings: AdminSettings,
    pub(crate) users_file: Option<PathBuf>,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    /// Validate loaded settings.
    ///
    /// # Errors
    /// Returns [`ConfigError`] for a missing token, an unparsable address or
    /// inconsistent limits.
    pub fn from_settings(settings: &AdminGatewaySettings) -> Result<Self, ConfigError> {
        Ok(Self {
            bind_addr: settings.bind_addr()?,
            admin_token: settings.admin_token()?,
            admin_settings: settings.admin_settings()?,
            users_file: settings.users_file.clone(),
            #[cfg(feature = "metrics")]
            prometheus: None,
        })
    }

    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware to the configuration.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for gateway configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 11] = [
        "ADMIN_GATEWAY_BIND_ADDR",
        "ADMIN_GATEWAY_ADMIN_TOKEN",
        "ADMIN_GATEWAY_DEFAULT_PAGE_SIZE",
        "ADMIN_GATEWAY_MAX_PAGE_SIZE",
        "ADMIN_GATEWAY_MAX_INVITATION_BATCH",
        "ADMIN_GATEWAY_DEFAULT_ANALYTICS_WINDOW_DAYS",
        "ADMIN_GATEWAY_MAX_ANALYTICS_WINDOW_DAYS",
        "ADMIN_GATEWAY_COLLABORATOR_TIMEOUT_MS",
        "ADMIN_GATEWAY_MAX_BODY_BYTES",
        "ADMIN_GATEWAY_USERS_FILE",
        "ADMIN_GATEWAY_CONFIG_PATH",
    ];

    fn load_from_empty_args() -> AdminGatewaySettings {
        AdminGatewaySettings::load_from_iter([OsString::from("admin-gateway")])
            .expect("config should load")
    }

    fn env_with(overrides: &[(&str, &str)]) -> Vec<(&'static str, Option<String>)> {
        VARS.iter()
            .map(|name| {
                let value = overrides
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| (*value).to_owned());
                (*name, value)
            })
            .collect()
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(env_with(&[]));

        let settings = load_from_empty_args();

        assert_eq!(
            settings.bind_addr().expect("default address"),
            DEFAULT_BIND_ADDR.parse::<SocketAddr>().expect("valid")
        );
        assert_eq!(
            settings.admin_settings().expect("default limits"),
            AdminSettings::default()
        );
        assert!(matches!(
            settings.admin_token(),
            Err(ConfigError::MissingAdminToken)
        ));
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(env_with(&[
            ("ADMIN_GATEWAY_BIND_ADDR", "127.0.0.1:9000"),
            ("ADMIN_GATEWAY_ADMIN_TOKEN", "s3cret"),
            ("ADMIN_GATEWAY_DEFAULT_PAGE_SIZE", "5"),
            ("ADMIN_GATEWAY_MAX_PAGE_SIZE", "50"),
            ("ADMIN_GATEWAY_COLLABORATOR_TIMEOUT_MS", "250"),
            ("ADMIN_GATEWAY_MAX_BODY_BYTES", "1024"),
            ("ADMIN_GATEWAY_USERS_FILE", "/tmp/users.json"),
        ]));

        let settings = load_from_empty_args();
        let config = ServerConfig::from_settings(&settings).expect("valid config");

        assert_eq!(config.bind_addr().port(), 9000);
        assert_eq!(config.admin_token.as_str(), "s3cret");
        assert_eq!(config.admin_settings.page_limits.max_page_size(), 50);
        assert_eq!(
            config.admin_settings.collaborator_timeout,
            Duration::from_millis(250)
        );
        assert_eq!(config.admin_settings.max_body_bytes, 1024);
        assert_eq!(config.users_file, Some(PathBuf::from("/tmp/users.json")));
    }

    #[rstest]
    #[case(&[("ADMIN_GATEWAY_DEFAULT_PAGE_SIZE", "200")])]
    #[case(&[("ADMIN_GATEWAY_MAX_ANALYTICS_WINDOW_DAYS", "3")])]
    #[case(&[("ADMIN_GATEWAY_MAX_INVITATION_BATCH", "0")])]
    #[case(&[("ADMIN_GATEWAY_COLLABORATOR_TIMEOUT_MS", "0")])]
    #[case(&[("ADMIN_GATEWAY_MAX_BODY_BYTES", "0")])]
    fn inconsistent_limits_fail(#[case] overrides: &[(&str, &str)]) {
        let _guard = lock_env(env_with(overrides));

        let settings = load_from_empty_args();

        assert!(settings.admin_settings().is_err());
    }

    #[rstest]
    fn blank_token_counts_as_missing() {
        let _guard = lock_env(env_with(&[("ADMIN_GATEWAY_ADMIN_TOKEN", "   ")]));

        let settings = load_from_empty_args();

        assert!(matches!(
            settings.admin_token(),
            Err(ConfigError::MissingAdminToken)
        ));
    }
}
