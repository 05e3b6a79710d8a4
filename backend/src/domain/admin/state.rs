//! Immutable state shared by every admin handler.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use mockable::Clock;
use pagination::PageLimits;
use tracing::warn;

use crate::domain::ports::{
    AnalyticsService, AnalyticsServiceError, InvitationStore, InvitationStoreError, UserStore,
    UserStoreError,
};
use crate::domain::{Error, TimeWindowLimits};

/// Request limits applied by the dispatch layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminSettings {
    pub page_limits: PageLimits,
    pub window_limits: TimeWindowLimits,
    pub max_invitation_batch: u32,
    pub collaborator_timeout: Duration,
    /// Largest request body accepted, in bytes.
    pub max_body_bytes: usize,
}

/// Default request body limit: 64 KiB.
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;

impl Default for AdminSettings {
    fn default() -> Self {
        Self {
            page_limits: PageLimits::default(),
            window_limits: TimeWindowLimits::default(),
            max_invitation_batch: 100,
            collaborator_timeout: Duration::from_secs(5),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// Collaborator ports consumed by admin handlers.
#[derive(Clone)]
pub struct AdminPorts {
    pub analytics: Arc<dyn AnalyticsService>,
    pub invitations: Arc<dyn InvitationStore>,
    pub users: Arc<dyn UserStore>,
}

/// Ports, limits and clock bundled for the handlers.
#[derive(Clone)]
pub struct AdminState {
    pub(crate) ports: AdminPorts,
    pub(crate) settings: AdminSettings,
    pub(crate) clock: Arc<dyn Clock>,
}

impl AdminState {
    pub fn new(ports: AdminPorts, settings: AdminSettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            ports,
            settings,
            clock,
        }
    }

    pub fn settings(&self) -> &AdminSettings {
        &self.settings
    }

    /// Await a collaborator call, bounded by the configured timeout.
    ///
    /// Expiry maps to `service_unavailable`; dropping the returned future
    /// drops the collaborator future with it.
    pub(crate) async fn call<T, E, Fut>(
        &self,
        collaborator: &'static str,
        fut: Fut,
        map_err: fn(E) -> Error,
    ) -> Result<T, Error>
    where
        Fut: Future<Output = Result<T, E>>,
    {
        let timeout = self.settings.collaborator_timeout;
        match tokio::time::timeout(timeout, fut).await {
            Ok(result) => result.map_err(map_err),
            Err(_) => {
                warn!(
                    collaborator,
                    timeout_ms = timeout_millis(timeout),
                    "collaborator call timed out"
                );
                Err(Error::service_unavailable(format!(
                    "{collaborator} did not respond within {} ms",
                    timeout.as_millis()
                )))
            }
        }
    }
}

/// Whole milliseconds in `timeout`, saturating at `u64::MAX`.
pub(crate) fn timeout_millis(timeout: Duration) -> u64 {
    u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX)
}

pub(crate) fn map_analytics_error(error: AnalyticsServiceError) -> Error {
    let message = error.to_string();
    match error {
        AnalyticsServiceError::Rejected { .. } => Error::invalid_argument(message),
        AnalyticsServiceError::Unavailable { .. } | AnalyticsServiceError::Query { .. } => {
            Error::service_unavailable(message)
        }
    }
}

pub(crate) fn map_invitation_error(error: InvitationStoreError) -> Error {
    let message = error.to_string();
    match error {
        InvitationStoreError::Duplicate { .. } | InvitationStoreError::IdempotencyConflict { .. } => {
            Error::conflict(message)
        }
        InvitationStoreError::Rejected { .. } => Error::invalid_argument(message),
        InvitationStoreError::Unavailable { .. } | InvitationStoreError::Query { .. } => {
            Error::service_unavailable(message)
        }
    }
}

pub(crate) fn map_user_error(error: UserStoreError) -> Error {
    Error::service_unavailable(error.to_string())
}
