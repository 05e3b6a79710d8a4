//! Driven port for invitation code persistence.
//!
//! Stores own code generation and uniqueness. The admin layer hands over a
//! validated batch together with an optional idempotency fingerprint; the
//! store decides whether the request is new, a replay, or a conflicting reuse
//! of the key.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{IdempotencyKey, InvitationBatch, InvitationCode, PayloadHash};

use super::define_port_error;

define_port_error! {
    /// Errors raised by invitation store adapters.
    pub enum InvitationStoreError {
        /// The store could not be reached.
        Unavailable { message: String } => "invitation store unavailable: {message}",
        /// A generated code collided with an existing one.
        Duplicate { code: String } => "invitation code already exists: {code}",
        /// The idempotency key was already used with a different payload.
        IdempotencyConflict { key: String } =>
            "idempotency key {key} was already used with a different request",
        /// The store refused the batch.
        Rejected { message: String } => "invitation batch rejected: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "invitation store query failed: {message}",
    }
}

/// Retry fingerprint attached to a creation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdempotencyFingerprint {
    pub key: IdempotencyKey,
    pub payload_hash: PayloadHash,
}

/// Request to persist a freshly generated batch.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateInvitationsRequest {
    pub batch: InvitationBatch,
    pub idempotency: Option<IdempotencyFingerprint>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InvitationStore: Send + Sync {
    /// Codes in insertion order, as observed now.
    async fn list(&self, page: &PageRequest) -> Result<Page<InvitationCode>, InvitationStoreError>;

    /// Codes created earlier under `fingerprint.key`, or `None` for an unseen
    /// key.
    ///
    /// Returns [`InvitationStoreError::IdempotencyConflict`] when the key was
    /// used with a different payload hash.
    async fn replay(
        &self,
        fingerprint: &IdempotencyFingerprint,
    ) -> Result<Option<Vec<InvitationCode>>, InvitationStoreError>;

    /// Generate and persist `request.batch.quantity()` distinct codes.
    ///
    /// A request carrying a fingerprint seen before returns the codes of the
    /// original request when the payload hash matches, and
    /// [`InvitationStoreError::IdempotencyConflict`] when it does not.
    async fn create(
        &self,
        request: &CreateInvitationsRequest,
    ) -> Result<Vec<InvitationCode>, InvitationStoreError>;
}

/// Fixture implementation holding no codes and refusing writes.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureInvitationStore;

#[async_trait]
impl InvitationStore for FixtureInvitationStore {
    async fn list(&self, page: &PageRequest) -> Result<Page<InvitationCode>, InvitationStoreError> {
        Ok(Page::new(Vec::new(), page, 0))
    }

    async fn replay(
        &self,
        _fingerprint: &IdempotencyFingerprint,
    ) -> Result<Option<Vec<InvitationCode>>, InvitationStoreError> {
        Ok(None)
    }

    async fn create(
        &self,
        _request: &CreateInvitationsRequest,
    ) -> Result<Vec<InvitationCode>, InvitationStoreError> {
        Err(InvitationStoreError::rejected("fixture store is read-only"))
    }
}
