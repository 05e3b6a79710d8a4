//! Domain primitives, collaborator ports and the admin dispatch layer.
//!
//! Nothing here depends on a web framework. Inbound adapters translate
//! transport requests into [`admin::AdminRequest`] values and map [`Error`]
//! back onto their protocol.
//!
//! Public surface:
//! - [`Error`] / [`ErrorCode`]: failure payload and taxonomy.
//! - [`TraceId`]: request correlation identifier.
//! - [`InvitationCode`], [`UserRecord`] and the analytics snapshots.
//! - [`ports`]: collaborator traits.
//! - [`admin`]: route table and dispatcher.

pub mod admin;
pub mod analytics;
pub mod error;
pub mod idempotency;
pub mod invitation;
pub mod ports;
pub mod trace_id;
pub mod user;

pub use self::analytics::{
    BillingAnalysis, DailyPoint, ErrorAnalysis, ModelAnalysis, ModelUsage, RequestAnalysis,
    ServiceInfo, TimeRange, TimeRangeError, TimeWindowLimits,
};
pub use self::error::{Error, ErrorCode};
pub use self::idempotency::{
    IdempotencyKey, IdempotencyKeyValidationError, PayloadHash, PayloadHashError,
    canonicalize_and_hash,
};
pub use self::invitation::{
    InvitationBatch, InvitationBatchDraft, InvitationCode, InvitationLabel, InvitationStatus,
    InvitationValidationError, Quota,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{UserId, UserRecord, UserSearch, UserValidationError, Username};
