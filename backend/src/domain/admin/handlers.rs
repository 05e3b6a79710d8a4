//! Admin operations as plain async functions over a [`HandlerContext`].
//!
//! Each handler validates its parameters, calls one collaborator through
//! [`AdminState::call`] and serialises the result. None of them touches a
//! web framework type.

use chrono::{DateTime, Utc};
use futures_util::future::BoxFuture;
use pagination::{PageParams, PageRequest};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::request::AdminRequest;
use super::schemas::{
    BillingAnalysisSchema, ErrorAnalysisSchema, ErrorSchema, GenerateInvitationsRequestSchema,
    GeneratedInvitationsSchema, InvitationPageSchema, ModelAnalysisSchema,
    RequestAnalysisSchema, ServiceInfoSchema, UserPageSchema,
};
use super::state::{AdminState, map_analytics_error, map_invitation_error, map_user_error};
use super::validation;
use crate::domain::ports::{CreateInvitationsRequest, IdempotencyFingerprint, UserListRequest};
use crate::domain::{
    Error, IdempotencyKey, InvitationBatch, InvitationBatchDraft, InvitationCode, TimeRange,
    UserSearch, canonicalize_and_hash,
};

const ANALYTICS: &str = "analytics engine";
const INVITATIONS: &str = "invitation store";
const USERS: &str = "user store";

/// Outcome of a handler: a JSON body or a taxonomy error.
pub type HandlerResult = Result<Value, Error>;
/// Boxed handler future stored in the route table.
pub type HandlerFuture<'a> = BoxFuture<'a, HandlerResult>;

/// Everything a handler may read while serving one request.
#[derive(Clone, Copy)]
pub struct HandlerContext<'a> {
    pub state: &'a AdminState,
    pub request: &'a AdminRequest,
}

impl HandlerContext<'_> {
    fn now(&self) -> DateTime<Utc> {
        self.state.clock.utc()
    }

    fn time_range(&self) -> Result<TimeRange, Error> {
        TimeRange::parse(
            self.request.query("from"),
            self.request.query("to"),
            &self.state.settings.window_limits,
            self.now(),
        )
        .map_err(|err| validation::time_range_error(&err))
    }

    fn page(&self) -> Result<PageRequest, Error> {
        let params = PageParams {
            page: self.request.query("page"),
            page_size: self.request.query("page_size"),
            cursor: self.request.query("cursor"),
        };
        PageRequest::parse(params, &self.state.settings.page_limits)
            .map_err(|err| validation::page_error(&err))
    }
}

fn to_json<T: Serialize>(value: &T) -> HandlerResult {
    serde_json::to_value(value)
        .map_err(|err| Error::internal(format!("failed to serialise response: {err}")))
}

/// Service snapshot: version, uptime and today's totals.
#[utoipa::path(
    get,
    path = "/admin/analytics/info",
    tags = ["analytics"],
    operation_id = "getInfo",
    responses(
        (status = 200, description = "Service snapshot", body = ServiceInfoSchema),
        (status = 401, description = "Missing or rejected admin token", body = ErrorSchema),
        (status = 503, description = "Analytics engine unavailable", body = ErrorSchema)
    )
)]
pub async fn get_info(ctx: HandlerContext<'_>) -> HandlerResult {
    let analytics = &ctx.state.ports.analytics;
    let info = ctx
        .state
        .call(ANALYTICS, analytics.info(), map_analytics_error)
        .await?;
    to_json(&info)
}

/// Requests and tokens per model.
#[utoipa::path(
    get,
    path = "/admin/analytics/model",
    tags = ["analytics"],
    operation_id = "getModelAnalysis",
    params(
        ("from" = Option<String>, Query, description = "RFC 3339 window start; defaults to the configured window before `to`"),
        ("to" = Option<String>, Query, description = "RFC 3339 window end (exclusive); defaults to now")
    ),
    responses(
        (status = 200, description = "Per-model usage", body = ModelAnalysisSchema),
        (status = 400, description = "Malformed time range", body = ErrorSchema),
        (status = 401, description = "Missing or rejected admin token", body = ErrorSchema),
        (status = 503, description = "Analytics engine unavailable", body = ErrorSchema)
    )
)]
pub async fn get_model_analysis(ctx: HandlerContext<'_>) -> HandlerResult {
    let range = ctx.time_range()?;
    let analytics = &ctx.state.ports.analytics;
    let analysis = ctx
        .state
        .call(ANALYTICS, analytics.model_usage(&range), map_analytics_error)
        .await?;
    to_json(&analysis)
}

/// Requests per day.
#[utoipa::path(
    get,
    path = "/admin/analytics/request",
    tags = ["analytics"],
    operation_id = "getRequestAnalysis",
    params(
        ("from" = Option<String>, Query, description = "RFC 3339 window start"),
        ("to" = Option<String>, Query, description = "RFC 3339 window end (exclusive)")
    ),
    responses(
        (status = 200, description = "Daily request volume", body = RequestAnalysisSchema),
        (status = 400, description = "Malformed time range", body = ErrorSchema),
        (status = 401, description = "Missing or rejected admin token", body = ErrorSchema),
        (status = 503, description = "Analytics engine unavailable", body = ErrorSchema)
    )
)]
pub async fn get_request_analysis(ctx: HandlerContext<'_>) -> HandlerResult {
    let range = ctx.time_range()?;
    let analytics = &ctx.state.ports.analytics;
    let analysis = ctx
        .state
        .call(ANALYTICS, analytics.request_volume(&range), map_analytics_error)
        .await?;
    to_json(&analysis)
}

/// Billed amount per day.
#[utoipa::path(
    get,
    path = "/admin/analytics/billing",
    tags = ["analytics"],
    operation_id = "getBillingAnalysis",
    params(
        ("from" = Option<String>, Query, description = "RFC 3339 window start"),
        ("to" = Option<String>, Query, description = "RFC 3339 window end (exclusive)")
    ),
    responses(
        (status = 200, description = "Daily billing", body = BillingAnalysisSchema),
        (status = 400, description = "Malformed time range", body = ErrorSchema),
        (status = 401, description = "Missing or rejected admin token", body = ErrorSchema),
        (status = 503, description = "Analytics engine unavailable", body = ErrorSchema)
    )
)]
pub async fn get_billing_analysis(ctx: HandlerContext<'_>) -> HandlerResult {
    let range = ctx.time_range()?;
    let analytics = &ctx.state.ports.analytics;
    let analysis = ctx
        .state
        .call(ANALYTICS, analytics.billing(&range), map_analytics_error)
        .await?;
    to_json(&analysis)
}

/// Failed requests per day and the overall error rate.
#[utoipa::path(
    get,
    path = "/admin/analytics/error",
    tags = ["analytics"],
    operation_id = "getErrorAnalysis",
    params(
        ("from" = Option<String>, Query, description = "RFC 3339 window start"),
        ("to" = Option<String>, Query, description = "RFC 3339 window end (exclusive)")
    ),
    responses(
        (status = 200, description = "Daily errors", body = ErrorAnalysisSchema),
        (status = 400, description = "Malformed time range", body = ErrorSchema),
        (status = 401, description = "Missing or rejected admin token", body = ErrorSchema),
        (status = 503, description = "Analytics engine unavailable", body = ErrorSchema)
    )
)]
pub async fn get_error_analysis(ctx: HandlerContext<'_>) -> HandlerResult {
    let range = ctx.time_range()?;
    let analytics = &ctx.state.ports.analytics;
    let analysis = ctx
        .state
        .call(ANALYTICS, analytics.errors(&range), map_analytics_error)
        .await?;
    to_json(&analysis)
}

/// Invitation codes in creation order.
#[utoipa::path(
    get,
    path = "/admin/invitation/list",
    tags = ["invitations"],
    operation_id = "listInvitations",
    params(
        ("page" = Option<u32>, Query, description = "1-based page number; defaults to 1"),
        ("page_size" = Option<u32>, Query, description = "Items per page; defaults to 20"),
        ("cursor" = Option<String>, Query, description = "Opaque `nextCursor` from a previous page; excludes `page`")
    ),
    responses(
        (status = 200, description = "One page of invitation codes", body = InvitationPageSchema),
        (status = 400, description = "Invalid pagination parameters", body = ErrorSchema),
        (status = 401, description = "Missing or rejected admin token", body = ErrorSchema),
        (status = 503, description = "Invitation store unavailable", body = ErrorSchema)
    )
)]
pub async fn list_invitations(ctx: HandlerContext<'_>) -> HandlerResult {
    let page = ctx.page()?;
    let invitations = &ctx.state.ports.invitations;
    let codes = ctx
        .state
        .call(INVITATIONS, invitations.list(&page), map_invitation_error)
        .await?;
    to_json(&codes)
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GenerateInvitationsBody {
    #[serde(default)]
    quantity: Option<i64>,
    #[serde(default)]
    expiry: Option<String>,
    #[serde(default)]
    quota: Option<f64>,
    #[serde(default)]
    label: Option<String>,
}

#[derive(Debug, Serialize)]
struct GeneratedInvitations {
    codes: Vec<InvitationCode>,
}

fn parse_body(body: &[u8]) -> Result<Value, Error> {
    match serde_json::from_slice::<Value>(body) {
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(_) => Err(validation::invalid_body("request body must be a JSON object")),
        Err(err) => Err(validation::invalid_body(format!(
            "request body is not valid JSON: {err}"
        ))),
    }
}

fn parse_expiry(raw: &str) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(raw)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| validation::invalid_timestamp("expiry", raw))
}

/// Create a batch of invitation codes.
///
/// Supplying an `Idempotency-Key` makes retries safe: the same key with the
/// same body replays the original codes, a different body is a conflict.
/// Replays are answered before the batch is validated against the clock.
#[utoipa::path(
    post,
    path = "/admin/invitation/generate",
    tags = ["invitations"],
    operation_id = "generateInvitations",
    request_body = GenerateInvitationsRequestSchema,
    params(
        ("Idempotency-Key" = Option<String>, Header, description = "Client-generated UUID making retries safe")
    ),
    responses(
        (status = 200, description = "Newly created codes", body = GeneratedInvitationsSchema),
        (status = 400, description = "Invalid batch", body = ErrorSchema),
        (status = 401, description = "Missing or rejected admin token", body = ErrorSchema),
        (status = 409, description = "Code collision or idempotency key reuse", body = ErrorSchema),
        (status = 503, description = "Invitation store unavailable", body = ErrorSchema)
    )
)]
pub async fn generate_invitations(ctx: HandlerContext<'_>) -> HandlerResult {
    let body = parse_body(ctx.request.body())?;
    let payload_hash = canonicalize_and_hash(&body).map_err(|err| Error::internal(err.to_string()))?;
    let fields: GenerateInvitationsBody = serde_json::from_value(body)
        .map_err(|err| validation::invalid_body(format!("invalid request body: {err}")))?;

    let quantity = fields
        .quantity
        .ok_or_else(|| validation::missing_field("quantity"))?;
    let expires_at = fields.expiry.as_deref().map(parse_expiry).transpose()?;

    let idempotency = ctx
        .request
        .idempotency_key()
        .map(|raw| {
            IdempotencyKey::new(raw)
                .map(|key| IdempotencyFingerprint { key, payload_hash })
                .map_err(|err| validation::idempotency_key_error(&err, raw))
        })
        .transpose()?;

    let invitations = &ctx.state.ports.invitations;
    // A retry must replay even once the original expiry has passed.
    if let Some(fingerprint) = &idempotency {
        let replayed = ctx
            .state
            .call(INVITATIONS, invitations.replay(fingerprint), map_invitation_error)
            .await?;
        if let Some(codes) = replayed {
            return to_json(&GeneratedInvitations { codes });
        }
    }

    let draft = InvitationBatchDraft {
        quantity,
        expires_at,
        quota: fields.quota,
        label: fields.label,
    };
    let batch = InvitationBatch::new(draft, ctx.state.settings.max_invitation_batch, ctx.now())
        .map_err(|err| validation::invitation_error(&err))?;

    let request = CreateInvitationsRequest { batch, idempotency };
    let codes = ctx
        .state
        .call(INVITATIONS, invitations.create(&request), map_invitation_error)
        .await?;
    to_json(&GeneratedInvitations { codes })
}

/// Registered users in registration order.
#[utoipa::path(
    get,
    path = "/admin/user/list",
    tags = ["users"],
    operation_id = "listUsers",
    params(
        ("page" = Option<u32>, Query, description = "1-based page number; defaults to 1"),
        ("page_size" = Option<u32>, Query, description = "Items per page; defaults to 20"),
        ("cursor" = Option<String>, Query, description = "Opaque `nextCursor` from a previous page; excludes `page`"),
        ("search" = Option<String>, Query, description = "Case-insensitive username fragment, 1-64 characters")
    ),
    responses(
        (status = 200, description = "One page of users", body = UserPageSchema),
        (status = 400, description = "Invalid pagination or search parameters", body = ErrorSchema),
        (status = 401, description = "Missing or rejected admin token", body = ErrorSchema),
        (status = 503, description = "User store unavailable", body = ErrorSchema)
    )
)]
pub async fn list_users(ctx: HandlerContext<'_>) -> HandlerResult {
    let page = ctx.page()?;
    let search = ctx
        .request
        .query("search")
        .map(|raw| UserSearch::new(raw).map_err(|err| validation::search_error(&err, raw)))
        .transpose()?;
    let request = UserListRequest { page, search };
    let users = &ctx.state.ports.users;
    let records = ctx
        .state
        .call(USERS, users.list(&request), map_user_error)
        .await?;
    to_json(&records)
}
