//! OpenAPI schema definitions for admin payloads.
//!
//! Domain types do not derive `ToSchema`. These wrappers mirror their wire
//! shape (camelCase fields, snake_case enum values) for documentation only.

#![expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]

use utoipa::ToSchema;

/// Stable machine-readable error codes.
#[derive(ToSchema)]
#[schema(as = ErrorCode)]
pub enum ErrorCodeSchema {
    #[schema(rename = "invalid_argument")]
    InvalidArgument,
    #[schema(rename = "unauthorized")]
    Unauthorized,
    #[schema(rename = "not_found")]
    NotFound,
    #[schema(rename = "method_not_allowed")]
    MethodNotAllowed,
    #[schema(rename = "conflict")]
    Conflict,
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    #[schema(rename = "internal_error")]
    InternalError,
}

/// Error payload returned with every 4xx and 5xx response.
#[derive(ToSchema)]
#[schema(as = Error, rename_all = "camelCase")]
pub struct ErrorSchema {
    #[schema(example = "invalid_argument")]
    code: ErrorCodeSchema,
    #[schema(example = "page_size must be between 1 and 100")]
    message: String,
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// `{field, code, value?}` for validation failures, `{allowed}` for 405.
    details: Option<serde_json::Value>,
}

/// Half-open UTC interval.
#[derive(ToSchema)]
#[schema(as = TimeRange)]
pub struct TimeRangeSchema {
    #[schema(value_type = String, format = DateTime)]
    from: String,
    #[schema(value_type = String, format = DateTime)]
    to: String,
}

/// Count for one UTC day.
#[derive(ToSchema)]
#[schema(as = DailyCount)]
pub struct DailyCountSchema {
    #[schema(value_type = String, format = Date, example = "2026-03-09")]
    date: String,
    value: u64,
}

/// Amount for one UTC day.
#[derive(ToSchema)]
#[schema(as = DailyAmount)]
pub struct DailyAmountSchema {
    #[schema(value_type = String, format = Date, example = "2026-03-09")]
    date: String,
    value: f64,
}

#[derive(ToSchema)]
#[schema(as = ServiceInfo, rename_all = "camelCase")]
pub struct ServiceInfoSchema {
    #[schema(example = "0.1.0")]
    version: String,
    uptime_seconds: u64,
    billing_today: f64,
    billing_month: f64,
    requests_today: u64,
}

#[derive(ToSchema)]
#[schema(as = ModelUsage)]
pub struct ModelUsageSchema {
    #[schema(example = "gpt-4o")]
    model: String,
    requests: u64,
    tokens: u64,
    daily: Vec<DailyCountSchema>,
}

#[derive(ToSchema)]
#[schema(as = ModelAnalysis)]
pub struct ModelAnalysisSchema {
    range: TimeRangeSchema,
    models: Vec<ModelUsageSchema>,
}

#[derive(ToSchema)]
#[schema(as = RequestAnalysis)]
pub struct RequestAnalysisSchema {
    range: TimeRangeSchema,
    daily: Vec<DailyCountSchema>,
    total: u64,
}

#[derive(ToSchema)]
#[schema(as = BillingAnalysis)]
pub struct BillingAnalysisSchema {
    range: TimeRangeSchema,
    daily: Vec<DailyAmountSchema>,
    total: f64,
}

#[derive(ToSchema)]
#[schema(as = ErrorAnalysis, rename_all = "camelCase")]
pub struct ErrorAnalysisSchema {
    range: TimeRangeSchema,
    daily: Vec<DailyCountSchema>,
    total_requests: u64,
    total_errors: u64,
    /// `totalErrors / totalRequests`, zero without requests.
    error_rate: f64,
}

#[derive(ToSchema)]
#[schema(as = InvitationStatus)]
pub enum InvitationStatusSchema {
    #[schema(rename = "unused")]
    Unused,
    #[schema(rename = "used")]
    Used,
    #[schema(rename = "expired")]
    Expired,
}

#[derive(ToSchema)]
#[schema(as = InvitationCode, rename_all = "camelCase")]
pub struct InvitationCodeSchema {
    #[schema(example = "beta-Zk3q9XhT0aLmPq2Rw8YbNc4D")]
    code: String,
    #[schema(example = "beta")]
    label: Option<String>,
    quota: Option<f64>,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
    #[schema(value_type = Option<String>, format = DateTime)]
    expires_at: Option<String>,
    status: InvitationStatusSchema,
    batch_quantity: u32,
    #[schema(value_type = Option<String>, format = Uuid)]
    redeemed_by: Option<String>,
}

/// One page of invitation codes.
#[derive(ToSchema)]
#[schema(as = InvitationPage, rename_all = "camelCase")]
pub struct InvitationPageSchema {
    items: Vec<InvitationCodeSchema>,
    page: u32,
    page_size: u32,
    total: u64,
    total_pages: u64,
    /// Absent on the last page.
    next_cursor: Option<String>,
}

#[derive(ToSchema)]
#[schema(as = GenerateInvitationsRequest)]
pub struct GenerateInvitationsRequestSchema {
    #[schema(minimum = 1, example = 3)]
    quantity: i64,
    #[schema(value_type = Option<String>, format = DateTime)]
    expiry: Option<String>,
    #[schema(minimum = 0.0)]
    quota: Option<f64>,
    #[schema(pattern = "^[A-Za-z0-9_-]{1,32}$", example = "beta")]
    label: Option<String>,
}

#[derive(ToSchema)]
#[schema(as = GeneratedInvitations)]
pub struct GeneratedInvitationsSchema {
    codes: Vec<InvitationCodeSchema>,
}

#[derive(ToSchema)]
#[schema(as = UserRecord, rename_all = "camelCase")]
pub struct UserRecordSchema {
    #[schema(value_type = String, format = Uuid)]
    id: String,
    #[schema(example = "ada")]
    username: String,
    is_admin: bool,
    quota: f64,
    #[schema(value_type = String, format = DateTime)]
    registered_at: String,
}

/// One page of users.
#[derive(ToSchema)]
#[schema(as = UserPage, rename_all = "camelCase")]
pub struct UserPageSchema {
    items: Vec<UserRecordSchema>,
    page: u32,
    page_size: u32,
    total: u64,
    total_pages: u64,
    next_cursor: Option<String>,
}
