//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers:
//!
//! - **Paths**: the eight admin operations and the health probes.
//! - **Schemas**: wrappers from [`crate::domain::admin::schemas`] that mirror
//!   the wire shape of domain types without coupling them to utoipa.
//! - **Security**: the `AdminBearer` HTTP bearer scheme.
//!
//! The document backs Swagger UI (debug builds) and is exported via
//! `cargo run --bin openapi-dump`.

use crate::domain::admin::schemas::{
    BillingAnalysisSchema, DailyAmountSchema, DailyCountSchema, ErrorAnalysisSchema,
    ErrorCodeSchema, ErrorSchema, GenerateInvitationsRequestSchema, GeneratedInvitationsSchema,
    InvitationCodeSchema, InvitationPageSchema, InvitationStatusSchema, ModelAnalysisSchema,
    ModelUsageSchema, RequestAnalysisSchema, ServiceInfoSchema, TimeRangeSchema, UserPageSchema,
    UserRecordSchema,
};
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Security scheme name referenced by every admin operation.
pub const ADMIN_SECURITY_SCHEME: &str = "AdminBearer";

/// Enrich the generated document with the admin bearer security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            ADMIN_SECURITY_SCHEME,
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

/// OpenAPI document for the admin gateway.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Admin gateway API",
        description = "Administrative analytics, invitation and user endpoints.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("AdminBearer" = [])),
    paths(
        crate::domain::admin::handlers::get_info,
        crate::domain::admin::handlers::get_model_analysis,
        crate::domain::admin::handlers::get_request_analysis,
        crate::domain::admin::handlers::get_billing_analysis,
        crate::domain::admin::handlers::get_error_analysis,
        crate::domain::admin::handlers::list_invitations,
        crate::domain::admin::handlers::generate_invitations,
        crate::domain::admin::handlers::list_users,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        TimeRangeSchema,
        DailyCountSchema,
        DailyAmountSchema,
        ServiceInfoSchema,
        ModelUsageSchema,
        ModelAnalysisSchema,
        RequestAnalysisSchema,
        BillingAnalysisSchema,
        ErrorAnalysisSchema,
        InvitationStatusSchema,
        InvitationCodeSchema,
        InvitationPageSchema,
        GenerateInvitationsRequestSchema,
        GeneratedInvitationsSchema,
        UserRecordSchema,
        UserPageSchema,
    )),
    tags(
        (name = "analytics", description = "Read-only usage and billing analytics"),
        (name = "invitations", description = "Invitation code listing and generation"),
        (name = "users", description = "Registered user listing"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
