//! Administrator authorisation for HTTP handlers.
//!
//! [`AdminSession`] is an extractor: handlers that take it as an argument
//! only run once the bearer token in `Authorization` has been accepted by the
//! [`AdminAuthorizer`](crate::domain::ports::AdminAuthorizer) port.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use tracing::{debug, warn};

use crate::domain::Error;
use crate::domain::admin::timeout_millis;
use crate::domain::ports::{AdminAuthorizerError, AdminDecision};

use super::state::HttpState;

/// Identity of an authorised administrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSession {
    subject: String,
}

impl AdminSession {
    /// Subject reported by the authoriser.
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
///
/// The scheme is matched case-insensitively.
pub(crate) fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

fn map_authorizer_error(error: AdminAuthorizerError) -> Error {
    Error::service_unavailable(error.to_string())
}

async fn authorise(state: &HttpState, token: &str) -> Result<AdminSession, Error> {
    let timeout = state.dispatcher.settings().collaborator_timeout;
    let decision = match tokio::time::timeout(timeout, state.authorizer.authorize(token)).await {
        Ok(result) => result.map_err(map_authorizer_error)?,
        Err(_) => {
            warn!(
                timeout_ms = timeout_millis(timeout),
                "authoriser call timed out"
            );
            return Err(Error::service_unavailable(format!(
                "authoriser did not respond within {} ms",
                timeout.as_millis()
            )));
        }
    };
    match decision {
        AdminDecision::Granted { subject } => {
            debug!(subject, "admin credential accepted");
            Ok(AdminSession { subject })
        }
        AdminDecision::Denied => Err(Error::unauthorized("admin credential rejected")),
    }
}

impl FromRequest for AdminSession {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        let token = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .map(str::to_owned);
        Box::pin(async move {
            let Some(state) = state else {
                return Err(Error::internal("HTTP state is not configured").into());
            };
            let Some(token) = token else {
                return Err(Error::unauthorized("missing bearer token").into());
            };
            authorise(&state, &token).await.map_err(Into::into)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockAdminAuthorizer;
    use crate::inbound::http::test_utils::http_state;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test as actix_test};
    use rstest::rstest;
    use rstest_bdd_macros::{given, then};
    use std::sync::Arc;

    #[rstest]
    #[case("Bearer s3cret", Some("s3cret"))]
    #[case("bearer   s3cret  ", Some("s3cret"))]
    #[case("Basic czNjcmV0", None)]
    #[case("Bearer ", None)]
    #[case("s3cret", None)]
    fn parses_bearer_header(#[case] header: &str, #[case] expected: Option<&str>) {
        assert_eq!(bearer_token(header), expected);
    }

    async fn whoami(session: AdminSession) -> HttpResponse {
        HttpResponse::Ok().body(session.subject().to_owned())
    }

    async fn call(authorizer: MockAdminAuthorizer, header: Option<&str>) -> (StatusCode, String) {
        let state = web::Data::new(http_state(Arc::new(authorizer)));
        let app = actix_test::init_service(
            App::new()
                .app_data(state)
                .route("/whoami", web::get().to(whoami)),
        )
        .await;
        let mut req = actix_test::TestRequest::get().uri("/whoami");
        if let Some(header) = header {
            req = req.insert_header((AUTHORIZATION, header));
        }
        let res = actix_test::call_service(&app, req.to_request()).await;
        let status = res.status();
        let body = actix_test::read_body(res).await;
        (status, String::from_utf8_lossy(&body).into_owned())
    }

    #[given("an authoriser that grants the token")]
    fn an_authoriser_that_grants_the_token() -> MockAdminAuthorizer {
        let mut authorizer = MockAdminAuthorizer::new();
        authorizer
            .expect_authorize()
            .withf(|token| token == "s3cret")
            .times(1)
            .return_once(|_| {
                Ok(AdminDecision::Granted {
                    subject: "ops".to_owned(),
                })
            });
        authorizer
    }

    #[then("the handler sees the subject")]
    fn the_handler_sees_the_subject(outcome: (StatusCode, String)) {
        assert_eq!(outcome, (StatusCode::OK, "ops".to_owned()));
    }

    #[actix_web::test]
    async fn granted_token_reaches_handler() {
        let authorizer = an_authoriser_that_grants_the_token();
        let outcome = call(authorizer, Some("Bearer s3cret")).await;
        the_handler_sees_the_subject(outcome);
    }

    #[actix_web::test]
    async fn missing_header_is_unauthorised_without_asking_port() {
        let mut authorizer = MockAdminAuthorizer::new();
        authorizer.expect_authorize().never();

        let (status, body) = call(authorizer, None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let error: Error = serde_json::from_str(&body).expect("error body");
        assert_eq!(error.message(), "missing bearer token");
    }

    #[actix_web::test]
    async fn denied_token_is_unauthorised() {
        let mut authorizer = MockAdminAuthorizer::new();
        authorizer
            .expect_authorize()
            .return_once(|_| Ok(AdminDecision::Denied));

        let (status, _) = call(authorizer, Some("Bearer wrong")).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn unreachable_authoriser_is_unavailable() {
        let mut authorizer = MockAdminAuthorizer::new();
        authorizer
            .expect_authorize()
            .return_once(|_| Err(AdminAuthorizerError::unavailable("ldap down")));

        let (status, body) = call(authorizer, Some("Bearer s3cret")).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body.contains("ldap down"));
    }
}
