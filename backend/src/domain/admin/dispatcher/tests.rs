//! Dispatch behaviour over mocked collaborators.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use pagination::Page;
use rstest::{fixture, rstest};
use rstest_bdd_macros::{given, then, when};
use serde_json::{Value, json};

use super::*;
use crate::domain::admin::{AdminPorts, AdminSettings, Method};
use crate::domain::ports::{
    AnalyticsService, AnalyticsServiceError, CreateInvitationsRequest, FixtureAnalyticsService,
    FixtureInvitationStore, FixtureUserStore, IdempotencyFingerprint, InvitationStoreError,
    MockAnalyticsService, MockInvitationStore, MockUserStore, UserStoreError,
};
use crate::domain::{
    BillingAnalysis, ErrorAnalysis, InvitationBatch, InvitationBatchDraft, InvitationCode,
    ModelAnalysis, RequestAnalysis, ServiceInfo, TimeRange,
};

const IDEMPOTENCY_KEY: &str = "550e8400-e29b-41d4-a716-446655440000";

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

#[fixture]
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0)
        .single()
        .expect("fixture instant")
}

#[fixture]
fn ports() -> AdminPorts {
    AdminPorts {
        analytics: Arc::new(FixtureAnalyticsService),
        invitations: Arc::new(FixtureInvitationStore),
        users: Arc::new(FixtureUserStore),
    }
}

fn dispatcher_with(
    ports: AdminPorts,
    settings: AdminSettings,
    now: DateTime<Utc>,
) -> AdminDispatcher {
    AdminDispatcher::new(AdminState::new(
        ports,
        settings,
        Arc::new(FixtureClock { utc_now: now }),
    ))
}

fn dispatcher(ports: AdminPorts, now: DateTime<Utc>) -> AdminDispatcher {
    dispatcher_with(ports, AdminSettings::default(), now)
}

fn generate(body: Value) -> AdminRequest {
    AdminRequest::new(Method::Post, "/admin/invitation/generate").with_body(body.to_string())
}

fn issued_codes(request: &CreateInvitationsRequest, now: DateTime<Utc>) -> Vec<InvitationCode> {
    (0..request.batch.quantity())
        .map(|n| InvitationCode::issue(format!("code-{n}"), &request.batch, now))
        .collect()
}

#[rstest]
#[tokio::test]
async fn unknown_path_is_not_found(ports: AdminPorts, now: DateTime<Utc>) {
    let err = dispatcher(ports, now)
        .dispatch(&AdminRequest::new(Method::Get, "/admin/unknown"))
        .await
        .expect_err("no route");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn wrong_method_lists_allowed_methods(ports: AdminPorts, now: DateTime<Utc>) {
    let err = dispatcher(ports, now)
        .dispatch(&AdminRequest::new(Method::Delete, "/admin/user/list"))
        .await
        .expect_err("wrong method");
    assert_eq!(err.code(), ErrorCode::MethodNotAllowed);
    assert_eq!(err.details(), Some(&json!({ "allowed": ["GET"] })));
}

#[rstest]
#[tokio::test]
async fn info_is_returned_as_camel_case_json(ports: AdminPorts, now: DateTime<Utc>) {
    let body = dispatcher(ports, now)
        .dispatch(&AdminRequest::new(Method::Get, "/admin/analytics/info"))
        .await
        .expect("info");
    assert_eq!(body["uptimeSeconds"], json!(0));
    assert_eq!(body["version"], json!(env!("CARGO_PKG_VERSION")));
}

#[rstest]
#[tokio::test]
async fn analytics_receive_the_requested_window(mut ports: AdminPorts, now: DateTime<Utc>) {
    let mut analytics = MockAnalyticsService::new();
    analytics
        .expect_request_volume()
        .withf(|range: &TimeRange| {
            range.from().to_rfc3339() == "2026-03-01T00:00:00+00:00"
                && range.to().to_rfc3339() == "2026-03-08T00:00:00+00:00"
        })
        .times(1)
        .returning(|range| Ok(RequestAnalysis::new(*range, Vec::new())));
    ports.analytics = Arc::new(analytics);

    let request = AdminRequest::new(Method::Get, "/admin/analytics/request")
        .with_query("from=2026-03-01T00:00:00Z&to=2026-03-08T00:00:00Z");
    let body = dispatcher(ports, now).dispatch(&request).await.expect("analysis");
    assert_eq!(body["total"], json!(0));
}

#[rstest]
#[case("/admin/analytics/model")]
#[case("/admin/analytics/request")]
#[case("/admin/analytics/billing")]
#[case("/admin/analytics/error")]
#[tokio::test]
async fn malformed_window_never_reaches_analytics(
    mut ports: AdminPorts,
    now: DateTime<Utc>,
    #[case] path: &str,
) {
    let mut analytics = MockAnalyticsService::new();
    analytics.expect_model_usage().never();
    analytics.expect_request_volume().never();
    analytics.expect_billing().never();
    analytics.expect_errors().never();
    ports.analytics = Arc::new(analytics);

    let request = AdminRequest::new(Method::Get, path).with_query("from=last-week");
    let err = dispatcher(ports, now)
        .dispatch(&request)
        .await
        .expect_err("bad timestamp");
    assert_eq!(err.code(), ErrorCode::InvalidArgument);
    assert_eq!(err.details().and_then(|d| d.get("code")), Some(&json!("invalid_timestamp")));
}

#[rstest]
#[tokio::test]
async fn analytics_rejection_is_invalid_argument(mut ports: AdminPorts, now: DateTime<Utc>) {
    let mut analytics = MockAnalyticsService::new();
    analytics
        .expect_billing()
        .returning(|_| Err(AnalyticsServiceError::rejected("window not yet aggregated")));
    ports.analytics = Arc::new(analytics);

    let err = dispatcher(ports, now)
        .dispatch(&AdminRequest::new(Method::Get, "/admin/analytics/billing"))
        .await
        .expect_err("rejected");
    assert_eq!(err.code(), ErrorCode::InvalidArgument);
    assert_eq!(
        err.message(),
        "analytics query rejected: window not yet aggregated"
    );
}

#[rstest]
#[case("page_size=0", "page_size")]
#[case("page_size=101", "page_size")]
#[case("page=0", "page")]
#[case("page=-2", "page")]
#[case("cursor=%%%", "cursor")]
#[tokio::test]
async fn invalid_pagination_is_rejected(
    mut ports: AdminPorts,
    now: DateTime<Utc>,
    #[case] query: &str,
    #[case] field: &str,
) {
    let mut store = MockInvitationStore::new();
    store.expect_list().never();
    ports.invitations = Arc::new(store);

    let request = AdminRequest::new(Method::Get, "/admin/invitation/list").with_query(query);
    let err = dispatcher(ports, now)
        .dispatch(&request)
        .await
        .expect_err("invalid page");
    assert_eq!(err.code(), ErrorCode::InvalidArgument);
    assert_eq!(err.details().and_then(|d| d.get("field")), Some(&json!(field)));
}

#[given("an invitation store that issues codes")]
fn an_invitation_store_that_issues_codes(now: DateTime<Utc>) -> MockInvitationStore {
    let mut store = MockInvitationStore::new();
    store
        .expect_create()
        .times(1)
        .returning(move |request| Ok(issued_codes(request, now)));
    store
}

#[when("an administrator asks for three codes")]
fn an_administrator_asks_for_three_codes() -> AdminRequest {
    generate(json!({ "quantity": 3 }))
}

#[then("three distinct codes are returned")]
fn three_distinct_codes_are_returned(result: Result<Value, Error>) {
    let body = result.expect("codes generated");
    let codes = body["codes"].as_array().expect("codes array");
    let unique: std::collections::HashSet<_> =
        codes.iter().map(|code| code["code"].as_str()).collect();
    assert_eq!(codes.len(), 3);
    assert_eq!(unique.len(), 3);
}

#[rstest]
#[tokio::test]
async fn generating_codes_happy_path(ports: AdminPorts, now: DateTime<Utc>) {
    let store = an_invitation_store_that_issues_codes(now);
    let request = an_administrator_asks_for_three_codes();
    let ports = AdminPorts {
        invitations: Arc::new(store),
        ..ports
    };
    let result = dispatcher(ports, now).dispatch(&request).await;
    three_distinct_codes_are_returned(result);
}

#[rstest]
#[case(json!({ "quantity": 0 }), "quantity", "quantity_not_positive")]
#[case(json!({ "quantity": -1 }), "quantity", "quantity_not_positive")]
#[case(json!({ "quantity": 101 }), "quantity", "quantity_too_large")]
#[case(json!({}), "quantity", "missing_field")]
#[case(json!({ "quantity": 1, "expiry": "soon" }), "expiry", "invalid_timestamp")]
#[case(json!({ "quantity": 1, "expiry": "2026-03-10T08:00:00Z" }), "expiry", "expiry_not_in_future")]
#[case(json!({ "quantity": 1, "quota": -5 }), "quota", "invalid_quota")]
#[case(json!({ "quantity": 1, "label": "no spaces" }), "label", "label_invalid_characters")]
#[case(json!({ "quantity": 1, "colour": "red" }), "body", "invalid_body")]
#[case(json!([1, 2]), "body", "invalid_body")]
#[tokio::test]
async fn invalid_batches_create_nothing(
    mut ports: AdminPorts,
    now: DateTime<Utc>,
    #[case] body: Value,
    #[case] field: &str,
    #[case] code: &str,
) {
    let mut store = MockInvitationStore::new();
    store.expect_create().never();
    ports.invitations = Arc::new(store);

    let err = dispatcher(ports, now)
        .dispatch(&generate(body))
        .await
        .expect_err("invalid batch");
    assert_eq!(err.code(), ErrorCode::InvalidArgument);
    let details = err.details().expect("details");
    assert_eq!(details.get("field"), Some(&json!(field)));
    assert_eq!(details.get("code"), Some(&json!(code)));
}

#[rstest]
#[tokio::test]
async fn malformed_json_is_rejected(ports: AdminPorts, now: DateTime<Utc>) {
    let request =
        AdminRequest::new(Method::Post, "/admin/invitation/generate").with_body("{quantity: 3");
    let err = dispatcher(ports, now)
        .dispatch(&request)
        .await
        .expect_err("malformed JSON");
    assert_eq!(err.code(), ErrorCode::InvalidArgument);
}

#[rstest]
#[tokio::test]
async fn idempotency_key_and_hash_reach_the_store(mut ports: AdminPorts, now: DateTime<Utc>) {
    let mut store = MockInvitationStore::new();
    let first_hash = Arc::new(std::sync::Mutex::new(None));
    let seen = first_hash.clone();
    store
        .expect_replay()
        .withf(|fingerprint: &IdempotencyFingerprint| fingerprint.key.as_ref() == IDEMPOTENCY_KEY)
        .times(2)
        .returning(move |fingerprint| {
            let mut seen = seen.lock().expect("hash lock");
            assert_eq!(*seen.get_or_insert(fingerprint.payload_hash), fingerprint.payload_hash);
            Ok(None)
        });
    store
        .expect_create()
        .withf(|request: &CreateInvitationsRequest| {
            request
                .idempotency
                .as_ref()
                .is_some_and(|fingerprint| fingerprint.key.as_ref() == IDEMPOTENCY_KEY)
        })
        .times(2)
        .returning(move |request| Ok(issued_codes(request, now)));
    ports.invitations = Arc::new(store);
    let dispatcher = dispatcher(ports, now);

    let first = generate(json!({ "label": "beta", "quantity": 2 }))
        .with_idempotency_key(IDEMPOTENCY_KEY);
    let reordered = AdminRequest::new(Method::Post, "/admin/invitation/generate")
        .with_body(r#"{ "quantity": 2, "label": "beta" }"#)
        .with_idempotency_key(IDEMPOTENCY_KEY);

    dispatcher.dispatch(&first).await.expect("first call");
    dispatcher.dispatch(&reordered).await.expect("retry");
}

#[rstest]
#[tokio::test]
async fn malformed_idempotency_key_is_rejected(ports: AdminPorts, now: DateTime<Utc>) {
    let request = generate(json!({ "quantity": 1 })).with_idempotency_key("not-a-uuid");
    let err = dispatcher(ports, now)
        .dispatch(&request)
        .await
        .expect_err("bad key");
    assert_eq!(err.code(), ErrorCode::InvalidArgument);
    assert_eq!(
        err.details().and_then(|d| d.get("field")),
        Some(&json!("Idempotency-Key"))
    );
}

#[rstest]
#[tokio::test]
async fn idempotency_conflict_is_a_conflict(mut ports: AdminPorts, now: DateTime<Utc>) {
    let mut store = MockInvitationStore::new();
    store.expect_replay().returning(|_| {
        Err(InvitationStoreError::idempotency_conflict(IDEMPOTENCY_KEY))
    });
    store.expect_create().never();
    ports.invitations = Arc::new(store);

    let request = generate(json!({ "quantity": 1 })).with_idempotency_key(IDEMPOTENCY_KEY);
    let err = dispatcher(ports, now)
        .dispatch(&request)
        .await
        .expect_err("conflict");
    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn retry_after_expiry_replays_original_codes(mut ports: AdminPorts, now: DateTime<Utc>) {
    let expiry = now - chrono::Duration::hours(1);
    let mut store = MockInvitationStore::new();
    store.expect_replay().times(1).returning(move |_| {
        let original = InvitationBatch::new(
            InvitationBatchDraft {
                quantity: 1,
                expires_at: Some(expiry),
                ..Default::default()
            },
            10,
            expiry - chrono::Duration::days(1),
        )
        .expect("original batch");
        Ok(Some(vec![
            InvitationCode::issue("code-0".to_owned(), &original, expiry).observed_at(now),
        ]))
    });
    store.expect_create().never();
    ports.invitations = Arc::new(store);

    let request = generate(json!({ "quantity": 1, "expiry": expiry.to_rfc3339() }))
        .with_idempotency_key(IDEMPOTENCY_KEY);
    let body = dispatcher(ports, now)
        .dispatch(&request)
        .await
        .expect("replayed");
    assert_eq!(body["codes"][0]["code"], json!("code-0"));
    assert_eq!(body["codes"][0]["status"], json!("expired"));
}

#[rstest]
#[tokio::test]
async fn past_expiry_without_key_is_rejected(mut ports: AdminPorts, now: DateTime<Utc>) {
    let mut store = MockInvitationStore::new();
    store.expect_replay().never();
    store.expect_create().never();
    ports.invitations = Arc::new(store);

    let expiry = (now - chrono::Duration::hours(1)).to_rfc3339();
    let err = dispatcher(ports, now)
        .dispatch(&generate(json!({ "quantity": 1, "expiry": expiry })))
        .await
        .expect_err("expired batch");
    assert_eq!(err.code(), ErrorCode::InvalidArgument);
}

#[rstest]
#[tokio::test]
async fn user_search_is_forwarded(mut ports: AdminPorts, now: DateTime<Utc>) {
    let mut users = MockUserStore::new();
    users
        .expect_list()
        .withf(|request| {
            request
                .search
                .as_ref()
                .is_some_and(|search| search.as_ref() == "ada")
                && request.page.page_size() == 5
        })
        .times(1)
        .returning(|request| Ok(Page::new(Vec::new(), &request.page, 0)));
    ports.users = Arc::new(users);

    let request = AdminRequest::new(Method::Get, "/admin/user/list")
        .with_query("page_size=5&search=%20ada%20");
    let body = dispatcher(ports, now).dispatch(&request).await.expect("users");
    assert_eq!(body["pageSize"], json!(5));
}

#[rstest]
#[tokio::test]
async fn blank_search_is_rejected(ports: AdminPorts, now: DateTime<Utc>) {
    let request = AdminRequest::new(Method::Get, "/admin/user/list").with_query("search=+++");
    let err = dispatcher(ports, now)
        .dispatch(&request)
        .await
        .expect_err("blank search");
    assert_eq!(err.details().and_then(|d| d.get("code")), Some(&json!("empty_search")));
}

#[rstest]
#[tokio::test]
async fn unavailable_store_is_service_unavailable(mut ports: AdminPorts, now: DateTime<Utc>) {
    let mut users = MockUserStore::new();
    users
        .expect_list()
        .returning(|_| Err(UserStoreError::unavailable("connection refused")));
    ports.users = Arc::new(users);

    let err = dispatcher(ports, now)
        .dispatch(&AdminRequest::new(Method::Get, "/admin/user/list"))
        .await
        .expect_err("unavailable");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    assert_eq!(err.message(), "user store unavailable: connection refused");
}

struct StalledAnalytics;

#[async_trait]
impl AnalyticsService for StalledAnalytics {
    async fn info(&self) -> Result<ServiceInfo, AnalyticsServiceError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Err(AnalyticsServiceError::unavailable("never answered"))
    }

    async fn model_usage(&self, range: &TimeRange) -> Result<ModelAnalysis, AnalyticsServiceError> {
        FixtureAnalyticsService.model_usage(range).await
    }

    async fn request_volume(
        &self,
        range: &TimeRange,
    ) -> Result<RequestAnalysis, AnalyticsServiceError> {
        FixtureAnalyticsService.request_volume(range).await
    }

    async fn billing(&self, range: &TimeRange) -> Result<BillingAnalysis, AnalyticsServiceError> {
        FixtureAnalyticsService.billing(range).await
    }

    async fn errors(&self, range: &TimeRange) -> Result<ErrorAnalysis, AnalyticsServiceError> {
        FixtureAnalyticsService.errors(range).await
    }
}

#[rstest]
#[tokio::test]
async fn slow_collaborator_times_out(mut ports: AdminPorts, now: DateTime<Utc>) {
    ports.analytics = Arc::new(StalledAnalytics);
    let settings = AdminSettings {
        collaborator_timeout: Duration::from_millis(20),
        ..AdminSettings::default()
    };

    let err = dispatcher_with(ports, settings, now)
        .dispatch(&AdminRequest::new(Method::Get, "/admin/analytics/info"))
        .await
        .expect_err("timed out");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    assert_eq!(err.message(), "analytics engine did not respond within 20 ms");
}

#[rstest]
#[tokio::test]
async fn reads_are_repeatable(ports: AdminPorts, now: DateTime<Utc>) {
    let dispatcher = dispatcher(ports, now);
    let request = AdminRequest::new(Method::Get, "/admin/invitation/list").with_query("page=1");
    let first = dispatcher.dispatch(&request).await.expect("first read");
    let second = dispatcher.dispatch(&request).await.expect("second read");
    assert_eq!(first, second);
}
