//! Tests for the domain error payload.

use super::*;
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn trace_id() -> TraceId {
    TRACE_ID.parse().expect("fixture trace id is a UUID")
}

#[rstest]
#[case(Error::invalid_argument("bad"), ErrorCode::InvalidArgument)]
#[case(Error::unauthorized("who"), ErrorCode::Unauthorized)]
#[case(Error::not_found("gone"), ErrorCode::NotFound)]
#[case(Error::method_not_allowed("nope"), ErrorCode::MethodNotAllowed)]
#[case(Error::conflict("dup"), ErrorCode::Conflict)]
#[case(Error::service_unavailable("down"), ErrorCode::ServiceUnavailable)]
#[case(Error::internal("boom"), ErrorCode::InternalError)]
fn constructors_set_code(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
fn trace_id_is_absent_out_of_scope() {
    assert!(Error::internal("boom").trace_id().is_none());
}

#[rstest]
#[tokio::test]
async fn trace_id_is_captured_in_scope(trace_id: TraceId) {
    let error = TraceId::scope(trace_id, async { Error::conflict("dup") }).await;
    assert_eq!(error.trace_id(), Some(TRACE_ID));
}

#[rstest]
fn serialises_snake_case_code_and_camel_case_fields() {
    let error = Error::invalid_argument("page_size must be between 1 and 100")
        .with_trace_id(TRACE_ID)
        .with_details(json!({ "field": "page_size" }));
    let value = serde_json::to_value(&error).expect("serialises");
    assert_eq!(
        value,
        json!({
            "code": "invalid_argument",
            "message": "page_size must be between 1 and 100",
            "traceId": TRACE_ID,
            "details": { "field": "page_size" }
        })
    );
}

#[rstest]
fn optional_fields_are_omitted() {
    let value = serde_json::to_value(Error::not_found("gone")).expect("serialises");
    assert!(value.get("traceId").is_none());
    assert!(value.get("details").is_none());
}

#[rstest]
fn deserialises_client_payload() {
    let error: Error = serde_json::from_value(json!({
        "code": "service_unavailable",
        "message": "analytics offline"
    }))
    .expect("deserialises");
    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    assert_eq!(error.message(), "analytics offline");
}

#[rstest]
fn display_includes_code_and_message() {
    assert_eq!(
        Error::conflict("duplicate code").to_string(),
        "conflict: duplicate code"
    );
}
