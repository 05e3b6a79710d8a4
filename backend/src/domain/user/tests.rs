//! Tests for user records and search terms.

use super::*;
use chrono::TimeZone;
use rstest::{fixture, rstest};
use rstest_bdd_macros::{given, then, when};
use serde_json::json;

const VALID_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

#[fixture]
fn record() -> UserRecord {
    UserRecord::new(
        UserId::new(VALID_ID).expect("fixture id"),
        Username::new("AdaLovelace").expect("fixture username"),
        true,
        Quota::new(12.5).expect("fixture quota"),
        Utc.with_ymd_and_hms(2025, 12, 10, 8, 30, 0)
            .single()
            .expect("fixture instant"),
    )
}

#[rstest]
#[case("", UserValidationError::EmptyId)]
#[case("not-a-uuid", UserValidationError::InvalidId)]
#[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6 ", UserValidationError::InvalidId)]
fn user_id_rejects_malformed_input(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(UserId::new(raw), Err(expected));
}

#[rstest]
fn user_id_from_uuid_keeps_canonical_text() {
    let uuid = Uuid::parse_str(VALID_ID).expect("valid UUID");
    let id = UserId::from_uuid(uuid);
    assert_eq!(id.as_uuid(), &uuid);
    assert_eq!(id.as_ref(), VALID_ID);
}

#[rstest]
#[case("   ".to_owned(), UserValidationError::EmptyUsername)]
#[case("x".repeat(USERNAME_MAX + 1), UserValidationError::UsernameTooLong { max: USERNAME_MAX })]
fn username_is_validated(#[case] raw: String, #[case] expected: UserValidationError) {
    assert_eq!(Username::new(raw), Err(expected));
}

#[rstest]
#[case("  ".to_owned(), UserValidationError::EmptySearch)]
#[case("q".repeat(SEARCH_MAX + 1), UserValidationError::SearchTooLong { max: SEARCH_MAX })]
fn search_is_validated(#[case] raw: String, #[case] expected: UserValidationError) {
    assert_eq!(UserSearch::new(&raw), Err(expected));
}

#[rstest]
fn search_length_is_measured_after_trimming() {
    let padded = format!("  {}  ", "q".repeat(SEARCH_MAX));
    assert!(UserSearch::new(&padded).is_ok());
}

#[given("a user named AdaLovelace")]
fn a_user_named_ada(record: UserRecord) -> UserRecord {
    record
}

#[when("the user is matched against the search")]
fn the_user_is_matched(user: UserRecord, search: UserSearch) -> bool {
    user.username().matches(&search)
}

#[then("the user is included")]
fn the_user_is_included(matched: bool) {
    assert!(matched);
}

#[then("the user is excluded")]
fn the_user_is_excluded(matched: bool) {
    assert!(!matched);
}

#[rstest]
#[case("ada")]
#[case("LOVE")]
#[case(" lace ")]
fn search_matches_case_insensitive_substrings(record: UserRecord, #[case] term: &str) {
    let user = a_user_named_ada(record);
    let matched = the_user_is_matched(user, UserSearch::new(term).expect("valid search"));
    the_user_is_included(matched);
}

#[rstest]
fn search_skips_non_matching_users(record: UserRecord) {
    let user = a_user_named_ada(record);
    let matched = the_user_is_matched(user, UserSearch::new("grace").expect("valid search"));
    the_user_is_excluded(matched);
}

#[rstest]
fn record_serialises_camel_case(record: UserRecord) {
    let value = serde_json::to_value(&record).expect("serialises");
    assert_eq!(
        value,
        json!({
            "id": VALID_ID,
            "username": "AdaLovelace",
            "isAdmin": true,
            "quota": 12.5,
            "registeredAt": "2025-12-10T08:30:00Z"
        })
    );
}

#[rstest]
fn record_rejects_unknown_fields() {
    let result: Result<UserRecord, _> = serde_json::from_value(json!({
        "id": VALID_ID,
        "username": "ada",
        "isAdmin": false,
        "quota": 0.0,
        "registeredAt": "2025-12-10T08:30:00Z",
        "password": "secret"
    }));
    assert!(result.is_err());
}

#[rstest]
fn record_rejects_negative_quota() {
    let result: Result<UserRecord, _> = serde_json::from_value(json!({
        "id": VALID_ID,
        "username": "ada",
        "isAdmin": false,
        "quota": -1.0,
        "registeredAt": "2025-12-10T08:30:00Z"
    }));
    assert!(result.is_err());
}
