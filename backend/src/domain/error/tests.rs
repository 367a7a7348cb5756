//! Tests for domain error construction and serialisation.

use super::*;
use rstest::{fixture, rstest};
use serde_json::json;
use uuid::Uuid;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn base_error() -> Error {
    Error::invalid_request("bad")
}

#[rstest]
#[case(Error::invalid_request("x"), ErrorCode::InvalidRequest)]
#[case(Error::self_reference("x"), ErrorCode::SelfReference)]
#[case(Error::blocked_relationship("x"), ErrorCode::BlockedRelationship)]
#[case(Error::unauthorized("x"), ErrorCode::Unauthorized)]
#[case(Error::forbidden("x"), ErrorCode::Forbidden)]
#[case(Error::not_found("x"), ErrorCode::NotFound)]
#[case(Error::conflict("x"), ErrorCode::Conflict)]
#[case(Error::service_unavailable("x"), ErrorCode::ServiceUnavailable)]
#[case(Error::internal("x"), ErrorCode::InternalError)]
fn constructors_set_codes(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
fn with_field_names_the_offending_input(base_error: Error) {
    let error = base_error.with_field("title", "too_long");
    assert_eq!(
        error.details(),
        Some(&json!({ "field": "title", "code": "too_long" }))
    );
}

#[rstest]
fn new_returns_none_when_trace_id_out_of_scope() {
    let error = Error::internal("boom");
    assert!(error.trace_id().is_none());
}

#[tokio::test]
async fn new_captures_scoped_trace_id() {
    let trace_id = TraceId::from_uuid(Uuid::nil());
    let error = TraceId::scope(trace_id, async { Error::not_found("missing") }).await;
    assert_eq!(error.trace_id(), Some(TRACE_ID));
}

#[rstest]
fn serialises_camel_case_and_skips_empty_fields(base_error: Error) {
    let value = serde_json::to_value(&base_error).expect("serialise error");
    assert_eq!(value, json!({ "code": "invalid_request", "message": "bad" }));

    let detailed = base_error
        .with_trace_id(TRACE_ID)
        .with_details(json!({ "field": "title" }));
    let value = serde_json::to_value(&detailed).expect("serialise error");
    assert_eq!(value.get("traceId"), Some(&json!(TRACE_ID)));
    assert_eq!(value.get("details"), Some(&json!({ "field": "title" })));
}

#[rstest]
#[case(ErrorCode::SelfReference, "self_reference")]
#[case(ErrorCode::BlockedRelationship, "blocked_relationship")]
#[case(ErrorCode::ServiceUnavailable, "service_unavailable")]
fn codes_serialise_as_snake_case(#[case] code: ErrorCode, #[case] expected: &str) {
    let value = serde_json::to_value(code).expect("serialise code");
    assert_eq!(value, json!(expected));
}
