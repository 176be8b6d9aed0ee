//! Tests for the domain error payload.

use super::*;
use rstest::rstest;
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[rstest]
#[case(Error::invalid_request("bad"), ErrorCode::InvalidRequest)]
#[case(Error::unauthorized("no auth"), ErrorCode::Unauthorized)]
#[case(Error::forbidden("denied"), ErrorCode::Forbidden)]
#[case(Error::not_found("missing"), ErrorCode::NotFound)]
#[case(Error::conflict("taken"), ErrorCode::Conflict)]
#[case(Error::service_unavailable("down"), ErrorCode::ServiceUnavailable)]
#[case(Error::internal("boom"), ErrorCode::InternalError)]
fn constructors_set_code(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[tokio::test]
async fn new_captures_trace_id_in_scope() {
    let trace_id: TraceId = TRACE_ID.parse().expect("valid UUID");
    let error = TraceId::scope(trace_id, async move { Error::internal("boom") }).await;
    assert_eq!(error.trace_id(), Some(TRACE_ID));
}

#[test]
fn new_has_no_trace_id_out_of_scope() {
    assert!(Error::internal("boom").trace_id().is_none());
}

#[test]
fn serialises_message_under_error_key() {
    let error = Error::invalid_request("Value must be a positive number")
        .with_details(json!({ "field": "value" }));
    let value = serde_json::to_value(&error).expect("serialise error");
    assert_eq!(
        value,
        json!({
            "error": "Value must be a positive number",
            "code": "invalid_request",
            "details": { "field": "value" },
        })
    );
}

#[test]
fn deserialises_snake_case_trace_id_alias() {
    let error: Error = serde_json::from_value(json!({
        "error": "missing",
        "code": "not_found",
        "trace_id": TRACE_ID,
    }))
    .expect("deserialise error");
    assert_eq!(error.trace_id(), Some(TRACE_ID));
    assert_eq!(error.message(), "missing");
}
