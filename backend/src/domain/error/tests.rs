//! Tests for domain error construction and serialisation.

use super::*;
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

#[rstest]
#[case(Error::invalid_request("bad"), ErrorCode::InvalidRequest)]
#[case(Error::unauthorized("no token"), ErrorCode::Unauthorized)]
#[case(Error::forbidden("not yours"), ErrorCode::Forbidden)]
#[case(Error::not_found("missing"), ErrorCode::NotFound)]
#[case(Error::conflict("already applied"), ErrorCode::Conflict)]
#[case(Error::service_unavailable("pool down"), ErrorCode::ServiceUnavailable)]
#[case(Error::internal("boom"), ErrorCode::InternalError)]
fn constructors_set_codes(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
fn try_new_rejects_blank_messages() {
    let result = Error::try_new(ErrorCode::Conflict, "   ");
    assert_eq!(result, Err(ErrorValidationError::EmptyMessage));
}

#[rstest]
fn trace_id_is_absent_outside_a_request_scope() {
    assert!(Error::internal("boom").trace_id().is_none());
}

#[rstest]
#[tokio::test]
async fn new_captures_trace_id_in_scope(expected_trace_id: String) {
    let trace_id: TraceId = expected_trace_id.parse().expect("fixture UUID");
    let error = TraceId::scope(trace_id, async move { Error::not_found("job missing") }).await;

    assert_eq!(error.trace_id(), Some(expected_trace_id.as_str()));
}

#[rstest]
fn serialises_with_camel_case_and_skips_empty_fields(expected_trace_id: String) {
    let error = Error::conflict("taken")
        .with_trace_id(expected_trace_id.clone())
        .with_details(json!({ "field": "phone" }));

    let value = serde_json::to_value(&error).expect("serialise error");
    assert_eq!(
        value,
        json!({
            "code": "conflict",
            "message": "taken",
            "traceId": expected_trace_id,
            "details": { "field": "phone" }
        })
    );

    let bare = serde_json::to_value(Error::forbidden("nope")).expect("serialise error");
    assert!(bare.get("traceId").is_none());
    assert!(bare.get("details").is_none());
}

#[rstest]
fn deserialising_rejects_blank_messages() {
    let result = serde_json::from_value::<Error>(json!({ "code": "not_found", "message": "" }));
    assert!(result.is_err());
}

#[rstest]
fn invalid_field_names_the_field_and_reason() {
    let error = Error::invalid_field("bio", "not_a_helper", "only helpers have a bio");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        error.details(),
        Some(&json!({ "field": "bio", "code": "not_a_helper" }))
    );
}

#[rstest]
#[case(ErrorCode::ServiceUnavailable, "service_unavailable")]
#[case(ErrorCode::InternalError, "internal_error")]
fn codes_display_their_wire_names(#[case] code: ErrorCode, #[case] expected: &str) {
    assert_eq!(code.to_string(), expected);
    assert_eq!(serde_json::to_value(code).expect("code"), json!(expected));
}
