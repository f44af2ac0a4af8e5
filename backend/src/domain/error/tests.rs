//! Construction, trace capture and wire form of [`Error`].

use rstest::rstest;
use serde_json::json;
use uuid::Uuid;

use super::*;

fn trace() -> TraceId {
    TraceId::from_uuid(Uuid::from_u128(0x6f1c_9a2e_4b7d_4e1a_9c3f_2d8b_5a0e_7f14))
}

#[rstest]
#[case(Error::invalid_request("Club name is required"), ErrorCode::InvalidRequest, "invalid_request")]
#[case(Error::invalid_state("Cannot join inactive club"), ErrorCode::InvalidState, "invalid_state")]
#[case(Error::unauthorized("login required"), ErrorCode::Unauthorized, "unauthorized")]
#[case(Error::forbidden("admin role required"), ErrorCode::Forbidden, "forbidden")]
#[case(Error::not_found("Club not found"), ErrorCode::NotFound, "not_found")]
#[case(Error::conflict("You have already voted in this election"), ErrorCode::Conflict, "conflict")]
#[case(Error::service_unavailable("store unreachable"), ErrorCode::ServiceUnavailable, "service_unavailable")]
#[case(Error::internal("tally overflow"), ErrorCode::InternalError, "internal_error")]
fn shorthands_pick_their_code(
    #[case] error: Error,
    #[case] code: ErrorCode,
    #[case] wire: &str,
) {
    assert_eq!(error.code(), code);
    assert_eq!(serde_json::to_value(error).expect("serialise")["code"], wire);
}

#[rstest]
#[case("")]
#[case("   ")]
fn blank_messages_are_rejected(#[case] message: &str) {
    assert_eq!(
        Error::try_new(ErrorCode::Conflict, message),
        Err(ErrorValidationError::EmptyMessage)
    );
}

#[rstest]
fn blank_trace_ids_are_rejected() {
    let result = Error::not_found("Election not found").try_with_trace_id(" ");
    assert_eq!(result, Err(ErrorValidationError::EmptyTraceId));
}

#[rstest]
fn errors_outside_a_request_have_no_trace() {
    assert_eq!(Error::internal("boom").trace_id(), None);
}

#[rstest]
#[tokio::test]
async fn errors_inside_a_request_capture_its_trace() {
    let error = TraceId::scope(trace(), async { Error::forbidden("admin role required") }).await;
    assert_eq!(error.trace_id(), Some(trace().to_string().as_str()));
}

#[rstest]
#[tokio::test]
async fn deserialised_errors_keep_their_own_trace() {
    let payload = json!({"code": "conflict", "message": "duplicate"});
    let error: Error = TraceId::scope(trace(), async move {
        serde_json::from_value(payload).expect("valid payload")
    })
    .await;
    assert_eq!(error.trace_id(), None);
}

#[rstest]
fn wire_form_is_camel_case_and_sparse() {
    let bare = serde_json::to_value(Error::not_found("Club not found")).expect("serialise");
    assert_eq!(bare, json!({"code": "not_found", "message": "Club not found"}));

    let full = Error::invalid_state("election is closed for voting")
        .with_trace_id("abc")
        .with_details(json!({"code": "election_closed"}));
    let value = serde_json::to_value(&full).expect("serialise");
    assert_eq!(value["traceId"], "abc");
    assert_eq!(value["details"]["code"], "election_closed");

    let back: Error = serde_json::from_value(value).expect("deserialise");
    assert_eq!(back, full);
}

#[rstest]
#[case(json!({"code": "not_found", "message": " "}))]
#[case(json!({"code": "not_found", "message": "gone", "traceId": ""}))]
#[case(json!({"code": "not_found", "message": "gone", "extra": 1}))]
#[case(json!({"code": "teapot", "message": "gone"}))]
fn malformed_payloads_do_not_deserialise(#[case] payload: serde_json::Value) {
    assert!(serde_json::from_value::<Error>(payload).is_err());
}

#[rstest]
fn display_is_the_message() {
    assert_eq!(
        Error::invalid_state("Cannot join inactive club").to_string(),
        "Cannot join inactive club"
    );
}
