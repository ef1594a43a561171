// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use isk_core::test_support::{repo_fp, validation_handle};
use isk_core::{JobId, JobKind, RemoteStatus};
use proptest::prelude::*;

#[test]
fn trigger_request_omits_null_payload() {
    let body = serde_json::to_value(TriggerRequest::new(repo_fp("main"), serde_json::Value::Null)).unwrap();
    assert!(body.get("payload").is_none());
    assert_eq!(body["fingerprint"]["branch"], "main");
}

#[yare::parameterized(
    job_id    = { r#"{"job_id":"j-1","auth_token":"t"}"#, Some("j-1"), Some("t") },
    id_alias  = { r#"{"id":"j-2","token":"t2"}"#,         Some("j-2"), Some("t2") },
    empty     = { "{}",                                    None,        None },
    extra     = { r#"{"job_id":"j-3","queued":true}"#,    Some("j-3"), None },
)]
fn trigger_response_fields(json: &str, id: Option<&str>, token: Option<&str>) {
    let parsed: TriggerResponse = serde_json::from_str(json).unwrap();
    assert_eq!(parsed.job_id.as_ref().map(JobId::as_str), id);
    assert_eq!(parsed.auth_token.as_deref(), token);
}

#[test]
fn status_response_fills_missing_fields_from_handle() {
    let handle = validation_handle("job-1", "main");
    let status: StatusResponse = serde_json::from_str(r#"{"status":"PENDING"}"#).unwrap();
    let result = status.into_poll_result(&handle);
    assert_eq!(result.job_id, "job-1");
    assert_eq!(result.fingerprint, repo_fp("main"));
    assert_eq!(result.status, RemoteStatus::Pending);
}

#[test]
fn status_response_keeps_server_fields() {
    let handle = validation_handle("cor-1", "main");
    let json = serde_json::json!({
        "job_id": "srv-9",
        "status": "COMPLETED",
        "fingerprint": {"repo_url": "https://other", "branch": "dev"},
        "result": {"valid": true},
    });
    let status: StatusResponse = serde_json::from_value(json).unwrap();
    let result = status.into_poll_result(&handle);
    assert_eq!(result.job_id, "srv-9");
    assert_eq!(result.fingerprint.get("branch"), Some("dev"));
    assert_eq!(result.payload, Some(serde_json::json!({"valid": true})));
}

#[test]
fn error_body_prefers_message() {
    let body: ErrorBody = serde_json::from_str(r#"{"error":"conflict","message":"already running"}"#).unwrap();
    assert_eq!(body.text().as_deref(), Some("already running"));
    let body: ErrorBody = serde_json::from_str(r#"{"message":"  "}"#).unwrap();
    assert_eq!(body.text(), None);
}

#[test]
fn subscribe_frame_encoding() {
    let frame = ClientFrame::Subscribe {
        job_id: JobId::new("m-1"),
        kind: JobKind::MeetingProcessing,
        token: None,
    };
    let text = encode_frame(&frame).unwrap();
    assert_eq!(text, r#"{"type":"subscribe","job_id":"m-1","kind":"meeting-processing"}"#);
}

#[test]
fn status_frame_decoding() {
    let frame = decode_frame(r#"{"type":"status","job_id":"m-1","status":"ERROR","error":"bad audio"}"#).unwrap();
    match frame {
        ServerFrame::Status { status } => {
            assert_eq!(status.status, RemoteStatus::Error);
            assert_eq!(status.error.as_deref(), Some("bad audio"));
        }
        other => panic!("unexpected frame {other:?}"),
    }
    assert!(decode_frame(r#"{"type":"bogus"}"#).is_err());
}

proptest! {
    #[test]
    fn fingerprint_query_is_order_independent(a in "[a-z]{1,6}", b in "[a-z]{1,6}") {
        let one = isk_core::Fingerprint::new().with("repo_url", &a).with("branch", &b);
        let two = isk_core::Fingerprint::new().with("branch", &b).with("repo_url", &a);
        prop_assert_eq!(fingerprint_query(&one).unwrap(), fingerprint_query(&two).unwrap());
    }
}
