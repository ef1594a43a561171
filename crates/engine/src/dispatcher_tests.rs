// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use isk_adapters::{BackendCall, FakeBackend};
use isk_core::test_support::repo_fp;
use isk_core::{FakeClock, Lookup};
use isk_wire::TriggerResponse;

fn dispatcher() -> (Dispatcher<FakeBackend, FakeClock>, FakeBackend) {
    let backend = FakeBackend::new();
    (Dispatcher::new(backend.clone(), FakeClock::new()), backend)
}

#[tokio::test]
async fn invalid_fingerprint_makes_no_call() {
    let (dispatcher, backend) = dispatcher();
    let err = dispatcher
        .start(JobKind::Validation, &Fingerprint::new(), serde_json::Value::Null, JobId::new("cor-1"))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        DispatchError::InvalidFingerprint { missing: vec!["repo_url".into(), "branch".into()] }
    );
    assert_eq!(backend.trigger_count(), 0);
}

#[tokio::test]
async fn server_id_becomes_handle() {
    let (dispatcher, backend) = dispatcher();
    backend.push_trigger(Ok(TriggerResponse { job_id: Some(JobId::new("job-42")), auth_token: Some("tok".into()) }));

    let handle = dispatcher
        .start(JobKind::Validation, &repo_fp("main"), serde_json::json!({"deep": true}), JobId::new("cor-1"))
        .await
        .unwrap();

    assert_eq!(handle.id, "job-42");
    assert_eq!(handle.lookup, Lookup::ById);
    assert_eq!(handle.auth_token.as_deref(), Some("tok"));
    assert_eq!(handle.fingerprint, repo_fp("main"));
    assert_eq!(handle.created_at_ms, 1_000_000);
    assert_eq!(
        backend.calls(),
        vec![BackendCall::Trigger {
            kind: JobKind::Validation,
            fingerprint: repo_fp("main"),
            payload: serde_json::json!({"deep": true}),
        }]
    );
}

#[tokio::test]
async fn missing_server_id_tracks_by_fingerprint() {
    let (dispatcher, backend) = dispatcher();
    backend.push_trigger(Ok(TriggerResponse::default()));

    let handle = dispatcher
        .start(JobKind::Reindex, &Fingerprint::project("p-1"), serde_json::Value::Null, JobId::new("cor-9"))
        .await
        .unwrap();
    assert_eq!(handle.id, "cor-9");
    assert_eq!(handle.lookup, Lookup::ByFingerprint);
}

#[yare::parameterized(
    unsent    = { BackendError::Unsent("refused".into()),                        false },
    config    = { BackendError::Config("bad url".into()),                        false },
    ambiguous = { BackendError::Ambiguous("timed out".into()),                   true },
    decode    = { BackendError::Decode("eof".into()),                            true },
)]
fn network_failures_classified(err: BackendError, ambiguous: bool) {
    match to_dispatch_error(err) {
        DispatchError::NetworkFailure { ambiguous: got, .. } => assert_eq!(got, ambiguous),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn status_errors_are_rejections() {
    let err = to_dispatch_error(BackendError::Status { status: 409, message: "running".into() });
    assert_eq!(err, DispatchError::ServerRejected { status: 409, message: "running".into() });
    assert!(!err.is_ambiguous());
}

#[tokio::test]
async fn ambiguous_trigger_failure_surfaces_once() {
    let (dispatcher, backend) = dispatcher();
    backend.push_trigger(Err(BackendError::Ambiguous("timed out".into())));

    let err = dispatcher
        .start(JobKind::Creation, &Fingerprint::project("p-1"), serde_json::Value::Null, JobId::new("cor-1"))
        .await
        .unwrap_err();
    assert!(err.is_ambiguous());
    assert_eq!(backend.trigger_count(), 1);
}
