// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Failure paths

use super::*;
use isk_adapters::BackendError;
use isk_wire::StatusResponse;

#[tokio::test]
async fn invalid_fingerprint_fails_without_dispatch() {
    let mut ctx = setup();
    ctx.start(validation_slot(), JobKind::Validation, Fingerprint::repository("", "main")).await;

    assert_eq!(
        ctx.status(&validation_slot()),
        JobStatus::Failed { reason: FailureReason::InvalidFingerprint { missing: vec!["repo_url".into()] } }
    );
    assert_eq!(ctx.backend.trigger_count(), 0);
    assert_eq!(ctx.notices().len(), 1);
}

#[tokio::test]
async fn rejected_dispatch_surfaces_server_message() {
    let mut ctx = setup();
    ctx.backend.push_trigger(Err(BackendError::Status { status: 409, message: "already running".into() }));

    ctx.start_validation("main").await;

    assert_eq!(
        ctx.status(&validation_slot()),
        JobStatus::Failed { reason: FailureReason::Rejected { status: 409, message: "already running".into() } }
    );
    let notices = ctx.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].message, "already running");
    assert_eq!(ctx.active_watches(), 0);
}

#[tokio::test]
async fn unsent_dispatch_fails_without_fallback() {
    let mut ctx = setup();
    ctx.backend.push_trigger(Err(BackendError::Unsent("connection refused".into())));

    ctx.start_validation("main").await;

    assert!(matches!(
        ctx.status(&validation_slot()),
        JobStatus::Failed { reason: FailureReason::Transport { .. } }
    ));
    assert_eq!(ctx.backend.fetch_count(), 0);
}

#[tokio::test]
async fn remote_error_carries_backend_message() {
    let mut ctx = setup();
    ctx.backend.push_reply(
        "job-1",
        Ok(Some(StatusResponse {
            job_id: None,
            status: RemoteStatus::Error,
            fingerprint: None,
            result: None,
            error: Some("clone failed: repository not found".into()),
        })),
    );

    ctx.start_validation("main").await;
    ctx.advance_secs(1).await;

    assert_eq!(
        ctx.status(&validation_slot()),
        JobStatus::Failed {
            reason: FailureReason::Remote { message: "clone failed: repository not found".into() }
        }
    );
    let notices = ctx.notices();
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert_eq!(notices[0].message, "clone failed: repository not found");
}

#[tokio::test]
async fn missing_record_fails_after_window() {
    let config =
        config_for(JobKind::Validation, |c| c.missing_record_timeout(Duration::from_secs(5)));
    let mut ctx = setup_with(config);
    for _ in 0..5 {
        ctx.backend.push_reply("job-1", Ok(None));
    }

    ctx.start_validation("main").await;

    // Not found at 1s and 3s reads as pending
    ctx.advance_secs(3).await;
    assert!(matches!(ctx.status(&validation_slot()), JobStatus::Polling { attempt: 2, .. }));

    ctx.advance_secs(2).await;
    assert_eq!(ctx.status(&validation_slot()), JobStatus::Failed { reason: FailureReason::RecordNotFound });
    assert_eq!(ctx.notices().len(), 1);
    assert_eq!(ctx.active_watches(), 0);
}

#[tokio::test]
async fn missing_record_without_window_keeps_polling() {
    let mut ctx = setup();
    for _ in 0..5 {
        ctx.backend.push_reply("job-1", Ok(None));
    }

    ctx.start_validation("main").await;
    ctx.advance_secs(9).await;

    assert!(matches!(ctx.status(&validation_slot()), JobStatus::Polling { attempt: 5, .. }));
}

#[tokio::test]
async fn fingerprint_lookup_that_never_matches_is_unconfirmed() {
    let config = config_for(JobKind::Creation, |c| c.missing_record_timeout(Duration::from_secs(2)));
    let mut ctx = setup_with(config);
    let slot = SlotId::scoped(JobKind::Creation, "p-1");
    ctx.backend.push_trigger(Err(BackendError::Ambiguous("connection reset".into())));
    for _ in 0..3 {
        ctx.backend.push_reply("cor-1", Ok(None));
    }

    ctx.start(slot.clone(), JobKind::Creation, Fingerprint::project("p-1")).await;
    ctx.advance_secs(3).await;

    assert!(matches!(
        ctx.status(&slot),
        JobStatus::Failed { reason: FailureReason::Unconfirmed { .. } }
    ));
    assert_eq!(ctx.notices().len(), 1);
}

#[tokio::test]
async fn transport_errors_are_retried_then_fail() {
    let config = config_for(JobKind::Validation, |c| c.max_transport_errors(2));
    let mut ctx = setup_with(config);
    for _ in 0..3 {
        ctx.backend.push_reply("job-1", Err(BackendError::Ambiguous("connection reset".into())));
    }

    ctx.start_validation("main").await;

    // Errors at 1s and 3s are retried silently
    ctx.advance_secs(3).await;
    assert!(ctx.status(&validation_slot()).is_polling());
    assert!(ctx.notices().is_empty());

    ctx.advance_secs(2).await;
    assert!(matches!(
        ctx.status(&validation_slot()),
        JobStatus::Failed { reason: FailureReason::Transport { .. } }
    ));
    assert_eq!(ctx.notices().len(), 1);
}

#[tokio::test]
async fn transient_transport_error_recovers() {
    let mut ctx = setup();
    ctx.backend.push_reply("job-1", Err(BackendError::Ambiguous("connection reset".into())));
    ctx.backend.push_status("job-1", RemoteStatus::Completed, None);

    ctx.start_validation("main").await;
    ctx.advance_secs(3).await;

    assert!(matches!(ctx.status(&validation_slot()), JobStatus::Succeeded { .. }));
}

#[tokio::test]
async fn failed_notification_does_not_block_transition() {
    let mut ctx = setup();
    ctx.notifier.set_failing(true);
    ctx.backend.push_status("job-1", RemoteStatus::Completed, None);

    ctx.start_validation("main").await;
    ctx.advance_secs(1).await;

    assert!(matches!(ctx.status(&validation_slot()), JobStatus::Succeeded { .. }));
    assert_eq!(ctx.notices().len(), 1);
}
