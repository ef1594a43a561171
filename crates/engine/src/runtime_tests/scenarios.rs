// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end job flows

use super::*;
use isk_adapters::{BackendCall, BackendError};
use isk_core::{FetchOutcome, Lookup, PollResult};

#[tokio::test]
async fn validation_succeeds_after_pending() {
    let mut ctx = setup();
    ctx.backend.push_status("job-1", RemoteStatus::Pending, None);
    ctx.backend.push_status("job-1", RemoteStatus::Completed, Some(serde_json::json!({"valid": true})));

    ctx.start_validation("main").await;

    // First fetch after the grace window reads PENDING
    ctx.advance_secs(1).await;
    assert!(matches!(ctx.status(&validation_slot()), JobStatus::Polling { attempt: 1, .. }));

    // Next fetch one interval later reads COMPLETED
    ctx.advance_secs(2).await;
    assert_eq!(
        ctx.status(&validation_slot()),
        JobStatus::Succeeded { result: serde_json::json!({"valid": true}) }
    );

    let notices = ctx.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Success);
    assert_eq!(notices[0].title, "Repository validation finished");
    assert_eq!(ctx.active_watches(), 0);

    // No more fetches once terminal
    ctx.advance_secs(10).await;
    assert_eq!(ctx.backend.fetch_count(), 2);
}

#[tokio::test]
async fn restart_drops_late_result_for_superseded_job() {
    let mut ctx = setup();
    ctx.start_validation("main").await;
    assert_eq!(ctx.job(&validation_slot()), Some(JobId::new("job-1")));

    // A fetch for job-1 is in flight when the branch changes
    ctx.backend.push_status("job-1", RemoteStatus::Completed, Some(serde_json::json!({"branch": "main"})));
    ctx.clock.advance(Duration::from_secs(1));
    assert_eq!(ctx.runtime.fire_timers().await, 1);

    ctx.runtime
        .start(validation_slot(), JobKind::Validation, repo_fp("dev"), serde_json::Value::Null)
        .await
        .unwrap();
    ctx.process_background_events().await;

    assert_eq!(ctx.job(&validation_slot()), Some(JobId::new("job-2")));
    assert!(ctx.status(&validation_slot()).is_polling());
    assert!(ctx.notices().is_empty());
    assert_eq!(ctx.active_watches(), 1);

    // job-2 alone drives the slot from here
    ctx.backend.push_status("job-2", RemoteStatus::Error, None);
    ctx.advance_secs(1).await;
    assert!(matches!(
        ctx.status(&validation_slot()),
        JobStatus::Failed { reason: FailureReason::Remote { .. } }
    ));
    assert_eq!(ctx.notices().len(), 1);
}

#[tokio::test]
async fn late_push_for_superseded_job_is_dropped() {
    let mut ctx = setup();
    ctx.start_validation("main").await;
    ctx.start_validation("dev").await;

    ctx.runtime
        .handle_event(Event::StatusPushed {
            slot: validation_slot(),
            job: JobId::new("job-1"),
            result: PollResult::completed("job-1", repo_fp("main"), None),
        })
        .await
        .unwrap();
    ctx.runtime
        .handle_event(Event::StatusFetched {
            slot: validation_slot(),
            job: JobId::new("job-1"),
            outcome: FetchOutcome::Found { result: PollResult::completed("job-1", repo_fp("main"), None) },
        })
        .await
        .unwrap();

    assert!(ctx.status(&validation_slot()).is_polling());
    assert_eq!(ctx.job(&validation_slot()), Some(JobId::new("job-2")));
    assert!(ctx.notices().is_empty());
}

#[tokio::test]
async fn ambiguous_dispatch_is_confirmed_by_fingerprint() {
    let mut ctx = setup();
    let slot = SlotId::scoped(JobKind::Creation, "p-1");
    ctx.backend.push_trigger(Err(BackendError::Ambiguous("operation timed out".into())));
    ctx.backend.push_status("cor-1", RemoteStatus::Completed, Some(serde_json::json!({"project_id": "p-1"})));

    ctx.start(slot.clone(), JobKind::Creation, Fingerprint::project("p-1")).await;

    let snapshot = ctx.runtime.snapshot(&slot).unwrap();
    assert!(snapshot.status.is_polling());
    assert_eq!(snapshot.handle.as_ref().map(|h| h.lookup), Some(Lookup::ByFingerprint));

    ctx.advance_secs(1).await;

    assert_eq!(ctx.status(&slot), JobStatus::Succeeded { result: serde_json::json!({"project_id": "p-1"}) });
    assert_eq!(ctx.backend.trigger_count(), 1);
    assert!(ctx
        .backend
        .calls()
        .contains(&BackendCall::Fetch { job: JobId::new("cor-1"), lookup: Lookup::ByFingerprint }));

    let notices = ctx.notices();
    assert_eq!(notices.len(), 1);
    assert!(notices.iter().all(|n| n.level == NoticeLevel::Success));
}

#[tokio::test]
async fn fingerprint_lookup_accepts_server_job_id() {
    let mut ctx = setup();
    let slot = SlotId::scoped(JobKind::Creation, "p-1");
    ctx.backend.push_trigger(Err(BackendError::Decode("unexpected end of body".into())));
    ctx.backend.push_reply(
        "cor-1",
        Ok(Some(isk_wire::StatusResponse {
            job_id: Some(JobId::new("srv-77")),
            status: RemoteStatus::Completed,
            fingerprint: Some(Fingerprint::project("p-1")),
            result: None,
            error: None,
        })),
    );

    ctx.start(slot.clone(), JobKind::Creation, Fingerprint::project("p-1")).await;
    ctx.advance_secs(1).await;

    assert!(matches!(ctx.status(&slot), JobStatus::Succeeded { .. }));
}

#[tokio::test]
async fn watch_times_out_once() {
    let config = config_for(JobKind::Validation, |c| c.timeout(Duration::from_secs(4)));
    let mut ctx = setup_with(config);
    ctx.start_validation("main").await;

    ctx.advance_secs(3).await;
    assert!(ctx.status(&validation_slot()).is_polling());

    ctx.advance_secs(1).await;
    assert_eq!(ctx.status(&validation_slot()), JobStatus::TimedOut);

    let fetches = ctx.backend.fetch_count();
    ctx.advance_secs(20).await;

    let notices = ctx.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert_eq!(notices[0].title, "Repository validation timed out");
    assert_eq!(ctx.backend.fetch_count(), fetches);
    assert_eq!(ctx.active_watches(), 0);
    assert_eq!(ctx.status(&validation_slot()), JobStatus::TimedOut);
}

#[tokio::test]
async fn restart_from_terminal_dispatches_again() {
    let mut ctx = setup();
    ctx.backend.push_status("job-1", RemoteStatus::Completed, None);
    ctx.start_validation("main").await;
    ctx.advance_secs(1).await;
    assert!(ctx.runtime.snapshot(&validation_slot()).unwrap().is_terminal);

    ctx.start_validation("main").await;

    assert_eq!(ctx.job(&validation_slot()), Some(JobId::new("job-2")));
    assert!(ctx.status(&validation_slot()).is_polling());
    assert_eq!(ctx.notices().len(), 1);
}

#[tokio::test]
async fn slot_id_with_colon_polls_and_times_out() {
    let config = config_for(JobKind::Validation, |c| c.timeout(Duration::from_secs(4)));
    let mut ctx = setup_with(config);
    let slot = SlotId::new("project:42");
    ctx.backend.push_status("job-1", RemoteStatus::Pending, None);

    ctx.start(slot.clone(), JobKind::Validation, repo_fp("main")).await;
    ctx.advance_secs(1).await;
    assert!(matches!(ctx.status(&slot), JobStatus::Polling { attempt: 1, .. }));

    ctx.advance_secs(29).await;
    assert_eq!(ctx.status(&slot), JobStatus::TimedOut);
    assert_eq!(ctx.notices().len(), 1);
    assert_eq!(ctx.active_watches(), 0);
}
