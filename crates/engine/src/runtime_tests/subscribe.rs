// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Push subscription transport

use super::*;
use crate::poller::WatchMode;
use isk_adapters::SubscribeError;

fn meeting_slot() -> SlotId {
    SlotId::scoped(JobKind::MeetingProcessing, "m-1")
}

async fn start_meeting(ctx: &mut TestContext) {
    ctx.start(meeting_slot(), JobKind::MeetingProcessing, Fingerprint::meeting("m-1")).await;
}

fn mode(ctx: &TestContext) -> Option<WatchMode> {
    ctx.runtime.executor().poller().lock().mode(&meeting_slot())
}

#[tokio::test]
async fn pushed_completion_succeeds_without_polling() {
    let mut ctx = setup();
    start_meeting(&mut ctx).await;

    assert_eq!(ctx.subscriber.subscribed(), vec![JobId::new("job-1")]);
    assert!(ctx.subscriber.is_open("job-1"));
    assert_eq!(mode(&ctx), Some(WatchMode::Subscribe));

    assert!(ctx.subscriber.push("job-1", RemoteStatus::Pending, None));
    ctx.process_background_events().await;
    assert!(matches!(ctx.status(&meeting_slot()), JobStatus::Polling { attempt: 1, .. }));

    assert!(ctx.subscriber.push("job-1", RemoteStatus::Completed, Some(serde_json::json!({"summary": "ok"}))));
    ctx.process_background_events().await;

    assert_eq!(ctx.status(&meeting_slot()), JobStatus::Succeeded { result: serde_json::json!({"summary": "ok"}) });
    assert_eq!(ctx.backend.fetch_count(), 0);
    assert!(!ctx.subscriber.is_open("job-1"));
    assert_eq!(ctx.notices().len(), 1);
    assert_eq!(ctx.notices()[0].title, "Meeting processing finished");
}

#[tokio::test]
async fn closed_subscription_falls_back_to_polling() {
    let mut ctx = setup();
    start_meeting(&mut ctx).await;

    assert!(ctx.subscriber.close("job-1", "stream ended"));
    ctx.settle().await;

    assert_eq!(mode(&ctx), Some(WatchMode::Poll));
    assert_eq!(ctx.backend.fetch_count(), 1);

    // Meeting processing polls every 5s
    ctx.backend.push_status("job-1", RemoteStatus::Completed, None);
    ctx.advance_secs(5).await;

    assert!(matches!(ctx.status(&meeting_slot()), JobStatus::Succeeded { .. }));
    assert_eq!(ctx.backend.fetch_count(), 2);
}

#[tokio::test]
async fn subscribe_failure_falls_back_to_polling() {
    let mut ctx = setup();
    ctx.subscriber.fail_with(SubscribeError::Unsupported);
    ctx.backend.push_status("job-1", RemoteStatus::Completed, None);

    start_meeting(&mut ctx).await;
    ctx.settle().await;

    assert!(matches!(ctx.status(&meeting_slot()), JobStatus::Succeeded { .. }));
    assert_eq!(ctx.backend.fetch_count(), 1);
}

#[tokio::test]
async fn reset_closes_subscription() {
    let mut ctx = setup();
    start_meeting(&mut ctx).await;
    assert!(ctx.subscriber.is_open("job-1"));

    ctx.runtime.reset(meeting_slot()).await.unwrap();

    assert!(!ctx.subscriber.is_open("job-1"));

    // Anything still in the pipe is dropped
    ctx.subscriber.push("job-1", RemoteStatus::Completed, None);
    ctx.process_background_events().await;
    assert_eq!(ctx.status(&meeting_slot()), JobStatus::Idle);
    assert!(ctx.notices().is_empty());
}

#[tokio::test]
async fn subscribed_watch_still_times_out() {
    let config = config_for(JobKind::MeetingProcessing, |c| c.timeout(Duration::from_secs(10)));
    let mut ctx = setup_with(config);
    start_meeting(&mut ctx).await;

    ctx.advance_secs(10).await;

    assert_eq!(ctx.status(&meeting_slot()), JobStatus::TimedOut);
    assert!(!ctx.subscriber.is_open("job-1"));
    assert_eq!(ctx.backend.fetch_count(), 0);
    assert_eq!(ctx.notices().len(), 1);
}

#[tokio::test]
async fn by_fingerprint_fallback_polls_even_when_subscribe_configured() {
    let mut ctx = setup();
    ctx.backend.push_trigger(Err(isk_adapters::BackendError::Ambiguous("timed out".into())));
    ctx.backend.push_status("cor-1", RemoteStatus::Completed, None);

    start_meeting(&mut ctx).await;
    assert!(ctx.subscriber.subscribed().is_empty());

    ctx.advance_secs(1).await;
    assert!(matches!(ctx.status(&meeting_slot()), JobStatus::Succeeded { .. }));
}
