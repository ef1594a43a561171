// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use isk_adapters::{BackendError, FakeBackend, FakeNotifyAdapter, FakeSubscribeAdapter};
use isk_core::test_support::{repo_fp, validation_handle};
use isk_core::{Clock, FakeClock, JobKind, JobStatus, KindConfig, Notice, RemoteStatus, TimerId, WatchTransport};
use std::time::Duration;

type TestExecutor = Executor<FakeBackend, FakeSubscribeAdapter, FakeNotifyAdapter, FakeClock>;

struct TestHarness {
    executor: TestExecutor,
    event_rx: mpsc::Receiver<Event>,
    backend: FakeBackend,
    subscriber: FakeSubscribeAdapter,
    notifier: FakeNotifyAdapter,
}

fn setup() -> TestHarness {
    setup_with(TrackerConfig::default())
}

fn setup_with(config: TrackerConfig) -> TestHarness {
    let (event_tx, event_rx) = mpsc::channel(100);
    let backend = FakeBackend::new();
    let subscriber = FakeSubscribeAdapter::new();
    let notifier = FakeNotifyAdapter::new();

    let executor = Executor::new(
        RuntimeDeps { backend: backend.clone(), subscriber: subscriber.clone(), notifier: notifier.clone() },
        config,
        Arc::new(Mutex::new(Scheduler::new())),
        Arc::new(Mutex::new(Poller::new())),
        FakeClock::new(),
        event_tx,
    );

    TestHarness { executor, event_rx, backend, subscriber, notifier }
}

fn slot() -> SlotId {
    SlotId::for_kind(JobKind::Validation)
}

#[tokio::test]
async fn dispatch_reports_handle() {
    let mut harness = setup();
    harness
        .executor
        .execute(Effect::Dispatch {
            slot: slot(),
            kind: JobKind::Validation,
            correlation: JobId::new("cor-1"),
            fingerprint: repo_fp("main"),
            payload: serde_json::Value::Null,
        })
        .await
        .unwrap();

    let event = harness.event_rx.recv().await.unwrap();
    match event {
        Event::JobDispatched { slot: s, correlation, handle } => {
            assert_eq!(s, slot());
            assert_eq!(correlation, "cor-1");
            assert_eq!(handle.id, "job-1");
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test]
async fn dispatch_reports_failure() {
    let mut harness = setup();
    harness.backend.push_trigger(Err(BackendError::Ambiguous("timed out".into())));
    harness
        .executor
        .execute(Effect::Dispatch {
            slot: slot(),
            kind: JobKind::Validation,
            correlation: JobId::new("cor-1"),
            fingerprint: repo_fp("main"),
            payload: serde_json::Value::Null,
        })
        .await
        .unwrap();

    let event = harness.event_rx.recv().await.unwrap();
    assert!(matches!(event, Event::DispatchFailed { ref error, .. } if error.is_ambiguous()));
}

#[tokio::test]
async fn fetch_maps_responses_to_outcomes() {
    let mut harness = setup();
    harness.backend.push_status("job-1", RemoteStatus::Completed, None);
    harness.backend.push_reply("job-1", Ok(None));
    harness.backend.push_reply("job-1", Err(BackendError::Ambiguous("reset".into())));

    let mut outcomes = Vec::new();
    for _ in 0..3 {
        harness
            .executor
            .execute(Effect::FetchStatus { slot: slot(), handle: validation_handle("job-1", "main") })
            .await
            .unwrap();
        match harness.event_rx.recv().await.unwrap() {
            Event::StatusFetched { outcome, .. } => outcomes.push(outcome),
            other => panic!("unexpected event {other:?}"),
        }
    }

    assert!(matches!(&outcomes[0], FetchOutcome::Found { result } if result.status == RemoteStatus::Completed));
    assert_eq!(outcomes[1], FetchOutcome::NotFound);
    assert!(matches!(&outcomes[2], FetchOutcome::TransportError { message } if message.contains("reset")));
}

#[tokio::test]
async fn watch_is_expanded_by_poller() {
    let harness = setup();
    harness
        .executor
        .execute(Effect::Watch { slot: slot(), handle: validation_handle("job-1", "main") })
        .await
        .unwrap();

    let scheduler = harness.executor.scheduler().lock();
    assert!(scheduler.has_timer(TimerId::poll(&slot(), &JobId::new("job-1")).as_str()));
    assert!(scheduler.has_timer(TimerId::timeout(&slot(), &JobId::new("job-1")).as_str()));
    drop(scheduler);
    assert_eq!(harness.executor.poller().lock().active_count(), 1);
}

#[tokio::test]
async fn unwatch_clears_timers() {
    let harness = setup();
    let handle = validation_handle("job-1", "main");
    harness.executor.execute(Effect::Watch { slot: slot(), handle }).await.unwrap();
    harness.executor.execute(Effect::Unwatch { slot: slot(), job: JobId::new("job-1") }).await.unwrap();

    assert!(!harness.executor.scheduler().lock().has_timers());
    assert_eq!(harness.executor.poller().lock().active_count(), 0);

    // Idempotent
    harness.executor.execute(Effect::Unwatch { slot: slot(), job: JobId::new("job-1") }).await.unwrap();
}

#[tokio::test]
async fn watch_effects_are_not_io() {
    let harness = setup();
    let err = harness
        .executor
        .execute_io(Effect::Unwatch { slot: slot(), job: JobId::new("job-1") })
        .await
        .unwrap_err();
    assert!(matches!(err, ExecuteError::NotPrimitive("unwatch")));
}

fn subscribe_config() -> TrackerConfig {
    TrackerConfig::default().with_kind(
        JobKind::Validation,
        KindConfig::defaults_for(JobKind::Validation).transport(WatchTransport::Subscribe),
    )
}

#[tokio::test]
async fn subscribe_then_unsubscribe() {
    let mut harness = setup_with(subscribe_config());
    let handle = validation_handle("job-1", "main");
    harness.executor.execute(Effect::Watch { slot: slot(), handle }).await.unwrap();

    // Let the subscribe task run
    for _ in 0..5 {
        tokio::task::yield_now().await;
    }
    assert!(harness.subscriber.is_open("job-1"));

    assert!(harness.subscriber.push("job-1", RemoteStatus::Pending, None));
    let event = harness.event_rx.recv().await.unwrap();
    assert!(matches!(event, Event::StatusPushed { ref job, .. } if job == "job-1"));

    harness.executor.execute(Effect::Unwatch { slot: slot(), job: JobId::new("job-1") }).await.unwrap();
    assert!(!harness.subscriber.is_open("job-1"));
}

#[tokio::test]
async fn subscribe_after_unwatch_is_closed_immediately() {
    let harness = setup_with(subscribe_config());
    let handle = validation_handle("job-1", "main");

    // Unwatch lands before the subscribe task gets to run
    harness.executor.execute(Effect::Watch { slot: slot(), handle }).await.unwrap();
    harness.executor.execute(Effect::Unwatch { slot: slot(), job: JobId::new("job-1") }).await.unwrap();
    for _ in 0..5 {
        tokio::task::yield_now().await;
    }

    assert_eq!(harness.subscriber.subscribed(), vec![JobId::new("job-1")]);
    assert!(!harness.subscriber.is_open("job-1"));
}

#[tokio::test]
async fn notify_failure_is_not_an_error() {
    let harness = setup();
    harness.notifier.set_failing(true);
    let notice = Notice::for_terminal(&slot(), JobKind::Validation, &JobStatus::TimedOut).unwrap();

    harness.executor.execute(Effect::Notify { notice }).await.unwrap();
    assert_eq!(harness.notifier.calls().len(), 1);
}

#[tokio::test]
async fn timer_effects_update_scheduler() {
    let harness = setup();
    let id = TimerId::poll(&slot(), &JobId::new("job-1"));
    harness
        .executor
        .execute(Effect::SetTimer { id: id.clone(), duration: Duration::from_secs(1) })
        .await
        .unwrap();
    assert!(harness.executor.scheduler().lock().has_timer(id.as_str()));

    harness.executor.execute(Effect::CancelTimer { id: id.clone() }).await.unwrap();
    assert!(!harness.executor.scheduler().lock().has_timer(id.as_str()));
}

#[test]
fn registration_requires_live_watch() {
    let harness = setup_with(subscribe_config());
    let job = JobId::new("job-1");
    let subscriptions: OpenSubscriptions = Arc::default();

    let (shutdown, _rx) = oneshot::channel();
    assert!(register_subscription(&slot(), &job, shutdown, harness.executor.poller(), &subscriptions).is_err());
    assert!(subscriptions.lock().is_empty());

    let now = harness.executor.clock().now();
    let config = harness.executor.config().kind(JobKind::Validation);
    harness.executor.poller().lock().begin(slot(), validation_handle("job-1", "main"), config, now);

    let (shutdown, _rx) = oneshot::channel();
    assert!(register_subscription(&slot(), &job, shutdown, harness.executor.poller(), &subscriptions).is_ok());
    assert!(subscriptions.lock().get(&slot()).is_some_and(|(open, _)| *open == job));

    // A different job on the same slot is not registered
    let (shutdown, _rx) = oneshot::channel();
    let other = JobId::new("job-2");
    assert!(register_subscription(&slot(), &other, shutdown, harness.executor.poller(), &subscriptions).is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn unwatch_racing_subscribe_never_leaks_connection() {
    for i in 0..50 {
        let harness = setup_with(subscribe_config());
        let job = format!("job-{i}");
        let handle = validation_handle(&job, "main");

        harness.executor.execute(Effect::Watch { slot: slot(), handle }).await.unwrap();
        harness.executor.execute(Effect::Unwatch { slot: slot(), job: JobId::new(job.as_str()) }).await.unwrap();

        // Wait for the subscribe task to finish registering or shutting down
        for _ in 0..200 {
            if harness.subscriber.subscribed().len() == 1 && !harness.subscriber.is_open(&job) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        assert!(!harness.subscriber.is_open(&job), "iteration {i} left {job} open");
    }
}
