// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime tests

mod failures;
mod properties;
mod scenarios;
mod subscribe;

use super::*;
use isk_adapters::{FakeBackend, FakeNotifyAdapter, FakeSubscribeAdapter};
use isk_core::test_support::{repo_fp, validation_handle};
use isk_core::{
    FailureReason, FakeClock, JobId, KindConfig, Notice, NoticeLevel, RemoteStatus, SequentialIdGen,
};
use std::time::Duration;

type TestRuntime = Runtime<FakeBackend, FakeSubscribeAdapter, FakeNotifyAdapter, FakeClock>;

struct TestContext {
    runtime: TestRuntime,
    clock: FakeClock,
    event_tx: mpsc::Sender<Event>,
    event_rx: mpsc::Receiver<Event>,
    backend: FakeBackend,
    subscriber: FakeSubscribeAdapter,
    notifier: FakeNotifyAdapter,
}

fn setup() -> TestContext {
    setup_with(TrackerConfig::default())
}

fn setup_with(config: TrackerConfig) -> TestContext {
    init_tracing();
    let (event_tx, event_rx) = mpsc::channel(100);
    let clock = FakeClock::new();
    let backend = FakeBackend::new();
    let subscriber = FakeSubscribeAdapter::new();
    let notifier = FakeNotifyAdapter::new();

    let runtime = Runtime::new(
        RuntimeDeps { backend: backend.clone(), subscriber: subscriber.clone(), notifier: notifier.clone() },
        config,
        clock.clone(),
        Arc::new(SequentialIdGen::new()),
        event_tx.clone(),
    );

    TestContext { runtime, clock, event_tx, event_rx, backend, subscriber, notifier }
}

/// Config with one kind overridden.
fn config_for(kind: JobKind, f: impl FnOnce(KindConfig) -> KindConfig) -> TrackerConfig {
    TrackerConfig::default().with_kind(kind, f(KindConfig::defaults_for(kind)))
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn validation_slot() -> SlotId {
    SlotId::for_kind(JobKind::Validation)
}

impl TestContext {
    /// Let spawned adapter tasks run and feed their events back in.
    async fn process_background_events(&mut self) {
        for _ in 0..20 {
            tokio::task::yield_now().await;
            while let Ok(event) = self.event_rx.try_recv() {
                self.runtime.handle_event(event).await.unwrap();
            }
        }
    }

    /// Handle queued events, then fire due timers, until nothing is due.
    async fn settle(&mut self) {
        loop {
            self.process_background_events().await;
            if self.runtime.fire_timers().await == 0 {
                break;
            }
        }
        self.process_background_events().await;
    }

    async fn advance(&mut self, duration: Duration) {
        self.clock.advance(duration);
        self.settle().await;
    }

    /// Advance one second at a time.
    async fn advance_secs(&mut self, secs: u64) {
        for _ in 0..secs {
            self.advance(Duration::from_secs(1)).await;
        }
    }

    async fn start(&mut self, slot: SlotId, kind: JobKind, fingerprint: Fingerprint) {
        self.runtime.start(slot, kind, fingerprint, serde_json::Value::Null).await.unwrap();
        self.process_background_events().await;
    }

    async fn start_validation(&mut self, branch: &str) {
        self.start(validation_slot(), JobKind::Validation, repo_fp(branch)).await;
    }

    fn status(&self, slot: &SlotId) -> JobStatus {
        self.runtime.snapshot(slot).map(|s| s.status).unwrap_or_default()
    }

    fn job(&self, slot: &SlotId) -> Option<JobId> {
        self.runtime.snapshot(slot).and_then(|s| s.handle).map(|h| h.id)
    }

    fn notices(&self) -> Vec<Notice> {
        self.notifier.calls()
    }

    fn active_watches(&self) -> usize {
        self.runtime.executor().poller().lock().active_count()
    }
}

#[tokio::test]
async fn start_dispatches_and_watches() {
    let mut ctx = setup();
    ctx.start_validation("main").await;

    let snapshot = ctx.runtime.snapshot(&validation_slot()).unwrap();
    assert_eq!(snapshot.status, JobStatus::Polling { attempt: 0, started_at_ms: 1_000_000 });
    assert!(snapshot.is_busy);
    assert_eq!(snapshot.handle.map(|h| h.id), Some(JobId::new("job-1")));
    assert_eq!(ctx.backend.trigger_count(), 1);
    assert_eq!(ctx.active_watches(), 1);
}

#[tokio::test]
async fn grace_window_delays_first_fetch() {
    let mut ctx = setup();
    ctx.start_validation("main").await;

    ctx.advance(Duration::from_millis(900)).await;
    assert_eq!(ctx.backend.fetch_count(), 0);

    ctx.advance(Duration::from_millis(100)).await;
    assert_eq!(ctx.backend.fetch_count(), 1);
}

#[tokio::test]
async fn pending_results_count_attempts() {
    let mut ctx = setup();
    ctx.start_validation("main").await;

    // Fetches at 1s, 3s, 5s
    ctx.advance_secs(5).await;
    assert_eq!(ctx.backend.fetch_count(), 3);
    assert!(matches!(ctx.status(&validation_slot()), JobStatus::Polling { attempt: 3, .. }));
}

#[tokio::test]
async fn reset_returns_to_idle_and_stops_polling() {
    let mut ctx = setup();
    ctx.start_validation("main").await;

    ctx.runtime.reset(validation_slot()).await.unwrap();
    assert_eq!(ctx.status(&validation_slot()), JobStatus::Idle);
    assert_eq!(ctx.active_watches(), 0);

    ctx.advance_secs(10).await;
    assert_eq!(ctx.backend.fetch_count(), 0);
    assert!(ctx.notices().is_empty());
}

#[tokio::test]
async fn reset_unknown_slot_is_noop() {
    let ctx = setup();
    ctx.runtime.reset(SlotId::new("nothing-here")).await.unwrap();
    assert!(ctx.runtime.snapshots().is_empty());
}

#[tokio::test]
async fn resume_watches_without_dispatch() {
    let mut ctx = setup();
    ctx.backend.push_status("job-9", RemoteStatus::Completed, None);

    ctx.runtime.resume(validation_slot(), validation_handle("job-9", "main")).await.unwrap();
    ctx.advance_secs(1).await;

    assert_eq!(ctx.backend.trigger_count(), 0);
    assert!(matches!(ctx.status(&validation_slot()), JobStatus::Succeeded { .. }));
}

#[tokio::test]
async fn kind_mismatch_is_an_error() {
    let mut ctx = setup();
    ctx.start_validation("main").await;

    let err = ctx
        .runtime
        .start(validation_slot(), JobKind::Reindex, Fingerprint::project("p-1"), serde_json::Value::Null)
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::KindMismatch { existing: JobKind::Validation, .. }));
}

#[tokio::test]
async fn slots_are_independent() {
    let mut ctx = setup();
    let reindex = SlotId::scoped(JobKind::Reindex, "p-1");
    ctx.start_validation("main").await;
    ctx.start(reindex.clone(), JobKind::Reindex, Fingerprint::project("p-1")).await;

    ctx.runtime.reset(validation_slot()).await.unwrap();

    assert!(ctx.runtime.snapshot(&reindex).unwrap().is_busy);
    assert_eq!(ctx.runtime.snapshots().len(), 2);
    assert_eq!(ctx.active_watches(), 1);
}

#[tokio::test]
async fn snapshots_are_broadcast_on_transition() {
    let mut ctx = setup();
    let mut updates = ctx.runtime.subscribe();
    ctx.start_validation("main").await;

    let first = updates.recv().await.unwrap();
    let second = updates.recv().await.unwrap();
    assert_eq!(first.status, JobStatus::Initializing);
    assert!(second.status.is_polling());
    assert_eq!(second.history.len(), 2);
}

#[tokio::test]
async fn run_stops_on_cancel() {
    let mut ctx = setup();
    let (_, placeholder) = mpsc::channel(1);
    let event_rx = std::mem::replace(&mut ctx.event_rx, placeholder);
    let cancel = CancellationToken::new();
    cancel.cancel();

    ctx.runtime.run(event_rx, cancel).await;
}

#[tokio::test]
async fn run_stops_on_shutdown_event() {
    let mut ctx = setup();
    let (_, placeholder) = mpsc::channel(1);
    let event_rx = std::mem::replace(&mut ctx.event_rx, placeholder);
    ctx.event_tx.send(Event::Shutdown).await.unwrap();

    ctx.runtime.run(event_rx, CancellationToken::new()).await;
}

#[tokio::test]
async fn run_measures_timer_waits_on_the_injected_clock() {
    let mut ctx = setup();
    ctx.backend.push_status("job-1", RemoteStatus::Completed, None);

    // The fake clock runs an hour ahead of tokio's
    ctx.clock.advance(Duration::from_secs(3600));
    ctx.runtime.resume(validation_slot(), validation_handle("job-1", "main")).await.unwrap();

    let (_, placeholder) = mpsc::channel(1);
    let event_rx = std::mem::replace(&mut ctx.event_rx, placeholder);
    let mut updates = ctx.runtime.subscribe();
    let cancel = CancellationToken::new();
    let stop = cancel.clone();
    let clock = ctx.clock.clone();

    let finished = tokio::time::timeout(Duration::from_secs(10), async {
        tokio::join!(ctx.runtime.run(event_rx, cancel), async move {
            clock.advance(Duration::from_secs(1));
            while let Ok(snapshot) = updates.recv().await {
                if snapshot.is_terminal {
                    break;
                }
            }
            stop.cancel();
        });
    })
    .await;

    assert!(finished.is_ok(), "poll timer waited on tokio time instead of the clock");
    assert!(matches!(ctx.status(&validation_slot()), JobStatus::Succeeded { .. }));
}
