// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Invariants that must hold for any sequence of intents and results

use super::*;
use isk_core::{FetchOutcome, PollResult};
use proptest::prelude::*;

#[tokio::test]
async fn reset_twice_is_noop() {
    let mut ctx = setup();
    ctx.backend.push_status("job-1", RemoteStatus::Error, None);
    ctx.start_validation("main").await;
    ctx.advance_secs(1).await;
    assert_eq!(ctx.notices().len(), 1);

    let mut updates = ctx.runtime.subscribe();
    ctx.runtime.reset(validation_slot()).await.unwrap();
    ctx.runtime.reset(validation_slot()).await.unwrap();

    assert_eq!(ctx.status(&validation_slot()), JobStatus::Idle);
    assert_eq!(updates.try_recv().map(|s| s.status), Ok(JobStatus::Idle));
    assert!(updates.try_recv().is_err());
    assert_eq!(ctx.notices().len(), 1);
}

#[tokio::test]
async fn mismatched_fingerprint_never_mutates_status() {
    let mut ctx = setup();
    ctx.start_validation("main").await;

    for status in [RemoteStatus::Pending, RemoteStatus::Completed, RemoteStatus::Error] {
        let result = PollResult {
            job_id: JobId::new("job-1"),
            fingerprint: repo_fp("dev"),
            status,
            payload: None,
            error: None,
        };
        ctx.runtime
            .handle_event(Event::StatusFetched {
                slot: validation_slot(),
                job: JobId::new("job-1"),
                outcome: FetchOutcome::Found { result },
            })
            .await
            .unwrap();
        assert_eq!(ctx.status(&validation_slot()), JobStatus::Polling { attempt: 0, started_at_ms: 1_000_000 });
    }
    assert!(ctx.notices().is_empty());
}

#[tokio::test]
async fn queued_terminal_result_beats_same_tick_timeout() {
    let config = config_for(JobKind::Validation, |c| c.timeout(Duration::from_secs(2)));
    let mut ctx = setup_with(config);
    ctx.runtime.resume(validation_slot(), validation_handle("job-1", "main")).await.unwrap();

    // The terminal result is already queued when the timeout comes due
    ctx.clock.advance(Duration::from_secs(2));
    ctx.event_tx
        .send(Event::StatusFetched {
            slot: validation_slot(),
            job: JobId::new("job-1"),
            outcome: FetchOutcome::Found { result: PollResult::completed("job-1", repo_fp("main"), None) },
        })
        .await
        .unwrap();

    let (_, placeholder) = mpsc::channel(1);
    let event_rx = std::mem::replace(&mut ctx.event_rx, placeholder);
    let mut updates = ctx.runtime.subscribe();
    let cancel = CancellationToken::new();
    let stop = cancel.clone();

    tokio::join!(ctx.runtime.run(event_rx, cancel), async move {
        while let Ok(snapshot) = updates.recv().await {
            if snapshot.is_terminal {
                break;
            }
        }
        stop.cancel();
    });

    assert!(matches!(ctx.status(&validation_slot()), JobStatus::Succeeded { .. }));
    let notices = ctx.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Success);
}

#[tokio::test]
async fn timeout_fires_when_no_result_is_queued() {
    let config = config_for(JobKind::Validation, |c| c.timeout(Duration::from_secs(2)));
    let mut ctx = setup_with(config);
    ctx.runtime.resume(validation_slot(), validation_handle("job-1", "main")).await.unwrap();
    ctx.clock.advance(Duration::from_secs(2));

    // Poll (due at 1s) fires first, then the timeout wins over its in-flight fetch
    ctx.runtime.fire_timers().await;
    ctx.process_background_events().await;

    assert_eq!(ctx.status(&validation_slot()), JobStatus::TimedOut);
    assert_eq!(ctx.notices().len(), 1);
}

#[derive(Debug, Clone)]
enum Action {
    Start(&'static str),
    Reset,
    Advance(u64),
    Complete,
    Fail,
    LateResult(&'static str),
}

fn arb_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        prop_oneof![Just("main"), Just("dev")].prop_map(Action::Start),
        Just(Action::Reset),
        (1u64..6).prop_map(Action::Advance),
        Just(Action::Complete),
        Just(Action::Fail),
        prop_oneof![Just("job-1"), Just("job-2"), Just("job-3")].prop_map(Action::LateResult),
    ]
}

async fn apply(ctx: &mut TestContext, action: &Action) {
    match action {
        Action::Start(branch) => ctx.start_validation(branch).await,
        Action::Reset => {
            ctx.runtime.reset(validation_slot()).await.unwrap();
        }
        Action::Advance(secs) => ctx.advance_secs(*secs).await,
        Action::Complete | Action::Fail => {
            if let Some(job) = ctx.job(&validation_slot()) {
                let status = match action {
                    Action::Complete => RemoteStatus::Completed,
                    _ => RemoteStatus::Error,
                };
                ctx.backend.push_status(job.as_str(), status, None);
            }
        }
        Action::LateResult(job) => {
            let fingerprint = repo_fp("main");
            ctx.runtime
                .handle_event(Event::StatusFetched {
                    slot: validation_slot(),
                    job: JobId::new(*job),
                    outcome: FetchOutcome::Found { result: PollResult::completed(*job, fingerprint, None) },
                })
                .await
                .unwrap();
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn slot_invariants_hold(actions in prop::collection::vec(arb_action(), 1..12)) {
        let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
        rt.block_on(async {
            let mut ctx = setup();
            let mut updates = ctx.runtime.subscribe();
            let mut terminal_transitions = 0;

            for action in &actions {
                apply(&mut ctx, action).await;

                // Terminal slots only change through start or reset, so every
                // terminal snapshot is a fresh terminal transition
                while let Ok(snapshot) = updates.try_recv() {
                    if snapshot.is_terminal {
                        terminal_transitions += 1;
                    }
                }

                let status = ctx.status(&validation_slot());
                let watching = ctx.runtime.executor().poller().lock().is_watching(&validation_slot());

                // At most one live watch, and only while polling
                assert!(ctx.active_watches() <= 1);
                assert_eq!(watching, status.is_polling(), "status {status:?}");

                // One notice per terminal transition
                assert_eq!(ctx.notices().len(), terminal_transitions);
            }
        });
    }
}
