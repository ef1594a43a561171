// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Poller: per-slot watch bookkeeping.
//!
//! The poller owns the timers and subscriptions behind each `Watch` effect.
//! It never talks to the network itself; every method returns the effects
//! the executor must run next.

use isk_core::{
    Effect, FailureReason, FetchOutcome, JobHandle, JobId, KindConfig, PollResult, SlotId, TimerId,
    WatchTransport,
};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// How a watch currently receives status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchMode {
    Poll,
    Subscribe,
}

isk_core::simple_display! {
    WatchMode {
        Poll => "poll",
        Subscribe => "subscribe",
    }
}

#[derive(Debug, Clone)]
struct Watch {
    handle: JobHandle,
    config: KindConfig,
    mode: WatchMode,
    in_flight: bool,
    started_at: Instant,
    transport_errors: u32,
    seen_record: bool,
}

/// What a fetch outcome means for the slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Hand the result to the reconciler for the watched handle
    Deliver { handle: JobHandle, result: PollResult },
    /// Stop watching and fail the slot
    Fail(FailureReason),
}

#[derive(Debug, Default)]
pub struct Poller {
    watches: HashMap<SlotId, Watch>,
}

impl Poller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start watching `handle` for `slot`, replacing any existing watch.
    ///
    /// Push subscriptions need a server-issued id, so by-fingerprint handles
    /// always poll.
    pub fn begin(&mut self, slot: SlotId, handle: JobHandle, config: KindConfig, now: Instant) -> Vec<Effect> {
        let mut effects = match self.watches.get(&slot) {
            Some(existing) => {
                let job = existing.handle.id.clone();
                self.cancel(&slot, &job)
            }
            None => Vec::new(),
        };

        let mode = if config.transport == WatchTransport::Subscribe && !handle.is_by_fingerprint() {
            WatchMode::Subscribe
        } else {
            WatchMode::Poll
        };

        effects.push(Effect::SetTimer { id: TimerId::timeout(&slot, &handle.id), duration: config.timeout });
        match mode {
            WatchMode::Subscribe => {
                effects.push(Effect::Subscribe { slot: slot.clone(), handle: handle.clone() })
            }
            WatchMode::Poll => {
                effects.push(Effect::SetTimer { id: TimerId::poll(&slot, &handle.id), duration: config.grace })
            }
        }

        tracing::debug!(%slot, job = %handle.id, %mode, "watch started");
        self.watches.insert(
            slot,
            Watch {
                handle,
                config,
                mode,
                in_flight: false,
                started_at: now,
                transport_errors: 0,
                seen_record: false,
            },
        );
        effects
    }

    /// Stop watching `job`. Idempotent; a watch for another job is left alone.
    pub fn cancel(&mut self, slot: &SlotId, job: &JobId) -> Vec<Effect> {
        if !self.matches(slot, job) {
            return Vec::new();
        }
        match self.watches.remove(slot) {
            Some(watch) => teardown(slot, &watch, true),
            None => Vec::new(),
        }
    }

    /// The poll timer fired. Returns the fetch to run, unless one is already
    /// in flight or the watch is gone.
    pub fn poll_due(&mut self, slot: &SlotId, job: &JobId) -> Option<Effect> {
        let watch = self.watch_mut(slot, job)?;
        if watch.mode != WatchMode::Poll || watch.in_flight {
            return None;
        }
        watch.in_flight = true;
        Some(Effect::FetchStatus { slot: slot.clone(), handle: watch.handle.clone() })
    }

    /// A fetch finished.
    ///
    /// Re-arms the poll timer unless the watch is failing. The verdict is
    /// `None` when the outcome belongs to a watch that no longer exists.
    pub fn on_fetched(
        &mut self,
        slot: &SlotId,
        job: &JobId,
        outcome: FetchOutcome,
        now: Instant,
    ) -> (Vec<Effect>, Option<Verdict>) {
        let Some(watch) = self.watch_mut(slot, job) else {
            return (Vec::new(), None);
        };
        watch.in_flight = false;

        let verdict = match outcome {
            FetchOutcome::Found { result } => {
                watch.transport_errors = 0;
                watch.seen_record = true;
                Verdict::Deliver { handle: watch.handle.clone(), result }
            }
            FetchOutcome::NotFound => {
                let expired = watch
                    .config
                    .missing_record_timeout
                    .is_some_and(|limit| now.saturating_duration_since(watch.started_at) >= limit);
                if !watch.seen_record && expired {
                    let reason = if watch.handle.is_by_fingerprint() {
                        FailureReason::Unconfirmed { message: "no job matching the request was found".to_string() }
                    } else {
                        FailureReason::RecordNotFound
                    };
                    return (Vec::new(), Some(Verdict::Fail(reason)));
                }
                // The record may not be persisted yet
                let result = PollResult::pending(watch.handle.id.clone(), watch.handle.fingerprint.clone());
                Verdict::Deliver { handle: watch.handle.clone(), result }
            }
            FetchOutcome::TransportError { message } => {
                watch.transport_errors += 1;
                if watch.transport_errors > watch.config.max_transport_errors {
                    return (Vec::new(), Some(Verdict::Fail(FailureReason::Transport { message })));
                }
                tracing::debug!(%slot, %job, errors = watch.transport_errors, %message, "fetch failed, retrying");
                return (vec![rearm(slot, watch, watch.config.interval)], None);
            }
        };

        let effects = match watch.mode {
            WatchMode::Poll => vec![rearm(slot, watch, watch.config.interval)],
            WatchMode::Subscribe => Vec::new(),
        };
        (effects, Some(verdict))
    }

    /// A push update arrived. Returns the watched handle when the update
    /// belongs to a live subscription.
    pub fn on_pushed(&self, slot: &SlotId, job: &JobId) -> Option<JobHandle> {
        let watch = self.watches.get(slot).filter(|w| &w.handle.id == job)?;
        (watch.mode == WatchMode::Subscribe).then(|| watch.handle.clone())
    }

    /// The subscription closed before a terminal status. Falls back to
    /// polling immediately.
    pub fn on_subscription_closed(&mut self, slot: &SlotId, job: &JobId, reason: &str) -> Vec<Effect> {
        let Some(watch) = self.watch_mut(slot, job) else {
            return Vec::new();
        };
        if watch.mode != WatchMode::Subscribe {
            return Vec::new();
        }
        tracing::info!(%slot, %job, reason, "subscription closed, falling back to polling");
        watch.mode = WatchMode::Poll;
        vec![rearm(slot, watch, Duration::ZERO)]
    }

    /// The timeout timer fired. Removes the watch and returns its cleanup,
    /// or `None` if `job` is no longer watched.
    pub fn on_timeout(&mut self, slot: &SlotId, job: &JobId) -> Option<Vec<Effect>> {
        if !self.matches(slot, job) {
            return None;
        }
        let watch = self.watches.remove(slot)?;
        Some(teardown(slot, &watch, false))
    }

    /// True while `job` should hold an open subscription.
    pub fn wants_subscription(&self, slot: &SlotId, job: &JobId) -> bool {
        self.watches.get(slot).is_some_and(|w| &w.handle.id == job && w.mode == WatchMode::Subscribe)
    }

    pub fn mode(&self, slot: &SlotId) -> Option<WatchMode> {
        self.watches.get(slot).map(|w| w.mode)
    }

    pub fn is_watching(&self, slot: &SlotId) -> bool {
        self.watches.contains_key(slot)
    }

    pub fn active_count(&self) -> usize {
        self.watches.len()
    }

    fn matches(&self, slot: &SlotId, job: &JobId) -> bool {
        self.watches.get(slot).is_some_and(|w| &w.handle.id == job)
    }

    fn watch_mut(&mut self, slot: &SlotId, job: &JobId) -> Option<&mut Watch> {
        self.watches.get_mut(slot).filter(|w| &w.handle.id == job)
    }
}

fn rearm(slot: &SlotId, watch: &Watch, duration: Duration) -> Effect {
    Effect::SetTimer { id: TimerId::poll(slot, &watch.handle.id), duration }
}

fn teardown(slot: &SlotId, watch: &Watch, cancel_timeout: bool) -> Vec<Effect> {
    let job = &watch.handle.id;
    let mut effects = vec![Effect::CancelTimer { id: TimerId::poll(slot, job) }];
    if cancel_timeout {
        effects.push(Effect::CancelTimer { id: TimerId::timeout(slot, job) });
    }
    if watch.mode == WatchMode::Subscribe {
        effects.push(Effect::Unsubscribe { slot: slot.clone(), job: job.clone() });
    }
    effects
}

#[cfg(test)]
#[path = "poller_tests.rs"]
mod tests;
