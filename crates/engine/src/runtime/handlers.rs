// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event handlers

use super::{Runtime, RuntimeError, SlotSnapshot};
use crate::poller::Verdict;
use isk_adapters::{JobBackend, NotifyAdapter, SubscribeAdapter};
use isk_core::{
    reconcile, Clock, Effect, Event, JobHandle, JobKind, JobSlot, PollResult, SlotId, TimerId, TimerKind,
};

impl<B, S, N, C> Runtime<B, S, N, C>
where
    B: JobBackend,
    S: SubscribeAdapter,
    N: NotifyAdapter,
    C: Clock,
{
    /// Route one event to the slot it concerns and execute the resulting
    /// effects.
    pub async fn handle_event(&self, event: Event) -> Result<(), RuntimeError> {
        tracing::debug!(event = event.name(), slot = ?event.slot().map(|s| s.as_str()), "handling event");

        let effects = match event {
            Event::Shutdown => Vec::new(),

            Event::TimerStart { id } => return self.handle_timer(&id).await,

            Event::SlotStart { slot, kind, fingerprint, payload } => {
                let correlation = self.ids.correlation_id();
                self.update_slot(&slot, Some(kind), |s, now| s.start(correlation, fingerprint, payload, now))?
            }

            Event::SlotReset { slot } => self.update_slot(&slot, None, |s, now| s.reset(now))?,

            Event::SlotResume { slot, handle } => {
                let kind = handle.kind;
                self.update_slot(&slot, Some(kind), |s, now| s.resume(handle, now))?
            }

            Event::JobDispatched { slot, correlation, handle } => {
                self.update_slot(&slot, None, |s, now| s.handle_obtained(&correlation, handle, now))?
            }

            Event::DispatchFailed { slot, correlation, error } => {
                self.update_slot(&slot, None, |s, now| s.dispatch_failed(&correlation, &error, now))?
            }

            Event::StatusFetched { slot, job, outcome } => {
                let now = self.executor.clock().now();
                let (mut effects, verdict) = self.executor.poller().lock().on_fetched(&slot, &job, outcome, now);
                match verdict {
                    Some(Verdict::Deliver { handle, result }) => effects.extend(self.deliver(&slot, &handle, result)),
                    Some(Verdict::Fail(reason)) => {
                        tracing::warn!(%slot, %job, %reason, "watch failed");
                        effects.extend(self.update_slot(&slot, None, |s, now| s.poll_failed(&job, reason, now))?);
                    }
                    None => tracing::debug!(%slot, %job, "dropped fetch for inactive watch"),
                }
                effects
            }

            Event::StatusPushed { slot, job, result } => {
                let handle = self.executor.poller().lock().on_pushed(&slot, &job);
                match handle {
                    Some(handle) => self.deliver(&slot, &handle, result),
                    None => {
                        tracing::debug!(%slot, %job, "dropped push for inactive subscription");
                        Vec::new()
                    }
                }
            }

            Event::SubscriptionClosed { slot, job, reason } => {
                self.executor.poller().lock().on_subscription_closed(&slot, &job, &reason)
            }
        };

        self.executor.execute_all(effects).await?;
        Ok(())
    }

    async fn handle_timer(&self, id: &TimerId) -> Result<(), RuntimeError> {
        let Some(timer) = id.kind() else {
            tracing::warn!(timer = %id, "unknown timer");
            return Ok(());
        };
        let (slot, job) = (timer.slot(), timer.job());

        let effects = match timer {
            TimerKind::Poll { .. } => {
                let fetch = self.executor.poller().lock().poll_due(&slot, &job);
                fetch.into_iter().collect()
            }
            TimerKind::Timeout { .. } => {
                let cleanup = self.executor.poller().lock().on_timeout(&slot, &job);
                match cleanup {
                    Some(mut effects) => {
                        tracing::warn!(%slot, %job, "job timed out");
                        effects.extend(self.update_slot(&slot, None, |s, now| s.timed_out(&job, now))?);
                        effects
                    }
                    None => {
                        tracing::debug!(%slot, %job, "timeout for inactive watch");
                        Vec::new()
                    }
                }
            }
        };

        self.executor.execute_all(effects).await?;
        Ok(())
    }

    /// Pass a watched result through the reconciler into the slot.
    fn deliver(&self, slot_id: &SlotId, watched: &JobHandle, result: PollResult) -> Vec<Effect> {
        let now_ms = self.executor.clock().epoch_ms();
        let mut slots = self.slots.lock();
        let Some(slot) = slots.get_mut(slot_id) else {
            tracing::debug!(slot = %slot_id, job = %watched.id, "result for unknown slot");
            return Vec::new();
        };

        let decision = reconcile::accept(slot, watched, &result);
        if !decision.is_apply() {
            tracing::info!(
                slot = %slot_id,
                job = %result.job_id,
                status = %result.status,
                %decision,
                "dropped poll result"
            );
            return Vec::new();
        }

        let before = SlotSnapshot::of(slot);
        let effects = slot.apply_poll(result, now_ms);
        self.publish(before, slot);
        effects
    }

    /// Run a slot reducer under the slot lock.
    ///
    /// With `create` set, a missing slot is created for that kind; otherwise
    /// events for unknown slots are ignored.
    fn update_slot<F>(&self, slot_id: &SlotId, create: Option<JobKind>, f: F) -> Result<Vec<Effect>, RuntimeError>
    where
        F: FnOnce(&mut JobSlot, u64) -> Vec<Effect>,
    {
        let now_ms = self.executor.clock().epoch_ms();
        let mut slots = self.slots.lock();
        let slot = match create {
            Some(kind) => {
                let slot = slots.entry(slot_id.clone()).or_insert_with(|| JobSlot::new(slot_id.clone(), kind));
                if slot.kind != kind {
                    return Err(RuntimeError::KindMismatch {
                        slot: slot_id.clone(),
                        existing: slot.kind,
                        requested: kind,
                    });
                }
                slot
            }
            None => match slots.get_mut(slot_id) {
                Some(slot) => slot,
                None => {
                    tracing::debug!(slot = %slot_id, "event for unknown slot");
                    return Ok(Vec::new());
                }
            },
        };

        let before = SlotSnapshot::of(slot);
        let effects = f(slot, now_ms);
        self.publish(before, slot);
        Ok(effects)
    }

    fn publish(&self, before: SlotSnapshot, slot: &JobSlot) {
        let after = SlotSnapshot::of(slot);
        if after == before {
            return;
        }
        if after.status.kind() != before.status.kind() {
            tracing::info!(
                slot = %after.slot,
                job = ?after.handle.as_ref().map(|h| h.id.as_str()),
                from = %before.status.kind(),
                to = %after.status.kind(),
                "slot transition"
            );
        }
        // No receivers is fine
        let _ = self.updates.send(after);
    }
}
