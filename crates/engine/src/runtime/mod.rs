// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime for the job tracker
//!
//! Owns every `JobSlot`, feeds events through the slot reducers and hands
//! the resulting effects to the executor.

mod handlers;

use crate::executor::{ExecuteError, Executor};
use crate::poller::Poller;
use crate::scheduler::Scheduler;
use isk_adapters::{JobBackend, NotifyAdapter, SubscribeAdapter};
use isk_core::{
    Clock, Event, Fingerprint, IdGen, JobHandle, JobKind, JobSlot, JobStatus, SlotId, TrackerConfig,
    TransitionRecord,
};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;

/// Capacity of the snapshot broadcast channel
const SNAPSHOT_CAPACITY: usize = 64;

/// Runtime adapter dependencies
pub struct RuntimeDeps<B, S, N> {
    pub backend: B,
    pub subscriber: S,
    pub notifier: N,
}

/// Errors that can occur in the runtime
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("execute error: {0}")]
    Execute(#[from] ExecuteError),
    #[error("slot {slot} tracks {existing} jobs, not {requested}")]
    KindMismatch { slot: SlotId, existing: JobKind, requested: JobKind },
}

/// Read-only view of a slot, published on every transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotSnapshot {
    pub slot: SlotId,
    pub kind: JobKind,
    pub status: JobStatus,
    pub is_busy: bool,
    pub is_terminal: bool,
    pub handle: Option<JobHandle>,
    pub history: Vec<TransitionRecord>,
}

impl SlotSnapshot {
    pub fn of(slot: &JobSlot) -> Self {
        Self {
            slot: slot.id.clone(),
            kind: slot.kind,
            status: slot.status().clone(),
            is_busy: slot.is_busy(),
            is_terminal: slot.is_terminal(),
            handle: slot.handle().cloned(),
            history: slot.history().cloned().collect(),
        }
    }
}

/// Runtime that coordinates the tracker
pub struct Runtime<B, S, N, C: Clock> {
    executor: Executor<B, S, N, C>,
    // Never held across an await
    slots: Mutex<HashMap<SlotId, JobSlot>>,
    ids: Arc<dyn IdGen>,
    updates: broadcast::Sender<SlotSnapshot>,
}

impl<B, S, N, C> Runtime<B, S, N, C>
where
    B: JobBackend,
    S: SubscribeAdapter,
    N: NotifyAdapter,
    C: Clock,
{
    /// Create a new runtime
    ///
    /// Background work reports back through `event_tx`; pass the matching
    /// receiver to [`Runtime::run`].
    pub fn new(
        deps: RuntimeDeps<B, S, N>,
        config: TrackerConfig,
        clock: C,
        ids: Arc<dyn IdGen>,
        event_tx: mpsc::Sender<Event>,
    ) -> Self {
        let scheduler = Arc::new(Mutex::new(Scheduler::new()));
        let poller = Arc::new(Mutex::new(Poller::new()));
        let (updates, _) = broadcast::channel(SNAPSHOT_CAPACITY);
        Self {
            executor: Executor::new(deps, config, scheduler, poller, clock, event_tx),
            slots: Mutex::new(HashMap::new()),
            ids,
            updates,
        }
    }

    /// Start (or restart) the job for `slot`.
    pub async fn start(
        &self,
        slot: SlotId,
        kind: JobKind,
        fingerprint: Fingerprint,
        payload: serde_json::Value,
    ) -> Result<(), RuntimeError> {
        self.handle_event(Event::SlotStart { slot, kind, fingerprint, payload }).await
    }

    /// Return `slot` to idle, dropping any live job.
    pub async fn reset(&self, slot: SlotId) -> Result<(), RuntimeError> {
        self.handle_event(Event::SlotReset { slot }).await
    }

    /// Watch a previously issued handle without dispatching.
    pub async fn resume(&self, slot: SlotId, handle: JobHandle) -> Result<(), RuntimeError> {
        self.handle_event(Event::SlotResume { slot, handle }).await
    }

    pub fn snapshot(&self, slot: &SlotId) -> Option<SlotSnapshot> {
        self.slots.lock().get(slot).map(SlotSnapshot::of)
    }

    /// Snapshots of every known slot, ordered by slot id
    pub fn snapshots(&self) -> Vec<SlotSnapshot> {
        let mut all: Vec<SlotSnapshot> = self.slots.lock().values().map(SlotSnapshot::of).collect();
        all.sort_by(|a, b| a.slot.as_str().cmp(b.slot.as_str()));
        all
    }

    /// Receive a snapshot every time a slot changes.
    pub fn subscribe(&self) -> broadcast::Receiver<SlotSnapshot> {
        self.updates.subscribe()
    }

    pub fn executor(&self) -> &Executor<B, S, N, C> {
        &self.executor
    }

    /// Fire every due timer. Returns how many fired.
    pub async fn fire_timers(&self) -> usize {
        let now = self.executor.clock().now();
        let fired = self.executor.scheduler().lock().fired_timers(now);
        let count = fired.len();
        for event in fired {
            self.process(event).await;
        }
        count
    }

    /// Drive the runtime until `cancel` fires, the channel closes, or a
    /// `Shutdown` event arrives.
    ///
    /// Queued events are always handled before due timers fire, so a
    /// terminal result that arrived in the same tick as a timeout wins.
    ///
    /// Timer waits are measured on the runtime's `Clock` and slept in real
    /// time. With a `FakeClock` nothing fires until the fake clock reaches
    /// the deadline; the loop re-checks after each wait or event.
    pub async fn run(&self, mut event_rx: mpsc::Receiver<Event>, cancel: CancellationToken) {
        tracing::info!("job tracker runtime started");
        loop {
            loop {
                match event_rx.try_recv() {
                    Ok(Event::Shutdown) => return self.stopped("shutdown event"),
                    Ok(event) => self.process(event).await,
                    Err(mpsc::error::TryRecvError::Empty) => break,
                    Err(mpsc::error::TryRecvError::Disconnected) => {
                        return self.stopped("event channel closed")
                    }
                }
            }
            self.fire_timers().await;

            // Remaining wait, measured on the injected clock
            let deadline = self.executor.scheduler().lock().next_deadline();
            let wait = deadline.map(|at| at.saturating_duration_since(self.executor.clock().now()));
            let next_timer = async move {
                match wait {
                    Some(wait) => tokio::time::sleep(wait).await,
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                _ = cancel.cancelled() => return self.stopped("cancelled"),
                event = event_rx.recv() => match event {
                    Some(Event::Shutdown) => return self.stopped("shutdown event"),
                    Some(event) => self.process(event).await,
                    None => return self.stopped("event channel closed"),
                },
                _ = next_timer => {}
            }
        }
    }

    /// Handle one event, logging instead of propagating failures.
    async fn process(&self, event: Event) {
        let name = event.name();
        if let Err(e) = self.handle_event(event).await {
            tracing::error!(event = name, error = %e, "event handling failed");
        }
    }

    fn stopped(&self, reason: &str) {
        tracing::info!(reason, "job tracker runtime stopped");
    }
}

#[cfg(test)]
#[path = "../runtime_tests/mod.rs"]
mod tests;
