// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effect executor

use crate::dispatcher::Dispatcher;
use crate::poller::Poller;
use crate::{scheduler::Scheduler, RuntimeDeps};
use isk_adapters::{JobBackend, NotifyAdapter, PushUpdate, SubscribeAdapter, Subscription};
use isk_core::{Clock, Effect, Event, FetchOutcome, JobHandle, JobId, SlotId, TrackerConfig};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

/// Errors that can occur during effect execution
#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("event channel closed")]
    ChannelClosed,
    #[error("effect {0} must be expanded by the poller")]
    NotPrimitive(&'static str),
}

type OpenSubscriptions = Arc<Mutex<HashMap<SlotId, (JobId, oneshot::Sender<()>)>>>;

/// Executes effects using the configured adapters
pub struct Executor<B, S, N, C: Clock> {
    backend: B,
    subscriber: S,
    notifier: N,
    dispatcher: Dispatcher<B, C>,
    config: TrackerConfig,
    scheduler: Arc<Mutex<Scheduler>>,
    poller: Arc<Mutex<Poller>>,
    subscriptions: OpenSubscriptions,
    clock: C,
    /// Channel for results of background work (dispatch, fetch, push)
    event_tx: mpsc::Sender<Event>,
}

impl<B, S, N, C> Executor<B, S, N, C>
where
    B: JobBackend,
    S: SubscribeAdapter,
    N: NotifyAdapter,
    C: Clock,
{
    /// Create a new executor
    pub fn new(
        deps: RuntimeDeps<B, S, N>,
        config: TrackerConfig,
        scheduler: Arc<Mutex<Scheduler>>,
        poller: Arc<Mutex<Poller>>,
        clock: C,
        event_tx: mpsc::Sender<Event>,
    ) -> Self {
        Self {
            dispatcher: Dispatcher::new(deps.backend.clone(), clock.clone()),
            backend: deps.backend,
            subscriber: deps.subscriber,
            notifier: deps.notifier,
            config,
            scheduler,
            poller,
            subscriptions: Arc::new(Mutex::new(HashMap::new())),
            clock,
            event_tx,
        }
    }

    /// Get a reference to the clock
    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn scheduler(&self) -> &Arc<Mutex<Scheduler>> {
        &self.scheduler
    }

    pub fn poller(&self) -> &Arc<Mutex<Poller>> {
        &self.poller
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Execute a single effect with tracing
    pub async fn execute(&self, effect: Effect) -> Result<(), ExecuteError> {
        // Format the fields as `key=val`
        let info = {
            let fields = effect.fields();
            let cap = fields.iter().map(|(a, b)| a.len() + b.len() + 2).sum();
            let mut fmt = String::with_capacity(cap);
            for (key, val) in fields {
                fmt.push_str(key);
                fmt.push('=');
                fmt.push_str(&val);
                fmt.push(' ');
            }
            fmt.pop();
            fmt
        };

        let op = effect.name();
        let verbose = effect.verbose();
        if verbose {
            tracing::info!("executing effect={} {}", op, info);
        }

        let start = std::time::Instant::now();
        let result = self.execute_inner(effect).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;
        if verbose {
            match &result {
                Ok(()) => tracing::info!(elapsed_ms, "completed"),
                Err(e) => tracing::error!(error = %e, elapsed_ms, "failed"),
            }
        } else {
            match &result {
                Ok(()) => tracing::debug!(elapsed_ms, "executed effect={} {}", op, info),
                Err(e) => tracing::error!(error = %e, elapsed_ms, "error effect={} {}", op, info),
            }
        }

        result
    }

    /// Execute multiple effects in order
    pub async fn execute_all(&self, effects: Vec<Effect>) -> Result<(), ExecuteError> {
        for effect in effects {
            self.execute(effect).await?;
        }
        Ok(())
    }

    /// Inner execution logic for a single effect
    async fn execute_inner(&self, effect: Effect) -> Result<(), ExecuteError> {
        match effect {
            // === Watch lifecycle ===
            Effect::Watch { slot, handle } => {
                let config = self.config.kind(handle.kind);
                let expanded = self.poller.lock().begin(slot, handle, config, self.clock.now());
                for effect in expanded {
                    self.execute_io(effect).await?;
                }
                Ok(())
            }

            Effect::Unwatch { slot, job } => {
                let expanded = self.poller.lock().cancel(&slot, &job);
                for effect in expanded {
                    self.execute_io(effect).await?;
                }
                Ok(())
            }

            effect => self.execute_io(effect).await,
        }
    }

    /// Run an effect that talks to an adapter or the scheduler.
    async fn execute_io(&self, effect: Effect) -> Result<(), ExecuteError> {
        match effect {
            Effect::Watch { .. } | Effect::Unwatch { .. } => Err(ExecuteError::NotPrimitive(effect.name())),

            // === Dispatch ===
            Effect::Dispatch { slot, kind, correlation, fingerprint, payload } => {
                let dispatcher = self.dispatcher.clone();
                let event_tx = self.event_tx.clone();
                tokio::spawn(async move {
                    let event = match dispatcher.start(kind, &fingerprint, payload, correlation.clone()).await {
                        Ok(handle) => Event::JobDispatched { slot, correlation, handle },
                        Err(error) => Event::DispatchFailed { slot, correlation, error },
                    };
                    if let Err(e) = event_tx.send(event).await {
                        tracing::error!("failed to send dispatch event: {}", e);
                    }
                });
                Ok(())
            }

            // === Poller effects ===
            Effect::FetchStatus { slot, handle } => {
                let backend = self.backend.clone();
                let event_tx = self.event_tx.clone();
                tokio::spawn(async move {
                    let outcome = match backend.fetch_status(&handle).await {
                        Ok(Some(response)) => FetchOutcome::Found { result: response.into_poll_result(&handle) },
                        Ok(None) => FetchOutcome::NotFound,
                        Err(e) => FetchOutcome::TransportError { message: e.to_string() },
                    };
                    let event = Event::StatusFetched { slot, job: handle.id, outcome };
                    if let Err(e) = event_tx.send(event).await {
                        tracing::error!("failed to send fetch event: {}", e);
                    }
                });
                Ok(())
            }

            Effect::Subscribe { slot, handle } => {
                let subscriber = self.subscriber.clone();
                let poller = Arc::clone(&self.poller);
                let subscriptions = Arc::clone(&self.subscriptions);
                let event_tx = self.event_tx.clone();
                tokio::spawn(async move {
                    match subscriber.subscribe(&handle).await {
                        Ok(subscription) => {
                            forward_updates(slot, handle, subscription, poller, subscriptions, event_tx).await
                        }
                        Err(e) => {
                            tracing::warn!(%slot, job = %handle.id, error = %e, "subscribe failed");
                            let event =
                                Event::SubscriptionClosed { slot, job: handle.id, reason: e.to_string() };
                            if let Err(e) = event_tx.send(event).await {
                                tracing::error!("failed to send subscription event: {}", e);
                            }
                        }
                    }
                });
                Ok(())
            }

            Effect::Unsubscribe { slot, job } => {
                let open = {
                    let mut subscriptions = self.subscriptions.lock();
                    match subscriptions.get(&slot) {
                        Some((open_job, _)) if *open_job == job => subscriptions.remove(&slot),
                        _ => None,
                    }
                };
                if let Some((_, shutdown)) = open {
                    let _ = shutdown.send(());
                }
                Ok(())
            }

            // === Timer effects ===
            Effect::SetTimer { id, duration } => {
                let now = self.clock.now();
                self.scheduler.lock().set_timer(id.to_string(), duration, now);
                Ok(())
            }

            Effect::CancelTimer { id } => {
                self.scheduler.lock().cancel_timer(id.as_str());
                Ok(())
            }

            // === Notification ===
            Effect::Notify { notice } => {
                if let Err(e) = self.notifier.notify(&notice).await {
                    tracing::warn!(slot = %notice.slot, error = %e, "notification failed");
                }
                Ok(())
            }
        }
    }
}

/// Bridge a push subscription into events until it closes or is shut down.
async fn forward_updates(
    slot: SlotId,
    handle: JobHandle,
    subscription: Subscription,
    poller: Arc<Mutex<Poller>>,
    subscriptions: OpenSubscriptions,
    event_tx: mpsc::Sender<Event>,
) {
    let Subscription { mut updates, shutdown } = subscription;

    // The watch may have ended while the connection was opening
    if let Err(shutdown) = register_subscription(&slot, &handle.id, shutdown, &poller, &subscriptions) {
        let _ = shutdown.send(());
        return;
    }

    while let Some(update) = updates.recv().await {
        let (event, closed) = match update {
            PushUpdate::Status(response) => (
                Event::StatusPushed {
                    slot: slot.clone(),
                    job: handle.id.clone(),
                    result: response.into_poll_result(&handle),
                },
                false,
            ),
            PushUpdate::Closed { reason } => {
                (Event::SubscriptionClosed { slot: slot.clone(), job: handle.id.clone(), reason }, true)
            }
        };
        if event_tx.send(event).await.is_err() || closed {
            break;
        }
    }

    let mut subscriptions = subscriptions.lock();
    if subscriptions.get(&slot).is_some_and(|(job, _)| *job == handle.id) {
        subscriptions.remove(&slot);
    }
}

/// Record an open subscription if its watch still wants one.
///
/// The poller lock is held across the insert so an `Unwatch` either sees the
/// entry or has already cancelled the watch. Lock order: poller, then
/// subscriptions. Hands the sender back when the watch is gone.
fn register_subscription(
    slot: &SlotId,
    job: &JobId,
    shutdown: oneshot::Sender<()>,
    poller: &Mutex<Poller>,
    subscriptions: &OpenSubscriptions,
) -> Result<(), oneshot::Sender<()>> {
    let poller = poller.lock();
    if !poller.wants_subscription(slot, job) {
        return Err(shutdown);
    }
    subscriptions.lock().insert(slot.clone(), (job.clone(), shutdown));
    Ok(())
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
