// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Push subscriptions: status updates delivered by the server.

mod ws;

use async_trait::async_trait;
use isk_core::JobHandle;
use isk_wire::StatusResponse;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

pub use ws::WsSubscribeAdapter;

/// Errors from subscribe operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubscribeError {
    #[error("push channel not configured")]
    Unsupported,
    #[error("connect failed: {0}")]
    Connect(String),
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// One message on an open subscription.
#[derive(Debug, Clone, PartialEq)]
pub enum PushUpdate {
    Status(StatusResponse),
    /// The subscription ended; no further updates follow.
    Closed { reason: String },
}

/// An open subscription.
///
/// Dropping or firing `shutdown` closes it.
#[derive(Debug)]
pub struct Subscription {
    pub updates: mpsc::Receiver<PushUpdate>,
    pub shutdown: oneshot::Sender<()>,
}

/// Adapter for push subscriptions
#[async_trait]
pub trait SubscribeAdapter: Clone + Send + Sync + 'static {
    /// Subscribe to status updates for a job.
    async fn subscribe(&self, handle: &JobHandle) -> Result<Subscription, SubscribeError>;
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{PushUpdate, SubscribeAdapter, SubscribeError, Subscription};
    use async_trait::async_trait;
    use isk_core::{JobHandle, JobId, RemoteStatus};
    use isk_wire::StatusResponse;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::{mpsc, oneshot};

    struct Open {
        tx: mpsc::Sender<PushUpdate>,
        shutdown: oneshot::Receiver<()>,
    }

    #[derive(Default)]
    struct FakeSubscribeState {
        open: HashMap<JobId, Open>,
        subscribed: Vec<JobId>,
        fail_with: Option<SubscribeError>,
    }

    /// Fake push channel for testing
    #[derive(Clone, Default)]
    pub struct FakeSubscribeAdapter {
        inner: Arc<Mutex<FakeSubscribeState>>,
    }

    impl FakeSubscribeAdapter {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make every later subscribe call fail
        pub fn fail_with(&self, err: SubscribeError) {
            self.inner.lock().fail_with = Some(err);
        }

        /// Every job ever subscribed, in order
        pub fn subscribed(&self) -> Vec<JobId> {
            self.inner.lock().subscribed.clone()
        }

        /// True while the subscriber has not shut the subscription down
        pub fn is_open(&self, job: &str) -> bool {
            let mut inner = self.inner.lock();
            match inner.open.get_mut(job) {
                Some(open) => matches!(open.shutdown.try_recv(), Err(oneshot::error::TryRecvError::Empty)),
                None => false,
            }
        }

        /// Deliver a status update; false when no subscription is open
        pub fn push(&self, job: &str, status: RemoteStatus, result: Option<serde_json::Value>) -> bool {
            let update = PushUpdate::Status(StatusResponse {
                job_id: Some(JobId::new(job)),
                status,
                fingerprint: None,
                result,
                error: None,
            });
            self.send(job, update)
        }

        /// Close a subscription from the server side
        pub fn close(&self, job: &str, reason: &str) -> bool {
            let sent = self.send(job, PushUpdate::Closed { reason: reason.to_string() });
            self.inner.lock().open.remove(job);
            sent
        }

        fn send(&self, job: &str, update: PushUpdate) -> bool {
            let inner = self.inner.lock();
            inner.open.get(job).is_some_and(|open| open.tx.try_send(update).is_ok())
        }
    }

    #[async_trait]
    impl SubscribeAdapter for FakeSubscribeAdapter {
        async fn subscribe(&self, handle: &JobHandle) -> Result<Subscription, SubscribeError> {
            let mut inner = self.inner.lock();
            if let Some(err) = inner.fail_with.clone() {
                return Err(err);
            }
            let (tx, updates) = mpsc::channel(16);
            let (shutdown, shutdown_rx) = oneshot::channel();
            inner.subscribed.push(handle.id.clone());
            inner.open.insert(handle.id.clone(), Open { tx, shutdown: shutdown_rx });
            Ok(Subscription { updates, shutdown })
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeSubscribeAdapter;

#[cfg(test)]
#[path = "subscribe_tests.rs"]
mod tests;
