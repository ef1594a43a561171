// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use async_trait::async_trait;
use isk_core::{Notice, NoticeLevel};
use thiserror::Error;
use tokio::sync::broadcast;

/// Errors from notify operations
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("send failed: {0}")]
    SendFailed(String),
}

/// Adapter for surfacing notices to the user
#[async_trait]
pub trait NotifyAdapter: Clone + Send + Sync + 'static {
    /// Show one notice
    async fn notify(&self, notice: &Notice) -> Result<(), NotifyError>;
}

/// Writes notices to the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifyAdapter;

#[async_trait]
impl NotifyAdapter for LogNotifyAdapter {
    async fn notify(&self, notice: &Notice) -> Result<(), NotifyError> {
        match notice.level {
            NoticeLevel::Success => {
                tracing::info!(slot = %notice.slot, title = %notice.title, message = %notice.message, "notice")
            }
            NoticeLevel::Error => {
                tracing::warn!(slot = %notice.slot, title = %notice.title, message = %notice.message, "notice")
            }
        }
        Ok(())
    }
}

/// Fans notices out to UI listeners (toasts).
#[derive(Clone, Debug)]
pub struct BroadcastNotifyAdapter {
    tx: broadcast::Sender<Notice>,
}

impl BroadcastNotifyAdapter {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }
}

#[async_trait]
impl NotifyAdapter for BroadcastNotifyAdapter {
    async fn notify(&self, notice: &Notice) -> Result<(), NotifyError> {
        // No listener is not an error: the notice is still logged by the executor.
        if self.tx.send(notice.clone()).is_err() {
            tracing::debug!(slot = %notice.slot, "notice dropped, no listeners");
        }
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{NotifyAdapter, NotifyError};
    use async_trait::async_trait;
    use isk_core::Notice;
    use parking_lot::Mutex;
    use std::sync::Arc;

    struct FakeNotifyState {
        calls: Vec<Notice>,
        fail: bool,
    }

    /// Fake notification adapter for testing
    #[derive(Clone)]
    pub struct FakeNotifyAdapter {
        inner: Arc<Mutex<FakeNotifyState>>,
    }

    impl Default for FakeNotifyAdapter {
        fn default() -> Self {
            Self { inner: Arc::new(Mutex::new(FakeNotifyState { calls: Vec::new(), fail: false })) }
        }
    }

    impl FakeNotifyAdapter {
        pub fn new() -> Self {
            Self::default()
        }

        /// Get all recorded notices
        pub fn calls(&self) -> Vec<Notice> {
            self.inner.lock().calls.clone()
        }

        /// Make later calls fail after recording
        pub fn set_failing(&self, fail: bool) {
            self.inner.lock().fail = fail;
        }
    }

    #[async_trait]
    impl NotifyAdapter for FakeNotifyAdapter {
        async fn notify(&self, notice: &Notice) -> Result<(), NotifyError> {
            let mut inner = self.inner.lock();
            inner.calls.push(notice.clone());
            if inner.fail {
                return Err(NotifyError::SendFailed("fake failure".into()));
            }
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeNotifyAdapter;

#[cfg(test)]
#[path = "notify_tests.rs"]
mod tests;
