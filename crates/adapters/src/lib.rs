// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Adapters for the job backend, the push channel and user notices

pub mod backend;
pub mod notify;
pub mod subscribe;

pub use backend::{BackendError, HttpBackend, JobBackend};
pub use notify::{BroadcastNotifyAdapter, LogNotifyAdapter, NotifyAdapter, NotifyError};
pub use subscribe::{PushUpdate, SubscribeAdapter, SubscribeError, Subscription, WsSubscribeAdapter};

// Test support
#[cfg(any(test, feature = "test-support"))]
pub use backend::{BackendCall, FakeBackend};
#[cfg(any(test, feature = "test-support"))]
pub use notify::FakeNotifyAdapter;
#[cfg(any(test, feature = "test-support"))]
pub use subscribe::FakeSubscribeAdapter;
