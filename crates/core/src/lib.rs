// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! isk-core: job slots, handles and the pure state machine for the job tracker

pub mod macros;

pub mod clock;
pub mod config;
pub mod effect;
pub mod error;
pub mod event;
pub mod fingerprint;
pub mod handle;
pub mod id;
pub mod kind;
pub mod notice;
pub mod poll;
pub mod reconcile;
pub mod slot;
pub mod status;
pub mod timer;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{BackendConfig, ConfigError, KindConfig, TrackerConfig, WatchTransport};
pub use effect::Effect;
pub use error::DispatchError;
pub use event::Event;
pub use fingerprint::Fingerprint;
pub use handle::{JobHandle, JobId, Lookup};
#[cfg(any(test, feature = "test-support"))]
pub use id::SequentialIdGen;
pub use id::{short, IdGen, NanoIdGen};
pub use kind::{JobKind, UnknownKind};
pub use notice::{Notice, NoticeLevel};
pub use poll::{FetchOutcome, PollResult};
pub use reconcile::Decision;
pub use slot::{JobSlot, PendingDispatch, SlotId, TransitionRecord};
pub use status::{FailureReason, JobStatus, JobStatusKind, RemoteStatus};
pub use timer::{TimerId, TimerKind};
