// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Job tracker engine: dispatch, watch and reconcile background jobs

pub mod dispatcher;
mod executor;
pub mod poller;
mod runtime;
pub mod scheduler;

pub use dispatcher::Dispatcher;
pub use executor::{ExecuteError, Executor};
pub use poller::{Poller, Verdict, WatchMode};
pub use runtime::{Runtime, RuntimeDeps, RuntimeError, SlotSnapshot};
pub use scheduler::Scheduler;
