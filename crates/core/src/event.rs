// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Events: every input that can drive a slot transition.

use crate::error::DispatchError;
use crate::fingerprint::Fingerprint;
use crate::handle::{JobHandle, JobId};
use crate::kind::JobKind;
use crate::poll::{FetchOutcome, PollResult};
use crate::slot::SlotId;
use crate::timer::TimerId;
use serde::{Deserialize, Serialize};

/// Events that trigger state transitions.
///
/// Serializes with `{"type": "event:name", ...fields}` format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    #[serde(rename = "system:shutdown")]
    Shutdown,

    #[serde(rename = "timer:start")]
    TimerStart { id: TimerId },

    // -- intents --
    /// Start (or restart) the job for a slot
    #[serde(rename = "slot:start")]
    SlotStart {
        slot: SlotId,
        kind: JobKind,
        fingerprint: Fingerprint,
        #[serde(default)]
        payload: serde_json::Value,
    },

    #[serde(rename = "slot:reset")]
    SlotReset { slot: SlotId },

    /// Watch a previously issued handle without dispatching
    #[serde(rename = "slot:resume")]
    SlotResume { slot: SlotId, handle: JobHandle },

    // -- dispatch outcomes --
    #[serde(rename = "job:dispatched")]
    JobDispatched { slot: SlotId, correlation: JobId, handle: JobHandle },

    #[serde(rename = "job:dispatch_failed")]
    DispatchFailed { slot: SlotId, correlation: JobId, error: DispatchError },

    // -- watch outcomes --
    #[serde(rename = "job:fetched")]
    StatusFetched { slot: SlotId, job: JobId, outcome: FetchOutcome },

    #[serde(rename = "job:pushed")]
    StatusPushed { slot: SlotId, job: JobId, result: PollResult },

    #[serde(rename = "job:subscription_closed")]
    SubscriptionClosed { slot: SlotId, job: JobId, reason: String },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::Shutdown => "system:shutdown",
            Event::TimerStart { .. } => "timer:start",
            Event::SlotStart { .. } => "slot:start",
            Event::SlotReset { .. } => "slot:reset",
            Event::SlotResume { .. } => "slot:resume",
            Event::JobDispatched { .. } => "job:dispatched",
            Event::DispatchFailed { .. } => "job:dispatch_failed",
            Event::StatusFetched { .. } => "job:fetched",
            Event::StatusPushed { .. } => "job:pushed",
            Event::SubscriptionClosed { .. } => "job:subscription_closed",
        }
    }

    /// Slot this event is addressed to, if any.
    pub fn slot(&self) -> Option<&SlotId> {
        match self {
            Event::Shutdown | Event::TimerStart { .. } => None,
            Event::SlotStart { slot, .. }
            | Event::SlotReset { slot }
            | Event::SlotResume { slot, .. }
            | Event::JobDispatched { slot, .. }
            | Event::DispatchFailed { slot, .. }
            | Event::StatusFetched { slot, .. }
            | Event::StatusPushed { slot, .. }
            | Event::SubscriptionClosed { slot, .. } => Some(slot),
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
