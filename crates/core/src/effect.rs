// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effects represent side effects the tracker needs to perform

use crate::fingerprint::Fingerprint;
use crate::handle::{JobHandle, JobId};
use crate::kind::JobKind;
use crate::notice::Notice;
use crate::slot::SlotId;
use crate::timer::TimerId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Effects that need to be executed by the runtime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    // === Dispatch ===
    /// Issue exactly one trigger call for a new job
    Dispatch {
        slot: SlotId,
        kind: JobKind,
        correlation: JobId,
        fingerprint: Fingerprint,
        payload: serde_json::Value,
    },

    // === Watch lifecycle (routed to the poller) ===
    /// Begin watching a handle until a terminal status or timeout
    Watch { slot: SlotId, handle: JobHandle },

    /// Stop watching; idempotent
    Unwatch { slot: SlotId, job: JobId },

    // === Poller effects ===
    /// Fetch the current status of a job once
    FetchStatus { slot: SlotId, handle: JobHandle },

    /// Open a push subscription for a job
    Subscribe { slot: SlotId, handle: JobHandle },

    /// Close a push subscription
    Unsubscribe { slot: SlotId, job: JobId },

    // === Timer effects ===
    SetTimer { id: TimerId, duration: Duration },

    CancelTimer { id: TimerId },

    // === Notification ===
    Notify { notice: Notice },
}

impl Effect {
    /// Effect name for log spans (e.g., "dispatch", "fetch_status")
    pub fn name(&self) -> &'static str {
        match self {
            Effect::Dispatch { .. } => "dispatch",
            Effect::Watch { .. } => "watch",
            Effect::Unwatch { .. } => "unwatch",
            Effect::FetchStatus { .. } => "fetch_status",
            Effect::Subscribe { .. } => "subscribe",
            Effect::Unsubscribe { .. } => "unsubscribe",
            Effect::SetTimer { .. } => "set_timer",
            Effect::CancelTimer { .. } => "cancel_timer",
            Effect::Notify { .. } => "notify",
        }
    }

    /// Key-value pairs for structured logging
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            Effect::Dispatch { slot, kind, correlation, fingerprint, .. } => vec![
                ("slot", slot.to_string()),
                ("kind", kind.to_string()),
                ("correlation", correlation.to_string()),
                ("fingerprint", fingerprint.to_string()),
            ],
            Effect::Watch { slot, handle }
            | Effect::FetchStatus { slot, handle }
            | Effect::Subscribe { slot, handle } => vec![
                ("slot", slot.to_string()),
                ("job", handle.id.to_string()),
                ("lookup", handle.lookup.to_string()),
            ],
            Effect::Unwatch { slot, job } | Effect::Unsubscribe { slot, job } => {
                vec![("slot", slot.to_string()), ("job", job.to_string())]
            }
            Effect::SetTimer { id, duration } => {
                vec![("timer", id.to_string()), ("duration_ms", duration.as_millis().to_string())]
            }
            Effect::CancelTimer { id } => vec![("timer", id.to_string())],
            Effect::Notify { notice } => vec![
                ("slot", notice.slot.to_string()),
                ("level", notice.level.to_string()),
                ("title", notice.title.clone()),
            ],
        }
    }

    /// Whether this effect is logged at info level before it runs.
    ///
    /// Timer bookkeeping and poll fetches happen on every tick; logging them
    /// up front would drown out the transitions.
    pub fn verbose(&self) -> bool {
        !matches!(
            self,
            Effect::SetTimer { .. } | Effect::CancelTimer { .. } | Effect::FetchStatus { .. }
        )
    }
}

#[cfg(test)]
#[path = "effect_tests.rs"]
mod tests;
