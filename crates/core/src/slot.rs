// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job slots: the per-purpose state machine.
//!
//! A slot holds at most one live job. Every transition method is a pure
//! reducer: it mutates the slot and returns the effects the runtime must
//! execute. Nothing here performs I/O or reads a clock.
//!
//! ```text
//! Idle ──start──▶ Initializing ──handle──▶ Polling ──COMPLETED──▶ Succeeded
//!                      │                      ├──ERROR/failure──▶ Failed
//!                      └──dispatch error──▶ Failed    └──timeout──▶ TimedOut
//! ```

use crate::effect::Effect;
use crate::error::DispatchError;
use crate::fingerprint::Fingerprint;
use crate::handle::{JobHandle, JobId};
use crate::kind::JobKind;
use crate::notice::Notice;
use crate::poll::PollResult;
use crate::status::{FailureReason, JobStatus, JobStatusKind, RemoteStatus};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

crate::define_id! {
    /// Identifier of a job slot, e.g. `validation` or `reindex/p-42`.
    pub struct SlotId("slot-");
}

impl SlotId {
    /// The default slot for a job kind.
    pub fn for_kind(kind: JobKind) -> Self {
        Self::new(kind.as_str())
    }

    /// A slot for one kind scoped to an entity (project, meeting, ...).
    pub fn scoped(kind: JobKind, scope: &str) -> Self {
        Self::new(format!("{}/{}", kind.as_str(), scope.replace(':', "_")))
    }
}

/// Maximum transitions retained per slot.
pub const HISTORY_LIMIT: usize = 32;

/// One recorded status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub at_ms: u64,
    pub from: JobStatusKind,
    pub to: JobStatusKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job: Option<JobId>,
}

/// A dispatch awaiting its trigger response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingDispatch {
    pub correlation: JobId,
    pub fingerprint: Fingerprint,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSlot {
    pub id: SlotId,
    pub kind: JobKind,
    status: JobStatus,
    handle: Option<JobHandle>,
    pending: Option<PendingDispatch>,
    history: VecDeque<TransitionRecord>,
}

impl JobSlot {
    pub fn new(id: SlotId, kind: JobKind) -> Self {
        Self {
            id,
            kind,
            status: JobStatus::Idle,
            handle: None,
            pending: None,
            history: VecDeque::new(),
        }
    }

    pub fn status(&self) -> &JobStatus {
        &self.status
    }

    /// Current handle. Kept after a terminal transition so callers can see
    /// which job produced the result.
    pub fn handle(&self) -> Option<&JobHandle> {
        self.handle.as_ref()
    }

    pub fn pending(&self) -> Option<&PendingDispatch> {
        self.pending.as_ref()
    }

    pub fn history(&self) -> impl Iterator<Item = &TransitionRecord> {
        self.history.iter()
    }

    pub fn is_busy(&self) -> bool {
        self.status.is_busy()
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// True when `job` is the handle currently being watched.
    pub fn is_watching(&self, job: &JobId) -> bool {
        self.status.is_polling() && self.handle.as_ref().is_some_and(|h| &h.id == job)
    }

    /// Start a job for this slot.
    ///
    /// Any live job is superseded first. A terminal slot restarts without an
    /// explicit reset. An invalid fingerprint fails synchronously and
    /// produces no `Dispatch`.
    pub fn start(
        &mut self,
        correlation: JobId,
        fingerprint: Fingerprint,
        payload: serde_json::Value,
        now_ms: u64,
    ) -> Vec<Effect> {
        let mut effects = self.supersede();
        self.transition(JobStatus::Initializing, now_ms);

        let missing = fingerprint.missing_fields(self.kind);
        if !missing.is_empty() {
            effects.extend(self.finish(
                JobStatus::Failed { reason: FailureReason::InvalidFingerprint { missing } },
                now_ms,
            ));
            return effects;
        }

        self.pending =
            Some(PendingDispatch { correlation: correlation.clone(), fingerprint: fingerprint.clone() });
        effects.push(Effect::Dispatch {
            slot: self.id.clone(),
            kind: self.kind,
            correlation,
            fingerprint,
            payload,
        });
        effects
    }

    /// The trigger call returned a handle.
    ///
    /// Ignored unless `correlation` matches the dispatch this slot is
    /// waiting on.
    pub fn handle_obtained(&mut self, correlation: &JobId, handle: JobHandle, now_ms: u64) -> Vec<Effect> {
        if !self.awaiting(correlation) {
            return Vec::new();
        }
        self.pending = None;
        self.watch(handle, now_ms)
    }

    /// The trigger call failed.
    ///
    /// An ambiguous failure falls back to watching by fingerprint under the
    /// correlation id; anything else is terminal.
    pub fn dispatch_failed(&mut self, correlation: &JobId, error: &DispatchError, now_ms: u64) -> Vec<Effect> {
        if !self.awaiting(correlation) {
            return Vec::new();
        }
        let Some(pending) = self.pending.take() else {
            return Vec::new();
        };
        if error.is_ambiguous() {
            let handle =
                JobHandle::by_fingerprint(pending.correlation, self.kind, pending.fingerprint, now_ms);
            return self.watch(handle, now_ms);
        }
        self.finish(JobStatus::Failed { reason: error.to_failure() }, now_ms)
    }

    /// Apply a poll result the reconciler accepted.
    pub fn apply_poll(&mut self, result: PollResult, now_ms: u64) -> Vec<Effect> {
        match result.status {
            RemoteStatus::Pending => {
                if let JobStatus::Polling { attempt, .. } = &mut self.status {
                    *attempt = attempt.saturating_add(1);
                }
                Vec::new()
            }
            RemoteStatus::Completed => self.finish(
                JobStatus::Succeeded { result: result.payload.unwrap_or(serde_json::Value::Null) },
                now_ms,
            ),
            RemoteStatus::Error => {
                let message = result.error.unwrap_or_else(|| format!("{} failed", self.kind.label()));
                self.finish(JobStatus::Failed { reason: FailureReason::Remote { message } }, now_ms)
            }
        }
    }

    /// Watching `job` failed for a reason other than the remote status.
    pub fn poll_failed(&mut self, job: &JobId, reason: FailureReason, now_ms: u64) -> Vec<Effect> {
        if !self.is_watching(job) {
            return Vec::new();
        }
        self.finish(JobStatus::Failed { reason }, now_ms)
    }

    /// The overall timeout for `job` elapsed.
    pub fn timed_out(&mut self, job: &JobId, now_ms: u64) -> Vec<Effect> {
        if !self.is_watching(job) {
            return Vec::new();
        }
        self.finish(JobStatus::TimedOut, now_ms)
    }

    /// Return to `Idle`, dropping any live job. No notice is raised.
    pub fn reset(&mut self, now_ms: u64) -> Vec<Effect> {
        if self.status == JobStatus::Idle {
            return Vec::new();
        }
        let effects = self.supersede();
        self.transition(JobStatus::Idle, now_ms);
        effects
    }

    /// Watch a previously issued handle without dispatching.
    ///
    /// Ignored when the handle belongs to another kind.
    pub fn resume(&mut self, handle: JobHandle, now_ms: u64) -> Vec<Effect> {
        if handle.kind != self.kind {
            return Vec::new();
        }
        let mut effects = self.supersede();
        effects.extend(self.watch(handle, now_ms));
        effects
    }

    fn awaiting(&self, correlation: &JobId) -> bool {
        self.status == JobStatus::Initializing
            && self.pending.as_ref().is_some_and(|p| &p.correlation == correlation)
    }

    fn watch(&mut self, handle: JobHandle, now_ms: u64) -> Vec<Effect> {
        self.handle = Some(handle.clone());
        self.transition(JobStatus::Polling { attempt: 0, started_at_ms: now_ms }, now_ms);
        vec![Effect::Watch { slot: self.id.clone(), handle }]
    }

    /// Drop the live job, if any.
    fn supersede(&mut self) -> Vec<Effect> {
        self.pending = None;
        match self.handle.take() {
            Some(handle) if self.status.is_polling() => {
                vec![Effect::Unwatch { slot: self.id.clone(), job: handle.id }]
            }
            _ => Vec::new(),
        }
    }

    /// Enter a terminal status: stop watching and raise one notice.
    fn finish(&mut self, status: JobStatus, now_ms: u64) -> Vec<Effect> {
        let mut effects = Vec::new();
        if let Some(handle) = &self.handle {
            if self.status.is_polling() {
                effects.push(Effect::Unwatch { slot: self.id.clone(), job: handle.id.clone() });
            }
        }
        self.transition(status, now_ms);
        if let Some(notice) = Notice::for_terminal(&self.id, self.kind, &self.status) {
            effects.push(Effect::Notify { notice });
        }
        effects
    }

    fn transition(&mut self, status: JobStatus, now_ms: u64) {
        let from = self.status.kind();
        self.status = status;
        if self.history.len() == HISTORY_LIMIT {
            self.history.pop_front();
        }
        self.history.push_back(TransitionRecord {
            at_ms: now_ms,
            from,
            to: self.status.kind(),
            job: self.handle.as_ref().map(|h| h.id.clone()),
        });
    }
}

#[cfg(test)]
#[path = "slot_tests.rs"]
mod tests;
