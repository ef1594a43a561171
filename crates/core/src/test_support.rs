// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::{Event, Fingerprint, JobHandle, JobId, JobKind, JobSlot, SlotId};

pub const REPO_URL: &str = "https://git.example.com/acme/app.git";

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for core state machine types.
pub mod strategies {
    use crate::status::{FailureReason, JobStatus, RemoteStatus};
    use proptest::prelude::*;

    pub fn arb_remote_status() -> impl Strategy<Value = RemoteStatus> {
        prop_oneof![
            Just(RemoteStatus::Pending),
            Just(RemoteStatus::Completed),
            Just(RemoteStatus::Error),
        ]
    }

    pub fn arb_failure_reason() -> impl Strategy<Value = FailureReason> {
        prop_oneof![
            prop::collection::vec("[a-z_]{1,8}", 1..3)
                .prop_map(|missing| FailureReason::InvalidFingerprint { missing }),
            (400u16..600, ".{0,16}")
                .prop_map(|(status, message)| FailureReason::Rejected { status, message }),
            ".{0,16}".prop_map(|message| FailureReason::Transport { message }),
            ".{0,16}".prop_map(|message| FailureReason::Remote { message }),
            Just(FailureReason::RecordNotFound),
            ".{0,16}".prop_map(|message| FailureReason::Unconfirmed { message }),
        ]
    }

    pub fn arb_job_status() -> impl Strategy<Value = JobStatus> {
        prop_oneof![
            Just(JobStatus::Idle),
            Just(JobStatus::Initializing),
            (any::<u32>(), any::<u64>())
                .prop_map(|(attempt, started_at_ms)| JobStatus::Polling { attempt, started_at_ms }),
            any::<Option<i64>>().prop_map(|n| JobStatus::Succeeded { result: serde_json::json!(n) }),
            arb_failure_reason().prop_map(|reason| JobStatus::Failed { reason }),
            Just(JobStatus::TimedOut),
        ]
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────

/// Repository fingerprint for `REPO_URL` at `branch`.
pub fn repo_fp(branch: &str) -> Fingerprint {
    Fingerprint::repository(REPO_URL, branch)
}

/// Acknowledged validation job for `REPO_URL` at `branch`.
pub fn validation_handle(id: &str, branch: &str) -> JobHandle {
    JobHandle::by_id(JobId::new(id), JobKind::Validation, repo_fp(branch), 1_000_000)
}

/// Validation slot already polling `id`.
pub fn polling_slot(id: &str, branch: &str) -> JobSlot {
    let mut slot = JobSlot::new(SlotId::for_kind(JobKind::Validation), JobKind::Validation);
    slot.resume(validation_handle(id, branch), 1_000_000);
    slot
}

// ── Event factory functions ─────────────────────────────────────────────────

pub fn slot_start_event(kind: JobKind, fingerprint: Fingerprint) -> Event {
    Event::SlotStart {
        slot: SlotId::for_kind(kind),
        kind,
        fingerprint,
        payload: serde_json::Value::Null,
    }
}

pub fn slot_reset_event(kind: JobKind) -> Event {
    Event::SlotReset { slot: SlotId::for_kind(kind) }
}
