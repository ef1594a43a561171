// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reconciler: decides whether an incoming status observation may touch a slot.
//!
//! Results arrive asynchronously and can outlive the job that requested
//! them. Only results for the slot's current handle, with a matching
//! fingerprint, while the slot is still polling, are applied.

use crate::handle::{JobHandle, Lookup};
use crate::poll::PollResult;
use crate::slot::JobSlot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Apply,
    /// The result belongs to a job the slot no longer tracks
    DropStale,
    /// The job's inputs differ from the slot's current inputs
    DropFingerprintMismatch,
    /// The slot already reached a terminal status
    DropSettled,
}

crate::simple_display! {
    Decision {
        Apply => "apply",
        DropStale => "drop_stale",
        DropFingerprintMismatch => "drop_fingerprint_mismatch",
        DropSettled => "drop_settled",
    }
}

impl Decision {
    pub fn is_apply(&self) -> bool {
        matches!(self, Decision::Apply)
    }
}

/// Check a result fetched for `watched` against the slot's current state.
///
/// For by-fingerprint handles the result carries the server's id, which
/// cannot be compared to the local correlation id; the fingerprint check
/// stands in for identity.
pub fn accept(slot: &JobSlot, watched: &JobHandle, result: &PollResult) -> Decision {
    let Some(current) = slot.handle() else {
        return Decision::DropStale;
    };
    if current.id != watched.id {
        return Decision::DropStale;
    }
    if watched.lookup == Lookup::ById && result.job_id != current.id {
        return Decision::DropStale;
    }
    if result.fingerprint != current.fingerprint {
        return Decision::DropFingerprintMismatch;
    }
    if !slot.status().is_polling() {
        return Decision::DropSettled;
    }
    Decision::Apply
}

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod tests;
