// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::handle::JobId;
use crate::kind::JobKind;
use crate::slot::{JobSlot, SlotId};
use crate::test_support::{polling_slot, repo_fp, validation_handle};

#[test]
fn current_job_pending_result_applies() {
    let slot = polling_slot("job-1", "main");
    let watched = validation_handle("job-1", "main");
    let result = PollResult::pending("job-1", repo_fp("main"));
    assert_eq!(accept(&slot, &watched, &result), Decision::Apply);
}

#[test]
fn late_result_for_superseded_job_is_stale() {
    // Slot moved on to job-2 (branch changed); job-1's result arrives late.
    let slot = polling_slot("job-2", "feature");
    let watched = validation_handle("job-1", "main");
    let result = PollResult::completed("job-1", repo_fp("main"), None);
    assert_eq!(accept(&slot, &watched, &result), Decision::DropStale);
}

#[test]
fn result_for_other_job_id_is_stale() {
    let slot = polling_slot("job-1", "main");
    let watched = validation_handle("job-1", "main");
    let result = PollResult::completed("job-9", repo_fp("main"), None);
    assert_eq!(accept(&slot, &watched, &result), Decision::DropStale);
}

#[test]
fn fingerprint_mismatch_is_dropped() {
    let slot = polling_slot("job-1", "main");
    let watched = validation_handle("job-1", "main");
    let result = PollResult::completed("job-1", repo_fp("feature"), None);
    assert_eq!(accept(&slot, &watched, &result), Decision::DropFingerprintMismatch);
}

#[test]
fn idle_slot_drops_everything() {
    let slot = JobSlot::new(SlotId::for_kind(JobKind::Validation), JobKind::Validation);
    let watched = validation_handle("job-1", "main");
    let result = PollResult::completed("job-1", repo_fp("main"), None);
    assert_eq!(accept(&slot, &watched, &result), Decision::DropStale);
}

#[test]
fn settled_slot_drops_second_terminal_result() {
    let mut slot = polling_slot("job-1", "main");
    let watched = validation_handle("job-1", "main");
    slot.apply_poll(PollResult::completed("job-1", repo_fp("main"), None), 2_000_000);
    let result = PollResult::errored("job-1", repo_fp("main"), "late");
    assert_eq!(accept(&slot, &watched, &result), Decision::DropSettled);
}

#[test]
fn by_fingerprint_watch_accepts_server_id() {
    let mut slot = JobSlot::new(SlotId::for_kind(JobKind::Validation), JobKind::Validation);
    let watched = JobHandle::by_fingerprint(JobId::new("cor-1"), JobKind::Validation, repo_fp("main"), 0);
    slot.resume(watched.clone(), 0);

    let result = PollResult::completed("srv-77", repo_fp("main"), None);
    assert_eq!(accept(&slot, &watched, &result), Decision::Apply);

    let other = PollResult::completed("srv-77", repo_fp("dev"), None);
    assert_eq!(accept(&slot, &watched, &other), Decision::DropFingerprintMismatch);
}

#[test]
fn decision_display() {
    assert_eq!(Decision::DropStale.to_string(), "drop_stale");
    assert!(Decision::Apply.is_apply());
    assert!(!Decision::DropSettled.is_apply());
}
