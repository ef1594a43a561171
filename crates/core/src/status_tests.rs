// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::strategies::arb_job_status;
use proptest::prelude::*;

fn failed_status() -> JobStatus {
    JobStatus::Failed { reason: FailureReason::Remote { message: "boom".into() } }
}

#[yare::parameterized(
    idle         = { JobStatus::Idle,                                            false, false },
    initializing = { JobStatus::Initializing,                                    true,  false },
    polling      = { JobStatus::Polling { attempt: 2, started_at_ms: 0 },        true,  false },
    succeeded    = { JobStatus::Succeeded { result: serde_json::Value::Null },   false, true },
    failed       = { failed_status(),                                             false, true },
    timed_out    = { JobStatus::TimedOut,                                        false, true },
)]
fn busy_and_terminal_flags(status: JobStatus, busy: bool, terminal: bool) {
    assert_eq!(status.is_busy(), busy);
    assert_eq!(status.is_terminal(), terminal);
}

#[yare::parameterized(
    pending   = { "\"PENDING\"",   RemoteStatus::Pending,   false },
    completed = { "\"COMPLETED\"", RemoteStatus::Completed, true },
    error     = { "\"ERROR\"",     RemoteStatus::Error,     true },
)]
fn remote_status_wire_names(json: &str, expected: RemoteStatus, terminal: bool) {
    let parsed: RemoteStatus = serde_json::from_str(json).unwrap();
    assert_eq!(parsed, expected);
    assert_eq!(parsed.is_terminal(), terminal);
}

#[test]
fn failure_reason_messages() {
    let missing = FailureReason::InvalidFingerprint { missing: vec!["repo_url".into(), "branch".into()] };
    assert_eq!(missing.to_string(), "missing required fields: repo_url, branch");
    assert_eq!(
        FailureReason::Transport { message: "connection refused".into() }.to_string(),
        "network error: connection refused"
    );
    assert_eq!(FailureReason::RecordNotFound.to_string(), "job record was never found");
}

#[test]
fn status_json_is_tagged() {
    let json = serde_json::to_value(JobStatus::Polling { attempt: 1, started_at_ms: 5 }).unwrap();
    assert_eq!(json["status"], "polling");
    assert_eq!(json["attempt"], 1);
}

proptest! {
    #[test]
    fn busy_and_terminal_are_exclusive(status in arb_job_status()) {
        prop_assert!(!(status.is_busy() && status.is_terminal()));
        let idle = status.kind() == JobStatusKind::Idle;
        prop_assert_eq!(idle, !status.is_busy() && !status.is_terminal());
    }
}
