// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn factory_methods_format() {
    let slot = SlotId::new("validation");
    let job = JobId::new("job-1");
    assert_eq!(TimerId::poll(&slot, &job).as_str(), "poll:validation:job-1");
    assert_eq!(TimerId::timeout(&slot, &job).as_str(), "timeout:validation:job-1");
}

#[test]
fn job_ids_may_contain_separators() {
    let slot = SlotId::new("reindex/p-1");
    let job = JobId::new("urn:job:9");
    let id = TimerId::poll(&slot, &job);
    let kind = id.kind().unwrap();
    assert_eq!(kind, TimerKind::Poll { slot: "reindex/p-1", job: "urn:job:9" });
    assert_eq!(kind.slot(), slot);
    assert_eq!(kind.job(), job);
}

#[yare::parameterized(
    colon   = { "project:42" },
    percent = { "reindex/50%" },
    both    = { "a%3A:b" },
)]
fn slot_ids_with_separators_route_back(raw: &str) {
    let slot = SlotId::new(raw);
    let job = JobId::new("urn:job:9");

    for id in [TimerId::poll(&slot, &job), TimerId::timeout(&slot, &job)] {
        let kind = id.kind().unwrap();
        assert_eq!(kind.slot(), slot);
        assert_eq!(kind.job(), job);
        assert_eq!(kind.to_timer_id(), id);
    }
}

#[yare::parameterized(
    unknown_prefix = { "cron:nightly" },
    missing_job    = { "poll:validation" },
    empty_slot     = { "timeout::job-1" },
    empty_job      = { "timeout:validation:" },
)]
fn unrecognized_ids_parse_to_none(id: &str) {
    assert!(TimerKind::parse(id).is_none());
}

#[test]
fn parse_roundtrips_through_to_timer_id() {
    for raw in ["poll:creation:cor-1", "timeout:meeting-processing:m-77"] {
        let kind = TimerKind::parse(raw).unwrap();
        assert_eq!(kind.to_timer_id().as_str(), raw);
    }
}
