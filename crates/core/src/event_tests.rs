// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::{repo_fp, validation_handle};

#[test]
fn events_serialize_with_type_tag() {
    let event = Event::SlotReset { slot: SlotId::new("validation") };
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["type"], "slot:reset");
    assert_eq!(json["slot"], "validation");
}

#[test]
fn name_matches_serde_tag() {
    let events = vec![
        Event::Shutdown,
        Event::TimerStart { id: TimerId::new("poll:validation:job-1") },
        Event::SlotStart {
            slot: SlotId::new("validation"),
            kind: JobKind::Validation,
            fingerprint: repo_fp("main"),
            payload: serde_json::Value::Null,
        },
        Event::SlotResume { slot: SlotId::new("validation"), handle: validation_handle("job-1", "main") },
        Event::DispatchFailed {
            slot: SlotId::new("creation"),
            correlation: JobId::new("cor-1"),
            error: DispatchError::NetworkFailure { message: "timeout".into(), ambiguous: true },
        },
        Event::StatusFetched {
            slot: SlotId::new("validation"),
            job: JobId::new("job-1"),
            outcome: FetchOutcome::NotFound,
        },
    ];
    for event in events {
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], event.name());
        let parsed: Event = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, event);
    }
}

#[test]
fn slot_start_payload_defaults_to_null() {
    let json = r#"{"type":"slot:start","slot":"reindex/p-1","kind":"reindex","fingerprint":{"project_id":"p-1"}}"#;
    let event: Event = serde_json::from_str(json).unwrap();
    match event {
        Event::SlotStart { payload, kind, .. } => {
            assert!(payload.is_null());
            assert_eq!(kind, JobKind::Reindex);
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn slot_accessor() {
    assert!(Event::Shutdown.slot().is_none());
    let event = Event::SubscriptionClosed {
        slot: SlotId::new("meeting"),
        job: JobId::new("m-1"),
        reason: "closed".into(),
    };
    assert_eq!(event.slot().map(SlotId::as_str), Some("meeting"));
}
