// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::validation_handle;

#[test]
fn dispatch_fields_include_fingerprint() {
    let effect = Effect::Dispatch {
        slot: SlotId::new("validation"),
        kind: JobKind::Validation,
        correlation: JobId::new("cor-1"),
        fingerprint: Fingerprint::repository("u", "main"),
        payload: serde_json::Value::Null,
    };
    assert_eq!(effect.name(), "dispatch");
    assert_eq!(
        effect.fields(),
        vec![
            ("slot", "validation".to_string()),
            ("kind", "validation".to_string()),
            ("correlation", "cor-1".to_string()),
            ("fingerprint", "branch=main,repo_url=u".to_string()),
        ]
    );
}

#[test]
fn watch_fields_name_lookup_mode() {
    let effect = Effect::Watch { slot: SlotId::new("validation"), handle: validation_handle("job-1", "main") };
    let fields = effect.fields();
    assert!(fields.contains(&("lookup", "by_id".to_string())));
}

#[yare::parameterized(
    set_timer    = { Effect::SetTimer { id: TimerId::new("poll:a:b"), duration: Duration::from_secs(1) }, false },
    cancel_timer = { Effect::CancelTimer { id: TimerId::new("poll:a:b") },                               false },
    unwatch      = { Effect::Unwatch { slot: SlotId::new("a"), job: JobId::new("b") },                   true },
)]
fn verbose_flags(effect: Effect, expected: bool) {
    assert_eq!(effect.verbose(), expected);
}
