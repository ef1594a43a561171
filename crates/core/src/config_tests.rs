// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    millis  = { "500ms", Duration::from_millis(500) },
    bare    = { "30",    Duration::from_secs(30) },
    seconds = { "2s",    Duration::from_secs(2) },
    minutes = { "4m",    Duration::from_secs(240) },
    hours   = { "1h",    Duration::from_secs(3600) },
    spaced  = { " 15 m", Duration::from_secs(900) },
)]
fn parse_duration_valid(input: &str, expected: Duration) {
    assert_eq!(parse_duration(input).unwrap(), expected);
}

#[yare::parameterized(
    invalid_suffix = { "30x" },
    empty_string   = { "" },
    invalid_number = { "abcs" },
    mul_overflow   = { "5124095576030432h" },
    u64_max_secs   = { "18446744073709551615s" },
    over_max_hours = { "8761h" },
    over_max_ms    = { "31536000001ms" },
)]
fn parse_duration_invalid(input: &str) {
    assert!(parse_duration(input).is_err());
}

#[test]
fn defaults_apply_per_kind() {
    let config = TrackerConfig::default();
    let validation = config.kind(JobKind::Validation);
    assert_eq!(validation.interval, Duration::from_secs(2));
    assert_eq!(validation.timeout, Duration::from_secs(240));
    assert_eq!(validation.grace, Duration::from_secs(1));

    let reindex = config.kind(JobKind::Reindex);
    assert_eq!(reindex.interval, Duration::from_secs(15));
    assert_eq!(reindex.timeout, Duration::from_secs(900));

    assert_eq!(config.kind(JobKind::MeetingProcessing).transport, WatchTransport::Subscribe);
}

#[test]
fn toml_overrides_only_named_fields() {
    let config = TrackerConfig::from_toml_str(
        r#"
        [backend]
        base_url = "https://insight.example.com/api/"
        request_timeout = "10s"
        auth_token = "tok"

        [kinds.validation]
        timeout = "5s"
        missing_record_timeout = "5s"

        [kinds.commit_refresh]
        transport = "subscribe"
        "#,
    )
    .unwrap();

    assert_eq!(config.backend.base_url, "https://insight.example.com/api");
    assert_eq!(config.backend.request_timeout, Duration::from_secs(10));
    assert_eq!(config.backend.auth_token.as_deref(), Some("tok"));

    let validation = config.kind(JobKind::Validation);
    assert_eq!(validation.timeout, Duration::from_secs(5));
    assert_eq!(validation.interval, Duration::from_secs(2));
    assert_eq!(validation.missing_record_timeout, Some(Duration::from_secs(5)));

    assert_eq!(config.kind(JobKind::CommitRefresh).transport, WatchTransport::Subscribe);
    assert_eq!(config.kind(JobKind::Creation), KindConfig::defaults_for(JobKind::Creation));
}

#[test]
fn unknown_kind_is_an_error() {
    let err = TrackerConfig::from_toml_str("[kinds.transcode]\ninterval = \"1s\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::UnknownKind(_)), "got {err:?}");
}

#[test]
fn bad_duration_names_the_field() {
    let err = TrackerConfig::from_toml_str("[kinds.reindex]\ninterval = \"soon\"\n").unwrap_err();
    assert!(err.to_string().contains("kinds.reindex.interval"), "got {err}");
}

#[test]
fn max_duration_is_accepted() {
    assert_eq!(parse_duration("8760h").unwrap(), MAX_DURATION);
}

#[test]
fn huge_timeout_is_rejected_at_load() {
    let err = TrackerConfig::from_toml_str("[kinds.validation]\ntimeout = \"18446744073709551615s\"\n")
        .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidDuration { ref field, .. } if field == "kinds.validation.timeout"));
}

#[test]
fn zero_interval_is_rejected() {
    let err = TrackerConfig::from_toml_str("[kinds.reindex]\ninterval = \"0s\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { .. }), "got {err:?}");
}

#[test]
fn unknown_fields_are_rejected() {
    assert!(TrackerConfig::from_toml_str("[backend]\nbase = \"x\"\n").is_err());
}

#[test]
fn load_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tracker.toml");
    std::fs::write(&path, "[kinds.creation]\ngrace = \"250ms\"\n").unwrap();

    let config = TrackerConfig::load(&path).unwrap();
    assert_eq!(config.kind(JobKind::Creation).grace, Duration::from_millis(250));

    let missing = TrackerConfig::load(&dir.path().join("nope.toml")).unwrap_err();
    assert!(matches!(missing, ConfigError::Io { .. }));
}

#[test]
fn setters_chain() {
    let config = KindConfig::defaults_for(JobKind::Validation)
        .interval(Duration::from_millis(100))
        .missing_record_timeout(Duration::from_secs(5));
    assert_eq!(config.interval, Duration::from_millis(100));
    assert_eq!(config.missing_record_timeout, Some(Duration::from_secs(5)));
}
