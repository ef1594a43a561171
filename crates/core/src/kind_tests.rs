// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    validation     = { "validation",         JobKind::Validation },
    creation       = { "creation",           JobKind::Creation },
    commit_refresh = { "commit-refresh",     JobKind::CommitRefresh },
    snake_case     = { "commit_refresh",     JobKind::CommitRefresh },
    reindex        = { "reindex",            JobKind::Reindex },
    meeting        = { "meeting-processing", JobKind::MeetingProcessing },
    indexing       = { "indexing-status",    JobKind::IndexingStatus },
)]
fn parses_path_segments(input: &str, expected: JobKind) {
    assert_eq!(input.parse::<JobKind>().unwrap(), expected);
}

#[test]
fn unknown_kind_is_rejected() {
    let err = "transcode".parse::<JobKind>().unwrap_err();
    assert_eq!(err.to_string(), "unknown job kind: transcode");
}

#[test]
fn serde_matches_path_segment() {
    for kind in JobKind::ALL {
        let json = serde_json::to_string(&kind).unwrap();
        assert_eq!(json, format!("\"{}\"", kind.as_str()));
    }
}

#[test]
fn validation_requires_repo_and_branch() {
    assert_eq!(JobKind::Validation.required_fields(), &["repo_url", "branch"]);
    assert_eq!(JobKind::MeetingProcessing.required_fields(), &["meeting_id"]);
}
