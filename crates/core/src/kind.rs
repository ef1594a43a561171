// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Kinds of remote job the tracker knows how to follow.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A long-running backend job the UI kicks off and then waits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobKind {
    /// Check that a repository URL + branch is reachable and indexable
    Validation,
    /// Create a project from a validated repository
    Creation,
    /// Pull new commits and summarize them
    CommitRefresh,
    /// Rebuild the embedding index of a project
    Reindex,
    /// Transcribe and index an uploaded meeting recording
    MeetingProcessing,
    /// Wait for the initial index of a freshly created project
    IndexingStatus,
}

impl JobKind {
    pub const ALL: [JobKind; 6] = [
        JobKind::Validation,
        JobKind::Creation,
        JobKind::CommitRefresh,
        JobKind::Reindex,
        JobKind::MeetingProcessing,
        JobKind::IndexingStatus,
    ];

    /// Path segment used by the job endpoints (`/jobs/{segment}`).
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::Validation => "validation",
            JobKind::Creation => "creation",
            JobKind::CommitRefresh => "commit-refresh",
            JobKind::Reindex => "reindex",
            JobKind::MeetingProcessing => "meeting-processing",
            JobKind::IndexingStatus => "indexing-status",
        }
    }

    /// Fingerprint fields that must be present and non-blank.
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            JobKind::Validation => &["repo_url", "branch"],
            JobKind::Creation
            | JobKind::CommitRefresh
            | JobKind::Reindex
            | JobKind::IndexingStatus => &["project_id"],
            JobKind::MeetingProcessing => &["meeting_id"],
        }
    }

    /// Human label used in notices.
    pub fn label(&self) -> &'static str {
        match self {
            JobKind::Validation => "Repository validation",
            JobKind::Creation => "Project creation",
            JobKind::CommitRefresh => "Commit refresh",
            JobKind::Reindex => "Reindexing",
            JobKind::MeetingProcessing => "Meeting processing",
            JobKind::IndexingStatus => "Indexing",
        }
    }
}

impl std::fmt::Display for JobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown job kind: {0}")]
pub struct UnknownKind(pub String);

impl FromStr for JobKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s || k.as_str().replace('-', "_") == s)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

#[cfg(test)]
#[path = "kind_tests.rs"]
mod tests;
