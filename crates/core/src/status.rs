// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Local job status, remote job status, and failure reasons.

use serde::{Deserialize, Serialize};

/// Status reported by the job status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RemoteStatus {
    Pending,
    Completed,
    Error,
}

impl RemoteStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RemoteStatus::Pending)
    }
}

crate::simple_display! {
    RemoteStatus {
        Pending => "PENDING",
        Completed => "COMPLETED",
        Error => "ERROR",
    }
}

/// Why a slot ended in `Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FailureReason {
    /// The fingerprint lacks fields its job kind requires. Caller error.
    #[error("missing required fields: {}", .missing.join(", "))]
    InvalidFingerprint { missing: Vec<String> },

    /// The trigger endpoint refused to start the job.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// The job could not be reached: either the trigger request provably never
    /// left, or status polling kept failing past its retry budget.
    #[error("network error: {message}")]
    Transport { message: String },

    /// The backend reported that the job failed.
    #[error("{message}")]
    Remote { message: String },

    /// The job record never appeared after it was acknowledged.
    #[error("job record was never found")]
    RecordNotFound,

    /// The trigger response was lost and no job matching the fingerprint
    /// turned up afterwards.
    #[error("could not confirm the job started: {message}")]
    Unconfirmed { message: String },
}

/// Status of a job slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Idle,
    /// Dispatch is in flight; no handle yet
    Initializing,
    /// A handle exists and its status is being watched
    Polling { attempt: u32, started_at_ms: u64 },
    Succeeded {
        #[serde(default)]
        result: serde_json::Value,
    },
    Failed { reason: FailureReason },
    TimedOut,
}

impl JobStatus {
    /// A job is live (dispatching or being watched).
    pub fn is_busy(&self) -> bool {
        matches!(self, JobStatus::Initializing | JobStatus::Polling { .. })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Succeeded { .. } | JobStatus::Failed { .. } | JobStatus::TimedOut)
    }

    pub fn is_polling(&self) -> bool {
        matches!(self, JobStatus::Polling { .. })
    }

    pub fn kind(&self) -> JobStatusKind {
        JobStatusKind::from(self)
    }
}

/// Tag-only variant of [`JobStatus`] (strips associated data).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatusKind {
    Idle,
    Initializing,
    Polling,
    Succeeded,
    Failed,
    TimedOut,
}

impl From<&JobStatus> for JobStatusKind {
    fn from(s: &JobStatus) -> Self {
        match s {
            JobStatus::Idle => JobStatusKind::Idle,
            JobStatus::Initializing => JobStatusKind::Initializing,
            JobStatus::Polling { .. } => JobStatusKind::Polling,
            JobStatus::Succeeded { .. } => JobStatusKind::Succeeded,
            JobStatus::Failed { .. } => JobStatusKind::Failed,
            JobStatus::TimedOut => JobStatusKind::TimedOut,
        }
    }
}

crate::simple_display! {
    JobStatusKind {
        Idle => "idle",
        Initializing => "initializing",
        Polling => "polling",
        Succeeded => "succeeded",
        Failed => "failed",
        TimedOut => "timed_out",
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
