// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use isk_core::{Fingerprint, JobHandle, JobId, PollResult, RemoteStatus};
use serde::{Deserialize, Serialize};

/// Answer to a trigger call.
///
/// Both fields are optional: some endpoints start the job without issuing
/// an id, in which case the job is tracked under its correlation id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerResponse {
    #[serde(default, alias = "id", skip_serializing_if = "Option::is_none")]
    pub job_id: Option<JobId>,
    #[serde(default, alias = "token", skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
}

/// Status record for one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(default, alias = "id", skip_serializing_if = "Option::is_none")]
    pub job_id: Option<JobId>,
    pub status: RemoteStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<Fingerprint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StatusResponse {
    /// Convert into a poll result for the job `handle` was watching.
    ///
    /// Records that omit the id or fingerprint inherit them from the handle
    /// the request was made for.
    pub fn into_poll_result(self, handle: &JobHandle) -> PollResult {
        PollResult {
            job_id: self.job_id.unwrap_or_else(|| handle.id.clone()),
            fingerprint: self.fingerprint.unwrap_or_else(|| handle.fingerprint.clone()),
            status: self.status,
            payload: self.result,
            error: self.error,
        }
    }
}

/// Error body returned with non-2xx responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    /// Best human-readable text in the body.
    pub fn text(self) -> Option<String> {
        self.message.or(self.error).filter(|s| !s.trim().is_empty())
    }
}
