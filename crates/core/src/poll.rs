// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Raw results of a single poll tick or push notification.

use crate::fingerprint::Fingerprint;
use crate::handle::JobId;
use crate::status::RemoteStatus;
use serde::{Deserialize, Serialize};

/// One status observation for a job. Consumed by the reconciler and dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollResult {
    pub job_id: JobId,
    pub fingerprint: Fingerprint,
    pub status: RemoteStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    /// Backend-provided message for `ERROR` results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PollResult {
    pub fn pending(job_id: impl Into<JobId>, fingerprint: Fingerprint) -> Self {
        Self { job_id: job_id.into(), fingerprint, status: RemoteStatus::Pending, payload: None, error: None }
    }

    pub fn completed(
        job_id: impl Into<JobId>,
        fingerprint: Fingerprint,
        payload: Option<serde_json::Value>,
    ) -> Self {
        Self { job_id: job_id.into(), fingerprint, status: RemoteStatus::Completed, payload, error: None }
    }

    pub fn errored(job_id: impl Into<JobId>, fingerprint: Fingerprint, message: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            fingerprint,
            status: RemoteStatus::Error,
            payload: None,
            error: Some(message.into()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Outcome of one status fetch, as seen by the poller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FetchOutcome {
    Found { result: PollResult },
    /// No job record (yet) for the id or fingerprint
    NotFound,
    /// The request failed in transit; retried on the next tick
    TransportError { message: String },
}
