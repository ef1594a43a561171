// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{BackendError, JobBackend};
use async_trait::async_trait;
use isk_core::{Fingerprint, JobHandle, JobId, JobKind, Lookup, RemoteStatus};
use isk_wire::{StatusResponse, TriggerRequest, TriggerResponse};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// Recorded backend call
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    Trigger { kind: JobKind, fingerprint: Fingerprint, payload: serde_json::Value },
    Fetch { job: JobId, lookup: Lookup },
}

type FetchReply = Result<Option<StatusResponse>, BackendError>;

#[derive(Default)]
struct FakeBackendState {
    triggers: VecDeque<Result<TriggerResponse, BackendError>>,
    replies: HashMap<JobId, VecDeque<FetchReply>>,
    calls: Vec<BackendCall>,
}

/// Fake job backend for testing.
///
/// Unscripted triggers answer with `job-N` ids; unscripted fetches answer
/// `PENDING`. Scripted fetch replies are keyed by handle id (the
/// correlation id for by-fingerprint handles) and consumed in order.
#[derive(Clone, Default)]
pub struct FakeBackend {
    inner: Arc<Mutex<FakeBackendState>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the outcome of the next trigger call
    pub fn push_trigger(&self, result: Result<TriggerResponse, BackendError>) {
        self.inner.lock().triggers.push_back(result);
    }

    /// Script the next fetch reply for `job`
    pub fn push_reply(&self, job: &str, reply: FetchReply) {
        self.inner.lock().replies.entry(JobId::new(job)).or_default().push_back(reply);
    }

    /// Script a status record for `job`
    pub fn push_status(&self, job: &str, status: RemoteStatus, result: Option<serde_json::Value>) {
        self.push_reply(
            job,
            Ok(Some(StatusResponse { job_id: None, status, fingerprint: None, result, error: None })),
        );
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.inner.lock().calls.clone()
    }

    pub fn trigger_count(&self) -> usize {
        self.inner.lock().calls.iter().filter(|c| matches!(c, BackendCall::Trigger { .. })).count()
    }

    pub fn fetch_count(&self) -> usize {
        self.inner.lock().calls.iter().filter(|c| matches!(c, BackendCall::Fetch { .. })).count()
    }
}

#[async_trait]
impl JobBackend for FakeBackend {
    async fn trigger(&self, kind: JobKind, request: &TriggerRequest) -> Result<TriggerResponse, BackendError> {
        let mut inner = self.inner.lock();
        inner.calls.push(BackendCall::Trigger {
            kind,
            fingerprint: request.fingerprint.clone(),
            payload: request.payload.clone(),
        });
        let n = inner.calls.iter().filter(|c| matches!(c, BackendCall::Trigger { .. })).count();
        inner.triggers.pop_front().unwrap_or_else(|| {
            Ok(TriggerResponse { job_id: Some(JobId::new(format!("job-{n}"))), auth_token: None })
        })
    }

    async fn fetch_status(&self, handle: &JobHandle) -> Result<Option<StatusResponse>, BackendError> {
        let mut inner = self.inner.lock();
        inner.calls.push(BackendCall::Fetch { job: handle.id.clone(), lookup: handle.lookup });
        inner.replies.get_mut(&handle.id).and_then(VecDeque::pop_front).unwrap_or_else(|| {
            Ok(Some(StatusResponse {
                job_id: None,
                status: RemoteStatus::Pending,
                fingerprint: None,
                result: None,
                error: None,
            }))
        })
    }
}
