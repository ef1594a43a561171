// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dispatcher: turns a start request into exactly one trigger call.

use isk_adapters::{BackendError, JobBackend};
use isk_core::{Clock, DispatchError, Fingerprint, JobHandle, JobId, JobKind};
use isk_wire::TriggerRequest;

#[derive(Clone)]
pub struct Dispatcher<B, C> {
    backend: B,
    clock: C,
}

impl<B: JobBackend, C: Clock> Dispatcher<B, C> {
    pub fn new(backend: B, clock: C) -> Self {
        Self { backend, clock }
    }

    /// Start a job and return its handle.
    ///
    /// An invalid fingerprint fails without a network call. Otherwise the
    /// backend is called exactly once. When the server issues no id, the job
    /// is tracked by fingerprint under `correlation`.
    pub async fn start(
        &self,
        kind: JobKind,
        fingerprint: &Fingerprint,
        payload: serde_json::Value,
        correlation: JobId,
    ) -> Result<JobHandle, DispatchError> {
        let missing = fingerprint.missing_fields(kind);
        if !missing.is_empty() {
            return Err(DispatchError::InvalidFingerprint { missing });
        }

        let request = TriggerRequest::new(fingerprint.clone(), payload);
        let response = self.backend.trigger(kind, &request).await.map_err(|e| {
            let err = to_dispatch_error(e);
            tracing::warn!(%kind, %correlation, ambiguous = err.is_ambiguous(), error = %err, "trigger failed");
            err
        })?;

        let now_ms = self.clock.epoch_ms();
        let mut handle = match response.job_id.filter(|id| !id.is_empty()) {
            Some(id) => JobHandle::by_id(id, kind, fingerprint.clone(), now_ms),
            None => JobHandle::by_fingerprint(correlation.clone(), kind, fingerprint.clone(), now_ms),
        };
        if let Some(token) = response.auth_token {
            handle = handle.with_auth_token(token);
        }
        tracing::info!(%kind, %correlation, job = %handle.id, lookup = %handle.lookup, "job dispatched");
        Ok(handle)
    }
}

/// Map a backend failure onto the dispatch error taxonomy.
pub(crate) fn to_dispatch_error(err: BackendError) -> DispatchError {
    match err {
        BackendError::Unsent(message) | BackendError::Config(message) => {
            DispatchError::NetworkFailure { message, ambiguous: false }
        }
        // A 2xx with an unreadable body still means the job was accepted.
        BackendError::Ambiguous(message) | BackendError::Decode(message) => {
            DispatchError::NetworkFailure { message, ambiguous: true }
        }
        BackendError::Status { status, message } => DispatchError::ServerRejected { status, message },
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
