// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job backend: the trigger and status endpoints.

mod http;

use async_trait::async_trait;
use isk_core::{JobHandle, JobKind};
use isk_wire::{StatusResponse, TriggerRequest, TriggerResponse};
use thiserror::Error;

pub use http::HttpBackend;

/// Errors from backend calls.
///
/// The split between `Unsent` and `Ambiguous` decides whether a failed
/// trigger can be retried safely or must be confirmed by fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The request provably never reached the server (connect refused, DNS).
    #[error("request not sent: {0}")]
    Unsent(String),

    /// The request may have reached the server but no usable answer came back.
    #[error("no response: {0}")]
    Ambiguous(String),

    /// The server answered with a non-success status.
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The server answered but the body could not be decoded.
    #[error("invalid response body: {0}")]
    Decode(String),

    #[error("invalid backend configuration: {0}")]
    Config(String),
}

/// Adapter for the job endpoints
#[async_trait]
pub trait JobBackend: Clone + Send + Sync + 'static {
    /// Start a job. Called exactly once per dispatch.
    async fn trigger(&self, kind: JobKind, request: &TriggerRequest) -> Result<TriggerResponse, BackendError>;

    /// Fetch the current status for a handle, by id or by fingerprint
    /// depending on its lookup mode. `Ok(None)` when no record exists.
    async fn fetch_status(&self, handle: &JobHandle) -> Result<Option<StatusResponse>, BackendError>;
}

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{BackendCall, FakeBackend};
