// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP client for the job endpoints.
//!
//! - `POST {base}/jobs/{kind}` triggers a job
//! - `GET {base}/jobs/{kind}/{id}` fetches a job by id
//! - `GET {base}/jobs/{kind}?fingerprint={json}` fetches the job matching a fingerprint

use super::{BackendError, JobBackend};
use async_trait::async_trait;
use isk_core::{BackendConfig, JobHandle, JobKind, Lookup};
use isk_wire::{fingerprint_query, ErrorBody, StatusResponse, TriggerRequest, TriggerResponse};
use reqwest::{RequestBuilder, Response, StatusCode, Url};

#[derive(Clone, Debug)]
pub struct HttpBackend {
    client: reqwest::Client,
    base: Url,
    auth_token: Option<String>,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let base = Url::parse(&config.base_url)
            .map_err(|e| BackendError::Config(format!("base_url {}: {e}", config.base_url)))?;
        if base.cannot_be_a_base() {
            return Err(BackendError::Config(format!("base_url {} cannot be a base", config.base_url)));
        }
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| BackendError::Config(e.to_string()))?;
        Ok(Self { client, base, auth_token: config.auth_token.clone() })
    }

    fn jobs_url(&self, kind: JobKind, job: Option<&str>) -> Result<Url, BackendError> {
        let mut url = self.base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| BackendError::Config(format!("base_url {} cannot be a base", self.base)))?;
            segments.pop_if_empty().push("jobs").push(kind.as_str());
            if let Some(job) = job {
                segments.push(job);
            }
        }
        Ok(url)
    }

    /// Per-job token wins over the configured one.
    fn authorize(&self, request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        match token.or(self.auth_token.as_deref()) {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl JobBackend for HttpBackend {
    async fn trigger(&self, kind: JobKind, request: &TriggerRequest) -> Result<TriggerResponse, BackendError> {
        let url = self.jobs_url(kind, None)?;
        tracing::debug!(%kind, %url, "triggering job");
        let response = self
            .authorize(self.client.post(url).json(request), None)
            .send()
            .await
            .map_err(classify)?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        let body = response.bytes().await.map_err(|e| BackendError::Ambiguous(e.to_string()))?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(TriggerResponse::default());
        }
        serde_json::from_slice(&body).map_err(|e| BackendError::Decode(e.to_string()))
    }

    async fn fetch_status(&self, handle: &JobHandle) -> Result<Option<StatusResponse>, BackendError> {
        let request = match handle.lookup {
            Lookup::ById => self.client.get(self.jobs_url(handle.kind, Some(handle.id.as_str()))?),
            Lookup::ByFingerprint => {
                let fingerprint = fingerprint_query(&handle.fingerprint)
                    .map_err(|e| BackendError::Config(e.to_string()))?;
                self.client.get(self.jobs_url(handle.kind, None)?).query(&[("fingerprint", fingerprint)])
            }
        };
        let response = self
            .authorize(request, handle.auth_token.as_deref())
            .send()
            .await
            .map_err(classify)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        let body = response.bytes().await.map_err(|e| BackendError::Ambiguous(e.to_string()))?;
        serde_json::from_slice::<Option<StatusResponse>>(&body)
            .map_err(|e| BackendError::Decode(e.to_string()))
    }
}

/// Connect failures mean the request never left; anything later is ambiguous.
fn classify(err: reqwest::Error) -> BackendError {
    if err.is_connect() || err.is_builder() {
        BackendError::Unsent(err.to_string())
    } else {
        BackendError::Ambiguous(err.to_string())
    }
}

async fn status_error(response: Response) -> BackendError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(ErrorBody::text)
        .or_else(|| {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| isk_core::short(trimmed, 200).to_string())
        })
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());
    match status {
        // The gateway gave up waiting; the upstream may have accepted the job.
        StatusCode::BAD_GATEWAY | StatusCode::GATEWAY_TIMEOUT => {
            BackendError::Ambiguous(format!("{}: {message}", status.as_u16()))
        }
        _ => BackendError::Status { status: status.as_u16(), message },
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
