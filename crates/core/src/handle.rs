// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job handles: the immutable identity of one remote job.

use crate::fingerprint::Fingerprint;
use crate::kind::JobKind;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Identifier of a remote job.
    ///
    /// Either the id issued by the server when the job was triggered, or a
    /// locally generated `cor-` correlation id when the server did not issue
    /// one (or the trigger response was lost).
    pub struct JobId("cor-");
}

/// How the status of a job is looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lookup {
    /// `GET /jobs/{kind}/{id}`
    ById,
    /// `GET /jobs/{kind}?fingerprint=...`, used when the trigger outcome is
    /// unknown and only the fingerprint identifies the job.
    ByFingerprint,
}

crate::simple_display! {
    Lookup {
        ById => "by_id",
        ByFingerprint => "by_fingerprint",
    }
}

/// One remote job.
///
/// Never mutated: when inputs change, a new handle supersedes this one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobHandle {
    pub id: JobId,
    pub kind: JobKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    pub created_at_ms: u64,
    pub fingerprint: Fingerprint,
    pub lookup: Lookup,
}

impl JobHandle {
    /// Handle for a job the server acknowledged.
    pub fn by_id(id: JobId, kind: JobKind, fingerprint: Fingerprint, created_at_ms: u64) -> Self {
        Self { id, kind, auth_token: None, created_at_ms, fingerprint, lookup: Lookup::ById }
    }

    /// Handle for a job whose trigger outcome is unknown.
    ///
    /// `correlation` is the local id the dispatch was started under; the
    /// remote id is unknown, so status is looked up by fingerprint.
    pub fn by_fingerprint(
        correlation: JobId,
        kind: JobKind,
        fingerprint: Fingerprint,
        created_at_ms: u64,
    ) -> Self {
        Self {
            id: correlation,
            kind,
            auth_token: None,
            created_at_ms,
            fingerprint,
            lookup: Lookup::ByFingerprint,
        }
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn is_by_fingerprint(&self) -> bool {
        self.lookup == Lookup::ByFingerprint
    }
}

#[cfg(test)]
#[path = "handle_tests.rs"]
mod tests;
