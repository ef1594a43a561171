// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dispatch-time errors.

use crate::status::FailureReason;
use serde::{Deserialize, Serialize};

/// Why starting a job failed.
///
/// Kept distinct from in-flight failures: a dispatch error means the
/// trigger call itself did not produce a handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DispatchError {
    /// Required fingerprint fields are missing. No request was made.
    #[error("invalid fingerprint: missing {}", .missing.join(", "))]
    InvalidFingerprint { missing: Vec<String> },

    /// The trigger request failed in transit.
    ///
    /// `ambiguous` is set when the request may have reached the server
    /// (timeout, connection reset mid-response, gateway timeout), so the job
    /// may exist even though no response arrived.
    #[error("network failure: {message}")]
    NetworkFailure { message: String, ambiguous: bool },

    /// The server answered and refused to start the job.
    #[error("server rejected job ({status}): {message}")]
    ServerRejected { status: u16, message: String },
}

impl DispatchError {
    /// True when the caller must confirm by fingerprint instead of failing.
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, DispatchError::NetworkFailure { ambiguous: true, .. })
    }

    /// Terminal failure reason for an unambiguous dispatch error.
    pub fn to_failure(&self) -> FailureReason {
        match self {
            DispatchError::InvalidFingerprint { missing } => {
                FailureReason::InvalidFingerprint { missing: missing.clone() }
            }
            DispatchError::NetworkFailure { message, ambiguous: false } => {
                FailureReason::Transport { message: message.clone() }
            }
            DispatchError::NetworkFailure { message, ambiguous: true } => {
                FailureReason::Unconfirmed { message: message.clone() }
            }
            DispatchError::ServerRejected { status, message } => {
                FailureReason::Rejected { status: *status, message: message.clone() }
            }
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
