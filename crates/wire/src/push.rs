// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use isk_core::{JobId, JobKind};
use serde::{Deserialize, Serialize};

use super::StatusResponse;

/// Frames sent by the client on the push channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    Subscribe {
        job_id: JobId,
        kind: JobKind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token: Option<String>,
    },
    Unsubscribe { job_id: JobId },
}

/// Frames sent by the server on the push channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    /// Subscription acknowledged
    Subscribed { job_id: JobId },

    /// A status change for a subscribed job
    Status {
        #[serde(flatten)]
        status: StatusResponse,
    },

    /// The server refused or dropped the subscription
    Error { message: String },
}
