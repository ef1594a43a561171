// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use isk_core::Fingerprint;
use serde::{Deserialize, Serialize};

/// Body of the trigger call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerRequest {
    pub fingerprint: Fingerprint,
    /// Kind-specific extras (project description, meeting options, ...)
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub payload: serde_json::Value,
}

impl TriggerRequest {
    pub fn new(fingerprint: Fingerprint, payload: serde_json::Value) -> Self {
        Self { fingerprint, payload }
    }
}
