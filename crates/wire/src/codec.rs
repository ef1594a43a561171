// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use isk_core::Fingerprint;
use thiserror::Error;

use super::{ClientFrame, ServerFrame};

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Encode a client frame as a text message.
pub fn encode_frame(frame: &ClientFrame) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(frame)?)
}

/// Decode a text message from the server.
pub fn decode_frame(text: &str) -> Result<ServerFrame, ProtocolError> {
    Ok(serde_json::from_str(text)?)
}

/// Value of the `fingerprint` query parameter for lookups by fingerprint.
///
/// Fingerprints are ordered maps, so the encoding is canonical.
pub fn fingerprint_query(fingerprint: &Fingerprint) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(fingerprint)?)
}
