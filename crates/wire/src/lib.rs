// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON bodies exchanged with the job backend.
//!
//! - `POST {base}/jobs/{kind}` takes a [`TriggerRequest`] and answers with a
//!   [`TriggerResponse`].
//! - `GET {base}/jobs/{kind}/{id}` and `GET {base}/jobs/{kind}?fingerprint=`
//!   answer with a [`StatusResponse`].
//! - The push channel exchanges [`ClientFrame`] and [`ServerFrame`] text
//!   messages.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod codec;
mod push;
mod request;
mod response;

pub use codec::{decode_frame, encode_frame, fingerprint_query, ProtocolError};
pub use push::{ClientFrame, ServerFrame};
pub use request::TriggerRequest;
pub use response::{ErrorBody, StatusResponse, TriggerResponse};

#[cfg(test)]
#[path = "wire_tests.rs"]
mod tests;
