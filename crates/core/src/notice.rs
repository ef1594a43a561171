// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-visible notices raised on terminal transitions.

use crate::kind::JobKind;
use crate::slot::SlotId;
use crate::status::JobStatus;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Error,
}

crate::simple_display! {
    NoticeLevel {
        Success => "success",
        Error => "error",
    }
}

/// One toast-style notice. Exactly one is raised per terminal transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub slot: SlotId,
    pub kind: JobKind,
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    /// Notice for a terminal status; `None` for non-terminal statuses.
    pub fn for_terminal(slot: &SlotId, kind: JobKind, status: &JobStatus) -> Option<Notice> {
        let label = kind.label();
        let (level, title, message) = match status {
            JobStatus::Succeeded { .. } => (
                NoticeLevel::Success,
                format!("{label} finished"),
                format!("{label} completed successfully."),
            ),
            JobStatus::Failed { reason } => {
                (NoticeLevel::Error, format!("{label} failed"), reason.to_string())
            }
            JobStatus::TimedOut => (
                NoticeLevel::Error,
                format!("{label} timed out"),
                "No result arrived in time. Please try again.".to_string(),
            ),
            JobStatus::Idle | JobStatus::Initializing | JobStatus::Polling { .. } => return None,
        };
        Some(Notice { slot: slot.clone(), kind, level, title, message })
    }
}
