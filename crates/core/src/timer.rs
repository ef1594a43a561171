// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timer identifiers for poll ticks and watch timeouts.
//!
//! Every timer belongs to one (slot, job) pair, so a timer that fires after
//! its job was superseded can be recognised as stale from its id alone.

use crate::handle::JobId;
use crate::slot::SlotId;

crate::define_id! {
    /// Unique identifier for a scheduled timer.
    pub struct TimerId("tmr-");
}

impl TimerId {
    /// Next poll tick for a job.
    pub fn poll(slot: &SlotId, job: &JobId) -> Self {
        TimerKind::Poll { slot: &encode_slot(slot), job: job.as_str() }.to_timer_id()
    }

    /// Overall timeout for watching a job.
    pub fn timeout(slot: &SlotId, job: &JobId) -> Self {
        TimerKind::Timeout { slot: &encode_slot(slot), job: job.as_str() }.to_timer_id()
    }

    /// Parse this timer ID into a typed `TimerKind`.
    pub fn kind(&self) -> Option<TimerKind<'_>> {
        TimerKind::parse(self.as_str())
    }
}

/// Parsed representation of a timer ID for type-safe routing.
///
/// `slot` is the encoded segment as it appears in the id; use
/// [`TimerKind::slot`] for the decoded `SlotId`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerKind<'a> {
    Poll { slot: &'a str, job: &'a str },
    Timeout { slot: &'a str, job: &'a str },
}

impl<'a> TimerKind<'a> {
    /// Parse a timer ID string. Returns `None` for unrecognized formats.
    ///
    /// The slot segment is encoded and never contains `:`. The job id is
    /// everything after the second separator, since server-issued ids are opaque.
    pub fn parse(id: &'a str) -> Option<TimerKind<'a>> {
        if let Some(rest) = id.strip_prefix("poll:") {
            let (slot, job) = split_owner(rest)?;
            return Some(TimerKind::Poll { slot, job });
        }
        if let Some(rest) = id.strip_prefix("timeout:") {
            let (slot, job) = split_owner(rest)?;
            return Some(TimerKind::Timeout { slot, job });
        }
        None
    }

    pub fn to_timer_id(&self) -> TimerId {
        match self {
            TimerKind::Poll { slot, job } => TimerId::new(format!("poll:{slot}:{job}")),
            TimerKind::Timeout { slot, job } => TimerId::new(format!("timeout:{slot}:{job}")),
        }
    }

    pub fn slot(&self) -> SlotId {
        match self {
            TimerKind::Poll { slot, .. } | TimerKind::Timeout { slot, .. } => {
                SlotId::new(decode_slot(slot))
            }
        }
    }

    pub fn job(&self) -> JobId {
        match self {
            TimerKind::Poll { job, .. } | TimerKind::Timeout { job, .. } => JobId::new(*job),
        }
    }
}

/// Escape `%` and `:` in a slot id so it fits a single timer id segment.
fn encode_slot(slot: &SlotId) -> String {
    slot.as_str().replace('%', "%25").replace(':', "%3A")
}

fn decode_slot(segment: &str) -> String {
    segment.replace("%3A", ":").replace("%25", "%")
}

fn split_owner(rest: &str) -> Option<(&str, &str)> {
    let (slot, job) = rest.split_once(':')?;
    if slot.is_empty() || job.is_empty() {
        return None;
    }
    Some((slot, job))
}

#[cfg(test)]
#[path = "timer_tests.rs"]
mod tests;
