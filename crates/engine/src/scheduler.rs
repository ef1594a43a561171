// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timer scheduler driven by an injected clock

use isk_core::{Event, TimerId};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Deadlines are capped this far past `now`.
const MAX_DELAY: Duration = Duration::from_secs(100 * 365 * 24 * 3600);

/// Pending timers keyed by id. Setting an existing id replaces its deadline.
#[derive(Debug, Default)]
pub struct Scheduler {
    timers: HashMap<String, Instant>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_timer(&mut self, id: String, duration: Duration, now: Instant) {
        let deadline = now.checked_add(duration.min(MAX_DELAY)).unwrap_or(now);
        self.timers.insert(id, deadline);
    }

    pub fn cancel_timer(&mut self, id: &str) {
        self.timers.remove(id);
    }

    /// Remove and return every timer due at `now`, earliest first.
    pub fn fired_timers(&mut self, now: Instant) -> Vec<Event> {
        let mut due: Vec<(Instant, String)> = self
            .timers
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(id, deadline)| (*deadline, id.clone()))
            .collect();
        due.sort();
        due.into_iter()
            .map(|(_, id)| {
                self.timers.remove(&id);
                Event::TimerStart { id: TimerId::new(id) }
            })
            .collect()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.values().min().copied()
    }

    pub fn has_timers(&self) -> bool {
        !self.timers.is_empty()
    }

    pub fn has_timer(&self, id: &str) -> bool {
        self.timers.contains_key(id)
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
