// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ID generation abstractions

use crate::handle::JobId;

/// Returns a string slice truncated to at most `n` characters.
pub fn short(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

/// Source of locally generated correlation ids.
///
/// A correlation id names a job before (or instead of) the server-issued id,
/// so dispatch responses can be matched to the `start()` that caused them.
pub trait IdGen: Send + Sync + 'static {
    fn correlation_id(&self) -> JobId;
}

/// Random `cor-` prefixed ids.
#[derive(Clone, Copy, Debug, Default)]
pub struct NanoIdGen;

impl IdGen for NanoIdGen {
    fn correlation_id(&self) -> JobId {
        JobId::generate()
    }
}

#[cfg(any(test, feature = "test-support"))]
mod sequential {
    use super::IdGen;
    use crate::handle::JobId;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Deterministic `cor-1`, `cor-2`, ... ids for tests.
    #[derive(Debug, Default)]
    pub struct SequentialIdGen {
        next: AtomicU64,
    }

    impl SequentialIdGen {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl IdGen for SequentialIdGen {
        fn correlation_id(&self) -> JobId {
            let n = self.next.fetch_add(1, Ordering::Relaxed) + 1;
            JobId::new(format!("{}{}", JobId::PREFIX, n))
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use sequential::SequentialIdGen;

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
