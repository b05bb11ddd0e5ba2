//! Time source for deadline evaluation
//!
//! The engine never reads the wall clock directly; it goes through
//! [`TimeSource`] so tests can drive time explicitly. The clock is consulted
//! only when a deadline is assigned at creation and for the read-side
//! `remaining_time` value. It does not gate contributions or withdrawals.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Supplier of monotonically non-decreasing wall-clock time
pub trait TimeSource: Send + Sync {
    /// Current time in unix seconds
    fn now_unix(&self) -> u64;
}

/// System wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now_unix(&self) -> u64 {
        // Negative unix time does not occur on a sane host clock
        chrono::Utc::now().timestamp().max(0) as u64
    }
}

/// Manually driven clock for tests
///
/// Only moves forward; `advance` keeps the monotonicity contract.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    /// Create a clock fixed at `now` unix seconds
    pub fn at(now: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(now)),
        }
    }

    /// Advance the clock by `seconds`
    pub fn advance(&self, seconds: u64) {
        self.now.fetch_add(seconds, Ordering::SeqCst);
    }
}

impl TimeSource for ManualClock {
    fn now_unix(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
