use std::cell::Cell;

use chrono::{Duration, Utc};

use crate::types::Timestamp;

/// Source of snapshot timestamps.
///
/// Only the ordering of returned values matters to the kernel; a clock that
/// occasionally goes backwards is tolerated but produces out-of-order inserts.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Wall clock backed by `chrono::Utc::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

/// A clock that only moves when told to.
///
/// Used by tests and the demo to get deterministic, well-separated capture
/// times without sleeping.
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<Timestamp>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    /// Start at the Unix epoch.
    pub fn at_epoch() -> Self {
        Self::new(Timestamp::UNIX_EPOCH)
    }

    pub fn set(&self, at: Timestamp) {
        self.now.set(at);
    }

    /// Move forward by `by` and return the new time.
    pub fn advance(&self, by: Duration) -> Timestamp {
        let next = self.now.get() + by;
        self.now.set(next);
        next
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.get()
    }
}
