//! Time sources for the scheduler
//!
//! The scheduler reads time in milliseconds from a [`Clock`]. Hosts use
//! [`SystemClock`]; deterministic hosts and tests drive a [`ManualClock`].

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;

/// A monotonically non-decreasing time source, in milliseconds
pub trait Clock: Send {
    fn now_ms(&self) -> f64;
}

/// Wall clock measured from the moment it was created
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same time, so a host can keep one handle and give
/// another to the scheduler.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Arc<Mutex<f64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clock starting at `ms`
    pub fn starting_at(ms: f64) -> Self {
        Self {
            now: Arc::new(Mutex::new(ms)),
        }
    }

    /// Move the clock forward by `ms` (negative deltas are ignored)
    pub fn advance(&self, ms: f64) {
        *self.now.lock() += ms.max(0.0);
    }

    /// Jump to `ms`, never moving backwards
    pub fn set(&self, ms: f64) {
        let mut now = self.now.lock();
        *now = now.max(ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        *self.now.lock()
    }
}
