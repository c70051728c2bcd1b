//! Time sources for animation.

use std::time::Instant;

/// Monotonic seconds since some fixed start.
pub trait Clock {
    fn elapsed_secs(&self) -> f64;
}

/// Wall clock backed by [`Instant`], started on construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

/// Clock driven by hand, for tests and deterministic capture.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ManualClock {
    now: f64,
}

impl ManualClock {
    pub fn new(now: f64) -> Self {
        Self { now }
    }

    /// Jump to `secs`. Values earlier than the current time are ignored.
    pub fn set(&mut self, secs: f64) {
        self.now = self.now.max(secs);
    }

    pub fn advance(&mut self, secs: f64) {
        self.now += secs.max(0.0);
    }
}

impl Clock for ManualClock {
    fn elapsed_secs(&self) -> f64 {
        self.now
    }
}
