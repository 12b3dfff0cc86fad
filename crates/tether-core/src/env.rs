//! Clock capability.
//!
//! Time is supplied by the host so the timing rules stay testable:
//! production uses [`SystemClock`], tests a manually advanced fake.

use std::{
    thread,
    time::{Duration, Instant},
};

/// Millisecond clock plus bounded synchronous waits.
///
/// `now_millis` only has to be monotonic modulo wrap; every consumer uses
/// wrapping subtraction, so a clock that rolls over keeps working. `sleep`
/// is the primitive behind the client's fixed backoffs and the relay settle
/// delay; it must block the calling thread.
pub trait Clock {
    /// Milliseconds of an arbitrary-epoch monotonic clock.
    fn now_millis(&self) -> u64;

    /// Blocks the calling thread for the given duration.
    fn sleep(&self, duration: Duration);
}

/// Monotonic process clock backed by [`Instant`] and [`thread::sleep`].
#[derive(Debug, Clone)]
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    /// Creates a clock whose epoch is the moment of construction.
    pub fn new() -> Self {
        Self { epoch: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}
