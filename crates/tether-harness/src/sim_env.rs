//! Manually advanced clock.

use std::{cell::Cell, rc::Rc, time::Duration};

use tether_core::env::Clock;

use crate::trace::{Event, EventLog};

/// A clock that only moves when a test advances it.
///
/// Backoff and settle sleeps advance virtual time by the requested amount
/// and are recorded in the shared log, so tests see both that a wait
/// happened and how long it was.
#[derive(Debug, Clone)]
pub struct SimClock {
    now_ms: Rc<Cell<u64>>,
    log: EventLog,
}

impl SimClock {
    /// Creates a clock at t=0 logging into `log`.
    pub fn new(log: EventLog) -> Self {
        Self { now_ms: Rc::new(Cell::new(0)), log }
    }

    /// Moves virtual time forward.
    pub fn advance(&self, ms: u64) {
        self.now_ms.set(self.now_ms.get().wrapping_add(ms));
    }
}

impl Clock for SimClock {
    fn now_millis(&self) -> u64 {
        self.now_ms.get()
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration.as_millis() as u64);
        self.log.push(Event::Sleep { duration });
    }
}
