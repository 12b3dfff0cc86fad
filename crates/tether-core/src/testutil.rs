//! Minimal in-crate doubles for unit tests.
//!
//! Integration-grade fakes live in `tether-harness`; these exist so the
//! leaf modules can test against the capability traits without a dependency
//! cycle.

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    time::Duration,
};

use crate::{
    env::Clock,
    gpio::{Gpio, PinLevel},
};

/// Pin map with a write log.
#[derive(Debug, Default)]
pub struct MapGpio {
    levels: HashMap<u8, PinLevel>,
    pub writes: Vec<(u8, PinLevel)>,
}

impl MapGpio {
    pub fn level(&self, pin: u8) -> PinLevel {
        self.levels.get(&pin).copied().unwrap_or(PinLevel::Low)
    }

    /// Drives a pin from outside, as the wired hardware would.
    pub fn set_level(&mut self, pin: u8, level: PinLevel) {
        self.levels.insert(pin, level);
    }
}

impl Gpio for MapGpio {
    fn configure_output(&mut self, _pin: u8) {}

    fn configure_input(&mut self, _pin: u8, _pull_up: bool) {}

    fn read_level(&self, pin: u8) -> PinLevel {
        self.level(pin)
    }

    fn write_level(&mut self, pin: u8, level: PinLevel) {
        self.levels.insert(pin, level);
        self.writes.push((pin, level));
    }
}

/// Clock that only moves when told to; sleeps are recorded, not slept.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: Cell<u64>,
    slept: RefCell<Vec<Duration>>,
}

impl ManualClock {
    pub fn slept(&self) -> Vec<Duration> {
        self.slept.borrow().clone()
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.now_ms.get()
    }

    fn sleep(&self, duration: Duration) {
        self.slept.borrow_mut().push(duration);
    }
}
