//! Pin-map GPIO double.

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use tether_core::gpio::{Gpio, PinLevel};

use crate::trace::{Event, EventLog};

#[derive(Debug, Default)]
struct GpioState {
    levels: HashMap<u8, PinLevel>,
    pull_ups: HashMap<u8, bool>,
}

/// GPIO double backed by a pin map.
///
/// Writes stick, so readback always reflects the last driven level, and
/// every write lands in the shared log. Tests drive sensor pins from the
/// outside with [`SimGpio::set_level`].
#[derive(Debug, Clone)]
pub struct SimGpio {
    inner: Rc<RefCell<GpioState>>,
    log: EventLog,
}

impl SimGpio {
    /// Creates a GPIO double with all pins low, logging into `log`.
    pub fn new(log: EventLog) -> Self {
        Self { inner: Rc::new(RefCell::new(GpioState::default())), log }
    }

    /// Drives a pin from outside, as the wired hardware would.
    pub fn set_level(&self, pin: u8, level: PinLevel) {
        self.inner.borrow_mut().levels.insert(pin, level);
    }

    /// Current level of a pin; unknown pins read low.
    pub fn level(&self, pin: u8) -> PinLevel {
        self.inner.borrow().levels.get(&pin).copied().unwrap_or(PinLevel::Low)
    }

    /// Pull-up setting recorded for an input pin, if it was configured.
    pub fn pull_up(&self, pin: u8) -> Option<bool> {
        self.inner.borrow().pull_ups.get(&pin).copied()
    }
}

impl Gpio for SimGpio {
    fn configure_output(&mut self, _pin: u8) {}

    fn configure_input(&mut self, pin: u8, pull_up: bool) {
        self.inner.borrow_mut().pull_ups.insert(pin, pull_up);
    }

    fn read_level(&self, pin: u8) -> PinLevel {
        self.level(pin)
    }

    fn write_level(&mut self, pin: u8, level: PinLevel) {
        self.inner.borrow_mut().levels.insert(pin, level);
        self.log.push(Event::Write { pin, level });
    }
}
