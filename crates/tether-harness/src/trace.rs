//! Ordered log of observable side effects.
//!
//! All doubles push into one shared log, so tests can assert cross-double
//! ordering — a relay's break write, the settle sleep, then the make write.

use std::{cell::RefCell, rc::Rc, time::Duration};

use tether_core::gpio::PinLevel;

/// One observable side effect of the device under test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A GPIO pin was driven.
    Write {
        /// Pin that was driven.
        pin: u8,
        /// Level it was driven to.
        level: PinLevel,
    },
    /// The device slept: a settle delay or a backoff.
    Sleep {
        /// Requested duration.
        duration: Duration,
    },
    /// The transport was asked to connect.
    Connect,
    /// The transport was torn down.
    Disconnect,
}

/// Order-preserving event log shared by all doubles.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<Event>>>,
}

impl EventLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event.
    pub fn push(&self, event: Event) {
        self.events.borrow_mut().push(event);
    }

    /// Snapshot of everything logged so far.
    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    /// Forgets everything logged so far.
    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}
