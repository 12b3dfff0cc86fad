//! Deterministic test harness for the Tether device client.
//!
//! Shared-handle doubles for every capability seam, plus a rig that wires
//! them to a device under test. The client is single-threaded and
//! synchronous, so determinism needs no simulated runtime: the clock only
//! moves when a test advances it, and every observable side effect lands in
//! one ordered [`EventLog`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod rig;
pub mod sim_env;
pub mod sim_gpio;
pub mod sim_link;
pub mod sim_transport;
pub mod trace;

pub use rig::{DeviceRig, RigBuilder};
pub use sim_env::SimClock;
pub use sim_gpio::SimGpio;
pub use sim_link::{SentCall, SimLink};
pub use sim_transport::SimTransport;
pub use trace::{Event, EventLog};
