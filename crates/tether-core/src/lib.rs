//! Device-side client core for the Tether cloud protocol.
//!
//! Everything a device needs to stay enrolled with the cloud and expose its
//! relays and sensors as protocol channels: the connection/registration
//! lifecycle, keep-alive scheduling, channel actuation with its timing
//! rules, and the dispatch of inbound remote calls.
//!
//! # Architecture
//!
//! The client is a single-threaded cooperative poller. The host calls
//! [`Device::tick`] from its control loop; one tick reconnects if needed,
//! advances the session state machine, counts channel timers down, polls
//! sensors, and pumps the wire engine. Nothing here spawns threads or
//! suspends; the three failure backoffs are bounded synchronous sleeps
//! through the [`env::Clock`] capability.
//!
//! Protocol timing rules live in pure state machines that take the current
//! clock as a parameter and return declarative actions. The [`Device`]
//! context executes those actions against the capability seams, so the same
//! rules run identically under the production collaborators and under the
//! deterministic doubles used in tests.
//!
//! # Components
//!
//! - [`session`]: connection state machine (registration, keep-alive, timeout)
//! - [`channel`]: channel registry and pin bindings
//! - [`actuation`]: relay sequencing, sensor debouncing, timer decay
//! - [`device`]: the device context — poll scheduler and remote-call dispatcher
//! - [`transport`], [`gpio`], [`link`], [`mod@env`]: capability seams
//! - [`error`]: setup-time error taxonomy

pub mod actuation;
pub mod channel;
pub mod device;
pub mod env;
pub mod error;
pub mod gpio;
pub mod link;
pub mod session;
pub mod transport;

#[cfg(test)]
mod testutil;

pub use device::{Device, DeviceConfig};
