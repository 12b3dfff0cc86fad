//! Wire-engine capability: framed remote calls over the transport.
//!
//! The engine owns framing and serialization, which are out of scope here;
//! the core sees decoded calls and typed send primitives. Payloads that
//! fail to decode still reach the client as [`DecodeError`] values so the
//! traffic counts as liveness and the failure can be logged.

use tether_proto::{DecodeError, RegisterRequest, ServerMessage};
use thiserror::Error;

/// Failures of the wire engine itself, as opposed to individual payloads.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    /// The underlying transport is gone.
    #[error("transport unavailable")]
    Disconnected,
    /// The engine could not frame or flush a call.
    #[error("wire engine failure: {0}")]
    Io(String),
}

/// A decoded inbound call, or the reason it would not decode.
pub type InboundCall = Result<ServerMessage, DecodeError>;

/// Synchronous remote-call engine.
///
/// Pumped once per scheduler tick. `pump` must invoke `on_call` once per
/// complete inbound call, in arrival order, and drain whatever outbound
/// frames are queued. Implementations are plain collaborators: invoked only
/// from within a tick, never re-entered, and they retain no connection or
/// channel state of their own.
pub trait ProtocolLink {
    /// Drives the inbound and outbound queues.
    fn pump(&mut self, on_call: &mut dyn FnMut(InboundCall)) -> Result<(), LinkError>;

    /// Sends the registration request.
    fn send_registration(&mut self, request: &RegisterRequest) -> Result<(), LinkError>;

    /// Sends a keep-alive ping.
    fn send_ping(&mut self) -> Result<(), LinkError>;

    /// Reports a channel's new value.
    fn send_channel_value(&mut self, channel_number: u8, value: u8) -> Result<(), LinkError>;

    /// Asks the server to change the activity timeout, in seconds.
    fn send_activity_timeout(&mut self, seconds: u16) -> Result<(), LinkError>;
}
