//! Typed protocol surface for the Tether device-cloud protocol.
//!
//! This crate defines the shapes a device exchanges with the cloud: its
//! identity and credentials, the channel table it registers, and the decoded
//! payloads of inbound remote calls. Framing and byte-level serialization are
//! the job of a wire engine implementation behind `tether-core`'s
//! `ProtocolLink` seam; this crate only defines what those engines produce
//! and consume, so the client logic never touches raw bytes.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod functions;
pub mod identity;
pub mod messages;

pub use functions::RelayFunctions;
pub use identity::{Credentials, DeviceIdentity, IdentityError, ServerAddr};
pub use messages::{
    ActivityTimeoutResult, ChannelDescriptor, ChannelKind, ChannelNewValue, DecodeError,
    RegisterRequest, RegisterResult, RegisterResultCode, RelayTarget, ServerMessage, VersionError,
};

/// Protocol revision spoken by this client.
pub const PROTOCOL_VERSION: u8 = 5;

/// Default TCP port of the cloud endpoint.
pub const DEFAULT_PORT: u16 = 2015;

/// Size of a device GUID in bytes.
pub const GUID_SIZE: usize = 16;

/// Size of a hardware (MAC) address in bytes.
pub const MAC_SIZE: usize = 6;

/// Ceiling on the number of channels a single device may register.
pub const MAX_CHANNELS: usize = 32;

/// Activity timeout, in seconds, the device asks the server to honor.
pub const PREFERRED_ACTIVITY_TIMEOUT_S: u16 = 30;
