//! Typed payloads of the remote calls exchanged with the cloud.
//!
//! Inbound calls arrive as a [`ServerMessage`] — one variant per call kind,
//! each carrying its own payload type. Outbound calls are plain structs the
//! wire engine serializes. Decoding failures surface as [`DecodeError`] so
//! the client can log them without tearing the connection down.

use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};
use thiserror::Error;

use crate::{Credentials, DeviceIdentity, RelayFunctions};

/// Errors a wire engine reports for an inbound call it could not decode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The frame ended before the payload was complete.
    #[error("inbound call truncated")]
    Truncated,
    /// The call identifier is not part of this protocol revision.
    #[error("unknown call type {0}")]
    UnknownCall(u32),
    /// The payload bytes did not match the call's schema.
    #[error("malformed payload for call type {0}")]
    BadPayload(u32),
}

/// Kind of capability a channel exposes to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum ChannelKind {
    /// Output channel driving one or two relay pins.
    Relay = 1,
    /// Normally-open binary input channel.
    BinarySensor = 2,
}

/// Desired relay position in a set-value call.
///
/// The wire carries 0/1/2: off, first pin energized, second pin energized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum RelayTarget {
    /// Both pins driven to their inactive level.
    Off = 0,
    /// First pin energized.
    Primary = 1,
    /// Second pin energized.
    Secondary = 2,
}

impl RelayTarget {
    /// Wire encoding of this target.
    pub const fn as_wire(self) -> u8 {
        self as u8
    }

    /// Decodes a wire byte; values above 2 are not valid targets.
    pub const fn from_wire(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Off),
            1 => Some(Self::Primary),
            2 => Some(Self::Secondary),
            _ => None,
        }
    }
}

/// Result codes of a registration attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum RegisterResultCode {
    /// Registration accepted; the device is live.
    Success = 1,
    /// The server cannot take registrations right now.
    TemporarilyUnavailable = 2,
    /// Location id/password pair was wrong.
    BadCredentials = 3,
    /// The device is already registered under another location.
    LocationConflict = 4,
    /// A channel number collides with an existing registration.
    ChannelConflict = 5,
    /// The device has been disabled server-side.
    DeviceDisabled = 6,
    /// The location has been disabled server-side.
    LocationDisabled = 7,
    /// The location reached its device quota.
    DeviceLimitExceeded = 8,
    /// The server rejected the GUID.
    GuidError = 9,
}

impl RegisterResultCode {
    /// Whether this code completes registration.
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Payload of a protocol version-mismatch notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionError {
    /// Protocol revision the server insists on.
    pub server_version: u8,
}

/// Payload of a registration result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterResult {
    /// Outcome of the attempt.
    pub code: RegisterResultCode,
    /// Activity timeout granted by the server, in seconds.
    pub activity_timeout_s: u16,
}

/// Payload of a channel set-value command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelNewValue {
    /// Number of the channel being addressed.
    pub channel_number: u8,
    /// Desired relay position.
    pub target: RelayTarget,
    /// Auto-revert duration in milliseconds; 0 leaves the relay latched.
    pub duration_ms: u32,
}

/// Payload of an activity-timeout negotiation result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityTimeoutResult {
    /// Activity timeout now in force, in seconds.
    pub activity_timeout_s: u16,
}

/// A decoded inbound remote call, tagged by kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServerMessage {
    /// The server cannot speak our protocol revision.
    VersionError(VersionError),
    /// Outcome of the registration request.
    RegisterResult(RegisterResult),
    /// Command to actuate a relay channel.
    ChannelSetValue(ChannelNewValue),
    /// Result of an activity-timeout negotiation.
    ActivityTimeoutResult(ActivityTimeoutResult),
}

/// One channel as listed in the registration request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelDescriptor {
    /// Protocol channel number; doubles as the registry index.
    pub number: u8,
    /// Capability the channel exposes.
    pub kind: ChannelKind,
    /// Function mask; empty for sensors.
    pub functions: RelayFunctions,
    /// Value the channel currently reports.
    pub value: u8,
}

/// The registration request a device sends once per connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// Who is registering.
    pub identity: DeviceIdentity,
    /// Proof of location membership.
    pub credentials: Credentials,
    /// The channel table in registration order.
    pub channels: Vec<ChannelDescriptor>,
}
