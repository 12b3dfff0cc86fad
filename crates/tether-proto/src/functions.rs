//! Relay function classification advertised at registration.
//!
//! The function mask tells the server which roles a relay channel may be
//! assigned to. It is declarative only; the device actuates the same way
//! regardless of the function the server picks.

use bitflags::bitflags;

bitflags! {
    /// Functions a relay channel can serve.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
    pub struct RelayFunctions: u32 {
        /// Gateway lock control.
        const GATEWAY_LOCK = 0x0001;
        /// Gate drive.
        const GATE = 0x0002;
        /// Garage door drive.
        const GARAGE_DOOR = 0x0004;
        /// Door lock control.
        const DOOR_LOCK = 0x0008;
        /// Roller shutter drive (requires a dual-pin channel).
        const ROLLER_SHUTTER = 0x0010;
        /// General-purpose power switch.
        const POWER_SWITCH = 0x0020;
        /// Light switch.
        const LIGHT_SWITCH = 0x0040;
    }
}

impl RelayFunctions {
    /// Default function set for a general-purpose single-pin relay.
    pub fn switching() -> Self {
        Self::GATEWAY_LOCK
            | Self::GATE
            | Self::GARAGE_DOOR
            | Self::DOOR_LOCK
            | Self::POWER_SWITCH
            | Self::LIGHT_SWITCH
    }
}
