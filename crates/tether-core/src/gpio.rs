//! GPIO capability consumed by the channel registry and actuation engine.

/// Logic level of a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinLevel {
    /// Logic low.
    Low,
    /// Logic high.
    High,
}

/// Electrical orientation of a channel's pins.
///
/// Relay boards wired through inverting drivers energize on a low level;
/// the polarity maps the channel's logical on/off onto the right levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Polarity {
    /// A high level energizes the pin.
    #[default]
    ActiveHigh,
    /// A low level energizes the pin.
    ActiveLow,
}

impl Polarity {
    /// Level that energizes a pin under this polarity.
    pub const fn active(self) -> PinLevel {
        match self {
            Self::ActiveHigh => PinLevel::High,
            Self::ActiveLow => PinLevel::Low,
        }
    }

    /// Level that de-energizes a pin under this polarity.
    pub const fn inactive(self) -> PinLevel {
        match self {
            Self::ActiveHigh => PinLevel::Low,
            Self::ActiveLow => PinLevel::High,
        }
    }
}

/// Physical pin driver.
///
/// Mirrors the pin-level operations of common embedded HALs. The core never
/// caches pin state; it re-reads after every write, so an implementation's
/// `read_level` must reflect the last written level on output pins.
pub trait Gpio {
    /// Configures a pin as a push-pull output.
    fn configure_output(&mut self, pin: u8);

    /// Configures a pin as an input, optionally with the internal pull-up.
    fn configure_input(&mut self, pin: u8, pull_up: bool);

    /// Samples the current level of a pin.
    fn read_level(&self, pin: u8) -> PinLevel;

    /// Drives an output pin to a level.
    fn write_level(&mut self, pin: u8, level: PinLevel);
}
