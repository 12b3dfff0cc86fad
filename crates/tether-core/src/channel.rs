//! Channel registry: protocol-visible channels and their pin bindings.
//!
//! Channels are created once during setup and then frozen: number, kind,
//! pins, and function mask never change after creation. Numbers are dense
//! and assigned in creation order, so the registry index doubles as the
//! protocol channel number.

use tether_proto::{ChannelDescriptor, ChannelKind, MAX_CHANNELS, RelayFunctions};

use crate::{
    error::ConfigError,
    gpio::{Gpio, PinLevel, Polarity},
};

/// One protocol-visible channel and its physical binding.
///
/// Only the reported value, the pending timer, and the cached sensor level
/// change after configuration.
#[derive(Debug, Clone)]
pub struct Channel {
    pub(crate) number: u8,
    pub(crate) kind: ChannelKind,
    pub(crate) functions: RelayFunctions,
    pub(crate) value: u8,
    pub(crate) pin1: Option<u8>,
    pub(crate) pin2: Option<u8>,
    pub(crate) polarity: Polarity,
    /// Milliseconds left on the pending timer; 0 when idle.
    pub(crate) timer_ms: u32,
    /// Last raw level a sensor observed; `None` forces a fresh comparison.
    pub(crate) last_level: Option<PinLevel>,
}

impl Channel {
    /// Protocol channel number.
    pub fn number(&self) -> u8 {
        self.number
    }

    /// Capability the channel exposes.
    pub fn kind(&self) -> ChannelKind {
        self.kind
    }

    /// Value the channel currently reports.
    pub fn value(&self) -> u8 {
        self.value
    }

    fn descriptor(&self) -> ChannelDescriptor {
        ChannelDescriptor {
            number: self.number,
            kind: self.kind,
            functions: self.functions,
            value: self.value,
        }
    }
}

/// Ordered set of configured channels.
#[derive(Debug, Default)]
pub struct ChannelBank {
    channels: Vec<Channel>,
}

impl ChannelBank {
    /// Creates an empty bank.
    pub fn new() -> Self {
        Self { channels: Vec::new() }
    }

    /// Number of configured channels.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Whether no channel has been configured yet.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Channel by number, if registered.
    pub fn get(&self, number: u8) -> Option<&Channel> {
        self.channels.get(usize::from(number))
    }

    pub(crate) fn get_mut(&mut self, number: u8) -> Option<&mut Channel> {
        self.channels.get_mut(usize::from(number))
    }

    /// The channel table as sent in the registration request.
    pub fn descriptors(&self) -> Vec<ChannelDescriptor> {
        self.channels.iter().map(Channel::descriptor).collect()
    }

    /// Creates an unconfigured channel bound to the given pins.
    ///
    /// Captures the current pin1 level as the sensor baseline. Fails once
    /// [`MAX_CHANNELS`] channels exist.
    pub fn create<G: Gpio>(
        &mut self,
        gpio: &G,
        pin1: Option<u8>,
        pin2: Option<u8>,
        polarity: Polarity,
    ) -> Result<usize, ConfigError> {
        if self.channels.len() >= MAX_CHANNELS {
            return Err(ConfigError::ChannelLimitExceeded { max: MAX_CHANNELS });
        }

        let number = self.channels.len() as u8;
        let last_level = pin1.map(|pin| gpio.read_level(pin));
        self.channels.push(Channel {
            number,
            kind: ChannelKind::Relay,
            functions: RelayFunctions::empty(),
            value: 0,
            pin1,
            pin2,
            polarity,
            timer_ms: 0,
            last_level,
        });

        Ok(usize::from(number))
    }

    /// Configures a channel as a relay and forces its pins inactive.
    ///
    /// Seeds the reported value from readback: 1 if pin1 reads active, else
    /// 2 if pin2 reads active, else 0.
    pub fn configure_relay<G: Gpio>(&mut self, gpio: &mut G, index: usize, functions: RelayFunctions) {
        let Some(ch) = self.channels.get_mut(index) else { return };
        ch.kind = ChannelKind::Relay;
        ch.functions = functions;

        let active = ch.polarity.active();
        let inactive = ch.polarity.inactive();

        if let Some(pin) = ch.pin1 {
            gpio.configure_output(pin);
            gpio.write_level(pin, inactive);
            ch.value = u8::from(gpio.read_level(pin) == active);
        }
        if let Some(pin) = ch.pin2 {
            gpio.configure_output(pin);
            gpio.write_level(pin, inactive);
            if ch.value == 0 && gpio.read_level(pin) == active {
                ch.value = 2;
            }
        }
    }

    /// Configures a channel as a normally-open sensor on pin1.
    pub fn configure_sensor<G: Gpio>(&mut self, gpio: &mut G, index: usize, pull_up: bool) {
        let Some(ch) = self.channels.get_mut(index) else { return };
        ch.kind = ChannelKind::BinarySensor;
        ch.functions = RelayFunctions::empty();

        if let Some(pin) = ch.pin1 {
            gpio.configure_input(pin, pull_up);
            ch.value = u8::from(gpio.read_level(pin) == PinLevel::High);
        }
    }
}
