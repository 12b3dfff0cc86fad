//! Rig wiring the doubles to a device under test.

use tether_core::{
    Device, DeviceConfig,
    gpio::{PinLevel, Polarity},
    session::SessionState,
};
use tether_proto::{
    Credentials, DeviceIdentity, RegisterResult, RegisterResultCode, ServerAddr, ServerMessage,
};

use crate::{
    sim_env::SimClock, sim_gpio::SimGpio, sim_link::SimLink, sim_transport::SimTransport,
    trace::EventLog,
};

enum ChannelSpec {
    Relay { pin: u8, polarity: Polarity },
    DualRelay { pin1: u8, pin2: u8, polarity: Polarity },
    Sensor { pin: u8, pull_up: bool },
}

/// Builder for a [`DeviceRig`].
///
/// Declares channels and initial pin levels, then builds an initialized
/// device wired to fresh doubles.
pub struct RigBuilder {
    config: DeviceConfig,
    channels: Vec<ChannelSpec>,
    initial_levels: Vec<(u8, PinLevel)>,
}

impl RigBuilder {
    /// Adds a single-pin relay, active high.
    #[must_use]
    pub fn relay(mut self, pin: u8) -> Self {
        self.channels.push(ChannelSpec::Relay { pin, polarity: Polarity::ActiveHigh });
        self
    }

    /// Adds a dual-pin shutter relay pair, active high.
    #[must_use]
    pub fn dual_relay(mut self, pin1: u8, pin2: u8) -> Self {
        self.channels.push(ChannelSpec::DualRelay { pin1, pin2, polarity: Polarity::ActiveHigh });
        self
    }

    /// Adds a normally-open sensor.
    #[must_use]
    pub fn sensor(mut self, pin: u8, pull_up: bool) -> Self {
        self.channels.push(ChannelSpec::Sensor { pin, pull_up });
        self
    }

    /// Presets a pin level before any channel is created.
    #[must_use]
    pub fn pin_level(mut self, pin: u8, level: PinLevel) -> Self {
        self.initial_levels.push((pin, level));
        self
    }

    /// Overrides the device configuration.
    #[must_use]
    pub fn config(mut self, config: DeviceConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the rig: doubles, channels, and a successfully initialized
    /// device.
    pub fn build(self) -> DeviceRig {
        let log = EventLog::new();
        let clock = SimClock::new(log.clone());
        let gpio = SimGpio::new(log.clone());
        let transport = SimTransport::new(log.clone());
        let link = SimLink::new();

        for (pin, level) in self.initial_levels {
            gpio.set_level(pin, level);
        }

        let mut device = Device::with_config(
            transport.clone(),
            gpio.clone(),
            link.clone(),
            clock.clone(),
            self.config,
        );

        for spec in self.channels {
            let added = match spec {
                ChannelSpec::Relay { pin, polarity } => device.add_relay(pin, polarity),
                ChannelSpec::DualRelay { pin1, pin2, polarity } => {
                    device.add_shutter_relays(pin1, pin2, polarity)
                },
                ChannelSpec::Sensor { pin, pull_up } => device.add_sensor(pin, pull_up),
            };
            added.expect("channel fits under the ceiling");
        }

        device
            .initialize(
                DeviceIdentity::new(*b"rig-device-guid!", [0x02, 0, 0, 0, 0, 0x01]),
                ServerAddr::new("svr1.example.org"),
                Credentials::new(42, "secret"),
            )
            .expect("rig identity is valid");

        DeviceRig { clock, gpio, transport, link, log, device }
    }
}

/// A device under test together with handles to all of its doubles.
pub struct DeviceRig {
    /// Manually advanced clock.
    pub clock: SimClock,
    /// Pin-map GPIO.
    pub gpio: SimGpio,
    /// Scriptable transport.
    pub transport: SimTransport,
    /// Scriptable wire engine.
    pub link: SimLink,
    /// Shared event log.
    pub log: EventLog,
    /// The device under test.
    pub device: Device<SimTransport, SimGpio, SimLink, SimClock>,
}

impl DeviceRig {
    /// Starts a builder.
    pub fn builder() -> RigBuilder {
        RigBuilder {
            config: DeviceConfig::default(),
            channels: Vec::new(),
            initial_levels: Vec::new(),
        }
    }

    /// One scheduler tick.
    pub fn tick(&mut self) {
        self.device.tick();
    }

    /// Moves virtual time forward.
    pub fn advance(&self, ms: u64) {
        self.clock.advance(ms);
    }

    /// Queues a registration result with the given code and grant.
    pub fn queue_register_result(&self, code: RegisterResultCode, activity_timeout_s: u16) {
        self.link.queue(ServerMessage::RegisterResult(RegisterResult {
            code,
            activity_timeout_s,
        }));
    }

    /// Drives the device through connect and a successful registration with
    /// the preferred 30 s activity timeout.
    pub fn register(&mut self) {
        self.tick();
        self.queue_register_result(RegisterResultCode::Success, 30);
        self.tick();
        assert_eq!(self.device.session().state(), SessionState::Registered);
    }
}
