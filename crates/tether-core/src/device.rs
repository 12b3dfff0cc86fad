//! The device context: setup surface, poll scheduler, remote-call
//! dispatcher.
//!
//! [`Device`] owns the session machine and channel bank and executes the
//! actions they emit against the capability seams. It is the only mutator
//! of that state, and it never re-enters itself: collaborators are called
//! synchronously from within [`Device::tick`] and control always returns to
//! the host's loop. Logging happens here, not in the state machines.

use tracing::{debug, error, info, warn};

use tether_proto::{
    ChannelNewValue, Credentials, DeviceIdentity, RegisterRequest, RegisterResult,
    RegisterResultCode, RelayFunctions, RelayTarget, ServerAddr, ServerMessage,
};

use crate::{
    actuation::{self, TimerExpiry},
    channel::ChannelBank,
    env::Clock,
    error::ConfigError,
    gpio::{Gpio, Polarity},
    link::{InboundCall, ProtocolLink},
    session::{Session, SessionAction, SessionConfig, SessionState},
    transport::Transport,
};

/// Device-level configuration.
#[derive(Debug, Clone, Default)]
pub struct DeviceConfig {
    /// Session timing: preferred activity timeout and backoffs.
    pub session: SessionConfig,
}

/// Registration target fixed by a successful `initialize`.
#[derive(Debug, Clone)]
struct Enrollment {
    identity: DeviceIdentity,
    server: ServerAddr,
    credentials: Credentials,
}

/// The device context object.
///
/// Construct it with the four collaborators, add channels, call
/// [`initialize`], then drive it by calling [`tick`] from the host's
/// control loop.
///
/// [`initialize`]: Device::initialize
/// [`tick`]: Device::tick
pub struct Device<T, G, L, C> {
    transport: T,
    gpio: G,
    link: L,
    clock: C,
    session: Session,
    channels: ChannelBank,
    enrollment: Option<Enrollment>,
    last_tick_ms: Option<u64>,
}

impl<T, G, L, C> Device<T, G, L, C>
where
    T: Transport,
    G: Gpio,
    L: ProtocolLink,
    C: Clock,
{
    /// Creates a device with the default configuration.
    pub fn new(transport: T, gpio: G, link: L, clock: C) -> Self {
        Self::with_config(transport, gpio, link, clock, DeviceConfig::default())
    }

    /// Creates a device with explicit configuration.
    pub fn with_config(transport: T, gpio: G, link: L, clock: C, config: DeviceConfig) -> Self {
        Self {
            transport,
            gpio,
            link,
            clock,
            session: Session::new(config.session),
            channels: ChannelBank::new(),
            enrollment: None,
            last_tick_ms: None,
        }
    }

    /// The session machine, for hosts that surface link status.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The configured channels.
    pub fn channels(&self) -> &ChannelBank {
        &self.channels
    }

    // --- setup surface ----------------------------------------------------

    /// Adds a single-pin relay with the general-purpose function set.
    pub fn add_relay(&mut self, pin: u8, polarity: Polarity) -> Result<usize, ConfigError> {
        self.add_relay_with_functions(Some(pin), None, polarity, RelayFunctions::switching())
    }

    /// Adds a dual-pin relay pair driving a roller shutter.
    pub fn add_shutter_relays(
        &mut self,
        pin1: u8,
        pin2: u8,
        polarity: Polarity,
    ) -> Result<usize, ConfigError> {
        self.add_relay_with_functions(
            Some(pin1),
            Some(pin2),
            polarity,
            RelayFunctions::ROLLER_SHUTTER,
        )
    }

    /// Adds a relay channel with an explicit pin binding and function mask.
    pub fn add_relay_with_functions(
        &mut self,
        pin1: Option<u8>,
        pin2: Option<u8>,
        polarity: Polarity,
        functions: RelayFunctions,
    ) -> Result<usize, ConfigError> {
        let index = self.create_channel(pin1, pin2, polarity)?;
        self.channels.configure_relay(&mut self.gpio, index, functions);
        Ok(index)
    }

    /// Adds a normally-open binary sensor.
    pub fn add_sensor(&mut self, pin: u8, pull_up: bool) -> Result<usize, ConfigError> {
        let index = self.create_channel(Some(pin), None, Polarity::ActiveHigh)?;
        self.channels.configure_sensor(&mut self.gpio, index, pull_up);
        Ok(index)
    }

    fn create_channel(
        &mut self,
        pin1: Option<u8>,
        pin2: Option<u8>,
        polarity: Polarity,
    ) -> Result<usize, ConfigError> {
        if self.enrollment.is_some() {
            warn!("channel rejected: device already initialized");
            return Err(ConfigError::AlreadyInitialized);
        }
        match self.channels.create(&self.gpio, pin1, pin2, polarity) {
            Ok(index) => Ok(index),
            Err(err) => {
                warn!(%err, "channel rejected");
                Err(err)
            },
        }
    }

    /// Fixes the identity, server, and credentials the device registers
    /// with.
    ///
    /// Validation failures are logged and abort the call; the device stays
    /// uninitialized and [`tick`] remains a no-op.
    ///
    /// [`tick`]: Device::tick
    pub fn initialize(
        &mut self,
        identity: DeviceIdentity,
        server: ServerAddr,
        credentials: Credentials,
    ) -> Result<(), ConfigError> {
        if self.enrollment.is_some() {
            warn!("initialize rejected: device already initialized");
            return Err(ConfigError::AlreadyInitialized);
        }
        if let Err(err) = Self::check_enrollment(&identity, &server, &credentials) {
            error!(%err, "initialize rejected");
            return Err(err);
        }

        info!(name = %identity.name, host = %server.host, port = server.port, "device initialized");
        self.enrollment = Some(Enrollment { identity, server, credentials });
        Ok(())
    }

    fn check_enrollment(
        identity: &DeviceIdentity,
        server: &ServerAddr,
        credentials: &Credentials,
    ) -> Result<(), ConfigError> {
        identity.validate()?;
        if server.host.is_empty() {
            return Err(ConfigError::EmptyServer);
        }
        if credentials.location_id == 0 {
            return Err(ConfigError::InvalidLocation);
        }
        Ok(())
    }

    // --- scheduler --------------------------------------------------------

    /// Advances the device by one cooperative tick.
    ///
    /// In order: reconnect if the transport is down, advance the session
    /// machine, count channel timers down and poll sensors, pump the wire
    /// engine. The failure paths sleep their fixed backoff through the
    /// [`Clock`] and return; the next tick retries.
    pub fn tick(&mut self) {
        if self.enrollment.is_none() {
            return;
        }

        if !self.transport.is_connected() {
            debug!("transport down");
            self.session.reset();
            if !self.reconnect() {
                return;
            }
        }

        let now = self.clock.now_millis();
        if let Some(action) = self.session.transport_connected(now) {
            self.execute(action);
        }
        if let Some(action) = self.session.poll(now) {
            self.execute(action);
        }

        if let Some(last) = self.last_tick_ms {
            self.advance_channels(now.wrapping_sub(last));
        }
        self.last_tick_ms = Some(self.clock.now_millis());

        self.pump();
    }

    fn reconnect(&mut self) -> bool {
        let Some((host, port)) = self
            .enrollment
            .as_ref()
            .map(|e| (e.server.host.clone(), e.server.port))
        else {
            return false;
        };

        if self.transport.connect(&host, port) {
            return true;
        }
        warn!(%host, port, "connect failed");
        self.clock.sleep(self.session.connect_backoff());
        false
    }

    /// Timer decay and sensor polling over every registered channel.
    fn advance_channels(&mut self, elapsed_ms: u64) {
        for number in 0..self.channels.len() as u8 {
            let expiry = self
                .channels
                .get_mut(number)
                .and_then(|ch| actuation::decay_timer(ch, elapsed_ms));
            if expiry == Some(TimerExpiry::RevertRelay) {
                self.apply_relay(number, RelayTarget::Off, 0);
            }

            let report = self
                .channels
                .get_mut(number)
                .and_then(|ch| actuation::poll_sensor(ch, &self.gpio));
            if let Some(value) = report {
                self.report_value(number, value);
            }
        }
    }

    /// Actuates a relay and reports the new value when registered.
    fn apply_relay(&mut self, number: u8, target: RelayTarget, duration_ms: u32) {
        let Some(ch) = self.channels.get_mut(number) else { return };
        let success = actuation::set_relay(ch, &mut self.gpio, &self.clock, target, duration_ms);
        if success {
            self.report_value(number, target.as_wire());
        } else {
            debug!(channel = number, ?target, "relay readback mismatch, not reported");
        }
    }

    /// Sends a value-changed report if the session allows it.
    fn report_value(&mut self, number: u8, value: u8) {
        if self.session.state() != SessionState::Registered {
            return;
        }
        if let Err(err) = self.link.send_channel_value(number, value) {
            warn!(%err, channel = number, "value report failed");
        }
    }

    fn pump(&mut self) {
        let mut inbound: Vec<InboundCall> = Vec::new();
        let result = self.link.pump(&mut |call| inbound.push(call));

        for call in inbound {
            self.dispatch(call);
        }

        if let Err(err) = result {
            warn!(%err, "pump failed");
            self.transport.disconnect();
            self.clock.sleep(self.session.fatal_backoff());
        }
    }

    // --- dispatcher -------------------------------------------------------

    /// Routes one decoded inbound call.
    ///
    /// Any traffic counts as liveness: the silence clock and the pending
    /// ping reset before routing, whatever the call decodes to.
    fn dispatch(&mut self, call: InboundCall) {
        let now = self.clock.now_millis();
        self.session.activity(now);

        let message = match call {
            Ok(message) => message,
            Err(err) => {
                warn!(%err, "inbound call ignored");
                return;
            },
        };

        match message {
            ServerMessage::VersionError(payload) => {
                error!(server_version = payload.server_version, "protocol version rejected");
                let action = self.session.version_error();
                self.execute(action);
            },
            ServerMessage::RegisterResult(result) => self.on_register_result(&result),
            ServerMessage::ChannelSetValue(command) => self.on_set_value(&command),
            ServerMessage::ActivityTimeoutResult(payload) => {
                debug!(seconds = payload.activity_timeout_s, "activity timeout negotiated");
                self.session.timeout_negotiated(payload.activity_timeout_s);
            },
        }
    }

    fn on_register_result(&mut self, result: &RegisterResult) {
        if self.session.state() != SessionState::Registering {
            warn!(code = ?result.code, "registration result outside handshake ignored");
            return;
        }

        match result.code {
            RegisterResultCode::Success => {
                info!(activity_timeout_s = result.activity_timeout_s, "registered and ready");
            },
            RegisterResultCode::BadCredentials => error!("registration rejected: bad credentials"),
            RegisterResultCode::TemporarilyUnavailable => {
                warn!("registration rejected: temporarily unavailable");
            },
            RegisterResultCode::LocationConflict => {
                error!("registration rejected: location conflict");
            },
            RegisterResultCode::ChannelConflict => error!("registration rejected: channel conflict"),
            RegisterResultCode::DeviceDisabled => warn!("registration rejected: device disabled"),
            RegisterResultCode::LocationDisabled => {
                warn!("registration rejected: location disabled");
            },
            RegisterResultCode::DeviceLimitExceeded => {
                warn!("registration rejected: device limit exceeded");
            },
            RegisterResultCode::GuidError => warn!("registration rejected: GUID error"),
        }

        if let Some(action) = self.session.register_result(result) {
            self.execute(action);
        }
    }

    fn on_set_value(&mut self, command: &ChannelNewValue) {
        if self.channels.get(command.channel_number).is_none() {
            debug!(channel = command.channel_number, "set-value for unknown channel ignored");
            return;
        }
        self.apply_relay(command.channel_number, command.target, command.duration_ms);
    }

    fn execute(&mut self, action: SessionAction) {
        match action {
            SessionAction::Register => {
                let Some(enrollment) = &self.enrollment else { return };
                let request = RegisterRequest {
                    identity: enrollment.identity.clone(),
                    credentials: enrollment.credentials.clone(),
                    channels: self.channels.descriptors(),
                };
                info!(channels = request.channels.len(), "registering");
                if let Err(err) = self.link.send_registration(&request) {
                    warn!(%err, "registration send failed");
                }
            },
            SessionAction::Ping => {
                if let Err(err) = self.link.send_ping() {
                    warn!(%err, "ping send failed");
                }
            },
            SessionAction::RequestActivityTimeout(seconds) => {
                if let Err(err) = self.link.send_activity_timeout(seconds) {
                    warn!(%err, "activity timeout request failed");
                }
            },
            SessionAction::Drop { backoff } => {
                self.transport.disconnect();
                if !backoff.is_zero() {
                    self.clock.sleep(backoff);
                }
            },
        }
    }
}
