//! Registration lifecycle integration tests.
//!
//! Tests the full connection state machine against the scripted doubles:
//! - Exactly-once registration per connection
//! - Activity-timeout negotiation
//! - Rejection, version-mismatch, and transport-failure recovery

use std::time::Duration;

use tether_core::{Device, error::ConfigError, gpio::Polarity, session::SessionState};
use tether_harness::{DeviceRig, Event, EventLog, SentCall, SimClock, SimGpio, SimLink, SimTransport};
use tether_proto::{
    ChannelKind, Credentials, DecodeError, DeviceIdentity, RegisterResultCode, ServerAddr,
    ServerMessage, VersionError,
};

#[test]
fn registration_sent_exactly_once_per_connection() {
    let mut rig = DeviceRig::builder().relay(4).build();

    rig.tick();
    rig.tick();
    rig.tick();

    assert_eq!(rig.link.registrations(), 1);
    assert_eq!(rig.device.session().state(), SessionState::Registering);
}

#[test]
fn registration_request_carries_channel_table() {
    let mut rig = DeviceRig::builder().relay(4).sensor(2, false).build();

    rig.tick();

    let sent = rig.link.sent();
    let Some(SentCall::Register(request)) = sent.first() else {
        panic!("expected a registration request, got {sent:?}");
    };
    assert_eq!(request.identity.name, "TETHER");
    assert_eq!(request.credentials.location_id, 42);
    assert_eq!(request.channels.len(), 2);
    assert_eq!(request.channels[0].number, 0);
    assert_eq!(request.channels[0].kind, ChannelKind::Relay);
    assert_eq!(request.channels[1].number, 1);
    assert_eq!(request.channels[1].kind, ChannelKind::BinarySensor);
}

#[test]
fn granted_preferred_timeout_skips_negotiation() {
    let mut rig = DeviceRig::builder().relay(4).build();

    rig.register();

    let negotiations = rig
        .link
        .sent()
        .iter()
        .filter(|call| matches!(call, SentCall::SetActivityTimeout { .. }))
        .count();
    assert_eq!(negotiations, 0);
}

#[test]
fn granted_other_timeout_is_renegotiated() {
    let mut rig = DeviceRig::builder().relay(4).build();

    rig.tick();
    rig.queue_register_result(RegisterResultCode::Success, 40);
    rig.tick();

    assert_eq!(rig.device.session().state(), SessionState::Registered);
    assert_eq!(rig.device.session().activity_timeout_s(), 40);
    assert!(
        rig.link
            .sent()
            .contains(&SentCall::SetActivityTimeout { seconds: 30 })
    );
}

#[test]
fn rejection_backs_off_then_retries_on_next_tick() {
    let mut rig = DeviceRig::builder().relay(4).build();

    rig.tick();
    rig.queue_register_result(RegisterResultCode::BadCredentials, 0);
    rig.tick();

    assert_eq!(rig.transport.disconnects(), 1);
    assert!(!rig.transport.is_up());
    assert_eq!(rig.device.session().state(), SessionState::Disconnected);
    assert!(
        rig.log
            .events()
            .contains(&Event::Sleep { duration: Duration::from_secs(5) })
    );

    // Next tick reconnects and registers afresh.
    rig.tick();
    assert!(rig.transport.is_up());
    assert_eq!(rig.transport.connect_attempts(), 2);
    assert_eq!(rig.link.registrations(), 2);
}

#[test]
fn version_error_forces_disconnect() {
    let mut rig = DeviceRig::builder().relay(4).build();
    rig.register();

    rig.link
        .queue(ServerMessage::VersionError(VersionError { server_version: 7 }));
    rig.tick();

    assert_eq!(rig.transport.disconnects(), 1);
    assert_eq!(rig.device.session().state(), SessionState::Disconnected);
    assert!(
        rig.log
            .events()
            .contains(&Event::Sleep { duration: Duration::from_secs(5) })
    );
}

#[test]
fn connect_failure_backs_off_without_registering() {
    let mut rig = DeviceRig::builder().relay(4).build();
    rig.transport.refuse_next_connects(1);

    rig.tick();

    assert_eq!(rig.link.registrations(), 0);
    assert!(
        rig.log
            .events()
            .contains(&Event::Sleep { duration: Duration::from_secs(2) })
    );

    rig.tick();
    assert_eq!(rig.link.registrations(), 1);
}

#[test]
fn pump_failure_disconnects_with_backoff() {
    let mut rig = DeviceRig::builder().relay(4).build();
    rig.register();

    rig.link.fail_next_pump();
    rig.tick();

    assert_eq!(rig.transport.disconnects(), 1);
    assert!(
        rig.log
            .events()
            .contains(&Event::Sleep { duration: Duration::from_secs(5) })
    );
}

#[test]
fn server_side_drop_resets_session_and_reregisters() {
    let mut rig = DeviceRig::builder().relay(4).build();
    rig.register();

    rig.transport.drop_connection();
    rig.tick();

    assert_eq!(rig.transport.connect_attempts(), 2);
    assert_eq!(rig.link.registrations(), 2);
    assert_eq!(rig.device.session().state(), SessionState::Registering);
}

#[test]
fn channels_cannot_be_added_after_initialize() {
    let mut rig = DeviceRig::builder().relay(4).build();

    let added = rig.device.add_relay(9, Polarity::ActiveHigh);
    assert_eq!(added, Err(ConfigError::AlreadyInitialized));
    assert_eq!(rig.device.channels().len(), 1);
}

#[test]
fn initialize_rejects_invalid_configuration() {
    let log = EventLog::new();
    let transport = SimTransport::new(log.clone());
    let mut device = Device::new(
        transport.clone(),
        SimGpio::new(log.clone()),
        SimLink::new(),
        SimClock::new(log),
    );

    let zero_guid = device.initialize(
        DeviceIdentity::new([0; 16], [0; 6]),
        ServerAddr::new("svr1.example.org"),
        Credentials::new(42, "secret"),
    );
    assert!(matches!(zero_guid, Err(ConfigError::Identity(_))));

    let empty_host = device.initialize(
        DeviceIdentity::new([1; 16], [0; 6]),
        ServerAddr::new(""),
        Credentials::new(42, "secret"),
    );
    assert_eq!(empty_host, Err(ConfigError::EmptyServer));

    let zero_location = device.initialize(
        DeviceIdentity::new([1; 16], [0; 6]),
        ServerAddr::new("svr1.example.org"),
        Credentials::new(0, "secret"),
    );
    assert_eq!(zero_location, Err(ConfigError::InvalidLocation));

    // Still uninitialized, so the tick is a no-op.
    device.tick();
    assert_eq!(transport.connect_attempts(), 0);

    device
        .initialize(
            DeviceIdentity::new([1; 16], [0; 6]),
            ServerAddr::new("svr1.example.org"),
            Credentials::new(42, "secret"),
        )
        .expect("configuration is now valid");
}

#[test]
fn decode_error_does_not_disconnect() {
    let mut rig = DeviceRig::builder().relay(4).build();
    rig.register();

    rig.link.queue_decode_error(DecodeError::UnknownCall(99));
    rig.tick();

    assert_eq!(rig.transport.disconnects(), 0);
    assert_eq!(rig.device.session().state(), SessionState::Registered);
}
