//! Relay actuation integration tests.
//!
//! Cover break-before-make sequencing, auto-revert, report gating, and the
//! unknown-channel no-op.

use std::time::Duration;

use tether_core::gpio::PinLevel;
use tether_harness::{DeviceRig, Event};
use tether_proto::{ChannelNewValue, RelayTarget, ServerMessage};

fn queue_set_value(rig: &DeviceRig, channel_number: u8, target: RelayTarget, duration_ms: u32) {
    rig.link.queue(ServerMessage::ChannelSetValue(ChannelNewValue {
        channel_number,
        target,
        duration_ms,
    }));
}

#[test]
fn primary_breaks_pin2_before_making_pin1() {
    let mut rig = DeviceRig::builder().dual_relay(4, 5).build();
    rig.register();
    rig.log.clear();

    queue_set_value(&rig, 0, RelayTarget::Primary, 0);
    rig.tick();

    assert_eq!(
        rig.log.events(),
        vec![
            Event::Write { pin: 5, level: PinLevel::Low },
            Event::Sleep { duration: Duration::from_millis(50) },
            Event::Write { pin: 4, level: PinLevel::High },
        ]
    );
    assert_eq!(rig.link.value_reports(), vec![(0, 1)]);
}

#[test]
fn secondary_breaks_pin1_before_making_pin2() {
    let mut rig = DeviceRig::builder().dual_relay(4, 5).build();
    rig.register();
    rig.log.clear();

    queue_set_value(&rig, 0, RelayTarget::Secondary, 0);
    rig.tick();

    assert_eq!(
        rig.log.events(),
        vec![
            Event::Write { pin: 4, level: PinLevel::Low },
            Event::Sleep { duration: Duration::from_millis(50) },
            Event::Write { pin: 5, level: PinLevel::High },
        ]
    );
    assert_eq!(rig.link.value_reports(), vec![(0, 2)]);
}

#[test]
fn auto_revert_after_duration_elapses_across_ticks() {
    let mut rig = DeviceRig::builder().relay(4).build();
    rig.register();

    queue_set_value(&rig, 0, RelayTarget::Primary, 1_000);
    rig.tick();
    assert_eq!(rig.gpio.level(4), PinLevel::High);

    rig.advance(600);
    rig.tick();
    assert_eq!(rig.gpio.level(4), PinLevel::High);

    rig.advance(400);
    rig.tick();
    assert_eq!(rig.gpio.level(4), PinLevel::Low);
    assert_eq!(rig.link.value_reports(), vec![(0, 1), (0, 0)]);
    assert_eq!(rig.device.channels().get(0).map(|ch| ch.value()), Some(0));
}

#[test]
fn auto_revert_arms_for_secondary_too() {
    let mut rig = DeviceRig::builder().dual_relay(4, 5).build();
    rig.register();

    queue_set_value(&rig, 0, RelayTarget::Secondary, 500);
    rig.tick();
    assert_eq!(rig.gpio.level(5), PinLevel::High);

    rig.advance(500);
    rig.tick();
    assert_eq!(rig.gpio.level(5), PinLevel::Low);
    assert_eq!(rig.link.value_reports(), vec![(0, 2), (0, 0)]);
}

#[test]
fn off_then_on_round_trips_reported_values() {
    let mut rig = DeviceRig::builder().relay(4).build();
    rig.register();

    queue_set_value(&rig, 0, RelayTarget::Off, 0);
    rig.tick();
    assert_eq!(rig.device.channels().get(0).map(|ch| ch.value()), Some(0));

    queue_set_value(&rig, 0, RelayTarget::Primary, 0);
    rig.tick();
    assert_eq!(rig.device.channels().get(0).map(|ch| ch.value()), Some(1));

    assert_eq!(rig.link.value_reports(), vec![(0, 0), (0, 1)]);
}

#[test]
fn unknown_channel_number_is_a_no_op() {
    let mut rig = DeviceRig::builder().relay(4).build();
    rig.register();
    rig.log.clear();

    queue_set_value(&rig, 7, RelayTarget::Primary, 0);
    rig.tick();

    assert!(rig.log.events().is_empty());
    assert!(rig.link.value_reports().is_empty());
}

#[test]
fn actuation_before_registration_is_not_reported() {
    let mut rig = DeviceRig::builder().relay(4).build();

    rig.tick();
    queue_set_value(&rig, 0, RelayTarget::Primary, 0);
    rig.tick();

    assert_eq!(rig.gpio.level(4), PinLevel::High);
    assert!(rig.link.value_reports().is_empty());
}
