//! Sensor debounce and hold-off tests.

use tether_core::gpio::PinLevel;
use tether_harness::DeviceRig;

#[test]
fn transition_reports_once_inside_holdoff() {
    let mut rig = DeviceRig::builder().sensor(2, true).build();
    rig.register();

    rig.gpio.set_level(2, PinLevel::High);
    rig.tick();
    assert_eq!(rig.link.value_reports(), vec![(0, 1)]);

    // Flapping inside the 500 ms window is absorbed.
    rig.gpio.set_level(2, PinLevel::Low);
    rig.tick();
    rig.gpio.set_level(2, PinLevel::High);
    rig.tick();
    assert_eq!(rig.link.value_reports(), vec![(0, 1)]);
}

#[test]
fn eligible_to_report_again_after_holdoff_elapses() {
    let mut rig = DeviceRig::builder().sensor(2, false).build();
    rig.register();

    rig.gpio.set_level(2, PinLevel::High);
    rig.tick();
    assert_eq!(rig.link.value_reports(), vec![(0, 1)]);

    rig.advance(499);
    rig.tick();
    assert_eq!(rig.link.value_reports(), vec![(0, 1)]);

    // Expiry invalidates the cached level; the next poll latches afresh.
    rig.advance(1);
    rig.tick();
    assert_eq!(rig.link.value_reports(), vec![(0, 1), (0, 1)]);
}

#[test]
fn reversion_during_holdoff_surfaces_after_expiry() {
    let mut rig = DeviceRig::builder().sensor(2, false).build();
    rig.register();

    rig.gpio.set_level(2, PinLevel::High);
    rig.tick();

    rig.gpio.set_level(2, PinLevel::Low);
    rig.tick();
    assert_eq!(rig.link.value_reports(), vec![(0, 1)]);

    rig.advance(500);
    rig.tick();
    assert_eq!(rig.link.value_reports(), vec![(0, 1), (0, 0)]);
}

#[test]
fn pull_up_is_configured_on_the_sensor_pin() {
    let rig = DeviceRig::builder().sensor(2, true).build();
    assert_eq!(rig.gpio.pull_up(2), Some(true));

    let rig = DeviceRig::builder().sensor(3, false).build();
    assert_eq!(rig.gpio.pull_up(3), Some(false));
}

#[test]
fn level_high_at_startup_seeds_value_without_a_report() {
    let mut rig = DeviceRig::builder()
        .pin_level(2, PinLevel::High)
        .sensor(2, false)
        .build();

    assert_eq!(rig.device.channels().get(0).map(|ch| ch.value()), Some(1));

    rig.register();
    rig.tick();
    assert!(rig.link.value_reports().is_empty());
}
