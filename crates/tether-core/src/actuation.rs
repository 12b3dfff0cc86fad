//! Channel actuation: relay sequencing, sensor debouncing, timer decay.
//!
//! The engine is a set of pure-ish functions over one [`Channel`] and the
//! GPIO/clock capabilities; the scheduler decides when they run and what to
//! do with the values they ask to report.

use std::time::Duration;

use tether_proto::{ChannelKind, RelayTarget};

use crate::{
    channel::Channel,
    env::Clock,
    gpio::{Gpio, PinLevel},
};

/// Settle delay between de-energizing one relay pin and energizing the
/// other. Dual-pin channels drive a single actuator; the break side must
/// open before the make side closes.
pub const RELAY_SETTLE: Duration = Duration::from_millis(50);

/// Hold-off after a reported sensor transition, in milliseconds.
pub const SENSOR_HOLDOFF_MS: u32 = 500;

/// What a channel's expired timer asks the scheduler to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerExpiry {
    /// Force the relay back to off.
    RevertRelay,
    /// Hold-off over; the sensor compares afresh on the next poll.
    RearmSensor,
}

/// Drives a relay channel to `target`.
///
/// Break-before-make: when energizing one pin of a dual-pin channel, the
/// opposite pin is driven inactive first and given [`RELAY_SETTLE`] to
/// open. Success means the readback of the driven pin matched the request;
/// on success the reported value is updated, and a non-zero `duration_ms`
/// arms the auto-revert timer. On failure the channel is left for the next
/// explicit command — there is no retry loop.
pub fn set_relay<G: Gpio, C: Clock>(
    ch: &mut Channel,
    gpio: &mut G,
    clock: &C,
    target: RelayTarget,
    duration_ms: u32,
) -> bool {
    if ch.kind != ChannelKind::Relay {
        return false;
    }

    let active = ch.polarity.active();
    let inactive = ch.polarity.inactive();
    let mut success = false;

    match target {
        RelayTarget::Off => {
            if let Some(pin) = ch.pin1 {
                gpio.write_level(pin, inactive);
                success = gpio.read_level(pin) == inactive;
            }
            if let Some(pin) = ch.pin2 {
                gpio.write_level(pin, inactive);
                if !success {
                    success = gpio.read_level(pin) == inactive;
                }
            }
        },
        RelayTarget::Primary => {
            if let Some(pin) = ch.pin2 {
                gpio.write_level(pin, inactive);
                clock.sleep(RELAY_SETTLE);
            }
            if let Some(pin) = ch.pin1 {
                gpio.write_level(pin, active);
                success = gpio.read_level(pin) == active;
                if duration_ms > 0 {
                    ch.timer_ms = duration_ms;
                }
            }
        },
        RelayTarget::Secondary => {
            if let Some(pin) = ch.pin1 {
                gpio.write_level(pin, inactive);
                clock.sleep(RELAY_SETTLE);
            }
            if let Some(pin) = ch.pin2 {
                gpio.write_level(pin, active);
                success = gpio.read_level(pin) == active;
                if duration_ms > 0 {
                    ch.timer_ms = duration_ms;
                }
            }
        },
    }

    if success {
        ch.value = target.as_wire();
    }
    success
}

/// Samples a sensor channel and latches a debounced transition.
///
/// Returns the value to report when a fresh edge was latched; latching arms
/// the [`SENSOR_HOLDOFF_MS`] timer. Changes observed while the timer runs
/// update the cached level but produce no report and leave the timer alone.
pub fn poll_sensor<G: Gpio>(ch: &mut Channel, gpio: &G) -> Option<u8> {
    if ch.kind != ChannelKind::BinarySensor {
        return None;
    }
    let pin = ch.pin1?;
    let level = gpio.read_level(pin);

    if ch.last_level == Some(level) {
        return None;
    }
    ch.last_level = Some(level);

    if ch.timer_ms > 0 {
        return None;
    }
    ch.timer_ms = SENSOR_HOLDOFF_MS;

    let value = u8::from(level == PinLevel::High);
    ch.value = value;
    Some(value)
}

/// Counts a channel's pending timer down by the elapsed tick time.
///
/// Returns the expiry event when the timer ran out this tick. A relay
/// expiry asks for a forced return to off; a sensor expiry invalidates the
/// cached level, so the next poll compares against nothing and always
/// latches the current level.
pub fn decay_timer(ch: &mut Channel, elapsed_ms: u64) -> Option<TimerExpiry> {
    if ch.timer_ms == 0 {
        return None;
    }

    if elapsed_ms >= u64::from(ch.timer_ms) {
        ch.timer_ms = 0;
        return match ch.kind {
            ChannelKind::BinarySensor => {
                ch.last_level = None;
                Some(TimerExpiry::RearmSensor)
            },
            ChannelKind::Relay => Some(TimerExpiry::RevertRelay),
        };
    }

    ch.timer_ms -= elapsed_ms as u32;
    None
}
