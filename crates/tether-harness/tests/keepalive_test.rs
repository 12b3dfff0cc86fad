//! Keep-alive window and hard-timeout tests.
//!
//! The rig registers with a 30 s activity timeout, so the ping window opens
//! at 25 s of silence and the hard timeout fires at 40 s.

use tether_core::session::SessionState;
use tether_harness::DeviceRig;
use tether_proto::{ActivityTimeoutResult, DecodeError, ServerMessage};

#[test]
fn ping_waits_for_the_window_to_open() {
    let mut rig = DeviceRig::builder().relay(4).build();
    rig.register();

    rig.advance(24_999);
    rig.tick();
    assert_eq!(rig.link.pings(), 0);

    rig.advance(1);
    rig.tick();
    assert_eq!(rig.link.pings(), 1);
}

#[test]
fn single_ping_per_silence_window() {
    let mut rig = DeviceRig::builder().relay(4).build();
    rig.register();

    rig.advance(25_000);
    rig.tick();
    rig.tick();
    rig.advance(5_000);
    rig.tick();

    assert_eq!(rig.link.pings(), 1);
}

#[test]
fn inbound_traffic_resets_the_window() {
    let mut rig = DeviceRig::builder().relay(4).build();
    rig.register();

    rig.advance(25_000);
    rig.tick();
    assert_eq!(rig.link.pings(), 1);

    // Any server traffic counts; the negotiation result stands in for a
    // ping answer.
    rig.link.queue(ServerMessage::ActivityTimeoutResult(ActivityTimeoutResult {
        activity_timeout_s: 30,
    }));
    rig.tick();

    rig.advance(24_999);
    rig.tick();
    assert_eq!(rig.link.pings(), 1);

    rig.advance(1);
    rig.tick();
    assert_eq!(rig.link.pings(), 2);
}

#[test]
fn hard_timeout_fires_at_grace_not_before() {
    let mut rig = DeviceRig::builder().relay(4).build();
    rig.register();

    rig.advance(39_999);
    rig.tick();
    assert_eq!(rig.transport.disconnects(), 0);

    rig.advance(1);
    rig.tick();
    assert_eq!(rig.transport.disconnects(), 1);
    assert_eq!(rig.device.session().state(), SessionState::Disconnected);
}

#[test]
fn no_keepalive_while_awaiting_registration() {
    let mut rig = DeviceRig::builder().relay(4).build();

    rig.tick();
    rig.advance(100_000);
    rig.tick();

    assert_eq!(rig.link.pings(), 0);
    assert_eq!(rig.transport.disconnects(), 0);
    assert_eq!(rig.link.registrations(), 1);
}

#[test]
fn undecodable_traffic_still_counts_as_liveness() {
    let mut rig = DeviceRig::builder().relay(4).build();
    rig.register();

    rig.advance(24_000);
    rig.link.queue_decode_error(DecodeError::Truncated);
    rig.tick();

    // Silence restarts at the garbled call, so 24 s later still no ping.
    rig.advance(24_000);
    rig.tick();
    assert_eq!(rig.link.pings(), 0);

    rig.advance(1_000);
    rig.tick();
    assert_eq!(rig.link.pings(), 1);
}
