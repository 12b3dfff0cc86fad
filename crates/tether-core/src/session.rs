//! Connection state machine: registration lifecycle and keep-alive.
//!
//! # Action pattern
//!
//! Methods take the current millisecond clock as a parameter and return a
//! [`SessionAction`] for the scheduler to execute. The machine performs no
//! I/O and emits no logs, which keeps every timing rule unit-testable with
//! plain integers.
//!
//! # State Machine
//!
//! ```text
//! ┌──────────────┐ transport up ┌─────────────┐   success   ┌────────────┐
//! │ Disconnected │─────────────>│ Registering │────────────>│ Registered │
//! └──────────────┘  (Register)  └─────────────┘             └────────────┘
//!        ^                            │ rejection                 │ silence
//!        │                            v                           v ≥ T+10s
//!        └───────────────────── Drop { backoff } <────────────────┘
//! ```
//!
//! # Keep-alive timing
//!
//! With a negotiated activity timeout of T seconds, a ping fires after
//! (T − 5) s of silence and the hard timeout after (T + 10) s. The 15 s
//! spread lets one ping and its answer land inside the window even with a
//! full round-trip of latency.

use std::time::Duration;

use tether_proto::{PREFERRED_ACTIVITY_TIMEOUT_S, RegisterResult};

/// Seconds of lead the keep-alive ping gets on the activity timeout.
pub const PING_LEAD_S: u64 = 5;

/// Seconds of grace past the activity timeout before the link is declared
/// dead.
pub const TIMEOUT_GRACE_S: u64 = 10;

/// Connection lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No transport, or the previous session was torn down.
    Disconnected,
    /// Registration request sent, waiting for the result.
    Registering,
    /// Registration accepted; keep-alive rules are in force.
    Registered,
}

/// Actions the scheduler executes on the machine's behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    /// Send the registration request.
    Register,
    /// Send a keep-alive ping.
    Ping,
    /// Ask the server for this activity timeout, in seconds.
    RequestActivityTimeout(u16),
    /// Disconnect the transport, then wait out the backoff.
    Drop {
        /// Bounded wait before the next reconnect attempt is eligible.
        backoff: Duration,
    },
}

/// Session timing configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Activity timeout the device prefers, in seconds.
    pub preferred_activity_timeout_s: u16,
    /// Wait after a failed transport connect.
    pub connect_backoff: Duration,
    /// Wait after a fatal protocol event: registration rejection, version
    /// mismatch, or a pump failure.
    pub fatal_backoff: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            preferred_activity_timeout_s: PREFERRED_ACTIVITY_TIMEOUT_S,
            connect_backoff: Duration::from_secs(2),
            fatal_backoff: Duration::from_secs(5),
        }
    }
}

/// Connection state machine.
///
/// Owned by the scheduler; all clock values are opaque milliseconds compared
/// with wrapping arithmetic, so a rolled-over clock never wedges the
/// machine.
#[derive(Debug, Clone)]
pub struct Session {
    state: SessionState,
    config: SessionConfig,
    /// Clock value of the last inbound traffic.
    last_response_ms: u64,
    /// Whether a ping is outstanding for the current silence window.
    ping_pending: bool,
    /// Activity timeout currently in force, seconds.
    activity_timeout_s: u16,
}

impl Session {
    /// Creates a machine in the Disconnected state.
    pub fn new(config: SessionConfig) -> Self {
        let preferred = config.preferred_activity_timeout_s;
        Self {
            state: SessionState::Disconnected,
            config,
            last_response_ms: 0,
            ping_pending: false,
            activity_timeout_s: preferred,
        }
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Activity timeout currently in force, in seconds.
    pub fn activity_timeout_s(&self) -> u16 {
        self.activity_timeout_s
    }

    /// Whether a ping is outstanding for the current silence window.
    pub fn ping_pending(&self) -> bool {
        self.ping_pending
    }

    /// Wait to apply after a failed transport connect.
    pub fn connect_backoff(&self) -> Duration {
        self.config.connect_backoff
    }

    /// Wait to apply after a fatal protocol event.
    pub fn fatal_backoff(&self) -> Duration {
        self.config.fatal_backoff
    }

    /// Transport came up: request registration.
    ///
    /// Only the Disconnected state reacts; further calls on the same
    /// connection return `None`. This is what makes the registration
    /// request single-shot per connection.
    pub fn transport_connected(&mut self, now: u64) -> Option<SessionAction> {
        if self.state != SessionState::Disconnected {
            return None;
        }
        self.state = SessionState::Registering;
        self.last_response_ms = now;
        self.ping_pending = false;
        Some(SessionAction::Register)
    }

    /// Keep-alive evaluation. Only the Registered state has timing rules;
    /// a device stuck in Registering waits until the transport itself
    /// drops.
    pub fn poll(&mut self, now: u64) -> Option<SessionAction> {
        if self.state != SessionState::Registered {
            return None;
        }

        let silence_s = now.wrapping_sub(self.last_response_ms) / 1000;
        let timeout_s = u64::from(self.activity_timeout_s);

        if silence_s >= timeout_s + TIMEOUT_GRACE_S {
            self.state = SessionState::Disconnected;
            self.ping_pending = false;
            return Some(SessionAction::Drop { backoff: Duration::ZERO });
        }

        if !self.ping_pending && silence_s >= timeout_s.saturating_sub(PING_LEAD_S) {
            self.ping_pending = true;
            return Some(SessionAction::Ping);
        }

        None
    }

    /// Any inbound traffic counts as liveness: resets the silence clock and
    /// clears the pending ping.
    pub fn activity(&mut self, now: u64) {
        self.last_response_ms = now;
        self.ping_pending = false;
    }

    /// Outcome of the registration request.
    ///
    /// Results arriving outside the Registering state are stale and return
    /// `None` without a transition. On success the granted timeout takes
    /// effect, and a grant that differs from the preferred value asks the
    /// server for the preferred one.
    pub fn register_result(&mut self, result: &RegisterResult) -> Option<SessionAction> {
        if self.state != SessionState::Registering {
            return None;
        }

        if result.code.is_success() {
            self.state = SessionState::Registered;
            self.activity_timeout_s = result.activity_timeout_s;
            if self.activity_timeout_s != self.config.preferred_activity_timeout_s {
                return Some(SessionAction::RequestActivityTimeout(
                    self.config.preferred_activity_timeout_s,
                ));
            }
            return None;
        }

        self.state = SessionState::Disconnected;
        self.ping_pending = false;
        Some(SessionAction::Drop { backoff: self.config.fatal_backoff })
    }

    /// The server cannot speak our protocol revision; tear down from any
    /// state.
    pub fn version_error(&mut self) -> SessionAction {
        self.state = SessionState::Disconnected;
        self.ping_pending = false;
        SessionAction::Drop { backoff: self.config.fatal_backoff }
    }

    /// Result of an activity-timeout negotiation.
    pub fn timeout_negotiated(&mut self, seconds: u16) {
        self.activity_timeout_s = seconds;
    }

    /// Transport dropped underneath us: forget the session.
    pub fn reset(&mut self) {
        self.state = SessionState::Disconnected;
        self.ping_pending = false;
        self.last_response_ms = 0;
    }
}
