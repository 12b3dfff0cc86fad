//! Scriptable wire-engine double.

use std::{cell::RefCell, collections::VecDeque, rc::Rc};

use tether_core::link::{InboundCall, LinkError, ProtocolLink};
use tether_proto::{DecodeError, RegisterRequest, ServerMessage};

/// Outbound calls the device sent through the wire engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentCall {
    /// The registration request.
    Register(RegisterRequest),
    /// A keep-alive ping.
    Ping,
    /// A channel value report.
    ChannelValue {
        /// Channel that reported.
        channel_number: u8,
        /// Reported value.
        value: u8,
    },
    /// An activity-timeout negotiation request.
    SetActivityTimeout {
        /// Requested timeout in seconds.
        seconds: u16,
    },
}

#[derive(Debug, Default)]
struct LinkState {
    inbound: VecDeque<InboundCall>,
    sent: Vec<SentCall>,
    pump_failures: u32,
}

/// Wire-engine double with a scriptable inbound queue and a sent-call log.
///
/// `pump` drains whatever the test queued, in order; an injected pump
/// failure takes precedence and delivers nothing.
#[derive(Debug, Clone, Default)]
pub struct SimLink {
    inner: Rc<RefCell<LinkState>>,
}

impl SimLink {
    /// Creates an idle engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a decoded inbound call for the next pump.
    pub fn queue(&self, message: ServerMessage) {
        self.inner.borrow_mut().inbound.push_back(Ok(message));
    }

    /// Queues an undecodable inbound call for the next pump.
    pub fn queue_decode_error(&self, err: DecodeError) {
        self.inner.borrow_mut().inbound.push_back(Err(err));
    }

    /// Makes the next pump fail at the transport level.
    pub fn fail_next_pump(&self) {
        self.inner.borrow_mut().pump_failures += 1;
    }

    /// Everything the device sent so far.
    pub fn sent(&self) -> Vec<SentCall> {
        self.inner.borrow().sent.clone()
    }

    /// Number of registration requests sent.
    pub fn registrations(&self) -> usize {
        self.inner
            .borrow()
            .sent
            .iter()
            .filter(|call| matches!(call, SentCall::Register(_)))
            .count()
    }

    /// Number of pings sent.
    pub fn pings(&self) -> usize {
        self.inner.borrow().sent.iter().filter(|call| matches!(call, SentCall::Ping)).count()
    }

    /// Channel value reports sent, in order, as `(channel, value)` pairs.
    pub fn value_reports(&self) -> Vec<(u8, u8)> {
        self.inner
            .borrow()
            .sent
            .iter()
            .filter_map(|call| match call {
                SentCall::ChannelValue { channel_number, value } => {
                    Some((*channel_number, *value))
                },
                _ => None,
            })
            .collect()
    }
}

impl ProtocolLink for SimLink {
    fn pump(&mut self, on_call: &mut dyn FnMut(InboundCall)) -> Result<(), LinkError> {
        {
            let mut state = self.inner.borrow_mut();
            if state.pump_failures > 0 {
                state.pump_failures -= 1;
                return Err(LinkError::Io("injected pump failure".to_owned()));
            }
        }
        loop {
            let call = self.inner.borrow_mut().inbound.pop_front();
            match call {
                Some(call) => on_call(call),
                None => break,
            }
        }
        Ok(())
    }

    fn send_registration(&mut self, request: &RegisterRequest) -> Result<(), LinkError> {
        self.inner.borrow_mut().sent.push(SentCall::Register(request.clone()));
        Ok(())
    }

    fn send_ping(&mut self) -> Result<(), LinkError> {
        self.inner.borrow_mut().sent.push(SentCall::Ping);
        Ok(())
    }

    fn send_channel_value(&mut self, channel_number: u8, value: u8) -> Result<(), LinkError> {
        self.inner.borrow_mut().sent.push(SentCall::ChannelValue { channel_number, value });
        Ok(())
    }

    fn send_activity_timeout(&mut self, seconds: u16) -> Result<(), LinkError> {
        self.inner.borrow_mut().sent.push(SentCall::SetActivityTimeout { seconds });
        Ok(())
    }
}
