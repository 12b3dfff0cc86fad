//! Scriptable transport double.

use std::{cell::RefCell, collections::VecDeque, io, rc::Rc};

use tether_core::transport::Transport;

use crate::trace::{Event, EventLog};

#[derive(Debug, Default)]
struct TransportState {
    connected: bool,
    refuse_connects: u32,
    connect_attempts: u32,
    disconnects: u32,
    rx: VecDeque<u8>,
    tx: Vec<u8>,
}

/// Transport double with scriptable connect failures and server-side drops.
///
/// Starts disconnected; the device's first tick establishes the stream.
/// The byte queues back the [`Transport::read`]/[`Transport::write`] side
/// used by wire-engine implementations.
#[derive(Debug, Clone)]
pub struct SimTransport {
    inner: Rc<RefCell<TransportState>>,
    log: EventLog,
}

impl SimTransport {
    /// Creates a disconnected transport logging into `log`.
    pub fn new(log: EventLog) -> Self {
        Self { inner: Rc::new(RefCell::new(TransportState::default())), log }
    }

    /// Makes the next `n` connect attempts fail.
    pub fn refuse_next_connects(&self, n: u32) {
        self.inner.borrow_mut().refuse_connects = n;
    }

    /// Drops the connection from the server side.
    pub fn drop_connection(&self) {
        self.inner.borrow_mut().connected = false;
    }

    /// Whether the stream is currently up.
    pub fn is_up(&self) -> bool {
        self.inner.borrow().connected
    }

    /// Connect attempts observed, successful or not.
    pub fn connect_attempts(&self) -> u32 {
        self.inner.borrow().connect_attempts
    }

    /// Device-initiated disconnects observed.
    pub fn disconnects(&self) -> u32 {
        self.inner.borrow().disconnects
    }

    /// Queues bytes for the device side to read.
    pub fn queue_bytes(&self, bytes: &[u8]) {
        self.inner.borrow_mut().rx.extend(bytes.iter().copied());
    }

    /// Bytes written by the device side so far.
    pub fn written(&self) -> Vec<u8> {
        self.inner.borrow().tx.clone()
    }
}

impl Transport for SimTransport {
    fn is_connected(&self) -> bool {
        self.inner.borrow().connected
    }

    fn connect(&mut self, _host: &str, _port: u16) -> bool {
        let mut state = self.inner.borrow_mut();
        state.connect_attempts += 1;
        if state.refuse_connects > 0 {
            state.refuse_connects -= 1;
            return false;
        }
        state.connected = true;
        self.log.push(Event::Connect);
        true
    }

    fn disconnect(&mut self) {
        let mut state = self.inner.borrow_mut();
        if state.connected {
            state.connected = false;
            state.disconnects += 1;
            self.log.push(Event::Disconnect);
        }
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut state = self.inner.borrow_mut();
        if !state.connected {
            return Err(io::Error::from(io::ErrorKind::NotConnected));
        }
        let mut count = 0;
        while count < buf.len() {
            let Some(byte) = state.rx.pop_front() else { break };
            buf[count] = byte;
            count += 1;
        }
        Ok(count)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.inner.borrow_mut();
        if !state.connected {
            return Err(io::Error::from(io::ErrorKind::NotConnected));
        }
        state.tx.extend_from_slice(buf);
        Ok(buf.len())
    }
}
