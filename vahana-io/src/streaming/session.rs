//! Gated accept loop and single-owner connection handoff.
//!
//! Used by the tick-coupled endpoints (direct control and video stream).
//!
//! ```text
//!   accept thread                              tick thread
//! ┌──────────────────────────┐  bounded(1)   ┌───────────────────────┐
//! │ gate.acquire()           │──────────────▶│ SessionSlot::session()│
//! │ listener.accept()        │   Session     │ per-tick I/O          │
//! │ handshake (stream only)  │               │ drop on I/O failure   │
//! └──────────────────────────┘               └──────────┬────────────┘
//!            ▲                                          │
//!            └──────────── SlotGuard dropped ───────────┘
//! ```
//!
//! The accept thread never touches a socket after handing it off, and the
//! tick thread never accepts. Dropping a [`Session`] releases the gate, which
//! lets the accept thread take the next client from the backlog.

use crate::control::gate::{ReconnectGate, SlotGuard};
use crate::error::{Error, Result};
use crate::streaming::socket;
use crossbeam_channel::{Receiver, Sender, TryRecvError, bounded};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// How long the accept loop waits on a closed gate before re-checking shutdown.
const GATE_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Protocol preamble run on the accept thread before handoff.
pub type Handshake = fn(&mut TcpStream, &AtomicBool) -> Result<()>;

/// A connected client holding its port's slot.
#[derive(Debug)]
pub struct Session {
    pub stream: TcpStream,
    pub peer: SocketAddr,
    _slot: SlotGuard,
}

/// Accept loop for one gated port.
pub struct GatedAcceptor {
    name: &'static str,
    listener: TcpListener,
    gate: ReconnectGate,
    handoff: Sender<Session>,
    handshake: Option<Handshake>,
    running: Arc<AtomicBool>,
}

impl GatedAcceptor {
    /// Create the acceptor and the tick-side slot it feeds.
    pub fn new(
        name: &'static str,
        listener: TcpListener,
        handshake: Option<Handshake>,
        running: Arc<AtomicBool>,
    ) -> (Self, SessionSlot) {
        let (tx, rx) = bounded(1);
        let gate = ReconnectGate::new();
        let acceptor = Self {
            name,
            listener,
            gate: gate.clone(),
            handoff: tx,
            handshake,
            running,
        };
        let slot = SessionSlot {
            name,
            rx,
            gate,
            current: None,
        };
        (acceptor, slot)
    }

    /// Run until shutdown or until the tick side goes away.
    pub fn run(self) -> Result<()> {
        while self.running.load(Ordering::Relaxed) {
            let Some(slot) = self.gate.acquire_timeout(GATE_POLL_INTERVAL) else {
                continue;
            };

            log::info!("{}: Idle", self.name);
            let (mut stream, peer) = match socket::accept(&self.listener, &self.running) {
                Ok(Some(conn)) => conn,
                Ok(None) => break,
                Err(e) => {
                    log::error!("{}: Accept error: {}", self.name, e);
                    continue;
                }
            };

            if let Some(handshake) = self.handshake
                && let Err(e) = handshake(&mut stream, &self.running)
            {
                log::info!("{}: Handshake with {} failed: {}", self.name, peer, e);
                continue;
            }

            log::info!("{}: Connected {}", self.name, peer);
            let session = Session {
                stream,
                peer,
                _slot: slot,
            };
            if self.handoff.send(session).is_err() {
                return Err(Error::ChannelClosed("session handoff"));
            }
        }

        log::info!("{}: Accept loop stopped", self.name);
        Ok(())
    }
}

/// Tick-side owner of the current session for one port.
pub struct SessionSlot {
    name: &'static str,
    rx: Receiver<Session>,
    gate: ReconnectGate,
    current: Option<Session>,
}

impl SessionSlot {
    /// The connected session, picking up a freshly accepted one if idle.
    pub fn session(&mut self) -> Option<&mut Session> {
        if self.current.is_none() {
            match self.rx.try_recv() {
                Ok(session) => self.current = Some(session),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => {}
            }
        }
        self.current.as_mut()
    }

    pub fn is_connected(&self) -> bool {
        self.current.is_some()
    }

    /// Drop the current session and reopen the gate.
    pub fn disconnect(&mut self, reason: &Error) {
        if let Some(session) = self.current.take() {
            if reason.is_disconnect() {
                log::info!("{}: Disconnected {}", self.name, session.peer);
            } else {
                log::info!("{}: Dropped {}: {}", self.name, session.peer, reason);
            }
        }
    }

    /// Gate shared with the accept thread.
    pub fn gate(&self) -> &ReconnectGate {
        &self.gate
    }
}
