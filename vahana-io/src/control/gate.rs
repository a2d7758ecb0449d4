//! Single-slot admission control for a listening port.
//!
//! The gate holds exactly one token in a capacity-1 channel. Acquiring takes
//! the token and returns a [`SlotGuard`]; dropping the guard puts the token
//! back. An accept loop that acquires before calling `accept` therefore serves
//! one client at a time, while later connection attempts wait in the listen
//! backlog until the slot frees up.

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError, bounded};
use std::time::Duration;

/// Binary gate, initially open.
#[derive(Clone)]
pub struct ReconnectGate {
    tx: Sender<()>,
    rx: Receiver<()>,
}

impl Default for ReconnectGate {
    fn default() -> Self {
        Self::new()
    }
}

impl ReconnectGate {
    pub fn new() -> Self {
        let (tx, rx) = bounded(1);
        // Cannot fail: fresh channel with capacity 1
        let _ = tx.try_send(());
        Self { tx, rx }
    }

    /// Block until the gate is open, then close it.
    pub fn acquire(&self) -> SlotGuard {
        // The gate owns a sender, so recv only returns once a token is back
        let _ = self.rx.recv();
        self.guard()
    }

    /// Like [`acquire`](Self::acquire) but gives up after `timeout`.
    ///
    /// Used by accept loops that need to re-check the shutdown flag.
    pub fn acquire_timeout(&self, timeout: Duration) -> Option<SlotGuard> {
        match self.rx.recv_timeout(timeout) {
            Ok(()) => Some(self.guard()),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Close the gate if it is open, without blocking.
    pub fn try_acquire(&self) -> Option<SlotGuard> {
        match self.rx.try_recv() {
            Ok(()) => Some(self.guard()),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Whether a caller could acquire right now.
    pub fn is_open(&self) -> bool {
        !self.rx.is_empty()
    }

    fn guard(&self) -> SlotGuard {
        SlotGuard {
            tx: self.tx.clone(),
        }
    }
}

/// Occupied slot. Dropping it reopens the gate.
pub struct SlotGuard {
    tx: Sender<()>,
}

impl SlotGuard {
    /// Reopen the gate now. Equivalent to dropping the guard.
    pub fn release(self) {}
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        if self.tx.try_send(()).is_err() {
            log::warn!("Reconnect gate already open on slot release");
        }
    }
}

impl std::fmt::Debug for SlotGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SlotGuard")
    }
}
