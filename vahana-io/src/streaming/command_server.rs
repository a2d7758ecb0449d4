//! Command port: framed movement commands from a remote controller.
//!
//! One client at a time. Each connection's byte stream runs through a
//! [`CommandFramer`]; every complete frame is queued to the tick thread in
//! arrival order. Malformed frames are dropped and never acknowledged, since
//! the protocol has no reply channel.
//!
//! # Connection Lifecycle
//!
//! ```text
//! 1. Accept (Idle -> Connected)
//! 2. Read bytes, frame, queue commands
//! 3. Zero-length read or socket error -> close, back to 1
//! ```

use crate::control::handle::ControlHandle;
use crate::error::{Error, Result};
use crate::streaming::socket;
use crate::streaming::wire::{Command, CommandFramer, FrameEvent};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Read chunk size. Frames are 5 bytes, so this batches many.
const READ_BUFFER_SIZE: usize = 256;

/// TCP server translating command frames into arbiter calls.
pub struct CommandServer {
    listener: TcpListener,
    control: ControlHandle,
    running: Arc<AtomicBool>,
}

impl CommandServer {
    pub fn new(listener: TcpListener, control: ControlHandle, running: Arc<AtomicBool>) -> Self {
        Self {
            listener,
            control,
            running,
        }
    }

    /// Accept and serve clients until shutdown.
    pub fn run(&self) -> Result<()> {
        while self.running.load(Ordering::Relaxed) {
            log::info!("Control: Idle");
            let (stream, peer) = match socket::accept(&self.listener, &self.running) {
                Ok(Some(conn)) => conn,
                Ok(None) => break,
                Err(e) => {
                    log::error!("Control: Accept error: {}", e);
                    continue;
                }
            };

            log::info!("Control: Connected {}", peer);
            match self.serve(stream, peer) {
                Err(Error::ChannelClosed(what)) => {
                    log::warn!("Control: {} closed, stopping server", what);
                    return Err(Error::ChannelClosed(what));
                }
                Err(Error::Shutdown) => break,
                Err(e) if e.is_disconnect() => log::info!("Control: Disconnected {}", peer),
                Err(e) => log::warn!("Control: Dropped {}: {}", peer, e),
                Ok(()) => {}
            }
        }

        log::info!("Control: Server stopped");
        Ok(())
    }

    fn serve(&self, mut stream: TcpStream, peer: SocketAddr) -> Result<()> {
        let mut framer = CommandFramer::new();
        let mut buf = [0u8; READ_BUFFER_SIZE];

        loop {
            let n = socket::read_some(&mut stream, &mut buf, &self.running)?;
            for event in framer.push_all(&buf[..n]) {
                match event {
                    FrameEvent::Command(cmd) => {
                        log::debug!("Control: {:?} from {}", cmd, peer);
                        self.dispatch(cmd)?;
                    }
                    FrameEvent::BadLength(len) => {
                        log::debug!("Control: Dropped frame with {} payload bytes", len);
                    }
                    FrameEvent::Unknown(payload) => {
                        log::warn!("Control: Invalid command {:02X?}", payload);
                    }
                }
            }
        }
    }

    fn dispatch(&self, cmd: Command) -> Result<()> {
        match cmd {
            Command::Stop => self.control.stop(),
            Command::Forward => self.control.forward(),
            Command::Backward => self.control.backward(),
            Command::TurnLeft => self.control.turn_left(),
            Command::TurnRight => self.control.turn_right(),
            Command::Reset => self.control.reset(),
        }
    }
}
