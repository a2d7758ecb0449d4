//! Direct port: lock-step control coupled to the simulation tick.
//!
//! While a client is connected, every tick runs
//!
//! ```text
//! receive()  blocking read of one command byte
//!   ...      tick applies it, steps the world, renders, ranges
//! respond()  isOut, frame, distances
//! ```
//!
//! The read blocks the tick thread, so a slow client slows the simulation
//! and a client that stops sending without closing stalls it. There is no
//! timeout. Any read or write failure drops the client and reopens the port.

use crate::error::Result;
use crate::streaming::session::{GatedAcceptor, SessionSlot};
use crate::streaming::socket;
use crate::streaming::wire::{DirectCommand, encode_direct_response};
use std::io::Write;
use std::net::TcpListener;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// Tick-side half of the direct-control server.
pub struct DirectEndpoint {
    slot: SessionSlot,
    running: Arc<AtomicBool>,
    /// A command was read this tick and still needs its response
    awaiting_response: bool,
    buffer: Vec<u8>,
}

impl DirectEndpoint {
    /// Split a bound listener into its accept loop and tick-side endpoint.
    pub fn listen(listener: TcpListener, running: Arc<AtomicBool>) -> (GatedAcceptor, Self) {
        let (acceptor, slot) = GatedAcceptor::new("Direct", listener, None, Arc::clone(&running));
        let endpoint = Self {
            slot,
            running,
            awaiting_response: false,
            buffer: Vec::with_capacity(64 * 1024),
        };
        (acceptor, endpoint)
    }

    pub fn is_connected(&self) -> bool {
        self.slot.is_connected()
    }

    /// Read this tick's command. `None` when idle or when the client just left.
    pub fn receive(&mut self) -> Option<DirectCommand> {
        self.awaiting_response = false;
        let session = self.slot.session()?;
        match socket::read_byte(&mut session.stream, &self.running) {
            Ok(byte) => {
                let cmd = DirectCommand::from_byte(byte);
                log::trace!("Direct: recv {:02X} ({:?})", byte, cmd);
                self.awaiting_response = true;
                Some(cmd)
            }
            Err(e) => {
                self.slot.disconnect(&e);
                None
            }
        }
    }

    /// Whether [`respond`](Self::respond) must run this tick.
    pub fn awaiting_response(&self) -> bool {
        self.awaiting_response
    }

    /// Send the observation for the command read this tick.
    pub fn respond(&mut self, is_out: bool, frame: &[u8], distances: &[f32]) {
        if !self.awaiting_response {
            return;
        }
        self.awaiting_response = false;
        encode_direct_response(&mut self.buffer, is_out, frame, distances);
        if let Err(e) = self.send() {
            self.slot.disconnect(&e);
        }
    }

    fn send(&mut self) -> Result<()> {
        if let Some(session) = self.slot.session() {
            session.stream.write_all(&self.buffer)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::net::TcpStream;
    use std::sync::atomic::Ordering;
    use std::thread;
    use std::time::{Duration, Instant};

    /// Poll `receive` the way the tick loop does until a command arrives.
    fn next_command(endpoint: &mut DirectEndpoint) -> Option<DirectCommand> {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if let Some(cmd) = endpoint.receive() {
                return Some(cmd);
            }
            thread::sleep(Duration::from_millis(5));
        }
        None
    }

    #[test]
    fn test_failed_response_frees_the_port() {
        let listener = socket::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let running = Arc::new(AtomicBool::new(true));
        let (acceptor, mut endpoint) = DirectEndpoint::listen(listener, Arc::clone(&running));
        let accept_thread = thread::spawn(move || acceptor.run());

        // Sends one command, never reads, then resets the connection
        let quitter = thread::spawn(move || {
            let mut client = TcpStream::connect(addr).unwrap();
            client.write_all(&[0x02]).unwrap();
            thread::sleep(Duration::from_millis(200));
        });

        assert_eq!(next_command(&mut endpoint), Some(DirectCommand::MoveForward));
        assert!(endpoint.awaiting_response());
        let frame = vec![0xAB; 32 * 1024 * 1024];
        endpoint.respond(false, &frame, &[1.0]);
        quitter.join().unwrap();
        assert!(!endpoint.is_connected());
        assert!(!endpoint.awaiting_response());

        let mut client = TcpStream::connect(addr).unwrap();
        client.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
        client.write_all(&[0x00]).unwrap();
        assert_eq!(next_command(&mut endpoint), Some(DirectCommand::RotateLeft));
        assert!(endpoint.is_connected());
        endpoint.respond(true, &[0xFF, 0xD9], &[2.5]);

        let mut reply = [0u8; 15];
        client.read_exact(&mut reply).unwrap();
        assert_eq!(reply[0], 1);
        assert_eq!(&reply[1..7], &[2, 0, 0, 0, 0xFF, 0xD9]);
        assert_eq!(&reply[7..11], &[1, 0, 0, 0]);
        assert_eq!(f32::from_le_bytes([reply[11], reply[12], reply[13], reply[14]]), 2.5);

        running.store(false, Ordering::Relaxed);
        drop(endpoint);
        accept_thread.join().unwrap().unwrap();
    }
}
