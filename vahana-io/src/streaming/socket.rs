//! Blocking socket helpers shared by every server.
//!
//! Sockets run in blocking mode with a short read timeout. The timeout only
//! exists so a blocked thread can notice daemon shutdown; it never counts as
//! a disconnect, so an idle client keeps its connection indefinitely.

use crate::error::{Error, Result};
use std::io::{ErrorKind, Read};
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

/// Read timeout used to re-check the running flag.
pub const READ_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Back-off between non-blocking accept attempts.
pub const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Bind a listener for one endpoint.
pub fn bind<A: ToSocketAddrs + std::fmt::Debug>(addr: A) -> Result<TcpListener> {
    let listener = TcpListener::bind(&addr)
        .map_err(|e| Error::Other(format!("Failed to bind to {:?}: {}", addr, e)))?;
    listener.set_nonblocking(true)?;
    Ok(listener)
}

/// Wait for the next client, polling the running flag.
///
/// Returns `Ok(None)` on shutdown. The returned stream is blocking, has
/// Nagle disabled and uses [`READ_POLL_INTERVAL`] as read timeout.
pub fn accept(
    listener: &TcpListener,
    running: &AtomicBool,
) -> Result<Option<(TcpStream, SocketAddr)>> {
    loop {
        if !running.load(Ordering::Relaxed) {
            return Ok(None);
        }
        match listener.accept() {
            Ok((stream, addr)) => {
                prepare_stream(&stream)?;
                return Ok(Some((stream, addr)));
            }
            Err(ref e) if e.kind() == ErrorKind::WouldBlock => {
                thread::sleep(ACCEPT_POLL_INTERVAL);
            }
            Err(ref e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(Error::Io(e)),
        }
    }
}

fn prepare_stream(stream: &TcpStream) -> Result<()> {
    stream.set_nonblocking(false)?;
    if let Err(e) = stream.set_nodelay(true) {
        log::warn!("Failed to disable Nagle: {}", e);
    }
    stream.set_read_timeout(Some(READ_POLL_INTERVAL))?;
    Ok(())
}

/// Read at least one byte into `buf`.
///
/// A zero-length read becomes [`Error::Disconnected`]; shutdown while waiting
/// becomes [`Error::Shutdown`].
pub fn read_some(stream: &mut TcpStream, buf: &mut [u8], running: &AtomicBool) -> Result<usize> {
    loop {
        match stream.read(buf) {
            Ok(0) => return Err(Error::Disconnected),
            Ok(n) => return Ok(n),
            Err(ref e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                if !running.load(Ordering::Relaxed) {
                    return Err(Error::Shutdown);
                }
            }
            Err(ref e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(Error::Io(e)),
        }
    }
}

/// Read exactly one byte. Blocks until it arrives, the peer leaves, or shutdown.
pub fn read_byte(stream: &mut TcpStream, running: &AtomicBool) -> Result<u8> {
    let mut byte = [0u8; 1];
    read_some(stream, &mut byte, running)?;
    Ok(byte[0])
}
