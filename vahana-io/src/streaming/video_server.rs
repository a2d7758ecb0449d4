//! Stream port: MJPEG over HTTP to a single viewer.
//!
//! The accept thread reads the request head (content ignored) up to
//! `\r\n\r\n`, answers with a `multipart/x-mixed-replace` response head and
//! hands the socket to the tick thread. Each tick then pushes one part:
//!
//! ```text
//! --b\r\n
//! Content-Type: image/jpeg\r\n
//! Content-length: N\r\n
//! \r\n
//! <N JPEG bytes>
//! ```
//!
//! A failed write drops the viewer and reopens the port.

use crate::error::{Error, Result};
use crate::streaming::session::{GatedAcceptor, SessionSlot};
use crate::streaming::socket;
use crate::streaming::wire::{RequestScanner, STREAM_RESPONSE_HEADER, multipart_part_header};
use std::io::Write;
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// Largest request head accepted before the viewer is dropped.
const MAX_REQUEST_BYTES: usize = 16 * 1024;

/// Read the HTTP request head and reply with the multipart response head.
pub fn stream_handshake(stream: &mut TcpStream, running: &AtomicBool) -> Result<()> {
    let mut scanner = RequestScanner::new();
    let mut buf = [0u8; 1024];
    loop {
        let n = socket::read_some(stream, &mut buf, running)?;
        if scanner.feed(&buf[..n]) {
            break;
        }
        if scanner.consumed() > MAX_REQUEST_BYTES {
            return Err(Error::Handshake(format!(
                "request head exceeds {} bytes",
                MAX_REQUEST_BYTES
            )));
        }
    }
    stream.write_all(STREAM_RESPONSE_HEADER)?;
    Ok(())
}

/// Tick-side half of the video stream server.
pub struct StreamEndpoint {
    slot: SessionSlot,
    frames_sent: u64,
}

impl StreamEndpoint {
    /// Split a bound listener into its accept loop and tick-side endpoint.
    pub fn listen(listener: TcpListener, running: Arc<AtomicBool>) -> (GatedAcceptor, Self) {
        let (acceptor, slot) =
            GatedAcceptor::new("Stream", listener, Some(stream_handshake), running);
        (
            acceptor,
            Self {
                slot,
                frames_sent: 0,
            },
        )
    }

    pub fn is_connected(&self) -> bool {
        self.slot.is_connected()
    }

    /// Parts pushed to viewers since start.
    pub fn frames_sent(&self) -> u64 {
        self.frames_sent
    }

    /// Push one frame to the viewer, if any.
    pub fn push_frame(&mut self, frame: &[u8]) {
        let Some(session) = self.slot.session() else {
            return;
        };
        let header = multipart_part_header(frame.len());
        let result = session
            .stream
            .write_all(header.as_bytes())
            .and_then(|_| session.stream.write_all(frame));
        match result {
            Ok(()) => self.frames_sent += 1,
            Err(e) => self.slot.disconnect(&Error::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::sync::atomic::Ordering;
    use std::thread;
    use std::time::{Duration, Instant};

    /// Push frames like the tick loop until `done` holds.
    fn tick_until(
        endpoint: &mut StreamEndpoint,
        frame: &[u8],
        done: impl Fn(&StreamEndpoint) -> bool,
    ) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            endpoint.push_frame(frame);
            if done(endpoint) {
                return true;
            }
            thread::sleep(Duration::from_millis(10));
        }
        false
    }

    #[test]
    fn test_viewer_lifecycle() {
        let listener = socket::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let running = Arc::new(AtomicBool::new(true));
        let (acceptor, mut endpoint) = StreamEndpoint::listen(listener, Arc::clone(&running));
        let accept_thread = thread::spawn(move || acceptor.run());

        let frame = [0xFF, 0xD8, 0x01, 0xFF, 0xD9];
        endpoint.push_frame(&frame);
        assert!(!endpoint.is_connected());
        assert_eq!(endpoint.frames_sent(), 0);

        let mut viewer = TcpStream::connect(addr).unwrap();
        viewer.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
        viewer.write_all(b"GET / HTTP/1.1\r\n\r\n").unwrap();
        assert!(tick_until(&mut endpoint, &frame, |e| e.frames_sent() == 1));
        assert!(endpoint.is_connected());

        let header = multipart_part_header(frame.len());
        let mut expected = STREAM_RESPONSE_HEADER.to_vec();
        expected.extend_from_slice(header.as_bytes());
        expected.extend_from_slice(&frame);
        let mut received = vec![0u8; expected.len()];
        viewer.read_exact(&mut received).unwrap();
        assert_eq!(received, expected);

        drop(viewer);
        assert!(tick_until(&mut endpoint, &frame, |e| !e.is_connected()));

        running.store(false, Ordering::Relaxed);
        accept_thread.join().unwrap().unwrap();
    }
}
