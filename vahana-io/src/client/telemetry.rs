use super::{connect, read_blob, read_u8};
use crate::error::Result;
use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

/// Byte sent to trigger a reply. Any value works.
const POLL_BYTE: u8 = 0x00;

/// One full-mode telemetry reply
#[derive(Debug, Clone, PartialEq)]
pub struct Telemetry {
    pub is_out: bool,
    /// Milestones since the previous poll
    pub reward: i32,
    /// Latest stream frame (JPEG)
    pub frame: Vec<u8>,
}

/// Sensor port client.
pub struct TelemetryClient {
    stream: TcpStream,
}

impl TelemetryClient {
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        Ok(Self {
            stream: connect(addr)?,
        })
    }

    pub fn set_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        self.stream.set_read_timeout(timeout)?;
        Ok(())
    }

    /// Poll a server running in full mode.
    pub fn poll(&mut self) -> Result<Telemetry> {
        self.stream.write_all(&[POLL_BYTE])?;
        let is_out = read_u8(&mut self.stream)? != 0;
        let mut reward = [0u8; 4];
        self.stream.read_exact(&mut reward)?;
        let frame = read_blob(&mut self.stream)?;
        Ok(Telemetry {
            is_out,
            reward: i32::from_le_bytes(reward),
            frame,
        })
    }

    /// Poll a server running in disqualification mode.
    pub fn poll_disqualified(&mut self) -> Result<bool> {
        self.stream.write_all(&[POLL_BYTE])?;
        Ok(read_u8(&mut self.stream)? & 0x01 != 0)
    }
}
