use super::{connect, read_blob, read_u32, read_u8};
use crate::error::Result;
use crate::streaming::wire::DirectCommand;
use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

/// Reply to one direct-control step
#[derive(Debug, Clone)]
pub struct Observation {
    pub is_out: bool,
    /// Direct-resolution frame (JPEG)
    pub frame: Vec<u8>,
    /// One reading per sensor, NaN where the ray hit nothing
    pub distances: Vec<f32>,
}

/// Direct port client. One [`step`](Self::step) per simulation tick.
pub struct DirectClient {
    stream: TcpStream,
}

impl DirectClient {
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        Ok(Self {
            stream: connect(addr)?,
        })
    }

    pub fn set_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        self.stream.set_read_timeout(timeout)?;
        Ok(())
    }

    /// Send one command and wait for that tick's observation.
    pub fn step(&mut self, command: DirectCommand) -> Result<Observation> {
        self.stream.write_all(&[command.to_byte()])?;
        let is_out = read_u8(&mut self.stream)? != 0;
        let frame = read_blob(&mut self.stream)?;
        let count = read_u32(&mut self.stream)? as usize;
        let mut raw = vec![0u8; count * 4];
        self.stream.read_exact(&mut raw)?;
        let distances = raw
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        Ok(Observation {
            is_out,
            frame,
            distances,
        })
    }
}
