//! Blocking clients for the four vehicle endpoints.
//!
//! Used by external controllers and by the integration tests.
//!
//! # Example
//!
//! ```ignore
//! use vahana_io::client::{CommandClient, DirectClient};
//! use vahana_io::streaming::{Command, DirectCommand};
//!
//! let mut control = CommandClient::connect("127.0.0.1:8081")?;
//! control.send(Command::Forward)?;
//!
//! let mut direct = DirectClient::connect("127.0.0.1:8082")?;
//! let obs = direct.step(DirectCommand::MoveForward)?;
//! println!("out={} frame={}B distances={:?}", obs.is_out, obs.frame.len(), obs.distances);
//! ```

mod command;
mod direct;
mod stream;
mod telemetry;

pub use command::CommandClient;
pub use direct::{DirectClient, Observation};
pub use stream::StreamClient;
pub use telemetry::{Telemetry, TelemetryClient};

use crate::error::Result;
use std::io::Read;
use std::net::{TcpStream, ToSocketAddrs};

/// Connect with Nagle disabled; every message on these ports is small.
fn connect<A: ToSocketAddrs>(addr: A) -> Result<TcpStream> {
    let stream = TcpStream::connect(addr)?;
    stream.set_nodelay(true)?;
    Ok(stream)
}

fn read_u8<R: Read>(reader: &mut R) -> Result<u8> {
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf)?;
    Ok(buf[0])
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

/// Read a `len:4` prefixed byte blob.
fn read_blob<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    let len = read_u32(reader)? as usize;
    let mut blob = vec![0u8; len];
    reader.read_exact(&mut blob)?;
    Ok(blob)
}
