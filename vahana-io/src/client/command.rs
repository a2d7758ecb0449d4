use super::connect;
use crate::error::Result;
use crate::streaming::wire::Command;
use std::io::Write;
use std::net::{TcpStream, ToSocketAddrs};

/// Command port client. Fire-and-forget, the port never replies.
pub struct CommandClient {
    stream: TcpStream,
}

impl CommandClient {
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        Ok(Self {
            stream: connect(addr)?,
        })
    }

    pub fn send(&mut self, command: Command) -> Result<()> {
        self.stream.write_all(&command.encode())?;
        Ok(())
    }

    /// Write raw bytes, framed or not.
    pub fn send_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.stream.write_all(bytes)?;
        Ok(())
    }
}
