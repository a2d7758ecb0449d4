use crate::error::{Error, Result};
use crate::streaming::wire::STREAM_BOUNDARY;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

const REQUEST: &[u8] =
    b"GET / HTTP/1.1\r\nHost: vahana\r\nAccept: multipart/x-mixed-replace\r\n\r\n";

/// MJPEG viewer for the stream port.
pub struct StreamClient {
    reader: BufReader<TcpStream>,
    line: String,
}

impl StreamClient {
    /// Send the request and consume the response head.
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let mut stream = super::connect(addr)?;
        stream.write_all(REQUEST)?;
        let mut client = Self {
            reader: BufReader::new(stream),
            line: String::new(),
        };

        let status = client.read_line()?.to_string();
        if !status.contains(" 200 ") && !status.ends_with(" 200") {
            return Err(Error::Handshake(format!("unexpected status line: {}", status)));
        }
        while !client.read_line()?.is_empty() {}
        Ok(client)
    }

    pub fn set_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        self.reader.get_ref().set_read_timeout(timeout)?;
        Ok(())
    }

    /// Read the next JPEG part.
    pub fn next_frame(&mut self) -> Result<Vec<u8>> {
        let boundary = format!("--{}", STREAM_BOUNDARY);
        loop {
            let line = self.read_line()?;
            if line == boundary {
                break;
            }
            if !line.is_empty() {
                return Err(Error::Other(format!("expected boundary, got '{}'", line)));
            }
        }

        let mut length = None;
        loop {
            let line = self.read_line()?;
            if line.is_empty() {
                break;
            }
            if let Some((name, value)) = line.split_once(':')
                && name.trim().eq_ignore_ascii_case("content-length")
            {
                length = value.trim().parse::<usize>().ok();
            }
        }

        let length =
            length.ok_or_else(|| Error::Other("part without Content-length".to_string()))?;
        let mut frame = vec![0u8; length];
        self.reader.read_exact(&mut frame)?;
        Ok(frame)
    }

    /// Next CRLF-terminated line without its terminator.
    fn read_line(&mut self) -> Result<&str> {
        self.line.clear();
        if self.reader.read_line(&mut self.line)? == 0 {
            return Err(Error::Disconnected);
        }
        Ok(self.line.trim_end_matches(['\r', '\n']))
    }
}
