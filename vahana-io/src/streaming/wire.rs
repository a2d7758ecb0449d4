//! Wire formats for the four vehicle endpoints.
//!
//! All multi-byte integers are little-endian 32-bit. Booleans are one byte
//! (0 or 1).
//!
//! # Command port
//!
//! ```text
//! ┌──────┬───────┬────────┬──────────┬──────┐
//! │ 0xFF │ group │ action │ reserved │ 0xFF │
//! └──────┴───────┴────────┴──────────┴──────┘
//! ```
//!
//! | group | action | call |
//! |-------|--------|------|
//! | 0x00 | 0x00 | Stop |
//! | 0x00 | 0x01 | Forward |
//! | 0x00 | 0x02 | Backward |
//! | 0x00 | 0x03 | TurnLeft |
//! | 0x00 | 0x04 | TurnRight |
//! | 0x10 | any  | Reset |
//!
//! The framer resynchronises on every 0xFF: a frame whose payload is not
//! exactly three bytes when the end marker arrives is dropped.
//!
//! # Sensor port (poll)
//!
//! ```text
//! full:             isOut:1 │ reward:4 │ frameLen:4 │ frame
//! disqualification: bits:1 (bit0 = isOut)
//! ```
//!
//! # Direct port (per tick)
//!
//! ```text
//! in:  command:1  (0x00 left, 0x01 right, 0x02 forward, 0xFF reset)
//! out: isOut:1 │ frameLen:4 │ frame │ count:4 │ count × f32
//! ```
//!
//! # Stream port
//!
//! HTTP request terminated by `\r\n\r\n`, answered with a
//! `multipart/x-mixed-replace` response using boundary `b`, then one part per
//! tick.

use std::fmt;

/// Start and end marker of a command frame.
pub const FRAME_MARKER: u8 = 0xFF;

/// Payload length of a well-formed command frame.
pub const COMMAND_PAYLOAD_LEN: usize = 3;

/// Command group for movement actions.
pub const GROUP_MOVEMENT: u8 = 0x00;

/// Command group for reset.
pub const GROUP_RESET: u8 = 0x10;

/// Multipart boundary used by the stream port.
pub const STREAM_BOUNDARY: &str = "b";

/// Response head sent once after the stream request.
pub const STREAM_RESPONSE_HEADER: &[u8] =
    b"HTTP/1.1 200 OK\r\nContent-Type: multipart/x-mixed-replace; boundary=b\r\n\r\n";

/// End of an HTTP request head.
pub const REQUEST_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Decoded command-port call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Stop,
    Forward,
    Backward,
    TurnLeft,
    TurnRight,
    Reset,
}

impl Command {
    /// Decode a 3-byte payload. Unknown group/action pairs return `None`.
    pub fn decode(payload: [u8; COMMAND_PAYLOAD_LEN]) -> Option<Self> {
        let [group, action, _reserved] = payload;
        match (group, action) {
            (GROUP_MOVEMENT, 0x00) => Some(Command::Stop),
            (GROUP_MOVEMENT, 0x01) => Some(Command::Forward),
            (GROUP_MOVEMENT, 0x02) => Some(Command::Backward),
            (GROUP_MOVEMENT, 0x03) => Some(Command::TurnLeft),
            (GROUP_MOVEMENT, 0x04) => Some(Command::TurnRight),
            (GROUP_RESET, _) => Some(Command::Reset),
            _ => None,
        }
    }

    /// `[group, action, reserved]`
    pub fn payload(self) -> [u8; COMMAND_PAYLOAD_LEN] {
        match self {
            Command::Stop => [GROUP_MOVEMENT, 0x00, 0x00],
            Command::Forward => [GROUP_MOVEMENT, 0x01, 0x00],
            Command::Backward => [GROUP_MOVEMENT, 0x02, 0x00],
            Command::TurnLeft => [GROUP_MOVEMENT, 0x03, 0x00],
            Command::TurnRight => [GROUP_MOVEMENT, 0x04, 0x00],
            Command::Reset => [GROUP_RESET, 0x00, 0x00],
        }
    }

    /// Complete frame including both markers.
    pub fn encode(self) -> [u8; COMMAND_PAYLOAD_LEN + 2] {
        let [group, action, reserved] = self.payload();
        [FRAME_MARKER, group, action, reserved, FRAME_MARKER]
    }
}

/// Result of feeding one byte to the [`CommandFramer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameEvent {
    /// A complete, decodable frame
    Command(Command),
    /// End marker with a payload that was not exactly three bytes
    BadLength(usize),
    /// Three-byte payload with an unknown group/action
    Unknown([u8; COMMAND_PAYLOAD_LEN]),
}

/// Two-state command framer: searching for a start marker, or capturing.
#[derive(Debug, Default)]
pub struct CommandFramer {
    capturing: bool,
    payload: [u8; COMMAND_PAYLOAD_LEN],
    /// Payload bytes seen since the start marker (may exceed the buffer)
    len: usize,
}

impl CommandFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one byte. Returns an event whenever an end marker closes a frame.
    pub fn push(&mut self, byte: u8) -> Option<FrameEvent> {
        if !self.capturing {
            if byte == FRAME_MARKER {
                self.capturing = true;
                self.len = 0;
            }
            return None;
        }

        if byte == FRAME_MARKER {
            self.capturing = false;
            if self.len != COMMAND_PAYLOAD_LEN {
                return Some(FrameEvent::BadLength(self.len));
            }
            return Some(match Command::decode(self.payload) {
                Some(cmd) => FrameEvent::Command(cmd),
                None => FrameEvent::Unknown(self.payload),
            });
        }

        if self.len < COMMAND_PAYLOAD_LEN {
            self.payload[self.len] = byte;
        }
        self.len = self.len.saturating_add(1);
        None
    }

    /// Feed a buffer, collecting every closed frame in order.
    pub fn push_all(&mut self, bytes: &[u8]) -> Vec<FrameEvent> {
        bytes.iter().filter_map(|b| self.push(*b)).collect()
    }

    /// Whether a start marker has been seen and the frame is still open.
    pub fn is_capturing(&self) -> bool {
        self.capturing
    }
}

/// One command byte on the direct port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectCommand {
    RotateLeft,
    RotateRight,
    MoveForward,
    Reset,
    /// Any other byte. Still completes the tick exchange.
    Idle(u8),
}

impl DirectCommand {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0x00 => DirectCommand::RotateLeft,
            0x01 => DirectCommand::RotateRight,
            0x02 => DirectCommand::MoveForward,
            0xFF => DirectCommand::Reset,
            other => DirectCommand::Idle(other),
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            DirectCommand::RotateLeft => 0x00,
            DirectCommand::RotateRight => 0x01,
            DirectCommand::MoveForward => 0x02,
            DirectCommand::Reset => 0xFF,
            DirectCommand::Idle(byte) => byte,
        }
    }
}

/// Append a little-endian length prefix followed by the bytes.
fn put_blob(buf: &mut Vec<u8>, bytes: &[u8]) {
    buf.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
    buf.extend_from_slice(bytes);
}

/// Full telemetry reply: `isOut:1, reward:4, frameLen:4, frame`.
pub fn encode_telemetry(buf: &mut Vec<u8>, is_out: bool, reward: i32, frame: &[u8]) {
    buf.clear();
    buf.reserve(1 + 4 + 4 + frame.len());
    buf.push(is_out as u8);
    buf.extend_from_slice(&reward.to_le_bytes());
    put_blob(buf, frame);
}

/// Disqualification-only reply: bitmask byte, bit0 = isOut.
pub fn encode_disqualification(is_out: bool) -> u8 {
    let mut bits = 0x00;
    if is_out {
        bits |= 0x01;
    }
    bits
}

/// Direct-control reply: `isOut:1, frameLen:4, frame, count:4, f32 × count`.
pub fn encode_direct_response(buf: &mut Vec<u8>, is_out: bool, frame: &[u8], distances: &[f32]) {
    buf.clear();
    buf.reserve(1 + 4 + frame.len() + 4 + distances.len() * 4);
    buf.push(is_out as u8);
    put_blob(buf, frame);
    buf.extend_from_slice(&(distances.len() as u32).to_le_bytes());
    for d in distances {
        buf.extend_from_slice(&d.to_le_bytes());
    }
}

/// Header block preceding each JPEG part on the stream port.
pub fn multipart_part_header(frame_len: usize) -> String {
    format!(
        "--{}\r\nContent-Type: image/jpeg\r\nContent-length: {}\r\n\r\n",
        STREAM_BOUNDARY, frame_len
    )
}

/// Detects the end of an HTTP request head across arbitrary read boundaries.
#[derive(Default)]
pub struct RequestScanner {
    matched: usize,
    consumed: usize,
}

impl RequestScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed bytes. Returns true once `\r\n\r\n` has been seen.
    pub fn feed(&mut self, bytes: &[u8]) -> bool {
        for &b in bytes {
            self.consumed += 1;
            if b == REQUEST_TERMINATOR[self.matched] {
                self.matched += 1;
                if self.matched == REQUEST_TERMINATOR.len() {
                    return true;
                }
            } else {
                self.matched = usize::from(b == REQUEST_TERMINATOR[0]);
            }
        }
        false
    }

    /// Request bytes consumed so far.
    pub fn consumed(&self) -> usize {
        self.consumed
    }
}

impl fmt::Debug for RequestScanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestScanner")
            .field("matched", &self.matched)
            .field("consumed", &self.consumed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_table() {
        assert_eq!(Command::decode([0x00, 0x00, 0x00]), Some(Command::Stop));
        assert_eq!(Command::decode([0x00, 0x01, 0x00]), Some(Command::Forward));
        assert_eq!(Command::decode([0x00, 0x02, 0x7F]), Some(Command::Backward));
        assert_eq!(Command::decode([0x00, 0x03, 0x00]), Some(Command::TurnLeft));
        assert_eq!(Command::decode([0x00, 0x04, 0x00]), Some(Command::TurnRight));
        assert_eq!(Command::decode([0x10, 0x42, 0x00]), Some(Command::Reset));
        assert_eq!(Command::decode([0x00, 0x05, 0x00]), None);
        assert_eq!(Command::decode([0x02, 0x01, 0x64]), None);
    }

    #[test]
    fn test_framer_decodes_every_command() {
        let mut framer = CommandFramer::new();
        for cmd in [
            Command::Stop,
            Command::Forward,
            Command::Backward,
            Command::TurnLeft,
            Command::TurnRight,
            Command::Reset,
        ] {
            assert_eq!(framer.push_all(&cmd.encode()), vec![FrameEvent::Command(cmd)]);
        }
    }

    #[test]
    fn test_framer_resyncs_after_short_frame() {
        let mut framer = CommandFramer::new();
        let mut bytes = vec![0xFF, 0x01, 0xFF];
        bytes.extend_from_slice(&Command::Forward.encode());
        assert_eq!(
            framer.push_all(&bytes),
            vec![
                FrameEvent::BadLength(1),
                FrameEvent::Command(Command::Forward)
            ]
        );
    }

    #[test]
    fn test_framer_drops_long_frame() {
        let mut framer = CommandFramer::new();
        let events = framer.push_all(&[0xFF, 0x00, 0x01, 0x00, 0x00, 0xFF]);
        assert_eq!(events, vec![FrameEvent::BadLength(4)]);
        assert!(!framer.is_capturing());
    }

    #[test]
    fn test_framer_ignores_noise_before_marker() {
        let mut framer = CommandFramer::new();
        let mut bytes = vec![0x12, 0x00, 0x34];
        bytes.extend_from_slice(&Command::TurnRight.encode());
        assert_eq!(
            framer.push_all(&bytes),
            vec![FrameEvent::Command(Command::TurnRight)]
        );
    }

    #[test]
    fn test_framer_reports_unknown_command() {
        let mut framer = CommandFramer::new();
        assert_eq!(
            framer.push_all(&[0xFF, 0x02, 0x01, 0x50, 0xFF]),
            vec![FrameEvent::Unknown([0x02, 0x01, 0x50])]
        );
    }

    #[test]
    fn test_framer_split_across_reads() {
        let mut framer = CommandFramer::new();
        assert!(framer.push_all(&[0xFF, 0x00]).is_empty());
        assert!(framer.push_all(&[0x03]).is_empty());
        assert_eq!(
            framer.push_all(&[0x00, 0xFF]),
            vec![FrameEvent::Command(Command::TurnLeft)]
        );
    }

    #[test]
    fn test_direct_command_bytes() {
        assert_eq!(DirectCommand::from_byte(0x00), DirectCommand::RotateLeft);
        assert_eq!(DirectCommand::from_byte(0x01), DirectCommand::RotateRight);
        assert_eq!(DirectCommand::from_byte(0x02), DirectCommand::MoveForward);
        assert_eq!(DirectCommand::from_byte(0xFF), DirectCommand::Reset);
        assert_eq!(DirectCommand::from_byte(0x09), DirectCommand::Idle(0x09));
    }

    #[test]
    fn test_telemetry_layout() {
        let mut buf = Vec::new();
        encode_telemetry(&mut buf, true, 3, &[0xAA, 0xBB]);
        assert_eq!(buf, vec![1, 3, 0, 0, 0, 2, 0, 0, 0, 0xAA, 0xBB]);
    }

    #[test]
    fn test_disqualification_bitmask() {
        assert_eq!(encode_disqualification(false), 0x00);
        assert_eq!(encode_disqualification(true), 0x01);
    }

    #[test]
    fn test_direct_response_layout() {
        let mut buf = Vec::new();
        encode_direct_response(&mut buf, false, &[0x01], &[1.5, f32::NAN]);
        assert_eq!(&buf[..6], &[0, 1, 0, 0, 0, 0x01]);
        assert_eq!(&buf[6..10], &[2, 0, 0, 0]);
        assert_eq!(f32::from_le_bytes([buf[10], buf[11], buf[12], buf[13]]), 1.5);
        assert!(f32::from_le_bytes([buf[14], buf[15], buf[16], buf[17]]).is_nan());
        assert_eq!(buf.len(), 18);
    }

    #[test]
    fn test_multipart_header() {
        assert_eq!(
            multipart_part_header(1234),
            "--b\r\nContent-Type: image/jpeg\r\nContent-length: 1234\r\n\r\n"
        );
    }

    #[test]
    fn test_request_scanner_across_chunks() {
        let mut scanner = RequestScanner::new();
        assert!(!scanner.feed(b"GET / HTTP/1.1\r\nHost: x\r"));
        assert!(!scanner.feed(b"\n\r"));
        assert!(scanner.feed(b"\n"));
    }

    #[test]
    fn test_request_scanner_partial_restart() {
        let mut scanner = RequestScanner::new();
        assert!(!scanner.feed(b"a\r\n\rb\r\r\n"));
        assert!(scanner.feed(b"\r\n"));
    }
}
