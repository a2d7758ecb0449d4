//! Sensor port: poll/response telemetry.
//!
//! Every inbound byte is a poll trigger; its value is ignored. The reply
//! depends on [`TelemetryMode`]:
//!
//! - `Full`: `isOut:1, reward:4, frameLen:4, frame`. Reward is the number of
//!   milestones since the previous poll and is reset to 0 once sent.
//! - `Disqualification`: one bitmask byte, bit0 = isOut.

use crate::control::status::StatusBoard;
use crate::error::{Error, Result};
use crate::streaming::socket;
use crate::streaming::wire::{encode_disqualification, encode_telemetry};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Reply layout for the sensor port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TelemetryMode {
    #[default]
    Full,
    Disqualification,
}

/// Poll/response telemetry server.
pub struct TelemetryServer {
    listener: TcpListener,
    status: Arc<StatusBoard>,
    mode: TelemetryMode,
    running: Arc<AtomicBool>,
}

impl TelemetryServer {
    pub fn new(
        listener: TcpListener,
        status: Arc<StatusBoard>,
        mode: TelemetryMode,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            listener,
            status,
            mode,
            running,
        }
    }

    /// Accept and serve clients until shutdown.
    pub fn run(&self) -> Result<()> {
        while self.running.load(Ordering::Relaxed) {
            log::info!("Sensor: Idle");
            let (stream, peer) = match socket::accept(&self.listener, &self.running) {
                Ok(Some(conn)) => conn,
                Ok(None) => break,
                Err(e) => {
                    log::error!("Sensor: Accept error: {}", e);
                    continue;
                }
            };

            log::info!("Sensor: Connected {} ({:?})", peer, self.mode);
            match self.serve(stream, peer) {
                Err(Error::Shutdown) => break,
                Err(e) if e.is_disconnect() => log::info!("Sensor: Disconnected {}", peer),
                Err(e) => log::warn!("Sensor: Dropped {}: {}", peer, e),
                Ok(()) => {}
            }
        }

        log::info!("Sensor: Server stopped");
        Ok(())
    }

    fn serve(&self, mut stream: TcpStream, peer: SocketAddr) -> Result<()> {
        let mut reply = Vec::new();
        let mut polls = [0u8; 64];

        loop {
            // Several polls may arrive in one read; answer each of them
            let n = socket::read_some(&mut stream, &mut polls, &self.running)?;
            for _ in 0..n {
                let reward = self.encode_reply(&mut reply);
                if let Err(e) = stream.write_all(&reply) {
                    // The client never saw these milestones
                    if reward != 0 {
                        self.status.add_reward(reward);
                    }
                    return Err(Error::Io(e));
                }
            }
            log::trace!("Sensor: Answered {} poll(s) from {}", n, peer);
        }
    }

    /// Encode one reply, returning the reward it carries.
    fn encode_reply(&self, reply: &mut Vec<u8>) -> i32 {
        let is_out = self.status.is_out();
        match self.mode {
            TelemetryMode::Full => {
                let frame = self.status.frame();
                let reward = self.status.take_reward();
                encode_telemetry(reply, is_out, reward, &frame);
                reward
            }
            TelemetryMode::Disqualification => {
                reply.clear();
                reply.push(encode_disqualification(is_out));
                0
            }
        }
    }
}
