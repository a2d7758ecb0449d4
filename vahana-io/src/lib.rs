//! VahanaIO - network endpoints for a simulated vehicle
//!
//! Exposes one simulated vehicle to external controllers over four TCP ports:
//!
//! - **Command**: framed movement commands, one controller at a time
//! - **Sensor**: poll/response telemetry (disqualification, reward, frame)
//! - **Direct**: lock-step command/observation exchange, one per tick
//! - **Stream**: MJPEG video over HTTP
//!
//! All vehicle state is owned by the tick thread ([`Simulation`]); input
//! threads reach it through a [`ControlHandle`](control::ControlHandle) queue
//! and read it back through the [`StatusBoard`](control::StatusBoard).

pub mod client;
pub mod config;
pub mod control;
pub mod core;
pub mod devices;
pub mod error;
pub mod simulation;
pub mod streaming;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
pub use simulation::Simulation;
