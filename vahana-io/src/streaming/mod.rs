//! TCP endpoints exposing the vehicle.
//!
//! | Endpoint | Thread model | Module |
//! |----------|--------------|--------|
//! | Command | own thread, serial clients | [`command_server`] |
//! | Sensor (telemetry) | own thread, serial clients | [`telemetry_server`] |
//! | Direct control | gated accept thread + tick thread I/O | [`direct_server`] |
//! | Video stream | gated accept thread + tick thread I/O | [`video_server`] |

pub mod command_server;
pub mod direct_server;
pub mod session;
pub mod socket;
pub mod telemetry_server;
pub mod video_server;
pub mod wire;

pub use command_server::CommandServer;
pub use direct_server::DirectEndpoint;
pub use session::{GatedAcceptor, Session, SessionSlot};
pub use telemetry_server::{TelemetryMode, TelemetryServer};
pub use video_server::StreamEndpoint;
pub use wire::{Command, CommandFramer, DirectCommand, FrameEvent};
