//! Control state: arbitration, admission gating and cross-thread handoff.
//!
//! - [`arbiter`]: Key-stack state machine resolving inputs into one [`Action`](crate::core::types::Action)
//! - [`gate`]: One-client-per-port admission control
//! - [`handle`]: Queue feeding control events to the tick thread
//! - [`status`]: Status board read by the telemetry server

pub mod arbiter;
pub mod gate;
pub mod handle;
pub mod status;

pub use arbiter::{ActionArbiter, Evaluation};
pub use gate::{ReconnectGate, SlotGuard};
pub use handle::{ControlHandle, control_channel};
pub use status::StatusBoard;
