//! Core abstractions shared by the simulation and the protocol servers.
//!
//! - [`environment`]: Collaborator traits to implement for a world backend
//! - [`types`]: Actions, keys, control events and poses

pub mod environment;
pub mod types;
