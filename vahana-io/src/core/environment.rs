//! Collaborator traits for the simulated world.
//!
//! The simulation never renders or resolves physics itself. It drives the
//! vehicle through [`VehicleBody`], grabs frames through [`Camera`] and reads
//! proximity through [`DistanceSensors`].

use crate::core::types::{Pose, Trigger};
use crate::error::Result;

/// Vehicle transform and trigger source.
pub trait VehicleBody: Send {
    /// Move along the current heading. Negative distances move backwards.
    fn translate(&mut self, distance: f32);

    /// Rotate in place. Positive angles turn left (counter-clockwise).
    fn rotate(&mut self, radians: f32);

    /// Place the vehicle at `pose`, discarding any pending triggers.
    fn teleport(&mut self, pose: Pose);

    /// Current vehicle pose.
    fn pose(&self) -> Pose;

    /// Trigger events raised since the previous call.
    fn drain_triggers(&mut self) -> Vec<Trigger>;
}

/// JPEG frame producer.
pub trait Camera: Send {
    fn capture(&mut self, width: u32, height: u32) -> Result<Vec<u8>>;
}

/// Ray-cast proximity sensors mounted on the vehicle.
pub trait DistanceSensors: Send {
    /// One reading per configured sensor, in mount order.
    ///
    /// `f32::NAN` means the ray hit nothing.
    fn distances(&mut self) -> Vec<f32>;
}

/// Everything the tick loop needs from the world.
pub trait Environment: VehicleBody + Camera + DistanceSensors {}

impl<T: VehicleBody + Camera + DistanceSensors> Environment for T {}
