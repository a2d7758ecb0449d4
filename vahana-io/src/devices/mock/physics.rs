//! Kinematics and collision handling for the simulated vehicle
//!
//! The vehicle is commanded with discrete translate/rotate steps rather than
//! velocities; the tick loop scales speeds by elapsed time before calling in.

use super::track::Track;
use crate::core::types::Pose;
use std::f32::consts::{PI, TAU};

/// Collision handling mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionMode {
    /// Refuse moves that would overlap a wall
    Stop,
    /// Ignore walls entirely
    Passthrough,
}

impl CollisionMode {
    /// Parse collision mode from config string
    pub fn from_config(mode: &str) -> Self {
        match mode {
            "passthrough" => Self::Passthrough,
            _ => Self::Stop,
        }
    }
}

/// Physics state for the simulated vehicle
pub struct PhysicsState {
    pose: Pose,
    collision_mode: CollisionMode,
    radius: f32,
}

impl PhysicsState {
    pub fn new(pose: Pose, collision_mode: CollisionMode, radius: f32) -> Self {
        Self {
            pose: Pose::new(pose.x, pose.y, normalize_angle(pose.heading)),
            collision_mode,
            radius,
        }
    }

    #[inline]
    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Move along the heading. Returns true if a wall blocked the move.
    pub fn translate(&mut self, distance: f32, track: &Track) -> bool {
        let (sin, cos) = self.pose.heading.sin_cos();
        let new_x = self.pose.x + distance * cos;
        let new_y = self.pose.y + distance * sin;

        if self.collision_mode == CollisionMode::Stop && track.collides(new_x, new_y, self.radius)
        {
            return true;
        }
        self.pose.x = new_x;
        self.pose.y = new_y;
        false
    }

    /// Rotate in place, counter-clockwise positive.
    pub fn rotate(&mut self, radians: f32) {
        self.pose.heading = normalize_angle(self.pose.heading + radians);
    }

    pub fn set_pose(&mut self, pose: Pose) {
        self.pose = Pose::new(pose.x, pose.y, normalize_angle(pose.heading));
    }
}

/// Normalize angle to [-π, π)
pub fn normalize_angle(angle: f32) -> f32 {
    let mut a = angle % TAU;
    if a >= PI {
        a -= TAU;
    } else if a < -PI {
        a += TAU;
    }
    a
}
