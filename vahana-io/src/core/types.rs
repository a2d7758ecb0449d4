//! Core data types shared by the arbiter, the simulation and the servers.
//!
//! Key types:
//! - [`Action`]: The single resolved vehicle action for a tick
//! - [`Key`]: Keyboard-style inputs fed into the key stack
//! - [`ControlEvent`]: Everything that may mutate arbiter state, queued to the tick thread
//! - [`Pose`]: Planar vehicle pose used for spawn points and sensor mounts
//! - [`Trigger`]: Environment events raised by vehicle movement

use serde::{Deserialize, Serialize};

/// Resolved vehicle action.
///
/// `Out` is terminal until a reset. `Reset` is transient: the next tick
/// evaluation respawns the vehicle and resolves it to `Stop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Action {
    #[default]
    Stop = 0,
    Forward = 1,
    Backward = 2,
    TurnLeft = 3,
    TurnRight = 4,
    Out = 5,
    Reset = 6,
}

impl Action {
    /// Discriminant used when the action is published through an atomic.
    #[inline]
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Inverse of [`Action::as_u8`]. Unknown values map to `Stop`.
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => Action::Forward,
            2 => Action::Backward,
            3 => Action::TurnLeft,
            4 => Action::TurnRight,
            5 => Action::Out,
            6 => Action::Reset,
            _ => Action::Stop,
        }
    }
}

/// Keyboard-style key identifiers understood by the key stack.
///
/// `Stop` is the neutral key that sits at the bottom of every stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Stop,
    Forward,
    Backward,
    TurnLeft,
    TurnRight,
}

impl Key {
    /// Action applied when this key becomes the effective top of the stack.
    pub fn action(self) -> Action {
        match self {
            Key::Stop => Action::Stop,
            Key::Forward => Action::Forward,
            Key::Backward => Action::Backward,
            Key::TurnLeft => Action::TurnLeft,
            Key::TurnRight => Action::TurnRight,
        }
    }
}

/// Inputs that mutate arbiter state.
///
/// Produced by input threads such as the command server and consumed only by
/// the tick thread. Disqualification never travels this queue; the tick thread
/// raises it itself from environment triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    KeyDown(Key),
    KeyUp(Key),
    /// Direct setter that bypasses the key stack
    Set(Action),
    Reset,
}

/// Planar pose in world frame.
///
/// Heading is in radians, counter-clockwise from +X.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub x: f32,
    pub y: f32,
    pub heading: f32,
}

impl Pose {
    pub fn new(x: f32, y: f32, heading: f32) -> Self {
        Self { x, y, heading }
    }

    /// Transform a point given in this pose's local frame into world frame.
    pub fn transform_point(&self, local_x: f32, local_y: f32) -> (f32, f32) {
        let (sin, cos) = self.heading.sin_cos();
        (
            self.x + local_x * cos - local_y * sin,
            self.y + local_x * sin + local_y * cos,
        )
    }
}

/// Events raised by the environment when the vehicle enters a trigger zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Boundary violation, forces `Action::Out`
    Disqualification,
    /// Progress checkpoint, adds one to the reward counter
    Milestone,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_action_u8_roundtrip() {
        for action in [
            Action::Stop,
            Action::Forward,
            Action::Backward,
            Action::TurnLeft,
            Action::TurnRight,
            Action::Out,
            Action::Reset,
        ] {
            assert_eq!(Action::from_u8(action.as_u8()), action);
        }
        assert_eq!(Action::from_u8(200), Action::Stop);
    }

    #[test]
    fn test_pose_transform_point() {
        let pose = Pose::new(1.0, 2.0, FRAC_PI_2);
        let (x, y) = pose.transform_point(1.0, 0.0);
        assert!((x - 1.0).abs() < 1e-5);
        assert!((y - 3.0).abs() < 1e-5);
    }
}
