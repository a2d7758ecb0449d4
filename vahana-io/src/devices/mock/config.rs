//! Track configuration for the mock environment
//!
//! The default track is a square ring road around a grass infield. Leaving
//! the road onto the infield disqualifies the vehicle; four checkpoints, one
//! per side of the ring, each pay one reward point when entered.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Arena, obstacles and trigger zones
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackConfig {
    /// Arena width along X (meters)
    #[serde(default = "default_arena_size")]
    pub width: f32,
    /// Arena height along Y (meters)
    #[serde(default = "default_arena_size")]
    pub height: f32,
    /// Treat the arena edges as solid walls
    #[serde(default = "default_true")]
    pub boundary_walls: bool,
    /// Additional wall segments
    #[serde(default)]
    pub walls: Vec<WallConfig>,
    /// Entering any of these raises a disqualification
    #[serde(default = "default_disqualification_zones")]
    pub disqualification_zones: Vec<ZoneConfig>,
    /// Entering any of these raises a milestone
    #[serde(default = "default_milestones")]
    pub milestones: Vec<ZoneConfig>,
    /// Vehicle collision radius (meters)
    #[serde(default = "default_vehicle_radius")]
    pub vehicle_radius: f32,
    /// Collision mode: "stop" or "passthrough"
    #[serde(default = "default_collision_mode")]
    pub collision_mode: String,
    /// Gaussian noise on distance readings (meters, 0 = exact)
    #[serde(default)]
    pub range_noise_stddev: f32,
}

/// Wall segment from (x1, y1) to (x2, y2)
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct WallConfig {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct ZoneConfig {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl ZoneConfig {
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

fn default_arena_size() -> f32 {
    20.0
}
fn default_true() -> bool {
    true
}
fn default_vehicle_radius() -> f32 {
    0.25
}
fn default_collision_mode() -> String {
    "stop".to_string()
}

fn zone(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> ZoneConfig {
    ZoneConfig {
        min_x,
        min_y,
        max_x,
        max_y,
    }
}

fn default_disqualification_zones() -> Vec<ZoneConfig> {
    vec![zone(6.0, 6.0, 14.0, 14.0)]
}

fn default_milestones() -> Vec<ZoneConfig> {
    vec![
        zone(9.5, 14.0, 10.5, 20.0), // north
        zone(14.0, 9.5, 20.0, 10.5), // east
        zone(9.5, 0.0, 10.5, 6.0),   // south
        zone(0.0, 9.5, 6.0, 10.5),   // west
    ]
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            width: default_arena_size(),
            height: default_arena_size(),
            boundary_walls: true,
            walls: Vec::new(),
            disqualification_zones: default_disqualification_zones(),
            milestones: default_milestones(),
            vehicle_radius: default_vehicle_radius(),
            collision_mode: default_collision_mode(),
            range_noise_stddev: 0.0,
        }
    }
}

impl TrackConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.width > 0.0 && self.height > 0.0) {
            return Err(Error::Config(format!(
                "track size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.vehicle_radius < 0.0 || self.range_noise_stddev < 0.0 {
            return Err(Error::Config(
                "vehicle_radius and range_noise_stddev must not be negative".to_string(),
            ));
        }
        if !matches!(self.collision_mode.as_str(), "stop" | "passthrough") {
            return Err(Error::Config(format!(
                "unknown collision_mode '{}'",
                self.collision_mode
            )));
        }
        let mut zones = self.disqualification_zones.iter().chain(&self.milestones);
        if let Some(bad) = zones.find(|z| z.min_x > z.max_x || z.min_y > z.max_y) {
            return Err(Error::Config(format!("inverted zone {:?}", bad)));
        }
        Ok(())
    }
}
