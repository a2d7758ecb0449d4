//! Mock environment for running without an external simulator
//!
//! Provides a self-contained world behind the [`Environment`] traits:
//! - Kinematics with wall collision
//! - Edge-triggered disqualification and milestone zones
//! - Ray-cast distance sensors with optional Gaussian noise
//! - A column ray-cast camera producing JPEG frames
//!
//! [`Environment`]: crate::core::environment::Environment

pub mod camera;
pub mod config;
pub mod noise;
pub mod physics;
pub mod track;

use crate::config::{Config, DistanceSensorConfig};
use crate::core::environment::{Camera, DistanceSensors, VehicleBody};
use crate::core::types::{Pose, Trigger};
use crate::error::Result;
use camera::Renderer;
use noise::RangeNoise;
use physics::{CollisionMode, PhysicsState};
use track::Track;

/// Self-contained simulated world.
pub struct MockEnvironment {
    physics: PhysicsState,
    track: Track,
    sensors: Vec<DistanceSensorConfig>,
    noise: RangeNoise,
    renderer: Renderer,
    /// Occupancy of each disqualification zone after the last move
    in_disqualification: Vec<bool>,
    /// Occupancy of each milestone after the last move
    in_milestone: Vec<bool>,
    triggers: Vec<Trigger>,
}

impl MockEnvironment {
    pub fn new(config: &Config) -> Self {
        let track = Track::new(&config.track);
        let physics = PhysicsState::new(
            config.simulation.start.to_pose(),
            CollisionMode::from_config(&config.track.collision_mode),
            config.track.vehicle_radius,
        );
        let mut env = Self {
            in_disqualification: vec![false; track.disqualification_zones().len()],
            in_milestone: vec![false; track.milestones().len()],
            physics,
            track,
            sensors: config.distance_sensors.clone(),
            noise: RangeNoise::new(
                config.simulation.random_seed,
                config.track.range_noise_stddev,
            ),
            renderer: Renderer::new(
                config.capture.field_of_view_deg,
                config.capture.jpeg_quality,
            ),
            triggers: Vec::new(),
        };
        env.sync_zones();
        log::info!("Mock: Vehicle at {:?}", env.physics.pose());
        env
    }

    /// Record current zone occupancy without raising triggers.
    fn sync_zones(&mut self) {
        let pose = self.physics.pose();
        for (inside, zone) in self
            .in_disqualification
            .iter_mut()
            .zip(self.track.disqualification_zones())
        {
            *inside = zone.contains(pose.x, pose.y);
        }
        for (inside, zone) in self.in_milestone.iter_mut().zip(self.track.milestones()) {
            *inside = zone.contains(pose.x, pose.y);
        }
    }

    /// Raise a trigger for every zone entered since the last move.
    fn update_zones(&mut self) {
        let pose = self.physics.pose();
        for (inside, zone) in self
            .in_disqualification
            .iter_mut()
            .zip(self.track.disqualification_zones())
        {
            let now = zone.contains(pose.x, pose.y);
            if now && !*inside {
                log::debug!(
                    "Mock: Entered disqualification zone at ({:.2}, {:.2})",
                    pose.x,
                    pose.y
                );
                self.triggers.push(Trigger::Disqualification);
            }
            *inside = now;
        }
        for (inside, zone) in self.in_milestone.iter_mut().zip(self.track.milestones()) {
            let now = zone.contains(pose.x, pose.y);
            if now && !*inside {
                log::debug!("Mock: Milestone at ({:.2}, {:.2})", pose.x, pose.y);
                self.triggers.push(Trigger::Milestone);
            }
            *inside = now;
        }
    }
}

impl VehicleBody for MockEnvironment {
    fn translate(&mut self, distance: f32) {
        if self.physics.translate(distance, &self.track) {
            log::trace!("Mock: Blocked by wall");
        }
        self.update_zones();
    }

    fn rotate(&mut self, radians: f32) {
        self.physics.rotate(radians);
    }

    fn teleport(&mut self, pose: Pose) {
        self.physics.set_pose(pose);
        self.triggers.clear();
        self.sync_zones();
    }

    fn pose(&self) -> Pose {
        self.physics.pose()
    }

    fn drain_triggers(&mut self) -> Vec<Trigger> {
        std::mem::take(&mut self.triggers)
    }
}

impl Camera for MockEnvironment {
    fn capture(&mut self, width: u32, height: u32) -> Result<Vec<u8>> {
        self.renderer
            .capture(&self.track, self.physics.pose(), width, height)
    }
}

impl DistanceSensors for MockEnvironment {
    fn distances(&mut self) -> Vec<f32> {
        let pose = self.physics.pose();
        self.sensors
            .iter()
            .map(|sensor| {
                let (x, y) = pose.transform_point(sensor.offset_x, sensor.offset_y);
                let angle = pose.heading + sensor.angle_deg.to_radians();
                match self.track.ray_cast(x, y, angle, sensor.max_range) {
                    Some(d) => self.noise.apply(d, sensor.max_range),
                    None => f32::NAN,
                }
            })
            .collect()
    }
}
