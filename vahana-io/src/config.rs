//! Configuration for the VahanaIO daemon
//!
//! Loads configuration from a TOML file. Every field has a default, so an
//! empty file yields a working simulator on the standard ports.
//!
//! ```toml
//! [network]
//! bind_host = "0.0.0.0"
//! control_port = 8081
//! sensor_port = 8083
//! direct_port = 8082
//! stream_port = 8080
//!
//! [telemetry]
//! mode = "full"            # or "disqualification"
//!
//! [simulation]
//! tick_rate_hz = 30.0
//! transport_speed = 1.0    # m/s
//! rotate_speed_deg = 90.0  # deg/s
//! direct_delta_time = 0.1  # s applied per direct command
//! random_seed = 0          # 0 = random spawn selection each run
//!
//! [[spawn_points]]
//! x = 3.0
//! y = 10.0
//! heading_deg = 90.0
//!
//! [[distance_sensors]]
//! angle_deg = 0.0
//! max_range = 20.0
//! ```

use crate::core::types::Pose;
use crate::devices::mock::config::TrackConfig;
use crate::error::{Error, Result};
use crate::streaming::TelemetryMode;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Top-level daemon configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
    /// Respawn locations, one is picked at random on reset
    #[serde(default = "default_spawn_points")]
    pub spawn_points: Vec<PoseConfig>,
    /// Proximity sensors, reported in this order on the direct port
    #[serde(default = "default_distance_sensors")]
    pub distance_sensors: Vec<DistanceSensorConfig>,
    #[serde(default)]
    pub track: TrackConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Listening ports
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkConfig {
    #[serde(default = "default_bind_host")]
    pub bind_host: String,
    /// Framed movement commands
    #[serde(default = "default_control_port")]
    pub control_port: u16,
    /// Poll/response telemetry
    #[serde(default = "default_sensor_port")]
    pub sensor_port: u16,
    /// Lock-step direct control
    #[serde(default = "default_direct_port", alias = "direc_port")]
    pub direct_port: u16,
    /// MJPEG video stream
    #[serde(default = "default_stream_port")]
    pub stream_port: u16,
}

fn default_bind_host() -> String {
    "0.0.0.0".to_string()
}
fn default_control_port() -> u16 {
    8081
}
fn default_sensor_port() -> u16 {
    8083
}
fn default_direct_port() -> u16 {
    8082
}
fn default_stream_port() -> u16 {
    8080
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bind_host: default_bind_host(),
            control_port: default_control_port(),
            sensor_port: default_sensor_port(),
            direct_port: default_direct_port(),
            stream_port: default_stream_port(),
        }
    }
}

impl NetworkConfig {
    /// `host:port` bind address for one endpoint.
    pub fn address(&self, port: u16) -> String {
        format!("{}:{}", self.bind_host, port)
    }
}

/// Sensor port behaviour
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TelemetryConfig {
    #[serde(default)]
    pub mode: TelemetryMode,
}

/// Tick loop and vehicle motion
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulationConfig {
    /// Fixed tick rate, also the video frame rate
    #[serde(default = "default_tick_rate_hz")]
    pub tick_rate_hz: f32,
    /// Linear speed for Forward/Backward (m/s)
    #[serde(default = "default_transport_speed")]
    pub transport_speed: f32,
    /// Turn rate for TurnLeft/TurnRight (deg/s)
    #[serde(default = "default_rotate_speed_deg")]
    pub rotate_speed_deg: f32,
    /// Elapsed time applied for one direct-port command (s)
    #[serde(default = "default_direct_delta_time")]
    pub direct_delta_time: f32,
    /// Seed for spawn selection and sensor noise (0 = entropy)
    #[serde(default)]
    pub random_seed: u64,
    /// Pose at startup
    #[serde(default = "default_start_pose")]
    pub start: PoseConfig,
}

fn default_tick_rate_hz() -> f32 {
    30.0
}
fn default_transport_speed() -> f32 {
    1.0
}
fn default_rotate_speed_deg() -> f32 {
    90.0
}
fn default_direct_delta_time() -> f32 {
    0.1
}
fn default_start_pose() -> PoseConfig {
    PoseConfig {
        x: 3.0,
        y: 10.0,
        heading_deg: 90.0,
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: default_tick_rate_hz(),
            transport_speed: default_transport_speed(),
            rotate_speed_deg: default_rotate_speed_deg(),
            direct_delta_time: default_direct_delta_time(),
            random_seed: 0,
            start: default_start_pose(),
        }
    }
}

/// Accepted tick rate range (Hz)
pub const TICK_RATE_RANGE: std::ops::RangeInclusive<f32> = 0.1..=1000.0;

impl SimulationConfig {
    /// Wall time between ticks. Rates outside [`TICK_RATE_RANGE`] are clamped.
    pub fn tick_interval(&self) -> Duration {
        let rate = self
            .tick_rate_hz
            .clamp(*TICK_RATE_RANGE.start(), *TICK_RATE_RANGE.end());
        Duration::try_from_secs_f32(1.0 / rate).unwrap_or(Duration::from_secs(10))
    }

    pub fn rotate_speed(&self) -> f32 {
        self.rotate_speed_deg.to_radians()
    }
}

/// Camera resolutions
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CaptureConfig {
    #[serde(default = "default_stream_width")]
    pub stream_width: u32,
    #[serde(default = "default_stream_height")]
    pub stream_height: u32,
    #[serde(default = "default_direct_width")]
    pub direct_width: u32,
    #[serde(default = "default_direct_height")]
    pub direct_height: u32,
    /// JPEG quality (1-100)
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
    /// Horizontal field of view
    #[serde(default = "default_field_of_view_deg")]
    pub field_of_view_deg: f32,
}

fn default_stream_width() -> u32 {
    320
}
fn default_stream_height() -> u32 {
    240
}
fn default_direct_width() -> u32 {
    160
}
fn default_direct_height() -> u32 {
    120
}
fn default_jpeg_quality() -> u8 {
    75
}
fn default_field_of_view_deg() -> f32 {
    90.0
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            stream_width: default_stream_width(),
            stream_height: default_stream_height(),
            direct_width: default_direct_width(),
            direct_height: default_direct_height(),
            jpeg_quality: default_jpeg_quality(),
            field_of_view_deg: default_field_of_view_deg(),
        }
    }
}

/// Pose as written in config files (heading in degrees)
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct PoseConfig {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub heading_deg: f32,
}

impl PoseConfig {
    pub fn to_pose(self) -> Pose {
        Pose::new(self.x, self.y, self.heading_deg.to_radians())
    }
}

fn default_spawn_points() -> Vec<PoseConfig> {
    vec![default_start_pose()]
}

/// One ray-cast proximity sensor, mounted relative to the vehicle centre
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct DistanceSensorConfig {
    /// Forward offset (m)
    #[serde(default)]
    pub offset_x: f32,
    /// Leftward offset (m)
    #[serde(default)]
    pub offset_y: f32,
    /// Ray direction relative to heading, positive = left
    #[serde(default)]
    pub angle_deg: f32,
    /// Hits beyond this range read as NaN
    #[serde(default = "default_max_range")]
    pub max_range: f32,
}

fn default_max_range() -> f32 {
    20.0
}

/// Ten sensors fanned from left (+90°) to right (-90°).
fn default_distance_sensors() -> Vec<DistanceSensorConfig> {
    (0..10)
        .map(|i| DistanceSensorConfig {
            offset_x: 0.0,
            offset_y: 0.0,
            angle_deg: 90.0 - i as f32 * 20.0,
            max_range: default_max_range(),
        })
        .collect()
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            telemetry: TelemetryConfig::default(),
            simulation: SimulationConfig::default(),
            capture: CaptureConfig::default(),
            spawn_points: default_spawn_points(),
            distance_sensors: default_distance_sensors(),
            track: TrackConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load and validate configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the tick loop or servers cannot run with
    pub fn validate(&self) -> Result<()> {
        let sim = &self.simulation;
        if !TICK_RATE_RANGE.contains(&sim.tick_rate_hz) {
            return Err(Error::Config(format!(
                "tick_rate_hz must be within {:?}, got {}",
                TICK_RATE_RANGE, sim.tick_rate_hz
            )));
        }
        if sim.transport_speed < 0.0 || sim.rotate_speed_deg < 0.0 {
            return Err(Error::Config("speeds must not be negative".to_string()));
        }
        if sim.direct_delta_time < 0.0 {
            return Err(Error::Config(
                "direct_delta_time must not be negative".to_string(),
            ));
        }

        let cap = &self.capture;
        if cap.stream_width == 0
            || cap.stream_height == 0
            || cap.direct_width == 0
            || cap.direct_height == 0
        {
            return Err(Error::Config(
                "capture resolutions must be non-zero".to_string(),
            ));
        }
        if !(1..=100).contains(&cap.jpeg_quality) {
            return Err(Error::Config(format!(
                "jpeg_quality must be 1-100, got {}",
                cap.jpeg_quality
            )));
        }

        let net = &self.network;
        let ports = [
            net.control_port,
            net.sensor_port,
            net.direct_port,
            net.stream_port,
        ];
        let unique: HashSet<u16> = ports.iter().copied().filter(|p| *p != 0).collect();
        let non_ephemeral = ports.iter().filter(|p| **p != 0).count();
        if unique.len() != non_ephemeral {
            return Err(Error::Config(format!("ports must be distinct: {:?}", ports)));
        }

        if let Some(sensor) = self
            .distance_sensors
            .iter()
            .find(|s| !(s.max_range > 0.0))
        {
            return Err(Error::Config(format!(
                "distance sensor max_range must be positive: {:?}",
                sensor
            )));
        }

        self.track.validate()
    }

    /// Spawn poses in world frame
    pub fn spawn_poses(&self) -> Vec<Pose> {
        self.spawn_points.iter().map(|p| p.to_pose()).collect()
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, contents)?;
        Ok(())
    }
}
