//! Loading daemon configuration from disk.

use approx::assert_relative_eq;
use std::io::Write;
use tempfile::NamedTempFile;
use vahana_io::config::Config;
use vahana_io::streaming::TelemetryMode;
use vahana_io::Error;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn loads_full_config() {
    let file = write_config(
        r#"
[network]
bind_host = "127.0.0.1"
control_port = 7001
sensor_port = 7003
direct_port = 7002
stream_port = 7000

[telemetry]
mode = "disqualification"

[simulation]
tick_rate_hz = 50.0
transport_speed = 2.5
rotate_speed_deg = 45.0

[capture]
stream_width = 640
stream_height = 480
jpeg_quality = 90

[[spawn_points]]
x = 2.0
y = 3.0
heading_deg = 90.0

[[distance_sensors]]
offset_x = 0.3
angle_deg = -30.0
max_range = 8.0

[track]
width = 30.0
height = 12.0
milestones = []

[[track.walls]]
x1 = 10.0
y1 = 0.0
x2 = 10.0
y2 = 6.0

[logging]
level = "debug"
"#,
    );

    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.network.stream_port, 7000);
    assert_eq!(config.telemetry.mode, TelemetryMode::Disqualification);
    assert_relative_eq!(config.simulation.tick_interval().as_secs_f32(), 0.02, epsilon = 1e-6);
    assert_relative_eq!(config.simulation.rotate_speed(), 45f32.to_radians());
    assert_eq!(config.capture.jpeg_quality, 90);
    // Unset capture fields keep their defaults
    assert_eq!(config.capture.direct_width, 160);

    let spawns = config.spawn_poses();
    assert_eq!(spawns.len(), 1);
    assert_relative_eq!(spawns[0].heading, std::f32::consts::FRAC_PI_2);

    assert_eq!(config.distance_sensors.len(), 1);
    assert_relative_eq!(config.distance_sensors[0].offset_x, 0.3);
    assert_eq!(config.track.walls.len(), 1);
    assert!(config.track.milestones.is_empty());
    assert_eq!(config.track.disqualification_zones.len(), 1);
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn saved_config_loads_back() {
    let file = NamedTempFile::new().unwrap();
    let mut config = Config::default();
    config.simulation.random_seed = 99;
    config.to_file(file.path()).unwrap();

    let loaded = Config::load(file.path()).unwrap();
    assert_eq!(loaded.simulation.random_seed, 99);
    assert_eq!(loaded.track.milestones.len(), 4);
}

#[test]
fn missing_file_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn invalid_values_are_rejected() {
    let file = write_config("[capture]\njpeg_quality = 0\n");
    assert!(matches!(Config::load(file.path()), Err(Error::Config(_))));

    let file = write_config("[track]\ncollision_mode = \"bounce\"\n");
    assert!(matches!(Config::load(file.path()), Err(Error::Config(_))));
}

#[test]
fn shipped_sample_config_is_valid() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("vahana.toml");
    let config = Config::load(path).unwrap();
    assert_eq!(config.network.control_port, 8081);
    assert_eq!(config.spawn_points.len(), 2);
    assert_eq!(config.distance_sensors.len(), 5);
    assert_eq!(config.track.milestones.len(), 4);
}
