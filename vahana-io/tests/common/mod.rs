//! Shared harness: runs every endpoint on ephemeral loopback ports.

#![allow(dead_code)]

use parking_lot::Mutex;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use vahana_io::config::{Config, PoseConfig};
use vahana_io::control::{StatusBoard, control_channel};
use vahana_io::core::environment::{Camera, DistanceSensors, Environment, VehicleBody};
use vahana_io::core::types::{Pose, Trigger};
use vahana_io::devices::mock::MockEnvironment;
use vahana_io::streaming::{CommandServer, DirectEndpoint, StreamEndpoint, TelemetryServer, socket};
use vahana_io::{Result, Simulation};

/// Generous bound for anything that waits on another thread.
pub const WAIT: Duration = Duration::from_secs(5);

/// Config bound to loopback ephemeral ports, ticking fast.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.network.bind_host = "127.0.0.1".to_string();
    config.network.control_port = 0;
    config.network.sensor_port = 0;
    config.network.direct_port = 0;
    config.network.stream_port = 0;
    config.simulation.tick_rate_hz = 100.0;
    config.simulation.random_seed = 11;
    config.capture.stream_width = 64;
    config.capture.stream_height = 48;
    config.capture.direct_width = 32;
    config.capture.direct_height = 24;
    config
}

/// Observable state of a [`FakeEnv`].
#[derive(Debug, Default)]
pub struct FakeState {
    pub pose: Pose,
    pub triggers: Vec<Trigger>,
    pub teleports: usize,
}

/// Open plane whose triggers are injected by the test.
pub struct FakeEnv {
    state: Arc<Mutex<FakeState>>,
}

impl FakeEnv {
    pub fn new(start: Pose) -> (Self, Arc<Mutex<FakeState>>) {
        let state = Arc::new(Mutex::new(FakeState {
            pose: start,
            ..Default::default()
        }));
        (
            Self {
                state: Arc::clone(&state),
            },
            state,
        )
    }
}

impl VehicleBody for FakeEnv {
    fn translate(&mut self, distance: f32) {
        let mut state = self.state.lock();
        let (sin, cos) = state.pose.heading.sin_cos();
        state.pose.x += distance * cos;
        state.pose.y += distance * sin;
    }

    fn rotate(&mut self, radians: f32) {
        self.state.lock().pose.heading += radians;
    }

    fn teleport(&mut self, pose: Pose) {
        let mut state = self.state.lock();
        state.pose = pose;
        state.triggers.clear();
        state.teleports += 1;
    }

    fn pose(&self) -> Pose {
        self.state.lock().pose
    }

    fn drain_triggers(&mut self) -> Vec<Trigger> {
        std::mem::take(&mut self.state.lock().triggers)
    }
}

impl Camera for FakeEnv {
    /// Tiny JPEG-shaped marker frame carrying the requested width.
    fn capture(&mut self, width: u32, _height: u32) -> Result<Vec<u8>> {
        Ok(vec![0xFF, 0xD8, width as u8, 0xFF, 0xD9])
    }
}

impl DistanceSensors for FakeEnv {
    fn distances(&mut self) -> Vec<f32> {
        vec![1.5, f32::NAN, 4.0]
    }
}

/// All four endpoints plus the tick loop, torn down on drop.
pub struct Daemon {
    pub control: SocketAddr,
    pub sensor: SocketAddr,
    pub direct: SocketAddr,
    pub stream: SocketAddr,
    pub status: Arc<StatusBoard>,
    running: Arc<AtomicBool>,
    handles: Vec<JoinHandle<()>>,
}

impl Daemon {
    pub fn with_mock(config: &Config) -> Self {
        Self::start(config, Box::new(MockEnvironment::new(config)))
    }

    pub fn with_fake(config: &Config) -> (Self, Arc<Mutex<FakeState>>) {
        let (env, state) = FakeEnv::new(config.simulation.start.to_pose());
        (Self::start(config, Box::new(env)), state)
    }

    pub fn start(config: &Config, env: Box<dyn Environment>) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let net = &config.network;
        let control_listener = socket::bind(net.address(net.control_port)).unwrap();
        let sensor_listener = socket::bind(net.address(net.sensor_port)).unwrap();
        let direct_listener = socket::bind(net.address(net.direct_port)).unwrap();
        let stream_listener = socket::bind(net.address(net.stream_port)).unwrap();

        let control = control_listener.local_addr().unwrap();
        let sensor = sensor_listener.local_addr().unwrap();
        let direct_addr = direct_listener.local_addr().unwrap();
        let stream_addr = stream_listener.local_addr().unwrap();

        let status = Arc::new(StatusBoard::new());
        let (handle, events) = control_channel();
        let command_server = CommandServer::new(control_listener, handle, Arc::clone(&running));
        let telemetry_server = TelemetryServer::new(
            sensor_listener,
            Arc::clone(&status),
            config.telemetry.mode,
            Arc::clone(&running),
        );
        let (direct_acceptor, direct) =
            DirectEndpoint::listen(direct_listener, Arc::clone(&running));
        let (stream_acceptor, stream) =
            StreamEndpoint::listen(stream_listener, Arc::clone(&running));

        let mut simulation = Simulation::new(config, env, Arc::clone(&status), events)
            .with_direct(direct)
            .with_stream(stream);

        let sim_running = Arc::clone(&running);
        let handles = vec![
            thread::spawn(move || {
                let _ = command_server.run();
            }),
            thread::spawn(move || {
                let _ = telemetry_server.run();
            }),
            thread::spawn(move || {
                let _ = direct_acceptor.run();
            }),
            thread::spawn(move || {
                let _ = stream_acceptor.run();
            }),
            thread::spawn(move || simulation.run(&sim_running)),
        ];

        Self {
            control,
            sensor,
            direct: direct_addr,
            stream: stream_addr,
            status,
            running,
            handles,
        }
    }
}

impl Drop for Daemon {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
    }
}

/// Poll `condition` until it holds or [`WAIT`] expires.
pub fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + WAIT;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    false
}

pub fn pose(x: f32, y: f32, heading_deg: f32) -> PoseConfig {
    PoseConfig { x, y, heading_deg }
}
