//! Fixed-rate tick scheduler
//!
//! The tick thread is the single owner of the [`ActionArbiter`] and the
//! environment. Every tick runs, in order:
//!
//! ```text
//! 1. Drain queued control events into the arbiter
//! 2. Direct client: blocking-read one command byte, apply it
//! 3. Evaluate the arbiter (Reset -> respawn + Stop), apply the action for dt
//! 4. Drain triggers (Disqualification -> Out, Milestone -> reward + 1),
//!    publish status
//! 5. Capture the stream frame, publish it, push it to the viewer
//! 6. Direct client: capture, range, respond
//! ```
//!
//! Steps 2 and 6 make up the direct-control exchange. Because step 2 blocks,
//! a connected direct client paces the whole loop.

use crate::config::{CaptureConfig, Config, SimulationConfig};
use crate::control::arbiter::ActionArbiter;
use crate::control::status::StatusBoard;
use crate::core::environment::Environment;
use crate::core::types::{Action, ControlEvent, Pose, Trigger};
use crate::streaming::direct_server::DirectEndpoint;
use crate::streaming::video_server::StreamEndpoint;
use crate::streaming::wire::DirectCommand;
use crossbeam_channel::Receiver;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Instant;

/// Tick-thread owner of arbiter, world and per-tick endpoints.
pub struct Simulation {
    arbiter: ActionArbiter,
    env: Box<dyn Environment>,
    status: Arc<StatusBoard>,
    events: Receiver<ControlEvent>,
    direct: Option<DirectEndpoint>,
    stream: Option<StreamEndpoint>,
    settings: SimulationConfig,
    capture: CaptureConfig,
    spawn_points: Vec<Pose>,
    initial_pose: Pose,
    rng: SmallRng,
}

impl Simulation {
    pub fn new(
        config: &Config,
        env: Box<dyn Environment>,
        status: Arc<StatusBoard>,
        events: Receiver<ControlEvent>,
    ) -> Self {
        let seed = config.simulation.random_seed;
        let rng = if seed == 0 {
            SmallRng::from_entropy()
        } else {
            SmallRng::seed_from_u64(seed)
        };
        Self {
            arbiter: ActionArbiter::new(),
            env,
            status,
            events,
            direct: None,
            stream: None,
            settings: config.simulation.clone(),
            capture: config.capture.clone(),
            spawn_points: config.spawn_poses(),
            initial_pose: config.simulation.start.to_pose(),
            rng,
        }
    }

    /// Attach the direct-control endpoint.
    pub fn with_direct(mut self, direct: DirectEndpoint) -> Self {
        self.direct = Some(direct);
        self
    }

    /// Attach the video stream endpoint.
    pub fn with_stream(mut self, stream: StreamEndpoint) -> Self {
        self.stream = Some(stream);
        self
    }

    pub fn arbiter(&self) -> &ActionArbiter {
        &self.arbiter
    }

    pub fn pose(&self) -> Pose {
        self.env.pose()
    }

    /// Run ticks at the configured rate until `running` is cleared.
    pub fn run(&mut self, running: &AtomicBool) {
        let interval = self.settings.tick_interval();
        let mut last_time = Instant::now();

        log::info!(
            "Simulation loop started: {} Hz, interval={:?}",
            self.settings.tick_rate_hz,
            interval
        );

        while running.load(Ordering::Relaxed) {
            let loop_start = Instant::now();
            let dt = loop_start.duration_since(last_time).as_secs_f32();
            last_time = loop_start;

            self.tick(dt);

            // Sleep for remaining interval
            let elapsed = loop_start.elapsed();
            if elapsed < interval {
                thread::sleep(interval - elapsed);
            }
        }

        log::info!("Simulation loop terminated");
    }

    /// Advance one tick covering `dt` seconds of wall time.
    pub fn tick(&mut self, dt: f32) {
        while let Ok(event) = self.events.try_recv() {
            let action = self.arbiter.handle(event);
            log::debug!("Arbiter: {:?} -> {:?}", event, action);
        }

        let command = self.direct.as_mut().and_then(|d| d.receive());
        if let Some(command) = command {
            self.apply_direct(command);
        }

        let evaluation = self.arbiter.evaluate();
        if evaluation.respawn {
            self.respawn();
        }
        self.apply(evaluation.action, dt);

        for trigger in self.env.drain_triggers() {
            match trigger {
                Trigger::Disqualification => {
                    if !self.arbiter.is_out() {
                        log::info!("Vehicle out at {:?}", self.env.pose());
                    }
                    self.arbiter.disqualify();
                }
                Trigger::Milestone => {
                    self.status.add_reward(1);
                    log::debug!("Milestone reached, reward pending {}", self.status.peek_reward());
                }
            }
        }
        self.status.publish(self.arbiter.current_action());

        let frame = Arc::new(capture_frame(
            self.env.as_mut(),
            self.capture.stream_width,
            self.capture.stream_height,
        ));
        self.status.set_frame(Arc::clone(&frame));
        if let Some(stream) = self.stream.as_mut() {
            stream.push_frame(&frame);
        }

        if let Some(direct) = self.direct.as_mut()
            && direct.awaiting_response()
        {
            let frame = capture_frame(
                self.env.as_mut(),
                self.capture.direct_width,
                self.capture.direct_height,
            );
            let distances = self.env.distances();
            direct.respond(self.arbiter.is_out(), &frame, &distances);
        }
    }

    fn apply_direct(&mut self, command: DirectCommand) {
        let dt = self.settings.direct_delta_time;
        match command {
            DirectCommand::Reset => {
                self.arbiter.reset();
            }
            DirectCommand::Idle(byte) => {
                log::trace!("Direct: Ignoring byte {:02X}", byte);
            }
            _ if self.arbiter.is_out() => {
                log::trace!("Direct: {:?} ignored while out", command);
            }
            DirectCommand::RotateLeft => self.apply(Action::TurnLeft, dt),
            DirectCommand::RotateRight => self.apply(Action::TurnRight, dt),
            DirectCommand::MoveForward => self.apply(Action::Forward, dt),
        }
    }

    /// Move the vehicle according to `action` for `dt` seconds.
    fn apply(&mut self, action: Action, dt: f32) {
        let distance = self.settings.transport_speed * dt;
        let angle = self.settings.rotate_speed() * dt;
        match action {
            Action::Forward => self.env.translate(distance),
            Action::Backward => self.env.translate(-distance),
            Action::TurnLeft => self.env.rotate(angle),
            Action::TurnRight => self.env.rotate(-angle),
            Action::Stop | Action::Out | Action::Reset => {}
        }
    }

    fn respawn(&mut self) {
        let pose = self
            .spawn_points
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(self.initial_pose);
        self.env.teleport(pose);
        log::info!(
            "Respawned at ({:.2}, {:.2}, {:.1}°)",
            pose.x,
            pose.y,
            pose.heading.to_degrees()
        );
    }
}

/// Capture a frame, falling back to an empty one on failure.
fn capture_frame(env: &mut dyn Environment, width: u32, height: u32) -> Vec<u8> {
    match env.capture(width, height) {
        Ok(frame) => frame,
        Err(e) => {
            log::warn!("Frame capture failed: {}", e);
            Vec::new()
        }
    }
}
