//! VahanaIO - simulated vehicle daemon
//!
//! ## Threads
//!
//! - **control**: command port, serial clients
//! - **sensor**: telemetry port, serial clients
//! - **direct-accept** / **stream-accept**: gated accept loops handing
//!   sockets to the tick thread
//! - **main**: fixed-rate tick loop (simulation, direct and stream I/O)

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use vahana_io::control::{StatusBoard, control_channel};
use vahana_io::devices::create_environment;
use vahana_io::streaming::{CommandServer, DirectEndpoint, StreamEndpoint, TelemetryServer, socket};
use vahana_io::{Config, Error, Result, Simulation};

#[derive(Parser)]
#[command(name = "vahana-io")]
#[command(version, about = "Network control, telemetry and video for a simulated vehicle")]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Configuration file, positional form
    #[arg(value_name = "CONFIG", conflicts_with = "config")]
    path: Option<PathBuf>,

    /// Log filter, overrides [logging] level (RUST_LOG still wins)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.or(args.path);
    let config = match &config_path {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let level = args.log_level.as_deref().unwrap_or(&config.logging.level);
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    log::info!("VahanaIO v{} starting...", env!("CARGO_PKG_VERSION"));
    match &config_path {
        Some(path) => log::info!("Using config: {}", path.display()),
        None => log::info!("No config given, using defaults"),
    }

    // Set up shutdown signal handler
    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        r.store(false, Ordering::Relaxed);
    })
    .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    let net = &config.network;
    let control_listener = socket::bind(net.address(net.control_port))?;
    let sensor_listener = socket::bind(net.address(net.sensor_port))?;
    let direct_listener = socket::bind(net.address(net.direct_port))?;
    let stream_listener = socket::bind(net.address(net.stream_port))?;
    for (name, listener) in [
        ("Control", &control_listener),
        ("Sensor", &sensor_listener),
        ("Direct", &direct_listener),
        ("Stream", &stream_listener),
    ] {
        log::info!("{} listening on {}", name, listener.local_addr()?);
    }

    let status = Arc::new(StatusBoard::new());
    let (control, events) = control_channel();

    let command_server = CommandServer::new(control_listener, control, Arc::clone(&running));
    let telemetry_server = TelemetryServer::new(
        sensor_listener,
        Arc::clone(&status),
        config.telemetry.mode,
        Arc::clone(&running),
    );
    let (direct_acceptor, direct) = DirectEndpoint::listen(direct_listener, Arc::clone(&running));
    let (stream_acceptor, stream) = StreamEndpoint::listen(stream_listener, Arc::clone(&running));

    let handles = vec![
        spawn("control", move || command_server.run())?,
        spawn("sensor", move || telemetry_server.run())?,
        spawn("direct-accept", move || direct_acceptor.run())?,
        spawn("stream-accept", move || stream_acceptor.run())?,
    ];

    let env = create_environment(&config);
    let mut simulation = Simulation::new(&config, env, status, events)
        .with_direct(direct)
        .with_stream(stream);

    log::info!("VahanaIO running. Press Ctrl-C to stop.");
    simulation.run(&running);

    // Shutdown
    log::info!("Shutting down...");
    running.store(false, Ordering::Relaxed);
    drop(simulation);
    for handle in handles {
        let name = handle.thread().name().unwrap_or("worker").to_string();
        if handle.join().is_err() {
            log::error!("{} thread panicked", name);
        }
    }

    log::info!("VahanaIO stopped");
    Ok(())
}

/// Spawn a named server thread, logging the error it exits with.
fn spawn<F>(name: &str, f: F) -> Result<JoinHandle<()>>
where
    F: FnOnce() -> Result<()> + Send + 'static,
{
    let label = name.to_string();
    thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            if let Err(e) = f() {
                log::error!("{} error: {}", label, e);
            }
        })
        .map_err(|e| Error::Other(format!("Failed to spawn {}: {}", name, e)))
}
