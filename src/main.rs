//! chunkmap - runs the collector against the procedural demo host and serves
//! the map over HTTP.
//!
//! Usage: cargo run --release -- [OPTIONS]
//!
//! Options:
//!   --config <FILE>      JSON config file (see `AppConfig`)
//!   --port <PORT>        Map server port (default: 8080)
//!   --encoding <MODE>    `surface` or `voxels` (default: voxels)
//!   --ticks <N>          Stop after N host ticks (default: run forever)

use std::path::Path;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tokio::sync::oneshot;

use chunkmap::core::{AppConfig, EncodingMode};
use chunkmap::sampling::{SamplingScheduler, SnapshotExporter};
use chunkmap::world::DemoWorld;
use chunkmap_server::{MapServer, SnapshotSource};

fn main() {
    chunkmap::core::logging::init();

    let args: Vec<String> = std::env::args().collect();
    let mut config = match parse_str_arg(&args, "--config") {
        Some(path) => match AppConfig::load(Path::new(&path)) {
            Ok(config) => config,
            Err(e) => {
                log::error!("Failed to load config: {}", e);
                std::process::exit(1);
            }
        },
        None => AppConfig::default(),
    };

    if let Some(port) = parse_arg::<u16>(&args, "--port") {
        config.server.port = port;
    }
    match parse_str_arg(&args, "--encoding").as_deref() {
        Some("surface") => config.collector.encoding = EncodingMode::Surface,
        Some("voxels") => config.collector.encoding = EncodingMode::Voxels,
        Some(other) => {
            log::error!("Unknown encoding '{}', expected surface or voxels", other);
            std::process::exit(1);
        }
        None => {}
    }
    let max_ticks = parse_arg::<u64>(&args, "--ticks");

    if let Err(e) = config.collector.validate() {
        log::error!("Invalid collector config: {}", e);
        std::process::exit(1);
    }

    let mut scheduler = SamplingScheduler::new(&config.collector);
    let exporter = SnapshotExporter::new(scheduler.store().clone(), scheduler.dedup().clone());

    log::info!(
        "Collector: {:?} encoding, every {} ticks ({:?}), radius {}, cap {} units",
        scheduler.encoding(),
        scheduler.interval(),
        config.collector.sample_period(),
        config.collector.max_radius,
        scheduler.store().capacity(),
    );

    let server = config
        .server
        .enabled
        .then(|| ServerThread::spawn(Arc::new(exporter.clone()), config.server.addr()));

    let mut world = DemoWorld::new(config.demo.clone());
    let tick_period = Duration::from_secs_f64(1.0 / config.collector.tick_rate as f64);
    let mut next_tick = Instant::now();

    loop {
        world.step();
        scheduler.tick(&world);

        if max_ticks.is_some_and(|max| world.tick() >= max) {
            break;
        }

        next_tick += tick_period;
        let now = Instant::now();
        if next_tick > now {
            std::thread::sleep(next_tick - now);
        } else {
            // Running behind: start the cadence over rather than bursting
            next_tick = now;
        }
    }

    let stats = exporter.stats();
    log::info!(
        "Stopped after {} ticks: {} units stored, {} sampled, {} loaded by host",
        world.tick(),
        stats.unit_count,
        stats.sampled_count,
        world.loaded_units(),
    );

    if let Some(server) = server {
        server.stop();
    }
}

/// Map server running on its own tokio runtime thread
struct ServerThread {
    shutdown: oneshot::Sender<()>,
    thread: JoinHandle<()>,
}

impl ServerThread {
    /// Start the server. A failure here is logged and never stops the tick loop.
    fn spawn(source: Arc<dyn SnapshotSource>, addr: String) -> Self {
        let (shutdown, mut shutdown_rx) = oneshot::channel::<()>();
        let thread = std::thread::spawn(move || {
            let rt = match tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    log::error!("Failed to create tokio runtime for map server: {}", e);
                    return;
                }
            };
            rt.block_on(async {
                let server = MapServer::start(source, addr);
                // Keep runtime alive while the server runs
                let requested = loop {
                    tokio::select! {
                        _ = &mut shutdown_rx => break true,
                        _ = tokio::time::sleep(Duration::from_secs(1)) => {
                            if server.is_finished() {
                                break false;
                            }
                        }
                    }
                };
                if requested {
                    server.stop();
                }
            });
        });

        Self { shutdown, thread }
    }

    /// Stop the server and wait for its runtime to shut down
    fn stop(self) {
        // Send fails only if the server already exited on its own
        let _ = self.shutdown.send(());
        if self.thread.join().is_err() {
            log::error!("Map server thread panicked");
        }
    }
}

fn parse_str_arg(args: &[String], name: &str) -> Option<String> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn parse_arg<T: std::str::FromStr>(args: &[String], name: &str) -> Option<T> {
    parse_str_arg(args, name).and_then(|s| s.parse().ok())
}
