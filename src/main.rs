//! Pixel Color Sampling CLI
//!
//! Samples three screen coordinates in rounds and publishes the
//! representative colors as JSON, either to stdout or as a PATCH to a URL.

use chrono::Utc;
use clap::Parser;
use pxcolor::{
    capture::{parse_click, ChannelCapture, CoordinateCapture, FileConfig, MockProbe, PickConfig},
    metrics::MetricsSnapshot,
    process::{kill_by_name, ProcessControl, SpawnedProcesses},
    sink::{PatchSink, Sink},
    PxColorPipe, SmoothingAverager, Strategy, TrackedCoordinate,
};
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Sample pixel colors at three screen coordinates and publish them.
#[derive(Debug, Parser)]
#[command(name = "pxcolor", version, about)]
struct Args {
    /// PATCH target for the JSON result; stdout is used when omitted.
    url: Option<String>,

    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Rounds to run (0 runs until interrupted).
    #[arg(long)]
    rounds: Option<u32>,

    /// Aggregation strategy.
    #[arg(long, value_enum)]
    strategy: Option<Strategy>,

    /// Samples per coordinate per round.
    #[arg(long)]
    hex_max: Option<u32>,

    /// Pick the three coordinates interactively (`x,y` lines on stdin).
    #[arg(long)]
    pick: bool,

    /// Program to launch before sampling.
    #[arg(long)]
    launch: Option<PathBuf>,

    /// Process name to kill on exit.
    ///
    /// Only processes started by this run with --launch are found; other
    /// running programs of that name are left alone.
    #[arg(long)]
    kill: Option<String>,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    info!("pxcolor v{}", pxcolor::VERSION);

    let mut config = match &args.config {
        Some(path) => match FileConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => FileConfig::default(),
    };
    if let Some(url) = args.url.clone() {
        config.output.url = Some(url);
    }
    if let Some(rounds) = args.rounds {
        config.output.rounds = rounds;
    }
    if let Some(strategy) = args.strategy {
        config.aggregation.strategy = strategy;
    }
    if let Some(hex_max) = args.hex_max {
        config.sampler.hex_max = hex_max;
    }

    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);
    let handler = ctrlc::set_handler(move || {
        // a second signal while the current round is still running exits at once
        if !flag.swap(false, Ordering::SeqCst) {
            std::process::exit(130);
        }
        eprintln!("Interrupted, stopping after the current round");
    });
    if let Err(e) = handler {
        warn!("Failed to install signal handler: {}", e);
    }

    let mut processes = SpawnedProcesses::new();
    if let Some(path) = &args.launch {
        if let Err(e) = processes.launch(path) {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }

    if args.pick {
        match pick_coordinates(&config.pick) {
            Ok(coords) => config.sampler.coordinates = coords,
            Err(e) => {
                eprintln!("Failed to pick coordinates: {}", e);
                std::process::exit(1);
            }
        }
    }

    let mut sink = match &config.output.url {
        Some(url) => {
            let timeout = Duration::from_millis(config.output.request_timeout_ms);
            match PatchSink::with_timeout(url, timeout) {
                Ok(patch) => Sink::Patch(patch),
                Err(e) => {
                    eprintln!("{}", e);
                    std::process::exit(1);
                }
            }
        }
        None => Sink::stdout(),
    };

    let metrics = Metrics::start(config.output.metrics_port);
    let strategy = config.aggregation.strategy;
    let mut averager = SmoothingAverager::new(strategy.mean_kind().unwrap_or_default());
    let mut probe = MockProbe::sleeping();
    let mut snapshot = MetricsSnapshot::default();
    let interval = Duration::from_millis(config.output.round_interval_ms);

    info!(
        strategy = ?strategy,
        hex_max = config.sampler.hex_max,
        sink = %sink.describe(),
        "Sampling with mock probe"
    );

    let mut round: u32 = 0;
    while running.load(Ordering::SeqCst)
        && (config.output.rounds == 0 || round < config.output.rounds)
    {
        round += 1;

        let mut pipe = PxColorPipe::new(config.sampler.clone());
        pipe.sample(&mut probe)
            .decode()
            .aggregate_with(strategy, &mut averager);
        let samples = pipe.colors().total_samples() as u64;
        let colors = pipe.aggregate().map(|a| *a.colors());

        let published = match pipe.to_json().deliver(&mut sink) {
            Ok(Some(response)) if !response.is_success() => {
                warn!(round, status = response.status, body = %response.body, "Endpoint rejected colors");
                false
            }
            Ok(_) => {
                info!(round, samples, "Round published");
                true
            }
            Err(e) => {
                warn!(round, error = %e, "Round failed");
                false
            }
        };

        snapshot.record_round(samples, colors.filter(|_| published), Utc::now());
        metrics.update(&snapshot);

        pause(interval, &running);
    }

    if let Some(name) = &args.kill {
        if let Err(e) = kill_by_name(&mut processes, name) {
            warn!("{}", e);
        }
    }

    info!(
        "Done. {} rounds, {} failed, {} samples",
        snapshot.rounds, snapshot.rounds_failed, snapshot.samples
    );
}

/// Reads `x,y` clicks from stdin until three are picked or the timeout hits.
fn pick_coordinates(
    config: &PickConfig,
) -> Result<Vec<TrackedCoordinate>, pxcolor::capture::CaptureError> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            match parse_click(&line) {
                Some(click) => {
                    if tx.send(click).is_err() {
                        break;
                    }
                }
                None => warn!("Ignoring click {:?}, expected x,y", line),
            }
        }
    });

    info!("Click the three coordinates (enter x,y per line)");
    let coords = ChannelCapture::new(rx).capture(config.timeout())?;
    Ok(coords.as_slice().to_vec())
}

/// Sleeps for `interval`, waking early when interrupted.
///
/// An interval too large for a deadline sleeps until interrupted.
fn pause(interval: Duration, running: &AtomicBool) {
    const STEP: Duration = Duration::from_millis(100);

    let deadline = Instant::now().checked_add(interval);
    while running.load(Ordering::SeqCst) {
        let step = match deadline {
            Some(deadline) => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    break;
                }
                remaining.min(STEP)
            }
            None => STEP,
        };
        std::thread::sleep(step);
    }
}

/// Publishes round metrics through the exporter when it is enabled.
struct Metrics {
    #[cfg(feature = "metrics")]
    state: Option<Arc<tokio::sync::RwLock<pxcolor::metrics::MetricsState>>>,
}

impl Metrics {
    #[cfg(feature = "metrics")]
    fn start(port: u16) -> Self {
        use pxcolor::metrics::{MetricsRegistry, MetricsServer, MetricsServerConfig};

        if port == 0 {
            return Self { state: None };
        }
        let registry = match MetricsRegistry::new() {
            Ok(registry) => registry,
            Err(e) => {
                warn!("Metrics disabled: {}", e);
                return Self { state: None };
            }
        };
        let server = MetricsServer::new(MetricsServerConfig::with_port(port), registry);
        let state = server.state();

        std::thread::spawn(move || {
            let runtime = match tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(e) => {
                    warn!("Failed to start metrics runtime: {}", e);
                    return;
                }
            };
            if let Err(e) = runtime.block_on(server.run()) {
                warn!("Metrics server stopped: {}", e);
            }
        });

        Self { state: Some(state) }
    }

    #[cfg(not(feature = "metrics"))]
    fn start(port: u16) -> Self {
        if port != 0 {
            warn!(port, "Metrics port set but the metrics feature is disabled");
        }
        Self {}
    }

    fn update(&self, snapshot: &MetricsSnapshot) {
        #[cfg(feature = "metrics")]
        if let Some(state) = &self.state {
            state.blocking_write().update(snapshot);
        }
        tracing::debug!(
            rounds = snapshot.rounds,
            failed = snapshot.rounds_failed,
            samples = snapshot.samples,
            "Metrics updated"
        );
    }
}
