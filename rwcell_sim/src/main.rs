//! # Readers-Writers Simulator
//!
//! CLI front end for the rwcell coordination core: spawns the configured
//! number of writer and reader threads against one shared value and logs
//! every waiting / reader-count / completion event.
//!
//! Configuration comes from a TOML file (`--config`, or `config/sim.toml`
//! when present), with CLI flags overriding individual fields. The
//! `--engine` flag selects between the classic two-lock coordinator and the
//! native-RwLock comparison variant.

use clap::{Parser, ValueEnum};
use rwcell::{
    ConfigError, ConfigLoader, Coordinator, LogLevel, NativeCoordinator, RwCell, SimConfig,
    SimError, SimResult, run_simulation,
};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Which coordinator drives the shared cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Engine {
    /// Classic hand-rolled two-lock protocol (reader preference).
    Classic,
    /// parking_lot RwLock comparison variant.
    Native,
}

/// rwcell simulator: readers-writers contention demo
#[derive(Parser, Debug)]
#[command(name = "rwcell_sim")]
#[command(version)]
#[command(about = "Spawns reader and writer threads contending for one shared value")]
struct Args {
    /// Path to the simulation configuration TOML. Without this flag,
    /// `config/sim.toml` is used when present, built-in defaults otherwise.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the number of writer tasks.
    #[arg(long)]
    writers: Option<usize>,

    /// Override the number of reader tasks.
    #[arg(long)]
    readers: Option<usize>,

    /// Override the base RNG seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Override the lower jitter bound, in milliseconds.
    #[arg(long)]
    jitter_min_ms: Option<u64>,

    /// Override the upper jitter bound, in milliseconds.
    #[arg(long)]
    jitter_max_ms: Option<u64>,

    /// Coordinator implementation to run.
    #[arg(long, value_enum, default_value_t = Engine::Classic)]
    engine: Engine,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("FATAL: {e}");
            process::exit(1);
        }
    };

    setup_tracing(&args, config.log_level);

    info!("rwcell simulator v{} starting...", env!("CARGO_PKG_VERSION"));
    info!(
        writers = config.writers,
        readers = config.readers,
        seed = config.seed,
        engine = ?args.engine,
        "configuration loaded"
    );

    if let Err(e) = run(&args, &config) {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("simulator shutdown complete");
}

/// Load the config file (explicit path, default path, or built-in
/// defaults), apply CLI overrides, and validate the result.
fn build_config(args: &Args) -> Result<SimConfig, SimError> {
    let mut config = match &args.config {
        Some(path) => SimConfig::load(path).map_err(SimError::from)?,
        None => {
            let default_path = Path::new("config/sim.toml");
            match SimConfig::load(default_path) {
                Ok(config) => config,
                Err(ConfigError::FileNotFound) => SimConfig::default(),
                Err(e) => return Err(e.into()),
            }
        }
    };

    if let Some(writers) = args.writers {
        config.writers = writers;
    }
    if let Some(readers) = args.readers {
        config.readers = readers;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(jitter_min_ms) = args.jitter_min_ms {
        config.jitter_min_ms = jitter_min_ms;
    }
    if let Some(jitter_max_ms) = args.jitter_max_ms {
        config.jitter_max_ms = jitter_max_ms;
    }
    if args.verbose {
        config.log_level = LogLevel::Debug;
    }

    config.validate()?;
    Ok(config)
}

fn setup_tracing(args: &Args, level: LogLevel) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_filter()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true);

    if args.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run(args: &Args, config: &SimConfig) -> SimResult<()> {
    match args.engine {
        Engine::Classic => simulate(config, RwCell::new(0_i64)),
        Engine::Native => simulate(
            config,
            RwCell::with_coordinator(0_i64, NativeCoordinator::new()),
        ),
    }
}

fn simulate<C: Coordinator + 'static>(config: &SimConfig, cell: RwCell<i64, C>) -> SimResult<()> {
    let cell = Arc::new(cell);
    let reports = run_simulation(Arc::clone(&cell), config)?;

    // All tasks are joined, so the Arc is normally unique again; fall back
    // to a coordinated read if anything still holds a reference.
    let final_value = match Arc::try_unwrap(cell) {
        Ok(cell) => cell.into_inner(),
        Err(shared) => *shared.read_guard(),
    };

    info!(
        writes = reports.writes.len(),
        reads = reports.reads.len(),
        final_value,
        "simulation complete"
    );
    Ok(())
}
