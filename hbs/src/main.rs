//! # HBS Rack Process
//!
//! Homes the carriage, loads the inventory and serves storage commands.
//!
//! Commands arrive as one JSON object per line on stdin; `status` and
//! `result` lines are written to stdout. Logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! # Run against the rack simulator
//! hbs --config config/hbs.toml --simulate
//!
//! # Verbose JSON logs
//! hbs -s -v --json
//!
//! # Store a box at column 3, level 2
//! echo '{"operation": "store", "x": 3, "z": 2}' | hbs -s
//! ```

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;

use clap::Parser;
use hbs::{Dispatcher, Flow, publish_abort};
use hbs_common::config::{ConfigError, ConfigLoader, HbsConfig, LogLevel};
use hbs_common::consts::DEFAULT_CONFIG_PATH;
use hbs_common::fault::MoveOutcome;
use hbs_common::io::DigitalIo;
use hbs_common::time::Clock;
use hbs_control_unit::storage::SnapshotStore;
use hbs_control_unit::{Carriage, StorageOrchestrator};
use hbs_hal::{DriverRegistry, SIMULATION_DRIVER};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Wait between checks of the shutdown flag while no command is pending.
const IDLE_POLL: Duration = Duration::from_millis(100);

type RackCarriage = Carriage<Box<dyn DigitalIo>, Box<dyn Clock>>;

/// HBS - high-bay storage rack control
#[derive(Parser, Debug)]
#[command(name = "hbs")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "High-bay storage rack: homing, storage commands, status publishing")]
struct Args {
    /// Path to the rack configuration (hbs.toml).
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Backplane driver.
    #[arg(short, long, default_value = SIMULATION_DRIVER)]
    driver: String,

    /// Force the simulation driver.
    #[arg(short = 's', long)]
    simulate: bool,

    /// Override the inventory snapshot path.
    #[arg(long, value_name = "FILE")]
    snapshot: Option<PathBuf>,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();
    let loaded = HbsConfig::load(&args.config);
    let log_level = loaded
        .as_ref()
        .map(|c| c.shared.log_level)
        .unwrap_or_default();
    setup_tracing(&args, log_level);

    info!("HBS v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = match loaded {
        Ok(config) => config,
        Err(ConfigError::FileNotFound) => {
            warn!(path = %args.config.display(), "No configuration file, using defaults");
            HbsConfig::default()
        }
        Err(e) => {
            error!("FATAL: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = run(&args, config) {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("HBS shutdown complete");
}

fn run(args: &Args, mut config: HbsConfig) -> Result<(), Box<dyn std::error::Error>> {
    config.validate()?;
    if let Some(ref snapshot) = args.snapshot {
        config.storage.snapshot_path = snapshot.clone();
    }

    let driver = if args.simulate {
        info!("Simulation mode enabled");
        SIMULATION_DRIVER
    } else {
        args.driver.as_str()
    };
    let registry = DriverRegistry::with_builtin();
    info!(driver, available = ?registry.list_drivers(), "Creating backplane");
    let backplane = registry.create(driver, &config)?;

    let mut carriage: RackCarriage = Carriage::new(
        backplane.io,
        backplane.clock,
        config.motion.clone(),
        config.conveyor.clone(),
    );

    let mut out = io::stdout();
    writeln!(out, "status BUSY")?;
    if let Err(fault) = home(&mut carriage) {
        carriage.stop_motion();
        publish_abort(&mut out, fault.code())?;
        return Err(fault.into());
    }

    let store = SnapshotStore::new(&config.storage.snapshot_path);
    let (inventory, origin) = match store.load_or_create() {
        Ok(loaded) => loaded,
        Err(e) => {
            carriage.stop_motion();
            publish_abort(&mut out, "err_storage_io")?;
            return Err(e.into());
        }
    };
    info!(path = %store.path().display(), occupied = inventory.occupied_count(), "Inventory ready");
    writeln!(out, "result {}", origin.code())?;

    let orchestrator = StorageOrchestrator::new(carriage, inventory, store);
    let mut dispatcher = Dispatcher::new(orchestrator, out);
    dispatcher.publish_idle()?;

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    })?;

    let commands = spawn_reader();
    info!("Waiting for commands. Cancel with Ctrl-C");
    while running.load(Ordering::SeqCst) {
        match commands.recv_timeout(IDLE_POLL) {
            Ok(payload) => {
                if dispatcher.handle(&payload)? == Flow::Shutdown {
                    break;
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                info!("Command input closed");
                break;
            }
        }
    }

    dispatcher.finish()?;
    Ok(())
}

/// Initialize Y, then Z, then X.
fn home(carriage: &mut RackCarriage) -> MoveOutcome {
    info!("Initializing axes");
    carriage.init_y()?;
    carriage.init_z()?;
    carriage.init_x()?;
    info!(x = ?carriage.x(), z = ?carriage.z(), "Axes initialized");
    Ok(())
}

/// Forward non-empty stdin lines to the dispatch loop.
fn spawn_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            let payload = line.trim();
            if payload.is_empty() {
                continue;
            }
            if tx.send(payload.to_string()).is_err() {
                break;
            }
        }
    });
    rx
}

/// Setup tracing subscriber based on CLI arguments.
fn setup_tracing(args: &Args, level: LogLevel) {
    let directive = if args.verbose {
        LogLevel::Debug.as_directive()
    } else {
        level.as_directive()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .compact()
            .init();
    }
}
