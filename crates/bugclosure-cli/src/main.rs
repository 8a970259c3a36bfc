//! BugClosure CLI
//!
//! Simulates an application session against the filesystem provider:
//! screens move through their lifecycle while producer threads log.
//!
//! ## Usage
//!
//! ```bash
//! # Run a simulated session, 4 producers x 100 lines
//! bugclosure run
//!
//! # Force frequent rotation
//! bugclosure run --max-bytes 4096 --lines 500
//!
//! # Inspect what was written
//! bugclosure files
//!
//! # Name the next rotation would use
//! bugclosure next-name
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};

use bugclosure_core::config::{DEFAULT_BASE_DIRECTORY, DEFAULT_BASE_FILE_NAME};
use bugclosure_core::namer::next_name_today;
use bugclosure_core::{
    FsStorage, LifecycleEvent, LifecycleHub, Logger, LoggerConfig, StorageProvider,
    MAX_CHUNK_CHARS,
};

/// BugClosure - buffered, rotating application logs
#[derive(Parser)]
#[command(name = "bugclosure")]
#[command(version = "0.1.0")]
#[command(about = "BugClosure CLI - simulated screens driving the log pipeline")]
struct Cli {
    /// Root directory log directories are created under
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log directory below the data directory
    #[arg(long, global = true, default_value = DEFAULT_BASE_DIRECTORY)]
    dir: String,

    /// Base name of log files
    #[arg(long, global = true, default_value = DEFAULT_BASE_FILE_NAME)]
    name: String,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a session and write logs
    Run(RunArgs),

    /// List log files with their sizes
    Files,

    /// Print the file name the next rotation would create
    NextName,
}

#[derive(Args)]
struct RunArgs {
    /// Logger configuration as JSON; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Rotation threshold in megabytes
    #[arg(long, default_value_t = 10)]
    size_mb: u32,

    /// Rotation threshold in bytes, overrides --size-mb
    #[arg(long)]
    max_bytes: Option<u64>,

    /// Concurrent producer threads
    #[arg(long, default_value_t = 4)]
    producers: usize,

    /// Lines logged by each producer
    #[arg(long, default_value_t = 100)]
    lines: usize,

    /// Do not echo lines to the console
    #[arg(long)]
    no_console: bool,

    /// Log screen lifecycle transitions
    #[arg(long)]
    lifecycle_log: bool,

    /// Log simulated touch events
    #[arg(long)]
    touch: bool,
}

fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();
}

/// Get the default data directory (~/.bugclosure)
fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".bugclosure")
}

fn load_config(path: Option<&Path>) -> Result<LoggerConfig> {
    let Some(path) = path else {
        return Ok(LoggerConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    LoggerConfig::from_json_str(&raw).with_context(|| format!("parsing config {}", path.display()))
}

fn run_session(storage: FsStorage, dir: &str, name: &str, args: &RunArgs) -> Result<()> {
    let logger = Logger::builder()
        .config(load_config(args.config.as_deref())?)
        .storage(storage.clone())
        .build();

    if args.no_console {
        logger.set_console_output(false);
    }
    if args.lifecycle_log {
        logger.set_lifecycle_logging(true);
    }
    if args.touch {
        logger.set_touch_logging(true);
    }

    let hub = LifecycleHub::new();
    logger.initialize(&hub);

    logger.set_file_persistence(true);
    logger.set_file_info(dir, name, args.size_mb);
    if let Some(bytes) = args.max_bytes {
        logger.set_max_file_bytes(bytes);
    }
    if !logger.is_processing() {
        bail!("log processing did not start");
    }
    tracing::info!(
        dir,
        name,
        producers = args.producers,
        lines = args.lines,
        "session started"
    );

    for event in [
        LifecycleEvent::Created,
        LifecycleEvent::Started,
        LifecycleEvent::Resumed,
    ] {
        hub.publish("MainScreen", event);
    }

    let handles: Vec<_> = (0..args.producers)
        .map(|p| {
            let logger = logger.clone();
            let lines = args.lines;
            std::thread::spawn(move || {
                for i in 0..lines {
                    logger.info(format!("producer {p} event {i}"));
                }
            })
        })
        .collect();
    for handle in handles {
        if handle.join().is_err() {
            bail!("producer thread panicked");
        }
    }

    logger.debug("payload ".repeat(MAX_CHUNK_CHARS / 4));
    let payload = serde_json::json!({
        "screen": "Checkout",
        "cart": { "items": 3, "total": 42.5 },
        "flags": ["express", "gift"],
    });
    let pretty = logger.pretty_print_json(Some(&payload.to_string()));
    logger.verbose(pretty);

    if args.touch {
        logger.on_touch(Some("checkout_button"));
        logger.on_touch(None);
    }

    for event in [
        LifecycleEvent::Paused,
        LifecycleEvent::Stopped,
        LifecycleEvent::Destroyed,
    ] {
        hub.publish("MainScreen", event);
    }
    logger.close_logger();

    let errors = logger.error_count();
    tracing::info!(errors, "session finished");
    if errors > 0 {
        bail!("log pipeline reported {errors} error(s)");
    }

    println!("Session complete");
    print_files(&storage, dir)
}

fn print_files(storage: &FsStorage, dir: &str) -> Result<()> {
    let names = storage.list_names(dir)?;
    if names.is_empty() {
        println!("No log files in {}", storage.root().join(dir).display());
        return Ok(());
    }

    println!("Log files in {}:", storage.root().join(dir).display());
    for name in &names {
        let path = storage.root().join(dir).join(name);
        let size = std::fs::metadata(&path)
            .with_context(|| format!("reading {}", path.display()))?
            .len();
        println!("  {name}  {size} bytes");
    }
    println!("{} file(s)", names.len());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let data_dir = cli.data_dir.unwrap_or_else(default_data_dir);
    let storage = FsStorage::new(&data_dir);

    match cli.command {
        Commands::Run(args) => run_session(storage, &cli.dir, &cli.name, &args)?,
        Commands::Files => print_files(&storage, &cli.dir)?,
        Commands::NextName => {
            let existing = storage.list_names(&cli.dir)?;
            println!("{}", next_name_today(&cli.name, &existing));
        }
    }

    Ok(())
}
