//! Input Tally CLI
//!
//! Counts keystrokes, clicks and mouse travel into hourly CSV files.

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use input_tally::{
    collector::Collector,
    config::Config,
    core::{ActivityDaemon, LockFileManager, ShutdownToken},
    VERSION,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "input-tally")]
#[command(version = VERSION)]
#[command(about = "Per-minute keyboard and mouse activity counts in hourly CSV files", long_about = None)]
struct Cli {
    /// Log filter (overrides RUST_LOG), e.g. "info" or "input_tally=debug"
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Where the output directory comes from.
#[derive(Args)]
struct ConfigSource {
    /// Configuration file naming the output directory
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Output directory (bypasses the configuration file)
    #[arg(long, short)]
    output_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start counting and writing rows until interrupted
    Start {
        #[command(flatten)]
        source: ConfigSource,

        /// Bounded wait per loop iteration, in milliseconds
        #[arg(long, default_value = "10")]
        tick_ms: u64,
    },

    /// Show active lock files and the newest CSV file
    Status {
        #[command(flatten)]
        source: ConfigSource,
    },

    /// Show resolved configuration
    Config {
        #[command(flatten)]
        source: ConfigSource,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    let result = match cli.command {
        Commands::Start { source, tick_ms } => cmd_start(&source, tick_ms),
        Commands::Status { source } => cmd_status(&source),
        Commands::Config { source } => cmd_config(&source),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn init_logging(level: Option<&str>) {
    let filter = level
        .and_then(|l| EnvFilter::try_new(l).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("input_tally=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_config(source: &ConfigSource) -> Result<Config> {
    let config = match &source.output_dir {
        Some(dir) => Config::new(dir),
        None => Config::load(source.config.as_deref())?,
    };
    Ok(config)
}

fn cmd_start(source: &ConfigSource, tick_ms: u64) -> Result<()> {
    let config = resolve_config(source)?.with_tick_ms(tick_ms)?;
    config.validate()?;

    println!("Input Tally v{VERSION}");
    println!();
    println!("  Output directory: {}", config.output_dir.display());
    println!("  Tick: {}ms", config.tick.as_millis());
    println!();

    let shutdown = ShutdownToken::new();
    let handle = shutdown.clone();
    ctrlc::set_handler(move || handle.request()).context("unable to set Ctrl+C handler")?;

    let mut collector = Collector::new();
    collector
        .start()
        .context("input event source unavailable")?;

    let mut daemon = match ActivityDaemon::start(&config.output_dir, config.tick, &Local::now()) {
        Ok(daemon) => daemon,
        Err(e) => {
            collector.stop();
            return Err(e).context("unable to open initial CSV file");
        }
    };

    println!("Press Ctrl+C to stop");
    println!();

    let result = daemon.run(collector.receiver(), &shutdown);
    collector.stop();

    println!();
    println!("{}", daemon.stats().summary());

    result.context("activity daemon stopped")
}

fn cmd_status(source: &ConfigSource) -> Result<()> {
    let config = resolve_config(source)?;
    config.validate()?;

    println!("Input Tally Status");
    println!("==================");
    println!();
    println!("Output directory: {}", config.output_dir.display());
    println!();

    let locks = LockFileManager::new(&config.output_dir)
        .list()
        .with_context(|| format!("unable to list {}", config.output_dir.display()))?;

    if locks.is_empty() {
        println!("Active window: none (daemon not running)");
    } else {
        for lock in &locks {
            println!("Active window: {}", file_stem(lock));
        }
        if locks.len() > 1 {
            println!("Warning: more than one lock file present");
        }
    }

    match newest_csv(&config.output_dir)? {
        Some(csv) => println!("Newest CSV: {}", csv.display()),
        None => println!("No CSV files yet."),
    }

    Ok(())
}

fn cmd_config(source: &ConfigSource) -> Result<()> {
    let config = resolve_config(source)?;

    println!("Configuration");
    println!("=============");
    println!();
    match (&source.output_dir, &source.config) {
        (Some(_), _) => println!("Source: --output-dir"),
        (None, Some(path)) => println!("Config file: {}", path.display()),
        (None, None) => {
            println!("Config file lookup:");
            for path in Config::default_paths() {
                println!("  {}", path.display());
            }
        }
    }
    println!();
    println!("{}", serde_json::to_string_pretty(&config)?);

    Ok(())
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Buckets sort chronologically by name, so the newest file is the largest.
fn newest_csv(dir: &Path) -> Result<Option<PathBuf>> {
    let newest = std::fs::read_dir(dir)
        .with_context(|| format!("unable to list {}", dir.display()))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().map(|e| e == "csv").unwrap_or(false))
        .max();
    Ok(newest)
}
