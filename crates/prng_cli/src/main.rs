//! prng CLI - Command Line Access to Thread-Partitioned Random Numbers
//!
//! This is the operational entry point for the prng workspace.
//!
//! # Commands
//!
//! - `prng info` - Show the resolved pool settings and host parallelism
//! - `prng sample uniform|normal` - Draw variates from a seeded pool
//! - `prng resample <weights>...` - Draw category indices from weights
//!
//! # Configuration
//!
//! Settings resolve as defaults < `--config` TOML file < `PRNG_*`
//! environment variables < flags.
//!
//! # Architecture
//!
//! As the **S**ervice layer, this crate wires `prng_parallel` pools to the
//! command line; samples go to stdout and diagnostics to stderr.

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod error;

pub use error::{CliError, Result};

use commands::sample::{Distribution, Layout};
use config::{build_config, CliArgs, LogLevel};

/// Thread-partitioned random number generation CLI
#[derive(Parser)]
#[command(name = "prng")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output (debug log level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path (TOML format)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Seed for the pool (entropy when unset)
    #[arg(short, long, global = true)]
    seed: Option<u64>,

    /// Number of per-thread slots
    #[arg(short, long, global = true)]
    threads: Option<usize>,

    /// Slot alignment in bytes (power of two)
    #[arg(long, global = true)]
    alignment: Option<usize>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the resolved pool configuration
    Info,

    /// Draw uniform or normal variates
    Sample {
        /// Distribution to sample from
        #[arg(value_enum)]
        distribution: Distribution,

        /// Number of values (per row)
        #[arg(short = 'n', long, default_value = "10")]
        count: usize,

        /// Draw a matrix with this many rows
        #[arg(short, long, conflicts_with = "per_thread")]
        rows: Option<usize>,

        /// Draw one row from every slot in parallel
        #[arg(short, long)]
        per_thread: bool,

        /// Output format (lines, csv)
        #[arg(short, long, default_value = "lines")]
        format: String,
    },

    /// Draw category indices proportional to weights
    Resample {
        /// Category weights
        #[arg(required = true, num_args = 1.., allow_negative_numbers = true)]
        weights: Vec<f64>,

        /// Number of indices to draw
        #[arg(short = 'n', long, default_value = "1")]
        count: usize,

        /// Output format (lines, csv)
        #[arg(short, long, default_value = "lines")]
        format: String,
    },
}

impl From<&Cli> for CliArgs {
    fn from(cli: &Cli) -> Self {
        CliArgs {
            config_file: cli.config.clone(),
            seed: cli.seed,
            threads: cli.threads,
            alignment: cli.alignment,
            log_level: cli.log_level.clone(),
        }
    }
}

fn init_tracing(log_level: LogLevel) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level.as_filter_str())),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = build_config(&CliArgs::from(&cli))?;

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        config.log_level
    };
    init_tracing(log_level);
    info!(
        seed = ?config.pool.seed(),
        threads = ?config.pool.threads(),
        alignment = ?config.pool.alignment(),
        %log_level,
        "Configuration loaded"
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Info => commands::info::run(&config.pool, &mut out)?,
        Commands::Sample {
            distribution,
            count,
            rows,
            per_thread,
            format,
        } => {
            let layout = match (rows, per_thread) {
                (Some(rows), _) => Layout::Matrix { rows },
                (None, true) => Layout::PerThread,
                (None, false) => Layout::Single,
            };
            commands::sample::run(&config.pool, distribution, count, layout, &format, &mut out)?
        }
        Commands::Resample {
            weights,
            count,
            format,
        } => commands::resample::run(&config.pool, &weights, count, &format, &mut out)?,
    }

    out.flush()?;
    Ok(())
}
