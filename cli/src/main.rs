//! chunkmap CLI — inspect chunk layouts and benchmark in-place collect.
//!
//! # Commands
//! ```
//! chunkmap plan  --count <N> --batch <N> [--json]
//! chunkmap bench --size <bytes> --batch <N> [--single] [--pseudo] [--max-workers <N>]
//! chunkmap info
//! ```

use anyhow::{Context, Result};
use chunkmap_core::TaskConfig;
use chunkmap_observability::{init_tracing, LogConfig};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd_bench;
mod cmd_plan;

#[derive(Parser)]
#[command(
    name = "chunkmap",
    about = "Batch-parallel chunked map — chunkmap CLI",
    long_about = "
chunkmap CLI: preview how items split into chunks and measure collect
throughput for an in-place byte transform.

ENVIRONMENT VARIABLES:
  RUST_LOG    Overrides the log filter, e.g. chunkmap_core=trace
",
    version
)]
struct Cli {
    /// Enable verbose output (debug logs, per-chunk traces)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    /// JSON task config supplying defaults for batch size and flags
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the chunk ranges for a given item count and batch size
    Plan {
        /// Number of items
        #[arg(long)]
        count: usize,
        /// Items per chunk (values <= 0 are rejected as an invalid batch)
        #[arg(long, allow_negative_numbers = true)]
        batch: Option<i64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Benchmark an in-place transform driven through collect
    Bench {
        /// Buffer size in bytes
        #[arg(long, default_value_t = 64 * 1024 * 1024)]
        size: usize,
        /// Items per chunk (default: config batch_size)
        #[arg(long, allow_negative_numbers = true)]
        batch: Option<i64>,
        /// Run every chunk on the calling thread
        #[arg(long)]
        single: bool,
        /// Partition only, skip the transform
        #[arg(long)]
        pseudo: bool,
        /// Bound full-chunk workers to a rayon pool of this size
        #[arg(long)]
        max_workers: Option<usize>,
        /// Number of timed runs
        #[arg(long, default_value_t = 5)]
        iterations: u32,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show chunkmap build and default settings
    Info,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log = if cli.verbose {
        LogConfig::verbose()
    } else {
        LogConfig::default().with_level("warn")
    };
    let log = LogConfig {
        json: cli.log_json,
        ..log
    };
    init_tracing(&log).context("failed to initialise logging")?;

    let config = match &cli.config {
        Some(path) => TaskConfig::from_path(path)
            .with_context(|| format!("failed to load config '{}'", path.display()))?,
        None => TaskConfig::default(),
    };

    match cli.command {
        Commands::Plan { count, batch, json } => {
            let batch = batch.unwrap_or_else(|| default_batch(&config));
            cmd_plan::run(count, batch, json)
        }

        Commands::Bench { size, batch, single, pseudo, max_workers, iterations, json } => {
            let opts = cmd_bench::BenchOptions {
                size,
                batch: batch.unwrap_or_else(|| default_batch(&config)),
                single: single || config.single,
                pseudo: pseudo || config.pseudo,
                max_workers: max_workers.or(config.max_workers),
                iterations,
            };
            cmd_bench::run(&opts, json)
        }

        Commands::Info => cmd_info(&config),
    }
}

/// The config's batch size as a CLI batch value, saturating at `i64::MAX`.
fn default_batch(config: &TaskConfig) -> i64 {
    i64::try_from(config.batch_size).unwrap_or(i64::MAX)
}

fn cmd_info(config: &TaskConfig) -> Result<()> {
    println!("chunkmap v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Dispatch modes:");
    println!("  ✓ single     — every chunk on the calling thread");
    println!("  ✓ unbounded  — one thread per full chunk, remainder on caller");
    println!("  ✓ pool       — full chunks on a bounded rayon pool");
    println!();
    println!("Effective task config:");
    println!("{}", serde_json::to_string_pretty(config)?);
    println!();
    println!(
        "Available parallelism: {}",
        std::thread::available_parallelism()
            .map(|n| n.get().to_string())
            .unwrap_or_else(|_| "unknown".into())
    );
    Ok(())
}
