//! Tile Inspector
//!
//! Prints the bins of a stored tile, optionally served for a descendant
//! tile or reduced to bucket-window averages.

use std::path::PathBuf;

use anyhow::Result;
use binning_common::TileIndex;
use clap::Parser;
use tile_views::BucketWindowConfig;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use tile_inspect::{inspect_buckets, inspect_scalar, load_tile};

/// Tile Inspector
#[derive(Parser, Debug)]
#[command(name = "tile-inspect")]
#[command(about = "Print the bins of a stored tile through pyramid views")]
struct Args {
    /// JSON tile file
    #[arg(long)]
    tile: PathBuf,

    /// Descendant tile to serve, as level/x/y
    #[arg(short, long)]
    target: Option<TileIndex>,

    /// Treat the tile as bucketed and print bucket-window averages
    #[arg(long)]
    average: bool,

    /// First bucket of the averaging window
    #[arg(long)]
    bucket_start: Option<i64>,

    /// Last bucket of the averaging window
    #[arg(long)]
    bucket_end: Option<i64>,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, env = "TILE_INSPECT_JSON_LOGS")]
    json_logs: bool,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args);

    let output = if args.average {
        let mut window = BucketWindowConfig::from_env();
        if let Some(start) = args.bucket_start {
            window.start_compare = start;
        }
        if let Some(end) = args.bucket_end {
            window.end_compare = end;
        }
        if window.is_empty() {
            warn!(
                start = window.start_compare,
                end = window.end_compare,
                "Bucket window selects no buckets, every bin averages to 0"
            );
        } else {
            info!(
                start = window.start_compare,
                end = window.end_compare,
                "Averaging bucket window"
            );
        }

        let tile = load_tile::<Vec<f64>>(&args.tile)?;
        inspect_buckets(&tile, args.target.as_ref(), &window)?
    } else {
        let tile = load_tile::<f64>(&args.tile)?;
        inspect_scalar(&tile, args.target.as_ref())?
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn init_tracing(args: &Args) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    // Logs go to stderr so stdout stays valid JSON
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr);

    if args.json_logs {
        builder.json().init();
    } else {
        builder.init();
    }
}
