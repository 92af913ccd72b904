//! CLI argument parsing using clap.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "unnest")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to scan for archives
    #[arg(value_name = "DIRECTORY")]
    pub directory: PathBuf,

    /// Path to a JSON settings file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Maximum extraction ratio before an archive is rejected as a zipbomb
    #[arg(long, value_name = "RATIO", value_parser = parse_ratio)]
    pub max_ratio: Option<f64>,

    /// Maximum nesting depth for archives found inside archives
    #[arg(long, value_name = "DEPTH", value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    pub max_depth: Option<usize>,

    /// Delete source archives after successful extraction
    #[arg(long)]
    pub no_preserve: bool,

    /// Abort the run at the first failed archive
    #[arg(long)]
    pub fail_fast: bool,

    /// Directory for rolling daily log files
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// File for persistent run statistics
    #[arg(long, value_name = "FILE")]
    pub stats_file: Option<PathBuf>,

    /// Torrent name attached to log events, supplied by the torrent client
    #[arg(long, value_name = "NAME")]
    pub torrent_name: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output the run summary in JSON format
    #[arg(short, long)]
    pub json: bool,
}

/// Parse an extraction ratio, rejecting values below 1
fn parse_ratio(s: &str) -> Result<f64, String> {
    let ratio: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("invalid ratio: {s}"))?;
    if !ratio.is_finite() {
        return Err(format!("ratio must be finite: {s}"));
    }
    if ratio < 1.0 {
        return Err(format!("ratio must be at least 1: {s}"));
    }
    Ok(ratio)
}
