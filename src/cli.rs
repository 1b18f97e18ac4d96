//! Command-line interface definitions for dupesweep.
//!
//! # Example
//!
//! ```bash
//! # Scan a drive, review duplicate_log.txt, confirm, move copies to the trash
//! dupesweep /media/roms
//!
//! # Only write the report
//! dupesweep /media/roms --dry-run
//!
//! # Also skip "Backups" folders, print the plan as JSON
//! dupesweep /media/roms --skip Backups --output json --dry-run
//!
//! # Verbose mode for debugging
//! dupesweep -v /media/roms
//! ```

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Find duplicate files and remove the newer copies.
///
/// dupesweep groups files by size, then by a hash of their first 8 KiB, then
/// by a full BLAKE3 hash. In every group of identical files the oldest copy is
/// kept. A report is written before anything is removed, and nothing is
/// removed without confirmation.
#[derive(Debug, Parser)]
#[command(name = "dupesweep")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory (or drive root) to scan; prompted for when omitted
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Additional directory name to skip (repeatable, case-insensitive exact match)
    #[arg(long = "skip", value_name = "NAME")]
    pub skip: Vec<String>,

    /// Do not skip the built-in directory names ($RECYCLE.BIN, System Volume Information, themes)
    #[arg(long)]
    pub no_default_skips: bool,

    /// Number of hashing threads (default: CPU count, between 2 and 16)
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..=256))]
    pub io_threads: Option<u32>,

    /// Files at least this large are hashed through a memory map (e.g. 64MiB)
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub mmap_threshold: Option<u64>,

    /// Where to write the plain-text report (default: duplicate_log.txt)
    #[arg(long = "report", value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Console output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Delete permanently instead of moving to the trash
    ///
    /// Warning: Files cannot be recovered after permanent deletion.
    #[arg(long)]
    pub permanent: bool,

    /// Do not ask for confirmation before deleting
    #[arg(short = 'y', long, conflicts_with = "dry_run")]
    pub yes: bool,

    /// Scan and write the report, but never delete
    #[arg(long)]
    pub dry_run: bool,

    /// Hide progress bars
    #[arg(long)]
    pub no_progress: bool,

    /// Follow symbolic links during scan
    ///
    /// Warning: May cause infinite loops if symlinks form cycles.
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Configuration file to load instead of the platform default
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub print_config: bool,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,

    /// Print fatal errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,
}

/// Console output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable overview
    Text,
    /// The deletion plan as JSON on stdout
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Parse a human-readable size string into bytes.
///
/// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB.
/// Case-insensitive. Numbers without suffix are treated as bytes.
///
/// # Examples
///
/// ```
/// use dupesweep::cli::parse_size;
///
/// assert_eq!(parse_size("1024").unwrap(), 1024);
/// assert_eq!(parse_size("1KB").unwrap(), 1000);
/// assert_eq!(parse_size("64MiB").unwrap(), 67_108_864);
/// ```
///
/// # Errors
///
/// Returns an error if the string is empty, contains an invalid number, or
/// an unknown size suffix.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }

    let (num_str, suffix) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(idx) => (&s[..idx], s[idx..].trim().to_uppercase()),
        None => (s, String::new()),
    };

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number: '{num_str}'"))?;

    let multiplier: u64 = match suffix.as_str() {
        "" | "B" => 1,
        "KB" | "K" => 1_000,
        "KIB" => 1_024,
        "MB" | "M" => 1_000_000,
        "MIB" => 1_048_576,
        "GB" | "G" => 1_000_000_000,
        "GIB" => 1_073_741_824,
        _ => return Err(format!("Unknown size suffix: '{suffix}'")),
    };

    Ok((num * multiplier as f64) as u64)
}
