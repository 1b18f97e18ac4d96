//! dupesweep - duplicate file finder and cleaner
//!
//! Finds files with identical content below a directory using staged
//! narrowing (size, then an 8 KiB BLAKE3 prefix hash, then a full BLAKE3
//! hash), keeps the oldest copy of each set and removes the rest after
//! explicit confirmation, through the system trash where available.
//!
//! The detection pipeline ([`duplicates`]) and the planner ([`plan`]) never
//! modify the filesystem; only [`actions::delete`] does.

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod plan;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};

use crate::actions::delete::{execute_plan, RemovalMethod};
use crate::actions::prompt::{available_drives, confirm, select_root};
use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use crate::error::ExitCode;
use crate::output::{console, JsonOutput, TextReport};
use crate::plan::DeletionPlan;
use crate::progress::Progress;

/// Run the whole program for parsed arguments and return the exit code.
///
/// # Errors
///
/// Returns an error for fatal conditions: bad configuration, a missing or
/// invalid root, failure to start the hashing pool, an unwritable report, or
/// an interrupted scan.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);
    if cli.no_color {
        yansi::disable();
    }

    let config = Config::load(cli.config.as_deref())
        .context("Failed to load configuration")?
        .with_cli_overrides(&cli);

    if cli.print_config {
        print!("{}", config.to_toml().context("Failed to render configuration")?);
        return Ok(ExitCode::Success);
    }

    let root = resolve_root(&cli)?;
    let handler = signal::install_handler()?;
    let shutdown = handler.get_flag();

    let hide_progress = cli.quiet || cli.no_progress;
    let progress = Arc::new(Progress::new(hide_progress));

    let mut finder_config = FinderConfig::default()
        .with_walker_config(config.walker_config())
        .with_mmap_threshold(config.mmap_threshold)
        .with_shutdown_flag(shutdown.clone())
        .with_progress_callback(progress.clone());
    if let Some(threads) = config.io_threads {
        finder_config = finder_config.with_io_threads(threads);
    }

    let (groups, summary) = DuplicateFinder::new(finder_config).find_duplicates(&root)?;
    let plan = DeletionPlan::from_scan(groups, &summary);

    TextReport::new(&plan, &summary)
        .write_to_path(&config.report_path)
        .with_context(|| format!("Failed to write report {}", config.report_path.display()))?;

    let scan_exit = ExitCode::for_outcome(!plan.is_empty(), summary.error_count());

    // Human-facing text goes to stderr when stdout carries JSON.
    let mut human: Box<dyn Write> = match cli.output {
        OutputFormat::Json => {
            JsonOutput::new(&plan, &summary, scan_exit).write_to(&mut io::stdout(), true)?;
            Box::new(io::stderr())
        }
        OutputFormat::Text => Box::new(io::stdout()),
    };

    if !cli.quiet && cli.output == OutputFormat::Text {
        console::write_phase_lines(&mut human, &summary)?;
        console::write_overview(&mut human, &plan, &summary)?;
        writeln!(human, "\nReport written to {}", config.report_path.display())?;
    }

    if plan.is_empty() {
        log::info!("No duplicates found");
        return Ok(scan_exit);
    }
    if cli.dry_run {
        writeln!(human, "Dry run: no files were changed.")?;
        return Ok(scan_exit);
    }

    let method = RemovalMethod::detect(cli.permanent);
    console::write_confirmation_notice(&mut human, &plan, method, cli.permanent, &config.report_path)?;

    let confirmed = if cli.yes {
        true
    } else if !io::stdin().is_terminal() {
        log::warn!("stdin is not a terminal; pass --yes to delete without a prompt");
        false
    } else {
        let question = format!("Delete {} files?", plan.stats.files_to_delete);
        confirm(&mut io::stdin().lock(), &mut human, &question)?
    };

    if handler.is_shutdown_requested() {
        return Err(FinderError::Interrupted.into());
    }
    if !confirmed {
        writeln!(human, "Deletion cancelled. No files were changed.")?;
        return Ok(scan_exit);
    }

    let result = execute_plan(&plan, method, Some(&shutdown), Some(progress.as_ref()));
    console::write_deletion_summary(&mut human, &result, method, &config.report_path)?;

    if result.interrupted {
        return Ok(ExitCode::Interrupted);
    }
    Ok(ExitCode::for_outcome(
        true,
        summary.error_count() + result.failure_count(),
    ))
}

fn resolve_root(cli: &Cli) -> Result<PathBuf> {
    if let Some(ref path) = cli.path {
        return Ok(path.clone());
    }
    if !io::stdin().is_terminal() {
        bail!("No PATH given and stdin is not a terminal");
    }
    select_root(&mut io::stdin().lock(), &mut io::stderr(), &available_drives())?
        .ok_or_else(|| anyhow!("No directory selected"))
}
