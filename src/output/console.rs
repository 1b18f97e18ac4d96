//! Terminal rendering of scan results and deletion outcomes.
//!
//! Everything here writes to a caller-supplied writer so the binary can use
//! stdout while tests capture into a buffer. Colour comes from `yansi` and is
//! switched off globally with `--no-color`.

use std::io::{self, Write};
use std::path::Path;

use bytesize::ByteSize;
use yansi::Paint;

use crate::actions::delete::{BatchDeleteResult, RemovalMethod};
use crate::duplicates::{PhaseStats, ScanSummary};
use crate::output::report::format_time;
use crate::plan::DeletionPlan;

/// Number of groups shown as examples in the overview.
pub const EXAMPLE_GROUPS: usize = 5;

/// One line per hashing phase with worker count and throughput.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_phase_lines<W: Write>(w: &mut W, summary: &ScanSummary) -> io::Result<()> {
    writeln!(
        w,
        "Indexed {} files ({}) in {:.2?}",
        summary.total_files,
        ByteSize::b(summary.total_size),
        summary.walk_duration
    )?;
    writeln!(
        w,
        "Size grouping eliminated {} files",
        summary.eliminated_by_size
    )?;
    phase_line(w, "Quick hash", &summary.quick_hash)?;
    phase_line(w, "Full hash", &summary.full_hash)
}

fn phase_line<W: Write>(w: &mut W, name: &str, stats: &PhaseStats) -> io::Result<()> {
    if stats.input_files == 0 {
        return Ok(());
    }
    writeln!(
        w,
        "{name}: {} files with {} workers in {:.2?} ({:.0} files/sec), {} remain",
        stats.input_files,
        stats.threads,
        stats.duration,
        stats.files_per_sec(),
        stats.surviving_files
    )
}

/// Overview of the plan, with the first [`EXAMPLE_GROUPS`] groups as examples.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_overview<W: Write>(w: &mut W, plan: &DeletionPlan, summary: &ScanSummary) -> io::Result<()> {
    let stats = &plan.stats;
    writeln!(w)?;
    writeln!(w, "{}", "DUPLICATE ANALYSIS".bold())?;
    writeln!(w, "  Duplicate groups:      {}", stats.groups.bold())?;
    writeln!(
        w,
        "  Total duplicate files: {}",
        stats.files_to_keep + stats.files_to_delete
    )?;
    writeln!(w, "  Files to keep:         {}", stats.files_to_keep.green())?;
    writeln!(w, "  Files to delete:       {}", stats.files_to_delete.red())?;
    writeln!(
        w,
        "  Duplicate data size:   {}",
        ByteSize::b(stats.duplicate_data_size(&plan.groups))
    )?;
    writeln!(
        w,
        "  Wasted space:          {} ({:.1}% of scanned data)",
        ByteSize::b(stats.bytes_to_free).yellow(),
        stats.waste_percentage()
    )?;
    if summary.pruned_dirs > 0 {
        writeln!(w, "  Skipped folders:       {}", summary.pruned_dirs)?;
    }
    if summary.error_count() > 0 {
        writeln!(
            w,
            "  Errors encountered:    {}",
            summary.error_count().red()
        )?;
    }

    let shown = plan.groups.len().min(EXAMPLE_GROUPS);
    if shown > 0 {
        writeln!(w)?;
        writeln!(w, "First {shown} of {} groups:", plan.groups.len())?;
        for (i, group) in plan.groups.iter().take(shown).enumerate() {
            writeln!(
                w,
                "  Group {} ({} files, {} each)",
                i + 1,
                group.len(),
                ByteSize::b(group.size)
            )?;
            writeln!(
                w,
                "    {} {} ({})",
                "KEEP  ".green(),
                group.keep.path.display(),
                format_time(group.keep.modified)
            )?;
            for record in &group.delete {
                writeln!(
                    w,
                    "    {} {} ({})",
                    "DELETE".red(),
                    record.path.display(),
                    format_time(record.modified)
                )?;
            }
        }
    }
    Ok(())
}

/// Text shown right before asking for confirmation.
///
/// An unrequested permanent removal is called out as a warning.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_confirmation_notice<W: Write>(
    w: &mut W,
    plan: &DeletionPlan,
    method: RemovalMethod,
    force_permanent: bool,
    report_path: &Path,
) -> io::Result<()> {
    writeln!(w)?;
    writeln!(w, "Review the full list in {}", report_path.display())?;
    if method.is_fallback(force_permanent) {
        writeln!(
            w,
            "{}",
            "WARNING: no trash facility is available. Files will be PERMANENTLY deleted."
                .red()
                .bold()
        )?;
    } else if method == RemovalMethod::Permanent {
        writeln!(w, "{}", "Files will be PERMANENTLY deleted.".red())?;
    } else {
        writeln!(w, "Files will be moved to the trash.")?;
    }
    writeln!(
        w,
        "About to remove {} files, freeing {}.",
        plan.stats.files_to_delete,
        ByteSize::b(plan.stats.bytes_to_free)
    )
}

/// Final summary after deletion.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_deletion_summary<W: Write>(
    w: &mut W,
    result: &BatchDeleteResult,
    method: RemovalMethod,
    report_path: &Path,
) -> io::Result<()> {
    writeln!(w)?;
    writeln!(w, "{}", "DELETION COMPLETE".bold())?;
    writeln!(
        w,
        "  Files {}: {}",
        method.describe(),
        result.success_count().green()
    )?;
    writeln!(w, "  Space freed:   {}", ByteSize::b(result.bytes_freed))?;
    if result.failure_count() > 0 {
        writeln!(w, "  Failed:        {}", result.failure_count().red())?;
        for (path, reason) in &result.failures {
            writeln!(w, "    {}: {}", path.display(), reason)?;
        }
    }
    if result.interrupted {
        writeln!(w, "  {}", "Stopped early by user".yellow())?;
    }
    writeln!(w, "  Report:        {}", report_path.display())
}
