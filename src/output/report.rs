//! Plain-text duplicate report.
//!
//! The report is the audit trail of a run. It lists every group with the
//! copy that is kept and the copies that will be removed, then the summary
//! counters, then every entry that could not be scanned or hashed. It is
//! written before the user is asked to confirm anything.
//!
//! # Example
//!
//! ```no_run
//! use dupesweep::duplicates::ScanSummary;
//! use dupesweep::output::report::TextReport;
//! use dupesweep::plan::DeletionPlan;
//! use std::path::Path;
//!
//! let plan = DeletionPlan::default();
//! let summary = ScanSummary::default();
//! TextReport::new(&plan, &summary)
//!     .write_to_path(Path::new("duplicate_log.txt"))
//!     .unwrap();
//! ```

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::SystemTime;

use bytesize::ByteSize;
use chrono::{DateTime, Local};

use crate::duplicates::ScanSummary;
use crate::plan::DeletionPlan;
use crate::scanner::FileRecord;

/// Default report file name, relative to the working directory.
pub const DEFAULT_REPORT_NAME: &str = "duplicate_log.txt";

const RULE: &str = "================================================================================";

/// Formatter for the plain-text report.
pub struct TextReport<'a> {
    plan: &'a DeletionPlan,
    summary: &'a ScanSummary,
    generated: DateTime<Local>,
}

impl<'a> TextReport<'a> {
    /// Create a report stamped with the current local time.
    #[must_use]
    pub fn new(plan: &'a DeletionPlan, summary: &'a ScanSummary) -> Self {
        Self {
            plan,
            summary,
            generated: Local::now(),
        }
    }

    /// Override the generation timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, generated: DateTime<Local>) -> Self {
        self.generated = generated;
        self
    }

    /// Write the report to a file, replacing any previous content.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn write_to_path(&self, path: &Path) -> io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        log::info!("Report written to {}", path.display());
        Ok(())
    }

    /// Write the report to any writer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        writeln!(w, "DUPLICATE FILE REPORT")?;
        writeln!(w, "Generated: {}", self.generated.format("%Y-%m-%d %H:%M:%S"))?;
        if !self.summary.root.as_os_str().is_empty() {
            writeln!(w, "Scanned:   {}", self.summary.root.display())?;
        }
        writeln!(w, "{RULE}")?;
        writeln!(w)?;

        for (i, group) in self.plan.groups.iter().enumerate() {
            writeln!(
                w,
                "Group {} - {} copies of {} (hash {})",
                i + 1,
                group.len(),
                ByteSize::b(group.size),
                group.hash_hex()
            )?;
            write_entry(w, "KEEP (oldest)", &group.keep)?;
            for record in &group.delete {
                write_entry(w, "DELETE (newer)", record)?;
            }
            writeln!(w)?;
        }

        let stats = &self.plan.stats;
        writeln!(w, "{RULE}")?;
        writeln!(w, "SUMMARY")?;
        writeln!(w, "  Files scanned:     {}", stats.files_scanned)?;
        writeln!(
            w,
            "  Bytes scanned:     {} ({} bytes)",
            ByteSize::b(stats.bytes_scanned),
            stats.bytes_scanned
        )?;
        writeln!(w, "  Groups found:      {}", stats.groups)?;
        writeln!(w, "  Files to delete:   {}", stats.files_to_delete)?;
        writeln!(
            w,
            "  Bytes to free:     {} ({} bytes)",
            ByteSize::b(stats.bytes_to_free),
            stats.bytes_to_free
        )?;
        if self.summary.pruned_dirs > 0 {
            writeln!(w, "  Skipped folders:   {}", self.summary.pruned_dirs)?;
        }
        writeln!(w)?;

        writeln!(w, "ERRORS ENCOUNTERED: {}", self.summary.error_count())?;
        for e in &self.summary.scan_errors {
            writeln!(w, "  [scan] {e}")?;
        }
        for e in &self.summary.hash_errors {
            writeln!(w, "  [hash] {e}")?;
        }

        Ok(())
    }
}

fn write_entry<W: Write>(w: &mut W, label: &str, record: &FileRecord) -> io::Result<()> {
    writeln!(w, "  {label}: {}", record.path.display())?;
    writeln!(
        w,
        "      modified {}, {}",
        format_time(record.modified),
        ByteSize::b(record.size)
    )
}

/// Local-time rendering of a modification time, `unknown` when absent.
#[must_use]
pub fn format_time(time: Option<SystemTime>) -> String {
    time.map_or_else(
        || "unknown".to_string(),
        |t| {
            DateTime::<Local>::from(t)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        },
    )
}
