//! JSON output formatter for deletion plans.
//!
//! Provides machine-readable JSON output for scripting and automation.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "groups": [
//!     {
//!       "hash": "abc123...",
//!       "size": 1024,
//!       "keep": { "path": "/roms/a.rom", "size": 1024, "modified": "2020-01-01T00:00:00+00:00" },
//!       "delete": [ { "path": "/roms/copy/a.rom", "size": 1024, "modified": null } ]
//!     }
//!   ],
//!   "summary": {
//!     "files_scanned": 100,
//!     "bytes_scanned": 1048576,
//!     "groups": 5,
//!     "files_to_delete": 10,
//!     "bytes_to_free": 51200,
//!     "exit_code": 0,
//!     "exit_code_name": "DS000"
//!   },
//!   "errors": [ { "stage": "hash", "path": "/locked.rom", "message": "Permission denied: /locked.rom" } ]
//! }
//! ```

use std::io::Write;
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::duplicates::ScanSummary;
use crate::error::ExitCode;
use crate::plan::{DeletionPlan, PlannedGroup};
use crate::scanner::FileRecord;

/// One file in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonFile {
    /// Absolute path
    pub path: String,
    /// Size in bytes
    pub size: u64,
    /// RFC 3339 modification time, `null` when unknown
    pub modified: Option<String>,
}

impl JsonFile {
    fn from_record(record: &FileRecord) -> Self {
        Self {
            path: record.path.to_string_lossy().into_owned(),
            size: record.size,
            modified: record.modified.map(to_rfc3339),
        }
    }
}

fn to_rfc3339(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).to_rfc3339()
}

/// A planned duplicate group in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonGroup {
    /// BLAKE3 hash as hexadecimal string (64 characters)
    pub hash: String,
    /// File size in bytes
    pub size: u64,
    /// Preserved copy
    pub keep: JsonFile,
    /// Copies marked for removal
    pub delete: Vec<JsonFile>,
}

impl JsonGroup {
    fn from_planned(group: &PlannedGroup) -> Self {
        Self {
            hash: group.hash_hex(),
            size: group.size,
            keep: JsonFile::from_record(&group.keep),
            delete: group.delete.iter().map(JsonFile::from_record).collect(),
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Files seen by the scan
    pub files_scanned: usize,
    /// Bytes seen by the scan
    pub bytes_scanned: u64,
    /// Number of duplicate groups
    pub groups: usize,
    /// Files marked DELETE
    pub files_to_delete: usize,
    /// Bytes freed by removing every DELETE-marked file
    pub bytes_to_free: u64,
    /// Share of scanned bytes taken by redundant copies (%)
    pub waste_percentage: f64,
    /// Directories skipped by name
    pub skipped_dirs: usize,
    /// Per-file errors during the scan
    pub error_count: usize,
    /// Duration of the scan in milliseconds
    pub scan_duration_ms: u64,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "DS000")
    pub exit_code_name: String,
}

/// One per-file error in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonError {
    /// `scan` for enumeration errors, `hash` for read errors
    pub stage: &'static str,
    /// Path the error refers to
    pub path: String,
    /// Human-readable message
    pub message: String,
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Planned groups
    pub groups: Vec<JsonGroup>,
    /// Aggregate counters
    pub summary: JsonSummary,
    /// Entries that were skipped with a reason
    pub errors: Vec<JsonError>,
}

impl JsonOutput {
    /// Create a new JSON output from a plan, the scan summary and an exit code.
    ///
    /// # Example
    ///
    /// ```
    /// use dupesweep::duplicates::ScanSummary;
    /// use dupesweep::error::ExitCode;
    /// use dupesweep::output::json::JsonOutput;
    /// use dupesweep::plan::DeletionPlan;
    ///
    /// let output = JsonOutput::new(&DeletionPlan::default(), &ScanSummary::default(), ExitCode::NoDuplicates);
    /// assert!(output.groups.is_empty());
    /// assert_eq!(output.summary.exit_code_name, "DS002");
    /// ```
    #[must_use]
    pub fn new(plan: &DeletionPlan, summary: &ScanSummary, exit_code: ExitCode) -> Self {
        let stats = &plan.stats;
        let errors = summary
            .scan_errors
            .iter()
            .map(|e| JsonError {
                stage: "scan",
                path: e.path().to_string_lossy().into_owned(),
                message: e.to_string(),
            })
            .chain(summary.hash_errors.iter().map(|e| JsonError {
                stage: "hash",
                path: e.path().to_string_lossy().into_owned(),
                message: e.to_string(),
            }))
            .collect();

        Self {
            groups: plan.groups.iter().map(JsonGroup::from_planned).collect(),
            summary: JsonSummary {
                files_scanned: stats.files_scanned,
                bytes_scanned: stats.bytes_scanned,
                groups: stats.groups,
                files_to_delete: stats.files_to_delete,
                bytes_to_free: stats.bytes_to_free,
                waste_percentage: stats.waste_percentage(),
                skipped_dirs: summary.pruned_dirs,
                error_count: summary.error_count(),
                scan_duration_ms: summary.scan_duration.as_millis() as u64,
                exit_code: exit_code.as_i32(),
                exit_code_name: exit_code.code_prefix().to_string(),
            },
            errors,
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
