//! Output formatters for scan results.
//!
//! This module provides different renderings of a deletion plan:
//! - Plain-text report written to disk before any deletion
//! - JSON for automation and scripting
//! - Colored console overview and post-run summary
//!
//! # Example
//!
//! ```no_run
//! use dupesweep::duplicates::DuplicateFinder;
//! use dupesweep::error::ExitCode;
//! use dupesweep::output::json::JsonOutput;
//! use dupesweep::plan::DeletionPlan;
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (groups, summary) = finder.find_duplicates(Path::new(".")).unwrap();
//! let plan = DeletionPlan::from_scan(groups, &summary);
//!
//! let output = JsonOutput::new(&plan, &summary, ExitCode::Success);
//! println!("{}", output.to_json_pretty().unwrap());
//! ```

pub mod console;
pub mod json;
pub mod report;

// Re-export main types
pub use json::JsonOutput;
pub use report::TextReport;
