//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based file grouping (Phase 1)
//! - Quick hash comparison (Phase 2)
//! - Full hash comparison (Phase 3)
//! - Duplicate group management

pub mod finder;
pub mod groups;

pub use finder::{
    default_io_threads, phase2_quick_hash, phase3_full_hash, DuplicateFinder, FinderConfig,
    FinderError, HashPhaseConfig, PhaseStats, ScanSummary,
};
pub use groups::{
    group_by_key, group_by_size, DuplicateGroup, GroupingStats, HashGroup, SizeGroup,
};
