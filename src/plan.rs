//! Deletion planning.
//!
//! Turns confirmed [`DuplicateGroup`]s into keep/delete decisions. Planning is
//! a pure transformation: it performs no I/O, so the same groups always
//! produce the same plan.
//!
//! # Keep policy
//!
//! The record kept in each group is the first under [`keep_order`]:
//! 1. oldest modification time (records with an unknown time come last)
//! 2. shorter path
//! 3. path in lexical order
//!
//! # Example
//!
//! ```
//! use dupesweep::duplicates::{DuplicateGroup, ScanSummary};
//! use dupesweep::plan::DeletionPlan;
//! use dupesweep::scanner::FileRecord;
//! use std::path::PathBuf;
//! use std::time::{Duration, UNIX_EPOCH};
//!
//! let old = FileRecord::new(PathBuf::from("/roms/b.rom"), 10, UNIX_EPOCH + Duration::from_secs(1));
//! let new = FileRecord::new(PathBuf::from("/roms/a.rom"), 10, UNIX_EPOCH + Duration::from_secs(2));
//! let group = DuplicateGroup::new([0u8; 32], 10, vec![old, new]);
//!
//! let plan = DeletionPlan::build(vec![group], 2, 20);
//! assert_eq!(plan.groups[0].keep.path, PathBuf::from("/roms/b.rom"));
//! assert_eq!(plan.stats.bytes_to_free, 10);
//! ```

use std::cmp::Ordering;
use std::path::Path;

use crate::duplicates::{DuplicateGroup, ScanSummary};
use crate::scanner::{hash_to_hex, FileRecord, Hash};

/// Decision for one member of a duplicate group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mark {
    /// The copy that is preserved
    Keep,
    /// A redundant copy
    Delete,
}

impl std::fmt::Display for Mark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Keep => write!(f, "KEEP"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

/// A duplicate group with its keep/delete decision applied.
///
/// Exactly one record is kept; `delete` holds every other member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedGroup {
    /// Full-content digest shared by every member
    pub hash: Hash,
    /// Size shared by every member
    pub size: u64,
    /// The preserved copy
    pub keep: FileRecord,
    /// Copies to remove, in keep order
    pub delete: Vec<FileRecord>,
}

impl PlannedGroup {
    /// Apply the keep policy to a duplicate group.
    ///
    /// Returns `None` for groups with fewer than two members, which are not
    /// duplicates.
    #[must_use]
    pub fn from_group(group: DuplicateGroup) -> Option<Self> {
        if group.files.len() < 2 {
            return None;
        }
        let mut files = group.files;
        files.sort_by(keep_order);
        let mut members = files.into_iter();
        let keep = members.next()?;
        Some(Self {
            hash: group.hash,
            size: group.size,
            keep,
            delete: members.collect(),
        })
    }

    /// Every member with its mark, the kept record first.
    pub fn marks(&self) -> impl Iterator<Item = (&FileRecord, Mark)> {
        std::iter::once((&self.keep, Mark::Keep))
            .chain(self.delete.iter().map(|f| (f, Mark::Delete)))
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.delete.len() + 1
    }

    /// Always false; a planned group holds at least its kept record.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Bytes freed by removing every DELETE member.
    #[must_use]
    pub fn bytes_to_free(&self) -> u64 {
        self.size * self.delete.len() as u64
    }

    /// Digest as hexadecimal string.
    #[must_use]
    pub fn hash_hex(&self) -> String {
        hash_to_hex(&self.hash)
    }
}

/// Ordering used to pick the record to keep. The first record wins.
#[must_use]
pub fn keep_order(a: &FileRecord, b: &FileRecord) -> Ordering {
    let by_time = match (a.modified, b.modified) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_time
        .then_with(|| path_len(&a.path).cmp(&path_len(&b.path)))
        .then_with(|| a.path.cmp(&b.path))
}

fn path_len(path: &Path) -> usize {
    path.as_os_str().len()
}

/// Aggregate counters for a plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct PlanStats {
    /// Files seen by the scan
    pub files_scanned: usize,
    /// Bytes seen by the scan
    pub bytes_scanned: u64,
    /// Number of duplicate groups
    pub groups: usize,
    /// Files marked KEEP (one per group)
    pub files_to_keep: usize,
    /// Files marked DELETE
    pub files_to_delete: usize,
    /// Sum of sizes of DELETE-marked files
    pub bytes_to_free: u64,
}

impl PlanStats {
    /// Share of scanned bytes taken by redundant copies.
    #[must_use]
    pub fn waste_percentage(&self) -> f64 {
        if self.bytes_scanned == 0 {
            0.0
        } else {
            (self.bytes_to_free as f64 / self.bytes_scanned as f64) * 100.0
        }
    }

    /// Bytes occupied by every member of every group.
    #[must_use]
    pub fn duplicate_data_size(&self, groups: &[PlannedGroup]) -> u64 {
        groups.iter().map(|g| g.size * g.len() as u64).sum()
    }
}

/// Ordered keep/delete decisions plus aggregate counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionPlan {
    /// Planned groups, in the order the scan produced them
    pub groups: Vec<PlannedGroup>,
    /// Aggregate counters
    pub stats: PlanStats,
}

impl DeletionPlan {
    /// Build a plan from confirmed duplicate groups.
    ///
    /// `files_scanned` and `bytes_scanned` describe the whole scan, not just
    /// the duplicates.
    #[must_use]
    pub fn build(groups: Vec<DuplicateGroup>, files_scanned: usize, bytes_scanned: u64) -> Self {
        let groups: Vec<PlannedGroup> = groups
            .into_iter()
            .filter_map(PlannedGroup::from_group)
            .collect();

        let stats = PlanStats {
            files_scanned,
            bytes_scanned,
            groups: groups.len(),
            files_to_keep: groups.len(),
            files_to_delete: groups.iter().map(|g| g.delete.len()).sum(),
            bytes_to_free: groups.iter().map(PlannedGroup::bytes_to_free).sum(),
        };

        log::debug!(
            "Plan: {} groups, {} files to delete, {} bytes to free",
            stats.groups,
            stats.files_to_delete,
            stats.bytes_to_free
        );

        Self { groups, stats }
    }

    /// Build a plan from a scan's groups and summary.
    #[must_use]
    pub fn from_scan(groups: Vec<DuplicateGroup>, summary: &ScanSummary) -> Self {
        Self::build(groups, summary.total_files, summary.total_size)
    }

    /// True when no duplicates were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Every DELETE-marked record paired with the record kept for its group.
    pub fn delete_targets(&self) -> impl Iterator<Item = (&FileRecord, &FileRecord)> {
        self.groups
            .iter()
            .flat_map(|g| g.delete.iter().map(move |d| (&g.keep, d)))
    }
}
