//! Candidate grouping and duplicate group types.
//!
//! # Overview
//!
//! Every phase of duplicate detection narrows candidates the same way:
//! bucket records by a key and throw away buckets with a single member.
//! [`group_by_key`] is that operation; the phases only differ in the key:
//!
//! | Phase | Key |
//! |-------|-----|
//! | 1 | size |
//! | 2 | (size, quick digest) |
//! | 3 | (size, full digest) |
//!
//! Buckets live in a `BTreeMap`, so iteration order depends only on the keys
//! and never on the order in which workers finished.
//!
//! # Example
//!
//! ```
//! use dupesweep::scanner::FileRecord;
//! use dupesweep::duplicates::group_by_size;
//! use std::path::PathBuf;
//! use std::time::SystemTime;
//!
//! let files = vec![
//!     FileRecord::new(PathBuf::from("/file1.rom"), 1024, SystemTime::now()),
//!     FileRecord::new(PathBuf::from("/file2.rom"), 1024, SystemTime::now()),
//!     FileRecord::new(PathBuf::from("/file3.rom"), 2048, SystemTime::now()),
//! ];
//!
//! let (groups, stats) = group_by_size(files);
//!
//! assert_eq!(stats.total_files, 3);
//! assert_eq!(stats.potential_duplicates, 2);
//! assert_eq!(groups.len(), 1);
//! assert_eq!(groups[0].size, 1024);
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::scanner::{hash_to_hex, FileRecord, Hash};

/// Phase 1 candidates: two or more files with the same size.
#[derive(Debug, Clone)]
pub struct SizeGroup {
    /// File size in bytes (shared by all files in this group)
    pub size: u64,
    /// Files with this exact size, in walk order
    pub files: Vec<FileRecord>,
}

impl SizeGroup {

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Files sharing a size and a digest (quick or full).
#[derive(Debug, Clone)]
pub struct HashGroup {
    /// Size shared by every member
    pub size: u64,
    /// Digest shared by every member
    pub hash: Hash,
    /// Members, in walk order
    pub files: Vec<FileRecord>,
}

impl HashGroup {
    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Confirmed duplicate group: two or more files with identical size and
/// identical full-content digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// BLAKE3 hash of the full content
    pub hash: Hash,
    /// File size in bytes (shared by every member)
    pub size: u64,
    /// Members, sorted by path
    pub files: Vec<FileRecord>,
}

impl DuplicateGroup {
    /// Create a new duplicate group. Members are sorted by path.
    #[must_use]
    pub fn new(hash: Hash, size: u64, mut files: Vec<FileRecord>) -> Self {
        debug_assert!(files.iter().all(|f| f.size == size));
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Self { hash, size, files }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Total size of all files in this group.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.size * self.files.len() as u64
    }

    /// Total wasted space (all copies minus one).
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.duplicate_count() as u64
    }

    /// Number of redundant copies (total - 1).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Hash as hexadecimal string.
    #[must_use]
    pub fn hash_hex(&self) -> String {
        hash_to_hex(&self.hash)
    }

    /// Paths of files in this group.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }
}

/// Statistics from size grouping phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total number of files processed
    pub total_files: usize,
    /// Total size of all files in bytes
    pub total_size: u64,
    /// Number of distinct file sizes
    pub unique_sizes: usize,
    /// Number of files that could be duplicates (in groups of 2+)
    pub potential_duplicates: usize,
    /// Number of files eliminated as unique (singleton groups)
    pub eliminated_unique: usize,
    /// Number of zero-byte files encountered
    pub empty_files: usize,
    /// Number of size groups with 2+ files
    pub duplicate_groups: usize,
}

impl GroupingStats {
    /// Percentage of files eliminated by size grouping.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.eliminated_unique as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Bucket records by key, keeping only buckets with two or more members.
///
/// Returns the surviving buckets and the number of records eliminated.
#[must_use]
pub fn group_by_key<K, I>(items: I) -> (BTreeMap<K, Vec<FileRecord>>, usize)
where
    K: Ord,
    I: IntoIterator<Item = (K, FileRecord)>,
{
    let mut buckets: BTreeMap<K, Vec<FileRecord>> = BTreeMap::new();
    for (key, record) in items {
        buckets.entry(key).or_default().push(record);
    }

    let mut eliminated = 0;
    buckets.retain(|_, files| {
        if files.len() < 2 {
            eliminated += files.len();
            false
        } else {
            true
        }
    });

    (buckets, eliminated)
}

/// Group files by size (Phase 1 of duplicate detection).
///
/// Files with different sizes cannot be duplicates, so this removes most of
/// a typical tree without any I/O. Zero-byte files are grouped like any
/// other size. Groups come back in ascending size order.
///
/// # Example
///
/// ```
/// use dupesweep::scanner::FileRecord;
/// use dupesweep::duplicates::group_by_size;
/// use std::path::PathBuf;
/// use std::time::SystemTime;
///
/// let files = vec![
///     FileRecord::new(PathBuf::from("/a.txt"), 100, SystemTime::now()),
///     FileRecord::new(PathBuf::from("/b.txt"), 100, SystemTime::now()),
///     FileRecord::new(PathBuf::from("/c.txt"), 200, SystemTime::now()),
/// ];
///
/// let (groups, stats) = group_by_size(files);
///
/// assert_eq!(groups.len(), 1);
/// assert_eq!(groups[0].len(), 2);
/// assert_eq!(stats.eliminated_unique, 1);
/// ```
#[must_use]
pub fn group_by_size(
    files: impl IntoIterator<Item = FileRecord>,
) -> (Vec<SizeGroup>, GroupingStats) {
    let mut stats = GroupingStats::default();

    let keyed: Vec<(u64, FileRecord)> = files
        .into_iter()
        .map(|file| {
            stats.total_files += 1;
            stats.total_size += file.size;
            if file.size == 0 {
                stats.empty_files += 1;
            }
            (file.size, file)
        })
        .collect();

    let mut distinct: Vec<u64> = keyed.iter().map(|(size, _)| *size).collect();
    distinct.sort_unstable();
    distinct.dedup();
    stats.unique_sizes = distinct.len();

    let (buckets, eliminated) = group_by_key(keyed);
    let groups: Vec<SizeGroup> = buckets
        .into_iter()
        .map(|(size, files)| SizeGroup { size, files })
        .collect();
    stats.eliminated_unique = eliminated;
    stats.duplicate_groups = groups.len();
    stats.potential_duplicates = groups.iter().map(SizeGroup::len).sum();

    for group in &groups {
        log::debug!(
            "Size group {} bytes: {} potential duplicates",
            group.size,
            group.len()
        );
    }

    log::info!(
        "Phase 1 complete: {} files → {} potential duplicates ({:.1}% eliminated)",
        stats.total_files,
        stats.potential_duplicates,
        stats.elimination_rate()
    );

    (groups, stats)
}
