//! Duplicate finder implementation with multi-phase detection.
//!
//! # Overview
//!
//! This module orchestrates the duplicate detection pipeline:
//! 1. **Phase 1 - Size grouping**: Group files by size (see [`crate::duplicates::groups`] module)
//! 2. **Phase 2 - Quick hash**: Hash the first 8 KiB of same-size files
//! 3. **Phase 3 - Full hash**: Hash entire content of quick-hash matches
//!
//! Phases 2 and 3 run on a dedicated rayon pool. Workers only read files and
//! return `(record, result)` pairs; the coordinating thread does all grouping
//! after the pool has joined, so no group map is ever shared between threads.
//!
//! # Example
//!
//! ```no_run
//! use dupesweep::scanner::{Walker, WalkerConfig, FileRecord, Hasher};
//! use dupesweep::duplicates::{group_by_size, phase2_quick_hash, HashPhaseConfig};
//! use std::path::Path;
//!
//! // Phase 1: Collect and group files by size
//! let walker = Walker::new(Path::new("."), WalkerConfig::default());
//! let files: Vec<FileRecord> = walker.walk().filter_map(Result::ok).collect();
//! let (size_groups, _) = group_by_size(files);
//!
//! // Phase 2: Compute quick hashes for potential duplicates
//! let hasher = Hasher::new();
//! let config = HashPhaseConfig::default();
//! let (groups, stats) = phase2_quick_hash(size_groups, &hasher, &config).unwrap();
//!
//! println!("Phase 2: {} candidates remain in {} groups", stats.surviving_files, groups.len());
//! ```

use std::cmp::Reverse;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;

use super::groups::{group_by_key, group_by_size, DuplicateGroup, HashGroup, SizeGroup};
use crate::progress::{ProgressCallback, PHASE_FULL_HASH, PHASE_QUICK_HASH, PHASE_WALKING};
use crate::scanner::{
    FileRecord, Hash, HashError, Hasher, ScanError, Walker, WalkerConfig,
};

/// Lower bound for the default hashing pool size.
pub const MIN_IO_THREADS: usize = 2;
/// Upper bound for the default hashing pool size.
pub const MAX_IO_THREADS: usize = 16;

/// Default hashing pool size: logical CPUs clamped to
/// [`MIN_IO_THREADS`]..=[`MAX_IO_THREADS`].
#[must_use]
pub fn default_io_threads() -> usize {
    num_cpus::get().clamp(MIN_IO_THREADS, MAX_IO_THREADS)
}

/// Configuration shared by both hashing phases.
#[derive(Clone)]
pub struct HashPhaseConfig {
    /// Number of worker threads in the hashing pool
    pub io_threads: usize,
    /// Shutdown flag for graceful termination
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Observer notified after each hashed file
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for HashPhaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashPhaseConfig")
            .field("io_threads", &self.io_threads)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "..."),
            )
            .finish()
    }
}

impl Default for HashPhaseConfig {
    fn default() -> Self {
        Self {
            io_threads: default_io_threads(),
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl HashPhaseConfig {
    /// Set the number of I/O threads. Zero is raised to one.
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the shutdown flag.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Statistics for one hashing phase.
#[derive(Debug, Default)]
pub struct PhaseStats {
    /// Files submitted to the phase
    pub input_files: usize,
    /// Files hashed successfully
    pub hashed_files: usize,
    /// Bytes covered by successful digests
    pub bytes_hashed: u64,
    /// Files that hashed successfully but had no partner
    pub eliminated_files: usize,
    /// Files remaining in groups of two or more
    pub surviving_files: usize,
    /// Groups of two or more produced by the phase
    pub groups: usize,
    /// Per-file read failures
    pub errors: Vec<HashError>,
    /// Worker threads used
    pub threads: usize,
    /// Wall-clock time of the phase
    pub duration: Duration,
}

impl PhaseStats {
    /// Hashing throughput in files per second.
    #[must_use]
    pub fn files_per_sec(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs <= 0.0 {
            0.0
        } else {
            self.hashed_files as f64 / secs
        }
    }
}

fn build_pool(threads: usize) -> Result<rayon::ThreadPool, FinderError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("dupesweep-hash-{i}"))
        .build()
        .map_err(|e| FinderError::ThreadPool(e.to_string()))
}

/// Hash every record on a dedicated pool and hand the results back to the caller.
fn hash_all<F>(
    files: Vec<FileRecord>,
    phase: &str,
    config: &HashPhaseConfig,
    digest: F,
) -> Result<Vec<(FileRecord, Result<Hash, HashError>)>, FinderError>
where
    F: Fn(&Path) -> Result<Hash, HashError> + Sync,
{
    let pool = build_pool(config.io_threads)?;

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_start(phase, files.len());
    }

    let completed = AtomicUsize::new(0);
    let results = pool.install(|| {
        files
            .into_par_iter()
            .map(|file| {
                if config.is_shutdown_requested() {
                    let path = file.path.clone();
                    return (file, Err(HashError::Interrupted(path)));
                }

                let result = digest(&file.path);
                match &result {
                    Ok(_) => log::trace!("{} computed: {}", phase, file.path.display()),
                    Err(e) if e.is_interrupted() => {}
                    Err(e) => log::warn!("Failed to hash {}: {}", file.path.display(), e),
                }

                let current = completed.fetch_add(1, Ordering::Relaxed) + 1;
                if let Some(ref callback) = config.progress_callback {
                    callback.on_progress(current, file.path.to_string_lossy().as_ref());
                    if result.is_ok() {
                        callback.on_item_completed(file.size);
                    }
                }

                (file, result)
            })
            .collect()
    });

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_end(phase);
    }

    if config.is_shutdown_requested() {
        log::info!("{}: Interrupted by shutdown signal", phase);
        return Err(FinderError::Interrupted);
    }

    Ok(results)
}

/// Split worker results into keyed records, recording failures in `stats`.
fn collect_digests(
    results: Vec<(FileRecord, Result<Hash, HashError>)>,
    stats: &mut PhaseStats,
    prefix_len: Option<u64>,
) -> Vec<((u64, Hash), FileRecord)> {
    let mut keyed = Vec::with_capacity(results.len());
    for (file, result) in results {
        match result {
            Ok(hash) => {
                stats.hashed_files += 1;
                stats.bytes_hashed += prefix_len.map_or(file.size, |n| file.size.min(n));
                keyed.push(((file.size, hash), file));
            }
            Err(e) => stats.errors.push(e),
        }
    }
    keyed
}

/// Phase 2: group same-size candidates by (size, quick digest).
///
/// Every record of every size group is hashed; records whose quick digest
/// matches no other record of the same size are eliminated, as are records
/// that could not be read.
///
/// # Errors
///
/// Returns [`FinderError::ThreadPool`] if the worker pool cannot be created and
/// [`FinderError::Interrupted`] if shutdown was requested.
pub fn phase2_quick_hash(
    size_groups: Vec<SizeGroup>,
    hasher: &Hasher,
    config: &HashPhaseConfig,
) -> Result<(Vec<HashGroup>, PhaseStats), FinderError> {
    let start = Instant::now();
    let files: Vec<FileRecord> = size_groups.into_iter().flat_map(|g| g.files).collect();
    let mut stats = PhaseStats {
        input_files: files.len(),
        threads: config.io_threads,
        ..Default::default()
    };

    if files.is_empty() {
        log::debug!("Phase 2: No files to process");
        return Ok((Vec::new(), stats));
    }

    log::info!(
        "Phase 2: Computing quick hashes for {} files with {} workers",
        files.len(),
        config.io_threads
    );

    let results = hash_all(files, PHASE_QUICK_HASH, config, |p| hasher.quick_hash(p))?;
    let keyed = collect_digests(
        results,
        &mut stats,
        Some(crate::scanner::QUICK_HASH_SIZE as u64),
    );

    let (buckets, eliminated) = group_by_key(keyed);
    let groups: Vec<HashGroup> = buckets
        .into_iter()
        .map(|((size, hash), files)| HashGroup { size, hash, files })
        .collect();

    stats.eliminated_files = eliminated;
    stats.surviving_files = groups.iter().map(HashGroup::len).sum();
    stats.groups = groups.len();
    stats.duration = start.elapsed();

    log::info!(
        "Phase 2 complete: {} files → {} candidates in {:.2?} ({:.0} files/sec)",
        stats.input_files,
        stats.surviving_files,
        stats.duration,
        stats.files_per_sec()
    );

    Ok((groups, stats))
}

/// Phase 3: confirm duplicates by (size, full digest).
///
/// Returns the confirmed groups sorted by size descending, then digest
/// ascending, with members sorted by path.
///
/// # Errors
///
/// Returns [`FinderError::ThreadPool`] if the worker pool cannot be created and
/// [`FinderError::Interrupted`] if shutdown was requested.
pub fn phase3_full_hash(
    candidates: Vec<HashGroup>,
    hasher: &Hasher,
    config: &HashPhaseConfig,
) -> Result<(Vec<DuplicateGroup>, PhaseStats), FinderError> {
    let start = Instant::now();
    let files: Vec<FileRecord> = candidates.into_iter().flat_map(|g| g.files).collect();
    let mut stats = PhaseStats {
        input_files: files.len(),
        threads: config.io_threads,
        ..Default::default()
    };

    if files.is_empty() {
        log::debug!("Phase 3: No files to process");
        return Ok((Vec::new(), stats));
    }

    log::info!(
        "Phase 3: Computing full hashes for {} files with {} workers",
        files.len(),
        config.io_threads
    );

    let results = hash_all(files, PHASE_FULL_HASH, config, |p| hasher.full_hash(p))?;
    let keyed = collect_digests(results, &mut stats, None);

    let (buckets, eliminated) = group_by_key(keyed);
    let mut groups: Vec<DuplicateGroup> = buckets
        .into_iter()
        .map(|((size, hash), files)| DuplicateGroup::new(hash, size, files))
        .collect();
    groups.sort_by_key(|g| (Reverse(g.size), g.hash));

    for group in &groups {
        log::debug!(
            "Duplicate group {}: {} files of {} bytes",
            group.hash_hex(),
            group.len(),
            group.size
        );
    }

    stats.eliminated_files = eliminated;
    stats.surviving_files = groups.iter().map(DuplicateGroup::len).sum();
    stats.groups = groups.len();
    stats.duration = start.elapsed();

    log::info!(
        "Phase 3 complete: {} duplicate groups confirmed in {:.2?} ({:.0} files/sec)",
        stats.groups,
        stats.duration,
        stats.files_per_sec()
    );

    Ok((groups, stats))
}

/// Configuration for the complete pipeline.
#[derive(Clone)]
pub struct FinderConfig {
    /// Hashing pool size
    pub io_threads: usize,
    /// Walker settings (skip set, symlink policy)
    pub walker_config: WalkerConfig,
    /// Files at least this large are hashed through a memory map
    pub mmap_threshold: u64,
    /// Shutdown flag for graceful termination
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Observer for all phases
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("io_threads", &self.io_threads)
            .field("walker_config", &self.walker_config)
            .field("mmap_threshold", &self.mmap_threshold)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "..."),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            io_threads: default_io_threads(),
            walker_config: WalkerConfig::default(),
            mmap_threshold: crate::scanner::hasher::DEFAULT_MMAP_THRESHOLD,
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the number of I/O threads.
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the memory-map threshold in bytes.
    #[must_use]
    pub fn with_mmap_threshold(mut self, threshold: u64) -> Self {
        self.mmap_threshold = threshold;
        self
    }

    /// Set the shutdown flag.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn phase_config(&self) -> HashPhaseConfig {
        HashPhaseConfig {
            io_threads: self.io_threads,
            shutdown_flag: self.shutdown_flag.clone(),
            progress_callback: self.progress_callback.clone(),
        }
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Summary statistics from a duplicate scan.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Absolute root that was scanned
    pub root: PathBuf,
    /// Total number of files scanned
    pub total_files: usize,
    /// Total size of all scanned files in bytes
    pub total_size: u64,
    /// Number of files eliminated by size grouping (unique sizes)
    pub eliminated_by_size: usize,
    /// Number of files eliminated by quick hash (different first 8 KiB)
    pub eliminated_by_quick_hash: usize,
    /// Number of files eliminated by full hash
    pub eliminated_by_full_hash: usize,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Total number of duplicate files (excluding the one kept per group)
    pub duplicate_files: usize,
    /// Total space that can be reclaimed by removing duplicates
    pub reclaimable_space: u64,
    /// Directories not descended into because of the skip set
    pub pruned_dirs: usize,
    /// Entries that could not be enumerated
    pub scan_errors: Vec<ScanError>,
    /// Files that could not be hashed
    pub hash_errors: Vec<HashError>,
    /// Quick hash phase statistics
    pub quick_hash: PhaseStats,
    /// Full hash phase statistics
    pub full_hash: PhaseStats,
    /// Time spent walking the tree
    pub walk_duration: Duration,
    /// Duration of the entire scan
    pub scan_duration: Duration,
}

impl ScanSummary {
    /// Calculate the percentage of space that is wasted by duplicates.
    #[must_use]
    pub fn wasted_percentage(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            (self.reclaimable_space as f64 / self.total_size as f64) * 100.0
        }
    }

    /// Total per-file errors (enumeration plus hashing).
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.scan_errors.len() + self.hash_errors.len()
    }

    /// Format reclaimable space as human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        bytesize::ByteSize::b(self.reclaimable_space).to_string()
    }

    /// Format total size as human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        bytesize::ByteSize::b(self.total_size).to_string()
    }
}

/// Errors that can occur during duplicate finding.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// The provided path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The provided path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// An I/O error occurred while resolving the root.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The hashing worker pool could not be started.
    #[error("Failed to start hashing workers: {0}")]
    ThreadPool(String),
}

/// Duplicate finder that orchestrates the multi-phase detection pipeline.
///
/// The pipeline never writes to the filesystem, so abandoning it at any
/// point leaves the tree unchanged.
///
/// # Example
///
/// ```no_run
/// use dupesweep::duplicates::{DuplicateFinder, FinderConfig};
/// use std::path::Path;
///
/// let config = FinderConfig::default().with_io_threads(4);
/// let finder = DuplicateFinder::new(config);
///
/// let (groups, summary) = finder.find_duplicates(Path::new("/some/path")).unwrap();
///
/// println!("Found {} duplicate groups", summary.duplicate_groups);
/// println!("Reclaimable space: {}", summary.reclaimable_display());
/// ```
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Hasher,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let mut hasher = Hasher::new().with_mmap_threshold(config.mmap_threshold);
        if let Some(ref flag) = config.shutdown_flag {
            hasher = hasher.with_shutdown_flag(flag.clone());
        }
        Self { config, hasher }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// The configuration this finder was built with.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Find all duplicate files below `path`.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if:
    /// - The path does not exist or is not a directory
    /// - The hashing pool cannot be started
    /// - The scan is interrupted by shutdown signal
    pub fn find_duplicates(
        &self,
        path: &Path,
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        let start_time = Instant::now();

        if !path.exists() {
            return Err(FinderError::PathNotFound(path.to_path_buf()));
        }
        if !path.is_dir() {
            return Err(FinderError::NotADirectory(path.to_path_buf()));
        }
        let root = std::path::absolute(path).map_err(|source| FinderError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        log::info!("Scanning {}", root.display());

        let mut walker = Walker::new(&root, self.config.walker_config.clone());
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(flag.clone());
        }
        if let Some(ref callback) = self.config.progress_callback {
            walker = walker.with_progress_callback(callback.clone());
            callback.on_phase_start(PHASE_WALKING, 0);
        }

        let mut files = Vec::new();
        let mut scan_errors = Vec::new();
        for entry in walker.walk() {
            match entry {
                Ok(file) => files.push(file),
                Err(e) => {
                    log::warn!("Skipping {}: {}", e.path().display(), e);
                    scan_errors.push(e);
                }
            }
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end(PHASE_WALKING);
        }

        if self.config.is_shutdown_requested() {
            log::info!("Walk interrupted by shutdown signal");
            return Err(FinderError::Interrupted);
        }

        let walk_duration = start_time.elapsed();
        log::info!(
            "Walk complete: {} files in {:.2?} ({} directories skipped, {} errors)",
            files.len(),
            walk_duration,
            walker.pruned_dirs(),
            scan_errors.len()
        );

        let (groups, mut summary) = self.find_duplicates_from_files(files)?;
        summary.root = root;
        summary.pruned_dirs = walker.pruned_dirs();
        summary.scan_errors = scan_errors;
        summary.walk_duration = walk_duration;
        summary.scan_duration = start_time.elapsed();

        Ok((groups, summary))
    }

    /// Run phases 1 to 3 over an already collected list of records.
    ///
    /// # Errors
    ///
    /// Returns `FinderError::ThreadPool` or `FinderError::Interrupted`.
    pub fn find_duplicates_from_files(
        &self,
        files: Vec<FileRecord>,
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        let start_time = Instant::now();
        let mut summary = ScanSummary::default();

        let (size_groups, size_stats) = group_by_size(files);
        summary.total_files = size_stats.total_files;
        summary.total_size = size_stats.total_size;
        summary.eliminated_by_size = size_stats.eliminated_unique;

        let phase_config = self.config.phase_config();

        let (quick_groups, mut quick_stats) =
            phase2_quick_hash(size_groups, &self.hasher, &phase_config)?;
        summary.eliminated_by_quick_hash = quick_stats.eliminated_files;
        summary.hash_errors.append(&mut quick_stats.errors);
        summary.quick_hash = quick_stats;

        let (groups, mut full_stats) = phase3_full_hash(quick_groups, &self.hasher, &phase_config)?;
        summary.eliminated_by_full_hash = full_stats.eliminated_files;
        summary.hash_errors.append(&mut full_stats.errors);
        summary.full_hash = full_stats;

        summary.duplicate_groups = groups.len();
        summary.duplicate_files = groups.iter().map(DuplicateGroup::duplicate_count).sum();
        summary.reclaimable_space = groups.iter().map(DuplicateGroup::wasted_space).sum();
        summary.scan_duration = start_time.elapsed();

        log::info!(
            "Found {} duplicate groups ({} redundant files, {} reclaimable)",
            summary.duplicate_groups,
            summary.duplicate_files,
            summary.reclaimable_display()
        );

        Ok((groups, summary))
    }
}
