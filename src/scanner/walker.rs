//! Directory walker implementation using jwalk for parallel traversal.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing a directory
//! tree and collecting [`FileRecord`]s for duplicate detection.
//!
//! # Features
//!
//! - Parallel directory reading using jwalk's rayon pool
//! - Deterministic, name-sorted output
//! - Skip-set pruning: excluded directories are never read
//! - One record per physical file: hardlinks and followed symlinks that
//!   alias an already-recorded file are dropped
//! - Explicitly excluded files (the report) are never recorded
//! - Per-entry errors are yielded, never fatal
//! - Graceful shutdown via atomic flag
//!
//! # Example
//!
//! ```no_run
//! use dupesweep::scanner::{SkipSet, Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let config = WalkerConfig::new(SkipSet::default(), false);
//! let walker = Walker::new(Path::new("/mnt/roms"), config);
//! let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();
//! println!("Found {} files ({} directories pruned)", files.len(), walker.pruned_dirs());
//! ```

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use jwalk::WalkDir;

use super::identity::SeenFiles;
use super::{FileRecord, ScanError, WalkerConfig};
use crate::progress::ProgressCallback;

/// Directory walker for file discovery.
pub struct Walker {
    root: PathBuf,
    config: WalkerConfig,
    shutdown_flag: Option<Arc<AtomicBool>>,
    progress_callback: Option<Arc<dyn ProgressCallback>>,
    pruned: Arc<AtomicUsize>,
}

impl std::fmt::Debug for Walker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Walker")
            .field("root", &self.root)
            .field("config", &self.config)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .field("pruned", &self.pruned)
            .finish()
    }
}

impl Walker {
    /// Create a new walker for the given path.
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
            shutdown_flag: None,
            progress_callback: None,
            pruned: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set, iteration stops as soon as possible.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback notified for every discovered file.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Number of directories pruned by the skip set so far.
    #[must_use]
    pub fn pruned_dirs(&self) -> usize {
        self.pruned.load(Ordering::Relaxed)
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Walk the directory tree, yielding file records.
    ///
    /// Errors are yielded as [`ScanError`] values rather than stopping
    /// iteration. Directories named in the skip set are removed before
    /// jwalk reads them, so nothing beneath them is ever yielded.
    pub fn walk(&self) -> impl Iterator<Item = Result<FileRecord, ScanError>> + '_ {
        let skip = Arc::new(self.config.skip_dirs.clone());
        let pruned = Arc::clone(&self.pruned);
        let mut discovered = 0usize;
        let mut seen = SeenFiles::new();
        let mut excluded = SeenFiles::new();
        for path in &self.config.excluded_files {
            if let Ok(metadata) = std::fs::metadata(path) {
                excluded.insert(&metadata);
            }
        }

        let walk_dir = WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .skip_hidden(false)
            .process_read_dir(move |_depth, _path, _read_dir_state, children| {
                children.retain(|entry| match entry {
                    Ok(e) if e.file_type().is_dir() && skip.matches(e.file_name()) => {
                        log::debug!("Skipping directory: {}", e.path().display());
                        pruned.fetch_add(1, Ordering::Relaxed);
                        false
                    }
                    _ => true,
                });
                // Sort children for deterministic output
                children.sort_by(|a, b| match (a, b) {
                    (Ok(a), Ok(b)) => a.file_name().cmp(b.file_name()),
                    (Ok(_), Err(_)) => std::cmp::Ordering::Less,
                    (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
                    (Err(_), Err(_)) => std::cmp::Ordering::Equal,
                });
            });

        walk_dir
            .into_iter()
            .take_while(move |_| {
                if self.is_shutdown_requested() {
                    log::debug!("Walker: Shutdown requested, stopping iteration");
                    false
                } else {
                    true
                }
            })
            .filter_map(move |entry_result| {
                let result = match entry_result {
                    Ok(entry) => {
                        let path = entry.path();
                        if path == self.root || entry.file_type().is_dir() {
                            return None;
                        }
                        self.process_entry(
                            path,
                            entry.file_type().is_symlink(),
                            &mut seen,
                            &excluded,
                        )?
                    }
                    Err(e) => {
                        let path = e
                            .path()
                            .map_or_else(|| self.root.clone(), std::borrow::ToOwned::to_owned);
                        Err(self.handle_jwalk_error(path, &e))
                    }
                };

                if let (Ok(record), Some(callback)) = (&result, &self.progress_callback) {
                    discovered += 1;
                    callback.on_progress(discovered, record.path.to_string_lossy().as_ref());
                }
                Some(result)
            })
    }

    /// Turn a non-directory entry into a record, or skip it.
    fn process_entry(
        &self,
        path: PathBuf,
        is_symlink: bool,
        seen: &mut SeenFiles,
        excluded: &SeenFiles,
    ) -> Option<Result<FileRecord, ScanError>> {
        if is_symlink && !self.config.follow_symlinks {
            log::trace!("Skipping symlink: {}", path.display());
            return None;
        }

        let metadata = if self.config.follow_symlinks {
            std::fs::metadata(&path)
        } else {
            std::fs::symlink_metadata(&path)
        };

        let metadata = match metadata {
            Ok(m) => m,
            Err(e) => return Some(Err(self.handle_io_error(&path, e))),
        };

        // Sockets, fifos, devices
        if !metadata.is_file() {
            log::trace!("Skipping non-regular file: {}", path.display());
            return None;
        }

        if self.config.excluded_files.contains(&path) || excluded.contains(&metadata) {
            log::debug!("Skipping excluded file: {}", path.display());
            return None;
        }

        if !seen.first_sighting(&metadata) {
            log::debug!("Skipping alias of an already-recorded file: {}", path.display());
            return None;
        }

        let modified = match metadata.modified() {
            Ok(t) => Some(t),
            Err(e) => {
                log::debug!("No modification time for {}: {}", path.display(), e);
                None
            }
        };

        Some(Ok(FileRecord {
            path,
            size: metadata.len(),
            modified,
        }))
    }

    fn handle_io_error(&self, path: &Path, error: io::Error) -> ScanError {
        let err = ScanError::from_io(path, error);
        match err {
            ScanError::NotFound(_) => {
                log::debug!("File not found (may have been deleted): {}", path.display());
            }
            _ => log::warn!("{}", err),
        }
        err
    }

    fn handle_jwalk_error(&self, path: PathBuf, error: &jwalk::Error) -> ScanError {
        log::warn!("Walker error for {}: {}", path.display(), error);
        match error.io_error().map(io::Error::kind) {
            Some(io::ErrorKind::PermissionDenied) => ScanError::PermissionDenied(path),
            Some(io::ErrorKind::NotFound) => ScanError::NotFound(path),
            Some(kind) => ScanError::Io {
                path,
                source: io::Error::new(kind, error.to_string()),
            },
            None => ScanError::Io {
                path,
                source: io::Error::other(error.to_string()),
            },
        }
    }
}
