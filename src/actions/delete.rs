//! Plan execution: removing the DELETE-marked copies.
//!
//! # Overview
//!
//! Removal goes through a [`RemovalMethod`] chosen once per run:
//! - [`RemovalMethod::Reversible`]: move to the system trash (default, recoverable)
//! - [`RemovalMethod::Permanent`]: unlink immediately
//!
//! # Safety
//!
//! - A group's copies are only removed while its KEEP file still exists.
//! - Each copy is re-checked against the size and modification time recorded
//!   by the scan; anything that changed since is left alone.
//! - Failures are per file. One failure never stops the rest of the batch.
//!
//! # Example
//!
//! ```no_run
//! use dupesweep::actions::delete::{execute_plan, RemovalMethod};
//! use dupesweep::plan::DeletionPlan;
//!
//! let plan = DeletionPlan::default();
//! let method = RemovalMethod::detect(false);
//! let result = execute_plan(&plan, method, None, None);
//! println!("{}", result.summary());
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use thiserror::Error;

use crate::plan::DeletionPlan;
use crate::scanner::FileRecord;

/// Error type for deletion operations.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// File was not found (may have been deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting to delete.
    #[error("permission denied: {0} - try running with elevated privileges")]
    PermissionDenied(PathBuf),

    /// File was modified since scan.
    #[error("file modified since scan: {0}")]
    Modified(PathBuf),

    /// The copy being kept for this group is gone, so nothing else may be removed.
    #[error("kept copy {keep} no longer exists, not deleting {path}")]
    KeepMissing {
        /// Path of the DELETE-marked file
        path: PathBuf,
        /// Path of the KEEP file that disappeared
        keep: PathBuf,
    },

    /// The DELETE-marked path resolves to the same file as the KEEP path.
    #[error("{path} is the same file as kept copy {keep}, not deleting")]
    SameFile {
        /// Path of the DELETE-marked file
        path: PathBuf,
        /// Path of the KEEP file it aliases
        keep: PathBuf,
    },

    /// Trash operation failed.
    #[error("trash operation failed for {path}: {message}")]
    TrashFailed {
        /// Path that could not be moved to the trash
        path: PathBuf,
        /// Error reported by the trash backend
        message: String,
    },

    /// Permanent delete operation failed.
    #[error("permanent delete failed for {path}: {message}")]
    PermanentDeleteFailed {
        /// Path that could not be unlinked
        path: PathBuf,
        /// Error reported by the filesystem
        message: String,
    },

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path being accessed when the error occurred
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    /// Get the path associated with this error.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::Modified(p)
            | Self::KeepMissing { path: p, .. }
            | Self::SameFile { path: p, .. }
            | Self::TrashFailed { path: p, .. }
            | Self::PermanentDeleteFailed { path: p, .. }
            | Self::Io { path: p, .. } => p,
        }
    }

    fn from_io(path: &Path, e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: e,
            },
        }
    }
}

/// How DELETE-marked files are removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RemovalMethod {
    /// Move to the platform trash / recycle bin
    Reversible,
    /// Remove immediately; cannot be undone
    Permanent,
}

impl RemovalMethod {
    /// Choose the removal method for this run.
    ///
    /// `Reversible` is chosen whenever the platform has a trash facility and
    /// a home directory can be resolved; otherwise the result is `Permanent`
    /// and callers must tell the user before proceeding (see
    /// [`RemovalMethod::is_fallback`]).
    #[must_use]
    pub fn detect(force_permanent: bool) -> Self {
        if force_permanent {
            return Self::Permanent;
        }
        if trash_available() {
            Self::Reversible
        } else {
            log::warn!("No trash facility available; deletion would be permanent");
            Self::Permanent
        }
    }

    /// True when deletion became permanent without the user asking for it.
    #[must_use]
    pub fn is_fallback(self, force_permanent: bool) -> bool {
        self == Self::Permanent && !force_permanent
    }

    /// Remove one file, returning the bytes freed.
    ///
    /// # Errors
    ///
    /// Returns `DeleteError` if the file cannot be removed.
    pub fn remove(self, path: &Path) -> Result<DeleteResult, DeleteError> {
        match self {
            Self::Reversible => delete_to_trash(path),
            Self::Permanent => permanent_delete(path),
        }
    }

    /// Where removed files end up, for user-facing messages.
    #[must_use]
    pub fn describe(self) -> &'static str {
        match self {
            Self::Reversible => "moved to trash",
            Self::Permanent => "permanently deleted",
        }
    }
}

impl std::fmt::Display for RemovalMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reversible => write!(f, "trash"),
            Self::Permanent => write!(f, "permanent"),
        }
    }
}

fn trash_available() -> bool {
    let platform = cfg!(any(
        target_os = "windows",
        target_os = "macos",
        all(
            unix,
            not(target_os = "android"),
            not(target_os = "ios"),
            not(target_os = "macos")
        )
    ));
    platform && directories::BaseDirs::new().is_some()
}

/// Result of a successful deletion operation.
#[derive(Debug, Clone)]
pub struct DeleteResult {
    /// Path that was deleted.
    pub path: PathBuf,
    /// Size of the deleted file in bytes.
    pub size: u64,
    /// Whether deletion was permanent (true) or to trash (false).
    pub permanent: bool,
}

impl DeleteResult {
    /// Create a new delete result.
    #[must_use]
    pub fn new(path: PathBuf, size: u64, permanent: bool) -> Self {
        Self {
            path,
            size,
            permanent,
        }
    }
}

/// Results of executing a plan.
#[derive(Debug, Clone, Default)]
pub struct BatchDeleteResult {
    /// Successfully deleted files.
    pub successes: Vec<DeleteResult>,
    /// Failed deletions with their errors.
    pub failures: Vec<(PathBuf, String)>,
    /// Total bytes freed.
    pub bytes_freed: u64,
    /// Execution stopped early on a shutdown request.
    pub interrupted: bool,
}

impl BatchDeleteResult {
    /// Number of successful deletions.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.successes.len()
    }

    /// Number of failed deletions.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Total number of attempted deletions.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.successes.len() + self.failures.len()
    }

    /// Check if all deletions succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Human-readable summary of the operation.
    #[must_use]
    pub fn summary(&self) -> String {
        let freed = bytesize::ByteSize::b(self.bytes_freed);
        if self.all_succeeded() {
            format!("Deleted {} file(s), freed {}", self.success_count(), freed)
        } else {
            format!(
                "Deleted {} file(s), {} failed, freed {}",
                self.success_count(),
                self.failure_count(),
                freed
            )
        }
    }
}

/// Callback trait for deletion progress reporting.
pub trait DeleteProgressCallback: Send + Sync {
    /// Called before each file deletion.
    fn on_before_delete(&self, path: &Path, index: usize, total: usize);

    /// Called after successful deletion.
    fn on_delete_success(&self, path: &Path, size: u64);

    /// Called after failed deletion.
    fn on_delete_failure(&self, path: &Path, error: &str);

    /// Called when batch operation completes.
    fn on_complete(&self, result: &BatchDeleteResult);
}

/// File metadata snapshot for change detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSnapshot {
    /// Path to the file.
    pub path: PathBuf,
    /// File size in bytes.
    pub size: u64,
    /// Last modification time.
    pub mtime: Option<SystemTime>,
}

impl FileSnapshot {
    /// Create a snapshot of a file's current state.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist or can't be accessed.
    pub fn capture(path: &Path) -> Result<Self, DeleteError> {
        let metadata = fs::metadata(path).map_err(|e| DeleteError::from_io(path, e))?;

        Ok(Self {
            path: path.to_path_buf(),
            size: metadata.len(),
            mtime: metadata.modified().ok(),
        })
    }

    /// Verify that the file on disk still matches what the scan recorded.
    ///
    /// # Errors
    ///
    /// Returns `Modified` if size or modification time changed, or the
    /// capture error if the file is gone or unreadable.
    pub fn verify_record(record: &FileRecord) -> Result<(), DeleteError> {
        let current = Self::capture(&record.path)?;

        if let (Some(orig), Some(curr)) = (record.modified, current.mtime) {
            if orig != curr {
                log::warn!(
                    "File modified since scan: {} (mtime changed)",
                    record.path.display()
                );
                return Err(DeleteError::Modified(record.path.clone()));
            }
        }

        if record.size != current.size {
            log::warn!(
                "File modified since scan: {} (size changed from {} to {})",
                record.path.display(),
                record.size,
                current.size
            );
            return Err(DeleteError::Modified(record.path.clone()));
        }

        Ok(())
    }
}

/// Delete a single file to the system trash.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if deletion is not allowed
/// - `TrashFailed` if the trash operation fails
pub fn delete_to_trash(path: &Path) -> Result<DeleteResult, DeleteError> {
    let size = fs::metadata(path)
        .map_err(|e| DeleteError::from_io(path, e))?
        .len();

    trash::delete(path).map_err(|e| {
        log::error!("Trash operation failed for {}: {}", path.display(), e);
        DeleteError::TrashFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;

    log::info!("Moved to trash: {} ({} bytes)", path.display(), size);

    Ok(DeleteResult::new(path.to_path_buf(), size, false))
}

/// Permanently delete a single file.
///
/// **WARNING**: This operation cannot be undone.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if deletion is not allowed
/// - `PermanentDeleteFailed` if the delete operation fails
pub fn permanent_delete(path: &Path) -> Result<DeleteResult, DeleteError> {
    let size = fs::metadata(path)
        .map_err(|e| DeleteError::from_io(path, e))?
        .len();

    fs::remove_file(path).map_err(|e| {
        log::error!("Permanent delete failed for {}: {}", path.display(), e);
        DeleteError::PermanentDeleteFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;

    log::info!("Permanently deleted: {} ({} bytes)", path.display(), size);

    Ok(DeleteResult::new(path.to_path_buf(), size, true))
}

fn keep_exists(keep: &FileRecord) -> bool {
    fs::metadata(&keep.path).is_ok_and(|m| m.is_file())
}

// Both paths resolving to one location means removing the target removes the KEEP.
fn aliases_keep(target: &Path, keep: &Path) -> bool {
    match (fs::canonicalize(target), fs::canonicalize(keep)) {
        (Ok(t), Ok(k)) => t == k,
        _ => false,
    }
}

fn remove_target(
    target: &FileRecord,
    keep: &FileRecord,
    method: RemovalMethod,
) -> Result<DeleteResult, DeleteError> {
    if aliases_keep(&target.path, &keep.path) {
        log::warn!(
            "Refusing to delete {}: same file as kept copy {}",
            target.path.display(),
            keep.path.display()
        );
        return Err(DeleteError::SameFile {
            path: target.path.clone(),
            keep: keep.path.clone(),
        });
    }
    FileSnapshot::verify_record(target)?;
    method.remove(&target.path)
}

/// Remove every DELETE-marked file of a plan.
///
/// Groups are processed in plan order. If a group's KEEP file has vanished,
/// all of that group's copies are reported as failures and left in place.
/// A copy that resolves to the KEEP file itself is never removed.
/// A set `shutdown` flag stops execution before the next file.
pub fn execute_plan(
    plan: &DeletionPlan,
    method: RemovalMethod,
    shutdown: Option<&AtomicBool>,
    callback: Option<&dyn DeleteProgressCallback>,
) -> BatchDeleteResult {
    let mut result = BatchDeleteResult::default();
    let total = plan.stats.files_to_delete;
    let mut index = 0;

    'groups: for group in &plan.groups {
        let keep_ok = keep_exists(&group.keep);
        if !keep_ok {
            log::warn!(
                "Kept copy vanished, leaving group {} untouched: {}",
                group.hash_hex(),
                group.keep.path.display()
            );
        }

        for target in &group.delete {
            if shutdown.is_some_and(|f| f.load(Ordering::SeqCst)) {
                log::info!("Deletion interrupted after {} files", index);
                result.interrupted = true;
                break 'groups;
            }

            if let Some(cb) = callback {
                cb.on_before_delete(&target.path, index, total);
            }
            index += 1;

            let outcome = if keep_ok {
                remove_target(target, &group.keep, method)
            } else {
                Err(DeleteError::KeepMissing {
                    path: target.path.clone(),
                    keep: group.keep.path.clone(),
                })
            };

            match outcome {
                Ok(deleted) => {
                    result.bytes_freed += deleted.size;
                    if let Some(cb) = callback {
                        cb.on_delete_success(&target.path, deleted.size);
                    }
                    result.successes.push(deleted);
                }
                Err(e) => {
                    let error_msg = e.to_string();
                    log::warn!("Failed to delete {}: {}", target.path.display(), error_msg);
                    if let Some(cb) = callback {
                        cb.on_delete_failure(&target.path, &error_msg);
                    }
                    result.failures.push((target.path.clone(), error_msg));
                }
            }
        }
    }

    if let Some(cb) = callback {
        cb.on_complete(&result);
    }

    log::info!("{}", result.summary());

    result
}
