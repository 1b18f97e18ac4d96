use dupesweep::actions::{execute_plan, DeleteProgressCallback, RemovalMethod};
use dupesweep::actions::BatchDeleteResult;
use dupesweep::duplicates::DuplicateFinder;
use dupesweep::plan::DeletionPlan;
use filetime::{set_file_mtime, FileTime};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Mutex;
use tempfile::{tempdir, TempDir};

/// Three identical files with ascending mtimes: `old` is kept.
fn setup() -> (TempDir, DeletionPlan) {
    let dir = tempdir().unwrap();
    for (name, secs) in [("old.bin", 1_000_000), ("mid.bin", 2_000_000), ("new.bin", 3_000_000)] {
        let path = dir.path().join(name);
        fs::write(&path, b"0123456789").unwrap();
        set_file_mtime(&path, FileTime::from_unix_time(secs, 0)).unwrap();
    }
    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();
    let plan = DeletionPlan::from_scan(groups, &summary);
    (dir, plan)
}

#[test]
fn test_permanent_execution_removes_only_delete_marks() {
    let (dir, plan) = setup();

    let result = execute_plan(&plan, RemovalMethod::Permanent, None, None);

    assert!(result.all_succeeded());
    assert_eq!(result.success_count(), 2);
    assert_eq!(result.bytes_freed, 20);
    assert!(!result.interrupted);
    assert!(dir.path().join("old.bin").exists());
    assert!(!dir.path().join("mid.bin").exists());
    assert!(!dir.path().join("new.bin").exists());
}

#[test]
fn test_modified_file_is_not_deleted() {
    let (dir, plan) = setup();
    let mid = dir.path().join("mid.bin");
    fs::write(&mid, b"changed contents, longer").unwrap();

    let result = execute_plan(&plan, RemovalMethod::Permanent, None, None);

    assert_eq!(result.success_count(), 1);
    assert_eq!(result.failure_count(), 1);
    assert!(result.failures[0].1.contains("modified"));
    assert!(mid.exists());
    assert!(!dir.path().join("new.bin").exists());
}

#[test]
fn test_touched_file_is_not_deleted() {
    let (dir, plan) = setup();
    let new = dir.path().join("new.bin");
    set_file_mtime(&new, FileTime::from_unix_time(4_000_000, 0)).unwrap();

    let result = execute_plan(&plan, RemovalMethod::Permanent, None, None);

    assert_eq!(result.failure_count(), 1);
    assert!(new.exists());
}

#[test]
fn test_missing_keep_leaves_group_untouched() {
    let (dir, plan) = setup();
    fs::remove_file(dir.path().join("old.bin")).unwrap();

    let result = execute_plan(&plan, RemovalMethod::Permanent, None, None);

    assert_eq!(result.success_count(), 0);
    assert_eq!(result.failure_count(), 2);
    assert!(dir.path().join("mid.bin").exists());
    assert!(dir.path().join("new.bin").exists());
}

#[test]
fn test_vanished_target_is_reported_and_batch_continues() {
    let (dir, plan) = setup();
    fs::remove_file(dir.path().join("mid.bin")).unwrap();

    let result = execute_plan(&plan, RemovalMethod::Permanent, None, None);

    assert_eq!(result.failure_count(), 1);
    assert_eq!(result.success_count(), 1);
    assert!(!dir.path().join("new.bin").exists());
    assert!(dir.path().join("old.bin").exists());
}

#[test]
fn test_shutdown_stops_before_next_file() {
    let (dir, plan) = setup();
    let flag = AtomicBool::new(true);

    let result = execute_plan(&plan, RemovalMethod::Permanent, Some(&flag), None);

    assert!(result.interrupted);
    assert_eq!(result.total_count(), 0);
    assert!(dir.path().join("mid.bin").exists());
    assert!(dir.path().join("new.bin").exists());
}

#[derive(Default)]
struct Recorder {
    before: Mutex<Vec<(PathBuf, usize, usize)>>,
    completed: Mutex<Option<usize>>,
}

impl DeleteProgressCallback for Recorder {
    fn on_before_delete(&self, path: &Path, index: usize, total: usize) {
        self.before
            .lock()
            .unwrap()
            .push((path.to_path_buf(), index, total));
    }
    fn on_delete_success(&self, _path: &Path, _size: u64) {}
    fn on_delete_failure(&self, _path: &Path, _error: &str) {}
    fn on_complete(&self, result: &BatchDeleteResult) {
        *self.completed.lock().unwrap() = Some(result.success_count());
    }
}

#[test]
fn test_progress_callback_sees_every_target() {
    let (_dir, plan) = setup();
    let recorder = Recorder::default();

    execute_plan(&plan, RemovalMethod::Permanent, None, Some(&recorder));

    let before = recorder.before.lock().unwrap();
    assert_eq!(before.len(), 2);
    assert_eq!(before[0].1, 0);
    assert_eq!(before[1].1, 1);
    assert!(before.iter().all(|(_, _, total)| *total == 2));
    assert_eq!(*recorder.completed.lock().unwrap(), Some(2));
}

#[test]
fn test_removal_method_selection() {
    assert_eq!(RemovalMethod::detect(true), RemovalMethod::Permanent);
    assert!(!RemovalMethod::Permanent.is_fallback(true));
    assert!(RemovalMethod::Permanent.is_fallback(false));
    assert!(!RemovalMethod::Reversible.is_fallback(false));
    assert_eq!(RemovalMethod::Permanent.describe(), "permanently deleted");
}
