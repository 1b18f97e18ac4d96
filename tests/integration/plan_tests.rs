use dupesweep::duplicates::DuplicateFinder;
use dupesweep::plan::{DeletionPlan, Mark};
use filetime::{set_file_mtime, FileTime};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write_at(path: &Path, content: &[u8], unix_secs: i64) {
    fs::write(path, content).unwrap();
    set_file_mtime(path, FileTime::from_unix_time(unix_secs, 0)).unwrap();
}

fn scan_and_plan(root: &Path) -> DeletionPlan {
    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(root)
        .unwrap();
    DeletionPlan::from_scan(groups, &summary)
}

#[test]
fn test_oldest_copy_is_kept() {
    let dir = tempdir().unwrap();
    write_at(&dir.path().join("newest.rom"), b"0123456789", 3_000_000);
    write_at(&dir.path().join("oldest.rom"), b"0123456789", 1_000_000);
    write_at(&dir.path().join("middle.rom"), b"0123456789", 2_000_000);

    let plan = scan_and_plan(dir.path());

    assert_eq!(plan.groups.len(), 1);
    let group = &plan.groups[0];
    assert_eq!(group.keep.path.file_name().unwrap(), "oldest.rom");
    assert_eq!(group.delete.len(), 2);
    assert_eq!(plan.stats.files_to_keep, 1);
    assert_eq!(plan.stats.files_to_delete, 2);
    assert_eq!(plan.stats.bytes_to_free, 20);
}

#[test]
fn test_equal_mtime_prefers_shorter_path() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("nested");
    fs::create_dir_all(&sub).unwrap();
    write_at(&sub.join("copy.bin"), b"same bytes", 1_500_000);
    write_at(&dir.path().join("copy.bin"), b"same bytes", 1_500_000);

    let plan = scan_and_plan(dir.path());

    let keep = &plan.groups[0].keep.path;
    assert!(!keep.parent().unwrap().ends_with("nested"));
    assert!(plan.groups[0].delete[0].path.parent().unwrap().ends_with("nested"));
}

#[test]
fn test_equal_mtime_and_length_prefers_lexical_order() {
    let dir = tempdir().unwrap();
    write_at(&dir.path().join("b.bin"), b"same bytes", 1_500_000);
    write_at(&dir.path().join("a.bin"), b"same bytes", 1_500_000);

    let plan = scan_and_plan(dir.path());

    assert_eq!(plan.groups[0].keep.path.file_name().unwrap(), "a.bin");
    assert_eq!(plan.groups[0].delete[0].path.file_name().unwrap(), "b.bin");
}

#[test]
fn test_exactly_one_keep_per_group() {
    let dir = tempdir().unwrap();
    for i in 0..4 {
        write_at(&dir.path().join(format!("x{i}")), b"group x", 1_000 + i);
        write_at(&dir.path().join(format!("y{i}")), b"group yy", 2_000 - i);
    }

    let plan = scan_and_plan(dir.path());

    assert_eq!(plan.groups.len(), 2);
    for group in &plan.groups {
        let keeps = group.marks().filter(|(_, m)| *m == Mark::Keep).count();
        let deletes = group.marks().filter(|(_, m)| *m == Mark::Delete).count();
        assert_eq!(keeps, 1);
        assert_eq!(deletes, 3);
        assert!(!group.delete.iter().any(|d| d.path == group.keep.path));
    }
    assert_eq!(plan.delete_targets().count(), 6);
}

#[test]
fn test_plan_counts_whole_scan() {
    let dir = tempdir().unwrap();
    write_at(&dir.path().join("a"), b"dup", 1);
    write_at(&dir.path().join("b"), b"dup", 2);
    write_at(&dir.path().join("c"), b"unique file", 3);

    let plan = scan_and_plan(dir.path());

    assert_eq!(plan.stats.files_scanned, 3);
    assert_eq!(plan.stats.bytes_scanned, 3 + 3 + 11);
    assert_eq!(plan.stats.groups, 1);
}

#[test]
fn test_no_duplicates_gives_empty_plan() {
    let dir = tempdir().unwrap();
    write_at(&dir.path().join("a"), b"one", 1);
    write_at(&dir.path().join("b"), b"two!", 2);

    let plan = scan_and_plan(dir.path());
    assert!(plan.is_empty());
    assert_eq!(plan.stats.files_to_delete, 0);
    assert_eq!(plan.stats.bytes_to_free, 0);
}
