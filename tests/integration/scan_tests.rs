use dupesweep::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use dupesweep::plan::DeletionPlan;
use dupesweep::scanner::QUICK_HASH_SIZE;
use filetime::{set_file_mtime, FileTime};
use std::fs::{self, File};
use std::io::Write;
use tempfile::tempdir;

fn write(dir: &std::path::Path, name: &str, content: &[u8]) {
    File::create(dir.join(name))
        .unwrap()
        .write_all(content)
        .unwrap();
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let finder = DuplicateFinder::with_defaults();

    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 0);
    assert_eq!(summary.duplicate_groups, 0);
    assert_eq!(summary.error_count(), 0);
}

#[test]
fn test_scan_unique_files() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"content a");
    write(dir.path(), "b.txt", b"content b");
    write(dir.path(), "c.txt", b"content c");

    let finder = DuplicateFinder::with_defaults();
    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 3);
    // Same size, so all three reach the quick hash and are split there.
    assert_eq!(summary.eliminated_by_size, 0);
    assert_eq!(summary.eliminated_by_quick_hash, 3);
}

#[test]
fn test_scan_duplicate_files() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"duplicate");
    write(dir.path(), "b.txt", b"duplicate");
    write(dir.path(), "c.txt", b"unique");

    let finder = DuplicateFinder::with_defaults();
    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].files.len(), 2);
    assert_eq!(groups[0].size, 9);
    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.eliminated_by_size, 1);
    assert_eq!(summary.duplicate_groups, 1);
    assert_eq!(summary.duplicate_files, 1);
    assert_eq!(summary.reclaimable_space, 9);
}

#[test]
fn test_scan_nested_directories() {
    let dir = tempdir().unwrap();
    let deep = dir.path().join("one").join("two").join("three");
    fs::create_dir_all(&deep).unwrap();

    write(dir.path(), "top.bin", b"nested content");
    write(&deep, "bottom.bin", b"nested content");

    let (groups, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(groups.len(), 1);
    let names: Vec<_> = groups[0]
        .files
        .iter()
        .map(|f| f.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert!(names.contains(&"top.bin".to_string()));
    assert!(names.contains(&"bottom.bin".to_string()));
}

#[test]
fn test_paths_are_absolute() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a", b"same");
    write(dir.path(), "b", b"same");

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(summary.root.is_absolute());
    assert!(groups[0].files.iter().all(|f| f.path.is_absolute()));
}

#[test]
fn test_groups_ordered_by_size_descending() {
    let dir = tempdir().unwrap();
    write(dir.path(), "s1", b"ab");
    write(dir.path(), "s2", b"ab");
    write(dir.path(), "l1", &[7u8; 5000]);
    write(dir.path(), "l2", &[7u8; 5000]);
    write(dir.path(), "m1", b"medium size");
    write(dir.path(), "m2", b"medium size");

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    let sizes: Vec<u64> = groups.iter().map(|g| g.size).collect();
    assert_eq!(sizes, vec![5000, 11, 2]);
    assert_eq!(summary.duplicate_groups, 3);
}

#[test]
fn test_members_sorted_by_path() {
    let dir = tempdir().unwrap();
    for name in ["c.dat", "a.dat", "b.dat"] {
        write(dir.path(), name, b"triplicate");
    }

    let (groups, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    let paths = groups[0].paths();
    let mut sorted = paths.clone();
    sorted.sort();
    assert_eq!(paths, sorted);
}

#[test]
fn test_same_prefix_different_tail_split_by_full_hash() {
    let dir = tempdir().unwrap();
    let mut a = vec![b'x'; QUICK_HASH_SIZE * 2];
    let b = a.clone();
    let last = a.len() - 1;
    a[last] = b'y';

    write(dir.path(), "a.bin", &a);
    write(dir.path(), "b.bin", &b);

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.eliminated_by_quick_hash, 0);
    assert_eq!(summary.eliminated_by_full_hash, 2);
}

#[test]
fn test_mmap_and_streaming_agree() {
    let dir = tempdir().unwrap();
    let content = vec![42u8; 64 * 1024];
    write(dir.path(), "a.bin", &content);
    write(dir.path(), "b.bin", &content);

    let streamed = DuplicateFinder::new(FinderConfig::default().with_mmap_threshold(u64::MAX))
        .find_duplicates(dir.path())
        .unwrap()
        .0;
    let mapped = DuplicateFinder::new(FinderConfig::default().with_mmap_threshold(1))
        .find_duplicates(dir.path())
        .unwrap()
        .0;

    assert_eq!(streamed.len(), 1);
    assert_eq!(streamed[0].hash, mapped[0].hash);
    assert_eq!(streamed[0].hash, *blake3::hash(&content).as_bytes());
}

#[test]
fn test_single_thread_matches_default() {
    let dir = tempdir().unwrap();
    for i in 0..6 {
        write(dir.path(), &format!("dup_{i}"), b"shared payload");
        write(dir.path(), &format!("uniq_{i}"), format!("unique {i}").as_bytes());
    }

    let single = DuplicateFinder::new(FinderConfig::default().with_io_threads(1))
        .find_duplicates(dir.path())
        .unwrap()
        .0;
    let many = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap()
        .0;

    assert_eq!(single.len(), 1);
    assert_eq!(single[0].files.len(), 6);
    assert_eq!(single[0].paths(), many[0].paths());
}

#[test]
fn test_repeated_scans_give_identical_plans() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("sub");
    fs::create_dir(&sub).unwrap();
    for i in 0..8 {
        write(dir.path(), &format!("dup_{i}.bin"), b"shared payload");
        write(&sub, &format!("dup_{i}.bin"), b"shared payload");
        write(dir.path(), &format!("pair_{i}"), format!("pair {}", i % 3).as_bytes());
        write(&sub, &format!("uniq_{i}"), format!("unique {i}").as_bytes());
    }
    let mut prefixed = vec![b'z'; QUICK_HASH_SIZE + 10];
    write(dir.path(), "long_a", &prefixed);
    write(&sub, "long_b", &prefixed);
    prefixed[QUICK_HASH_SIZE + 5] = b'!';
    write(dir.path(), "long_c", &prefixed);
    // Identical mtimes force the keep rule onto path length and lexical order.
    for entry in all_files(dir.path()) {
        set_file_mtime(&entry, FileTime::from_unix_time(1_700_000_000, 0)).unwrap();
    }

    let scan = |threads: usize| {
        let (groups, summary) = DuplicateFinder::new(FinderConfig::default().with_io_threads(threads))
            .find_duplicates(dir.path())
            .unwrap();
        let plan = DeletionPlan::from_scan(groups.clone(), &summary);
        (groups, plan, summary)
    };

    let (first_groups, first_plan, first_summary) = scan(4);
    assert!(!first_plan.is_empty());
    for threads in [1, 2, 4, 8] {
        let (groups, plan, summary) = scan(threads);
        assert_eq!(groups, first_groups);
        assert_eq!(plan, first_plan);
        assert_eq!(summary.total_files, first_summary.total_files);
        assert_eq!(summary.eliminated_by_size, first_summary.eliminated_by_size);
        assert_eq!(
            summary.eliminated_by_quick_hash,
            first_summary.eliminated_by_quick_hash
        );
        assert_eq!(
            summary.eliminated_by_full_hash,
            first_summary.eliminated_by_full_hash
        );
        assert_eq!(summary.reclaimable_space, first_summary.reclaimable_space);
    }
}

fn all_files(root: &std::path::Path) -> Vec<std::path::PathBuf> {
    let mut files = Vec::new();
    for entry in fs::read_dir(root).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            files.extend(all_files(&path));
        } else {
            files.push(path);
        }
    }
    files
}

#[test]
fn test_missing_root_is_fatal() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("does_not_exist");

    let err = DuplicateFinder::with_defaults()
        .find_duplicates(&missing)
        .unwrap_err();
    assert!(matches!(err, FinderError::PathNotFound(_)));
}

#[test]
fn test_file_root_is_fatal() {
    let dir = tempdir().unwrap();
    write(dir.path(), "plain.txt", b"not a dir");

    let err = DuplicateFinder::with_defaults()
        .find_duplicates(&dir.path().join("plain.txt"))
        .unwrap_err();
    assert!(matches!(err, FinderError::NotADirectory(_)));
}
