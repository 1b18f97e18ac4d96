use dupesweep::duplicates::{DuplicateFinder, FinderConfig};
use dupesweep::scanner::{SkipSet, WalkerConfig};
use std::fs;
use tempfile::tempdir;

fn finder(skip: SkipSet) -> DuplicateFinder {
    DuplicateFinder::new(FinderConfig::default().with_walker_config(WalkerConfig::new(skip, false)))
}

#[test]
fn test_default_skips_are_case_insensitive() {
    let dir = tempdir().unwrap();
    let themes = dir.path().join("THEMES");
    let recycle = dir.path().join("$Recycle.Bin");
    fs::create_dir_all(&themes).unwrap();
    fs::create_dir_all(&recycle).unwrap();

    fs::write(dir.path().join("keep.bin"), b"payload").unwrap();
    fs::write(themes.join("copy.bin"), b"payload").unwrap();
    fs::write(recycle.join("copy.bin"), b"payload").unwrap();

    let (groups, summary) = finder(SkipSet::default())
        .find_duplicates(dir.path())
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 1);
    assert_eq!(summary.pruned_dirs, 2);
}

#[test]
fn test_skip_is_exact_name_match() {
    let dir = tempdir().unwrap();
    let similar = dir.path().join("my_themes");
    fs::create_dir_all(&similar).unwrap();

    fs::write(dir.path().join("a.bin"), b"payload").unwrap();
    fs::write(similar.join("b.bin"), b"payload").unwrap();

    let (groups, summary) = finder(SkipSet::default())
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(summary.pruned_dirs, 0);
}

#[test]
fn test_skipped_subtree_is_not_entered() {
    let dir = tempdir().unwrap();
    let nested = dir.path().join("themes").join("inner").join("deeper");
    fs::create_dir_all(&nested).unwrap();

    fs::write(nested.join("a.bin"), b"payload").unwrap();
    fs::write(nested.join("b.bin"), b"payload").unwrap();

    let (groups, summary) = finder(SkipSet::default())
        .find_duplicates(dir.path())
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 0);
}

#[test]
fn test_custom_skip_names() {
    let dir = tempdir().unwrap();
    let backups = dir.path().join("Backups");
    fs::create_dir_all(&backups).unwrap();

    fs::write(dir.path().join("a.bin"), b"payload").unwrap();
    fs::write(backups.join("a.bin"), b"payload").unwrap();

    let (with_skip, _) = finder(SkipSet::new(["backups"]))
        .find_duplicates(dir.path())
        .unwrap();
    let (without_skip, _) = finder(SkipSet::empty())
        .find_duplicates(dir.path())
        .unwrap();

    assert!(with_skip.is_empty());
    assert_eq!(without_skip.len(), 1);
}

#[test]
fn test_root_named_like_skip_entry_is_scanned() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("themes");
    fs::create_dir_all(&root).unwrap();

    fs::write(root.join("a.bin"), b"payload").unwrap();
    fs::write(root.join("b.bin"), b"payload").unwrap();

    let (groups, _) = finder(SkipSet::default()).find_duplicates(&root).unwrap();
    assert_eq!(groups.len(), 1);
}

#[test]
fn test_empty_skip_set_prunes_nothing() {
    let dir = tempdir().unwrap();
    let themes = dir.path().join("themes");
    fs::create_dir_all(&themes).unwrap();

    fs::write(dir.path().join("a.bin"), b"payload").unwrap();
    fs::write(themes.join("a.bin"), b"payload").unwrap();

    let (groups, summary) = finder(SkipSet::empty())
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(summary.pruned_dirs, 0);
}
