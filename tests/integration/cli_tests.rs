use clap::Parser;
use dupesweep::cli::Cli;
use dupesweep::duplicates::FinderError;
use dupesweep::error::ExitCode;
use dupesweep::run_app;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn run(args: &[&str]) -> anyhow::Result<ExitCode> {
    let mut argv = vec!["dupesweep", "--quiet", "--no-progress", "--no-color"];
    argv.extend_from_slice(args);
    run_app(Cli::try_parse_from(argv).unwrap())
}

fn path_str(p: &Path) -> &str {
    p.to_str().unwrap()
}

#[test]
fn test_dry_run_writes_report_and_keeps_files() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("scan");
    fs::create_dir(&root).unwrap();
    fs::write(root.join("a.bin"), b"payload").unwrap();
    fs::write(root.join("b.bin"), b"payload").unwrap();
    let report = dir.path().join("report.txt");

    let code = run(&[path_str(&root), "--dry-run", "--report", path_str(&report)]).unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(root.join("a.bin").exists());
    assert!(root.join("b.bin").exists());
    let text = fs::read_to_string(&report).unwrap();
    assert!(text.contains("DELETE (newer): "));
}

#[test]
fn test_no_duplicates_exit_code() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("scan");
    fs::create_dir(&root).unwrap();
    fs::write(root.join("a.bin"), b"one").unwrap();
    let report = dir.path().join("report.txt");

    let code = run(&[path_str(&root), "--report", path_str(&report)]).unwrap();

    assert_eq!(code, ExitCode::NoDuplicates);
    assert!(report.exists());
}

#[test]
fn test_report_inside_root_is_not_scanned() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("a.bin"), b"payload").unwrap();
    let report = root.join("duplicate_log.txt");
    fs::write(&report, b"payload").unwrap();

    let code = run(&[path_str(root), "--dry-run", "--report", path_str(&report)]).unwrap();

    assert_eq!(code, ExitCode::NoDuplicates);
    assert!(root.join("a.bin").exists());
}

#[test]
fn test_yes_permanent_deletes_newer_copies() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("scan");
    fs::create_dir(&root).unwrap();
    let old = root.join("old.bin");
    let new = root.join("new.bin");
    fs::write(&old, b"payload").unwrap();
    fs::write(&new, b"payload").unwrap();
    filetime::set_file_mtime(&old, filetime::FileTime::from_unix_time(1_000, 0)).unwrap();
    filetime::set_file_mtime(&new, filetime::FileTime::from_unix_time(2_000, 0)).unwrap();
    let report = dir.path().join("report.txt");

    let code = run(&[
        path_str(&root),
        "--yes",
        "--permanent",
        "--report",
        path_str(&report),
    ])
    .unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(old.exists());
    assert!(!new.exists());
}

#[test]
fn test_missing_root_is_an_error() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing");
    let report = dir.path().join("report.txt");

    let err = run(&[path_str(&missing), "--report", path_str(&report)]).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<FinderError>(),
        Some(FinderError::PathNotFound(_))
    ));
    assert!(!report.exists());
}

#[test]
fn test_missing_config_file_is_an_error() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("nope.toml");

    assert!(run(&[path_str(dir.path()), "--config", path_str(&config)]).is_err());
}

#[test]
fn test_print_config_exits_early() {
    let code = run(&["--print-config"]).unwrap();
    assert_eq!(code, ExitCode::Success);
}
