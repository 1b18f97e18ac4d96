use chrono::{Local, TimeZone};
use dupesweep::duplicates::{DuplicateFinder, ScanSummary};
use dupesweep::error::ExitCode;
use dupesweep::output::{JsonOutput, TextReport};
use dupesweep::plan::DeletionPlan;
use filetime::{set_file_mtime, FileTime};
use std::fs;
use tempfile::{tempdir, TempDir};

fn scanned() -> (TempDir, DeletionPlan, ScanSummary) {
    let dir = tempdir().unwrap();
    let first = dir.path().join("first.sav");
    let second = dir.path().join("second.sav");
    fs::write(&first, b"save data").unwrap();
    fs::write(&second, b"save data").unwrap();
    fs::write(dir.path().join("lonely.txt"), b"no twin").unwrap();
    set_file_mtime(&first, FileTime::from_unix_time(1_000_000, 0)).unwrap();
    set_file_mtime(&second, FileTime::from_unix_time(2_000_000, 0)).unwrap();

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();
    let plan = DeletionPlan::from_scan(groups, &summary);
    (dir, plan, summary)
}

#[test]
fn test_text_report_lists_keep_before_delete() {
    let (_dir, plan, summary) = scanned();
    let generated = Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();

    let mut buf = Vec::new();
    TextReport::new(&plan, &summary)
        .with_timestamp(generated)
        .write_to(&mut buf)
        .unwrap();
    let text = String::from_utf8(buf).unwrap();

    assert!(text.starts_with("DUPLICATE FILE REPORT\nGenerated: 2024-01-02 03:04:05\n"));
    let keep = text.find("KEEP (oldest): ").unwrap();
    let delete = text.find("DELETE (newer): ").unwrap();
    assert!(keep < delete);
    assert!(text[keep..delete].contains("first.sav"));
    assert!(text[delete..].contains("second.sav"));
    assert!(!text.contains("lonely.txt"));
    assert!(text.contains("Files scanned:     3"));
    assert!(text.contains("Files to delete:   1"));
    assert!(text.contains("ERRORS ENCOUNTERED: 0"));
}

#[test]
fn test_text_report_written_to_disk() {
    let (dir, plan, summary) = scanned();
    let report_path = dir.path().join("duplicate_log.txt");

    TextReport::new(&plan, &summary)
        .write_to_path(&report_path)
        .unwrap();

    let text = fs::read_to_string(&report_path).unwrap();
    assert!(text.contains("SUMMARY"));
    assert!(text.contains("Groups found:      1"));
}

#[test]
fn test_json_output_shape() {
    let (_dir, plan, summary) = scanned();
    let output = JsonOutput::new(&plan, &summary, ExitCode::Success);

    let value: serde_json::Value = serde_json::from_str(&output.to_json().unwrap()).unwrap();

    let groups = value["groups"].as_array().unwrap();
    assert_eq!(groups.len(), 1);
    assert!(groups[0]["keep"]["path"].as_str().unwrap().ends_with("first.sav"));
    assert_eq!(groups[0]["delete"].as_array().unwrap().len(), 1);
    assert_eq!(groups[0]["size"], 9);
    assert_eq!(value["summary"]["files_scanned"], 3);
    assert_eq!(value["summary"]["files_to_delete"], 1);
    assert_eq!(value["summary"]["exit_code"], 0);
    assert!(value["errors"].as_array().unwrap().is_empty());
}
