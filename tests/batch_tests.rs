mod common;

use common::*;
use std::fs;
use tempfile::TempDir;
use tpd_rollforward::batch::{report_path, roll_forward_dir};
use tpd_rollforward::docx::DOCUMENT_PART;
use tpd_rollforward::{Config, RollForwardEngine, RollForwardReport, RollForwardRequest};

fn engine() -> RollForwardEngine {
    RollForwardEngine::new(Config::default()).unwrap()
}

#[test]
fn test_batch_mirrors_tree_and_writes_reports() {
    let tmp_dir = TempDir::new().unwrap();
    let input = tmp_dir.path().join("prior");
    let output = tmp_dir.path().join("drafts");
    fs::create_dir_all(input.join("emea")).unwrap();

    fs::write(input.join("acme.docx"), prior_year_docx()).unwrap();
    fs::write(input.join("emea").join("acme-uk.docx"), prior_year_docx()).unwrap();
    fs::write(input.join("~$acme.docx"), b"lock").unwrap();
    fs::write(input.join("notes.txt"), "FY2023 notes").unwrap();

    let result =
        roll_forward_dir(&engine(), &input, &output, &RollForwardRequest::new(2024)).unwrap();

    assert_eq!(result.processed.len(), 2);
    assert!(result.failures.is_empty());
    assert_eq!(result.total(), 2);

    let paths: Vec<&str> = result.processed.iter().map(|p| p.path.as_str()).collect();
    assert!(paths.contains(&"acme.docx"));

    let draft = output.join("emea").join("acme-uk.docx");
    assert!(draft.exists());
    assert_eq!(
        part_texts(&fs::read(&draft).unwrap(), DOCUMENT_PART)[0],
        "Transfer Pricing Report FY2024"
    );

    let report = RollForwardReport::load(&report_path(&draft)).unwrap();
    assert_eq!(report.new_fy, 2024);
    assert_eq!(report.total_replacements, 4);

    assert!(!output.join("~$acme.docx").exists());
    assert!(!output.join("notes.txt").exists());
}

#[test]
fn test_batch_collects_failures() {
    let tmp_dir = TempDir::new().unwrap();
    let input = tmp_dir.path().join("prior");
    let output = tmp_dir.path().join("drafts");
    fs::create_dir_all(&input).unwrap();

    fs::write(input.join("good.docx"), prior_year_docx()).unwrap();
    fs::write(input.join("broken.docx"), b"not a zip archive").unwrap();

    let result =
        roll_forward_dir(&engine(), &input, &output, &RollForwardRequest::new(2024)).unwrap();

    assert_eq!(result.processed.len(), 1);
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].path, "broken.docx");
    assert!(result.failures[0].error.contains("DOCX error"));
    assert!(output.join("good.docx").exists());
    assert!(!output.join("broken.docx").exists());
}

#[test]
fn test_batch_skips_output_inside_input() {
    let tmp_dir = TempDir::new().unwrap();
    let input = tmp_dir.path().to_path_buf();
    let output = input.join("drafts");

    fs::write(input.join("acme.docx"), prior_year_docx()).unwrap();

    let first =
        roll_forward_dir(&engine(), &input, &output, &RollForwardRequest::new(2024)).unwrap();
    assert_eq!(first.processed.len(), 1);

    // A second run must not pick up the drafts written by the first
    let second =
        roll_forward_dir(&engine(), &input, &output, &RollForwardRequest::new(2025)).unwrap();
    assert_eq!(second.processed.len(), 1);
    assert_eq!(second.processed[0].path, "acme.docx");
}
