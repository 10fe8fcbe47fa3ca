//! Directory roll-forward.
//!
//! Walks an input directory, rolls every DOCX forward into the mirrored path
//! under the output directory and writes a report sidecar next to each draft.

use crate::report::RollForwardReport;
use crate::rollforward::{RollForwardEngine, RollForwardRequest};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

/// Prefix of the lock files Word leaves next to open documents
const LOCK_FILE_PREFIX: &str = "~$";

/// Suffix appended to a draft's file stem for its report
pub const REPORT_SUFFIX: &str = ".report.toml";

/// A document rolled forward by the batch
#[derive(Debug, Clone)]
pub struct ProcessedFile {
    /// Relative path from the input directory
    pub path: String,
    pub output: PathBuf,
    pub report: RollForwardReport,
}

/// A document that failed; the batch carries on without it
#[derive(Debug, Clone)]
pub struct FailedFile {
    pub path: String,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct BatchResult {
    pub processed: Vec<ProcessedFile>,
    pub failures: Vec<FailedFile>,
}

impl BatchResult {
    pub fn total(&self) -> usize {
        self.processed.len() + self.failures.len()
    }
}

/// Path of the report sidecar for a draft, e.g. `a/report.docx` -> `a/report.report.toml`
pub fn report_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    output.with_file_name(format!("{}{}", stem, REPORT_SUFFIX))
}

fn is_docx(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("docx"))
}

/// Roll forward every `.docx` under `input_dir` into `output_dir`
pub fn roll_forward_dir(
    engine: &RollForwardEngine,
    input_dir: &Path,
    output_dir: &Path,
    request: &RollForwardRequest,
) -> Result<BatchResult> {
    let mut result = BatchResult::default();

    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create directory {}", output_dir.display()))?;

    // Output may live inside the input tree; never walk into it
    let output_canonical = output_dir.canonicalize().ok();

    for entry in WalkDir::new(input_dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| match &output_canonical {
            Some(out) => e.path().canonicalize().map_or(true, |p| &p != out),
            None => true,
        })
    {
        let entry = entry.context("Failed to read directory entry")?;

        if !entry.file_type().is_file() || !is_docx(entry.path()) {
            continue;
        }
        if entry
            .file_name()
            .to_string_lossy()
            .starts_with(LOCK_FILE_PREFIX)
        {
            continue;
        }

        let rel_path = match entry.path().strip_prefix(input_dir) {
            Ok(p) => p.to_path_buf(),
            Err(_) => continue,
        };
        let rel = rel_path.to_string_lossy().to_string();
        let output = output_dir.join(&rel_path);

        match roll_forward_one(engine, entry.path(), &output, request) {
            Ok(report) => {
                info!("{}: {} replacements", rel, report.total_replacements);
                result.processed.push(ProcessedFile {
                    path: rel,
                    output,
                    report,
                });
            }
            Err(e) => {
                warn!("{}: {:#}", rel, e);
                result.failures.push(FailedFile {
                    path: rel,
                    error: format!("{:#}", e),
                });
            }
        }
    }

    info!(
        "Batch complete: {} rolled forward, {} failed",
        result.processed.len(),
        result.failures.len()
    );
    Ok(result)
}

fn roll_forward_one(
    engine: &RollForwardEngine,
    input: &Path,
    output: &Path,
    request: &RollForwardRequest,
) -> Result<RollForwardReport> {
    let prior =
        fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let outcome = engine.roll_forward(&prior, request)?;

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    fs::write(output, &outcome.document)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    outcome.report.save(&report_path(output))?;

    Ok(outcome.report)
}
