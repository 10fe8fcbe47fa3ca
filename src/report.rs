//! Roll-forward run report.
//!
//! Records what a run did to a document: the fingerprints of the source and
//! output files, the detected years, how often each rule fired and which
//! sections were appended. Reports are stored as TOML next to the draft.

use crate::replace::{ReplaceStats, ReplacementSet};
use crate::sections::SectionKind;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

/// How often one rule fired
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacementCount {
    pub from: String,
    pub to: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollForwardReport {
    pub generated_at: DateTime<Utc>,
    pub source_sha256: String,
    pub output_sha256: String,
    pub new_fy: i32,
    /// Years found in the prior document
    #[serde(default)]
    pub detected_years: Vec<i32>,
    /// True when no year was found and the previous year was assumed
    #[serde(default)]
    pub assumed_prior_year: bool,
    pub total_replacements: usize,
    /// Matches left alone because they crossed a tab or break
    #[serde(default)]
    pub skipped_matches: usize,
    #[serde(default)]
    pub sections: Vec<SectionKind>,
    #[serde(default)]
    pub parts_modified: Vec<String>,
    #[serde(default)]
    pub replacements: Vec<ReplacementCount>,
}

impl RollForwardReport {
    /// Per-rule counts paired with their rules; rules that never fired are omitted
    pub fn replacement_counts(set: &ReplacementSet, stats: &ReplaceStats) -> Vec<ReplacementCount> {
        set.rules()
            .iter()
            .zip(&stats.per_rule)
            .filter(|(_, count)| **count > 0)
            .map(|(rule, &count)| ReplacementCount {
                from: rule.from.clone(),
                to: rule.to.clone(),
                count,
            })
            .collect()
    }

    /// Load a report from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read report from {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse report from {}", path.display()))
    }

    /// Save report to file atomically
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents =
            toml::to_string_pretty(self).context("Failed to serialize report to TOML")?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        // Write atomically: write to temp file, then rename
        let temp_path = path.with_extension("toml.tmp");
        fs::write(&temp_path, contents)
            .with_context(|| format!("Failed to write temp report to {}", temp_path.display()))?;

        fs::rename(&temp_path, path)
            .with_context(|| format!("Failed to rename temp report to {}", path.display()))?;

        Ok(())
    }
}

/// SHA-256 of a byte buffer as lowercase hex
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
