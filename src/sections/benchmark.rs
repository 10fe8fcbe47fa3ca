//! Benchmark (vendor study) summary.

use serde::{Deserialize, Serialize};

/// Summary used when no comparables were supplied
pub const NO_BENCHMARK: &str = "Benchmark not provided.";

/// One comparable company from a benchmark export
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Comparable {
    #[serde(default)]
    pub name: String,
    /// Reviewer decision, usually `Accept` or `Reject`
    #[serde(default)]
    pub decision: String,
}

/// Comparables from a benchmark study
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkStudy {
    #[serde(default)]
    pub comparables: Vec<Comparable>,
}

/// Accept/reject tally of a study
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkSummary {
    pub accepted: usize,
    pub rejected: usize,
    pub total: usize,
}

impl BenchmarkStudy {
    /// Build a study from bare decisions
    pub fn from_decisions<I, S>(decisions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            comparables: decisions
                .into_iter()
                .map(|d| Comparable {
                    name: String::new(),
                    decision: d.into(),
                })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.comparables.is_empty()
    }

    /// Count decisions; comparison ignores case and surrounding whitespace
    pub fn summarize(&self) -> BenchmarkSummary {
        let mut summary = BenchmarkSummary {
            total: self.comparables.len(),
            ..Default::default()
        };
        for comparable in &self.comparables {
            match comparable.decision.trim().to_lowercase().as_str() {
                "accept" => summary.accepted += 1,
                "reject" => summary.rejected += 1,
                _ => {}
            }
        }
        summary
    }
}

impl BenchmarkSummary {
    pub fn sentence(&self) -> String {
        format!(
            "Vendor study summary: {} accepted, {} rejected, {} total comparables.",
            self.accepted, self.rejected, self.total
        )
    }
}

/// Summary sentence for an optional study
pub fn summarize_benchmark(study: Option<&BenchmarkStudy>) -> String {
    match study {
        Some(study) if !study.is_empty() => study.summarize().sentence(),
        _ => NO_BENCHMARK.to_string(),
    }
}
