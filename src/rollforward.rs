//! Roll-forward engine.
//!
//! Ties the pieces together for one prior-year document:
//! detect fiscal years across every story part, plan the replacement rules,
//! rewrite the runs in place, append the conditional sections to the body,
//! then re-zip the package and report what changed.
//!
//! PDF input cannot keep its styling, so it produces a JSON draft payload
//! carrying the same inputs instead of a document.

use crate::config::Config;
use crate::docx::package::{DocxPackage, DOCUMENT_PART};
use crate::docx::paragraph::document_texts;
use crate::docx::xml::XmlDocument;
use crate::error::{Error, IoError, Result, RollForwardError};
use crate::fiscal::{plan_replacements, FiscalYearDetector, PlanOptions};
use crate::replace::{replace_in_document, ReplaceStats, Replacement, ReplacementSet};
use crate::report::{sha256_hex, RollForwardReport};
use crate::sections::benchmark::{summarize_benchmark, BenchmarkStudy};
use crate::sections::client_info::ClientInfo;
use crate::sections::industry::{
    cleaned_sources, IndustrySource, ProvidedTitleResolver, TitleResolver,
};
use crate::sections::{SectionAppender, SectionContent};
use anyhow::Context;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// What information is available for this year's update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateMode {
    #[default]
    NoInformation,
    ClientInformationRequest,
    BenchmarkStudy,
    Both,
}

impl UpdateMode {
    pub fn uses_benchmark(self) -> bool {
        matches!(self, UpdateMode::BenchmarkStudy | UpdateMode::Both)
    }

    pub fn uses_client_info(self) -> bool {
        matches!(self, UpdateMode::ClientInformationRequest | UpdateMode::Both)
    }
}

impl fmt::Display for UpdateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateMode::NoInformation => write!(f, "No information"),
            UpdateMode::ClientInformationRequest => write!(f, "Client information request"),
            UpdateMode::BenchmarkStudy => write!(f, "Benchmark study"),
            UpdateMode::Both => write!(f, "Both (IRL + Benchmark)"),
        }
    }
}

/// Everything needed to roll one document forward
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RollForwardRequest {
    pub new_fy: i32,
    /// Inserted after the `Report Date` label, e.g. `30 June 2025`
    #[serde(default)]
    pub report_date: Option<String>,
    #[serde(default)]
    pub mode: UpdateMode,
    #[serde(default)]
    pub benchmark: Option<BenchmarkStudy>,
    #[serde(default)]
    pub client_info: Option<ClientInfo>,
    #[serde(default)]
    pub industry_sources: Vec<IndustrySource>,
    #[serde(default)]
    pub extra_replacements: Vec<Replacement>,
}

impl RollForwardRequest {
    pub fn new(new_fy: i32) -> Self {
        Self {
            new_fy,
            ..Default::default()
        }
    }

    pub fn with_mode(mut self, mode: UpdateMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_report_date(mut self, date: impl Into<String>) -> Self {
        self.report_date = Some(date.into());
        self
    }

    pub fn with_benchmark(mut self, study: BenchmarkStudy) -> Self {
        self.benchmark = Some(study);
        self
    }

    pub fn with_client_info(mut self, info: ClientInfo) -> Self {
        self.client_info = Some(info);
        self
    }

    pub fn with_industry_sources(mut self, sources: Vec<IndustrySource>) -> Self {
        self.industry_sources = sources;
        self
    }

    pub fn with_replacement(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.extra_replacements.push(Replacement::new(from, to));
        self
    }

    /// Load a request (job file) from TOML
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read request from {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse request from {}", path.display()))
    }

    /// Benchmark study, if the update mode includes one
    pub fn active_benchmark(&self) -> Option<&BenchmarkStudy> {
        self.benchmark.as_ref().filter(|_| self.mode.uses_benchmark())
    }

    /// Client information, if the update mode includes it
    pub fn active_client_info(&self) -> Option<&ClientInfo> {
        self.client_info.as_ref().filter(|_| self.mode.uses_client_info())
    }
}

/// Rolled-forward document and its report
#[derive(Debug, Clone)]
pub struct RollForwardOutcome {
    pub document: Vec<u8>,
    pub report: RollForwardReport,
}

/// JSON draft written for PDF input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftPayload {
    pub note: String,
    pub new_fy: i32,
    pub report_date: String,
    pub industry_sources: Vec<String>,
    pub benchmark_summary: Option<String>,
    pub irl: Option<String>,
}

impl DraftPayload {
    pub const NOTE: &'static str =
        "PDF input: style not preserved. Upload DOCX to keep formatting.";

    pub fn from_request(request: &RollForwardRequest) -> Self {
        Self {
            note: Self::NOTE.to_string(),
            new_fy: request.new_fy,
            report_date: request.report_date.clone().unwrap_or_default(),
            industry_sources: cleaned_sources(&request.industry_sources)
                .into_iter()
                .map(|s| s.url)
                .collect(),
            benchmark_summary: request
                .active_benchmark()
                .map(|study| summarize_benchmark(Some(study))),
            irl: request
                .active_client_info()
                .filter(|info| !info.text.is_empty())
                .map(|info| info.text.clone()),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// What `roll_forward_file` produced
#[derive(Debug, Clone)]
pub enum DraftOutput {
    Docx(RollForwardReport),
    Json(DraftPayload),
}

/// The document roll-forward engine
pub struct RollForwardEngine {
    config: Config,
    detector: FiscalYearDetector,
    resolver: Box<dyn TitleResolver>,
}

impl RollForwardEngine {
    /// Create an engine; fails if the configured detection pattern is invalid
    pub fn new(config: Config) -> Result<Self> {
        let detector = FiscalYearDetector::new(&config.fiscal_year.pattern)?;
        let resolver = Box::new(ProvidedTitleResolver::new(config.sections.max_title_len));
        Ok(Self {
            config,
            detector,
            resolver,
        })
    }

    /// Replace the title resolver used for industry citations
    pub fn with_title_resolver(mut self, resolver: Box<dyn TitleResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn validate_year(&self, year: i32) -> Result<()> {
        let min = self.config.fiscal_year.min_year;
        let max = self.config.fiscal_year.max_year;
        if year < min || year > max {
            return Err(RollForwardError::InvalidFiscalYear { year, min, max }.into());
        }
        Ok(())
    }

    /// Roll a prior-year DOCX forward
    pub fn roll_forward(
        &self,
        prior: &[u8],
        request: &RollForwardRequest,
    ) -> Result<RollForwardOutcome> {
        self.validate_year(request.new_fy)?;

        let mut package = DocxPackage::from_bytes(prior)?;
        let part_names = package.story_parts(self.config.parts.include_headers_footers);

        let mut parts: Vec<XmlDocument> = Vec::with_capacity(part_names.len());
        for name in &part_names {
            if let Some(bytes) = package.part(name) {
                parts.push(XmlDocument::parse(name, bytes)?);
            }
        }

        let detection = self.detector.detect(parts.iter().flat_map(document_texts));
        if detection.is_empty() {
            info!(
                "No fiscal-year tokens found, assuming prior year {}",
                request.new_fy - 1
            );
        } else {
            info!("Detected fiscal years: {:?}", detection.years);
        }

        let rules = plan_replacements(
            &detection,
            request.new_fy,
            &PlanOptions {
                token_formats: &self.config.fiscal_year.token_formats,
                report_date: request.report_date.as_deref(),
                extra: &request.extra_replacements,
            },
        );
        let set = ReplacementSet::new(rules)?;
        debug!("Planned {} replacement rules", set.rules().len());

        let mut stats = ReplaceStats::for_set(&set);
        let mut modified = vec![false; parts.len()];
        for (doc, changed) in parts.iter_mut().zip(modified.iter_mut()) {
            let part_stats = replace_in_document(doc, &set);
            if part_stats.paragraphs_changed > 0 {
                debug!(
                    "{}: {} replacements in {} paragraphs",
                    doc.part,
                    part_stats.total(),
                    part_stats.paragraphs_changed
                );
                *changed = true;
            }
            stats.merge(&part_stats);
        }
        if stats.skipped > 0 {
            warn!(
                "{} matches crossed a tab or line break and were left unchanged",
                stats.skipped
            );
        }

        let appender = SectionAppender::new(&self.config.sections, self.resolver.as_ref());
        let content = SectionContent {
            benchmark: request.active_benchmark(),
            client_info: request.active_client_info(),
            industry_sources: &request.industry_sources,
        };
        let mut sections = Vec::new();
        if let Some(index) = parts.iter().position(|doc| doc.part == DOCUMENT_PART) {
            sections = appender.append(&mut parts[index], &content)?;
            if !sections.is_empty() {
                modified[index] = true;
            }
        }

        let mut parts_modified = Vec::new();
        for (doc, _) in parts.iter().zip(&modified).filter(|(_, changed)| **changed) {
            package.set_part(&doc.part, doc.to_bytes()?);
            parts_modified.push(doc.part.clone());
        }

        let document = package.to_bytes()?;
        info!(
            "Roll-forward to FY{} complete: {} replacements, {} sections appended",
            request.new_fy,
            stats.total(),
            sections.len()
        );

        let report = RollForwardReport {
            generated_at: Utc::now(),
            source_sha256: sha256_hex(prior),
            output_sha256: sha256_hex(&document),
            new_fy: request.new_fy,
            detected_years: detection.years.iter().copied().collect(),
            assumed_prior_year: detection.is_empty(),
            total_replacements: stats.total(),
            skipped_matches: stats.skipped,
            sections,
            parts_modified,
            replacements: RollForwardReport::replacement_counts(&set, &stats),
        };

        Ok(RollForwardOutcome { document, report })
    }

    /// Roll a file forward by extension: `.docx` through the engine, `.pdf` as a JSON draft
    pub fn roll_forward_file(
        &self,
        input: &Path,
        output: &Path,
        request: &RollForwardRequest,
    ) -> anyhow::Result<DraftOutput> {
        let extension = input
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "docx" => {
                let prior = fs::read(input).map_err(|source| {
                    Error::Io(IoError::FileReadFailed {
                        path: input.display().to_string(),
                        source,
                    })
                })?;
                let outcome = self
                    .roll_forward(&prior, request)
                    .with_context(|| format!("Failed to roll forward {}", input.display()))?;
                write_output(output, &outcome.document)?;
                Ok(DraftOutput::Docx(outcome.report))
            }
            "pdf" => {
                self.validate_year(request.new_fy)?;
                fs::metadata(input).map_err(|source| {
                    Error::Io(IoError::FileReadFailed {
                        path: input.display().to_string(),
                        source,
                    })
                })?;
                warn!(
                    "{} is a PDF; writing a JSON draft without formatting",
                    input.display()
                );
                let payload = DraftPayload::from_request(request);
                let json = payload
                    .to_json()
                    .context("Failed to serialize draft payload")?;
                write_output(output, json.as_bytes())?;
                Ok(DraftOutput::Json(payload))
            }
            _ => Err(Error::from(RollForwardError::UnsupportedInput(
                input.display().to_string(),
            ))
            .into()),
        }
    }
}

fn write_output(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }
    fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))
}
