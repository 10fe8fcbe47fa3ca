use crate::fiscal::DEFAULT_PATTERN;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fiscal_year: FiscalYearConfig,
    #[serde(default)]
    pub sections: SectionsConfig,
    #[serde(default)]
    pub parts: PartsConfig,
}

impl Config {
    /// Load config from a TOML file, returns defaults if the file doesn't exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiscalYearConfig {
    /// Detection regex; group 1 captures the year
    #[serde(default = "default_pattern")]
    pub pattern: String,
    /// Token spellings rewritten for every detected year
    #[serde(default = "default_token_formats")]
    pub token_formats: Vec<String>,
    #[serde(default = "default_min_year")]
    pub min_year: i32,
    #[serde(default = "default_max_year")]
    pub max_year: i32,
}

fn default_pattern() -> String {
    DEFAULT_PATTERN.to_string()
}

fn default_token_formats() -> Vec<String> {
    vec![
        "FY{year}".to_string(),
        "FY {year}".to_string(),
        "FYE {year}".to_string(),
    ]
}

fn default_min_year() -> i32 {
    1990
}

fn default_max_year() -> i32 {
    2100
}

impl Default for FiscalYearConfig {
    fn default() -> Self {
        Self {
            pattern: default_pattern(),
            token_formats: default_token_formats(),
            min_year: default_min_year(),
            max_year: default_max_year(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionsConfig {
    #[serde(default = "default_benchmark_heading")]
    pub benchmark_heading: String,
    #[serde(default = "default_client_info_heading")]
    pub client_info_heading: String,
    #[serde(default = "default_bullet")]
    pub bullet: String,
    #[serde(default = "default_industry_heading")]
    pub industry_heading: String,
    #[serde(default = "default_sources_heading")]
    pub sources_heading: String,
    /// Paragraph style id for section headings
    #[serde(default)]
    pub heading_style: Option<String>,
    /// Paragraph style id for section body paragraphs
    #[serde(default)]
    pub body_style: Option<String>,
    #[serde(default = "default_max_title_len")]
    pub max_title_len: usize,
}

fn default_benchmark_heading() -> String {
    "\nEconomic Analysis — Benchmark Update: ".to_string()
}

fn default_client_info_heading() -> String {
    "\nClient Information Provided:".to_string()
}

fn default_bullet() -> String {
    "• ".to_string()
}

fn default_industry_heading() -> String {
    "Industry Update (Current Year)".to_string()
}

fn default_sources_heading() -> String {
    "Sources:".to_string()
}

fn default_max_title_len() -> usize {
    120
}

impl Default for SectionsConfig {
    fn default() -> Self {
        Self {
            benchmark_heading: default_benchmark_heading(),
            client_info_heading: default_client_info_heading(),
            bullet: default_bullet(),
            industry_heading: default_industry_heading(),
            sources_heading: default_sources_heading(),
            heading_style: None,
            body_style: None,
            max_title_len: default_max_title_len(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartsConfig {
    /// Roll forward headers, footers and notes as well as the body
    #[serde(default = "default_include_headers_footers")]
    pub include_headers_footers: bool,
}

fn default_include_headers_footers() -> bool {
    true
}

impl Default for PartsConfig {
    fn default() -> Self {
        Self {
            include_headers_footers: default_include_headers_footers(),
        }
    }
}
