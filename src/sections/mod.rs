//! Conditional sections appended to the rolled-forward document.
//!
//! Each section is only emitted when its input carries content: a benchmark
//! study with comparables, non-blank client information, or at least one
//! industry source. Sections are appended after replacement, so their text
//! is never rolled forward.

pub mod benchmark;
pub mod client_info;
pub mod industry;

use crate::config::SectionsConfig;
use crate::docx::paragraph::{append_to_body, ParagraphBuilder};
use crate::docx::xml::{Element, XmlDocument};
use crate::error::Result;
use benchmark::BenchmarkStudy;
use client_info::ClientInfo;
use industry::{cite, cleaned_sources, IndustrySource, TitleResolver};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Kinds of appended section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Benchmark,
    ClientInformation,
    IndustryUpdate,
}

impl std::fmt::Display for SectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SectionKind::Benchmark => write!(f, "Benchmark"),
            SectionKind::ClientInformation => write!(f, "Client information"),
            SectionKind::IndustryUpdate => write!(f, "Industry update"),
        }
    }
}

/// Inputs for the appended sections
#[derive(Debug, Clone, Copy, Default)]
pub struct SectionContent<'a> {
    pub benchmark: Option<&'a BenchmarkStudy>,
    pub client_info: Option<&'a ClientInfo>,
    pub industry_sources: &'a [IndustrySource],
}

/// Builds and appends sections using the configured headings and styles
pub struct SectionAppender<'a> {
    config: &'a SectionsConfig,
    resolver: &'a dyn TitleResolver,
}

impl<'a> SectionAppender<'a> {
    pub fn new(config: &'a SectionsConfig, resolver: &'a dyn TitleResolver) -> Self {
        Self { config, resolver }
    }

    fn heading(&self) -> ParagraphBuilder {
        ParagraphBuilder::new().style(self.config.heading_style.as_deref())
    }

    fn body(&self) -> ParagraphBuilder {
        ParagraphBuilder::new().style(self.config.body_style.as_deref())
    }

    /// Paragraphs for each section that has content, in append order
    pub fn build(&self, content: &SectionContent<'_>) -> Vec<(SectionKind, Vec<Element>)> {
        let mut sections = Vec::new();

        if let Some(study) = content.benchmark.filter(|s| !s.is_empty()) {
            sections.push((
                SectionKind::Benchmark,
                vec![
                    self.heading().bold(self.config.benchmark_heading.as_str()).build(),
                    self.body().text(study.summarize().sentence()).build(),
                ],
            ));
        }

        if let Some(info) = content.client_info.filter(|c| !c.is_empty()) {
            let mut paragraphs =
                vec![self.heading().bold(self.config.client_info_heading.as_str()).build()];
            for line in info.lines() {
                paragraphs.push(
                    self.body()
                        .text(format!("{}{}", self.config.bullet, line))
                        .build(),
                );
            }
            sections.push((SectionKind::ClientInformation, paragraphs));
        }

        let sources = cleaned_sources(content.industry_sources);
        if !sources.is_empty() {
            let citations = cite(&sources, self.resolver);
            let mut paragraphs = vec![
                ParagraphBuilder::new().build(),
                self.heading().text(self.config.industry_heading.as_str()).build(),
            ];
            for citation in &citations {
                paragraphs.push(self.body().text(citation.reference_line()).build());
            }
            paragraphs.push(self.body().text(self.config.sources_heading.as_str()).build());
            for citation in &citations {
                paragraphs.push(self.body().text(citation.source_line()).build());
            }
            sections.push((SectionKind::IndustryUpdate, paragraphs));
        }

        sections
    }

    /// Append all sections with content to the document body
    pub fn append(
        &self,
        doc: &mut XmlDocument,
        content: &SectionContent<'_>,
    ) -> Result<Vec<SectionKind>> {
        let sections = self.build(content);
        let kinds: Vec<SectionKind> = sections.iter().map(|(kind, _)| *kind).collect();

        let paragraphs: Vec<Element> = sections
            .into_iter()
            .flat_map(|(kind, paragraphs)| {
                info!("Appending {} section ({} paragraphs)", kind, paragraphs.len());
                paragraphs
            })
            .collect();

        if !paragraphs.is_empty() {
            append_to_body(doc, paragraphs)?;
        }
        Ok(kinds)
    }
}
