//! Industry update sources and numbered citations.

use serde::{Deserialize, Serialize};

/// A cited source for the industry update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndustrySource {
    pub url: String,
    /// Display title; the URL is shown when absent
    #[serde(default)]
    pub title: Option<String>,
}

impl IndustrySource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Parse one source per line, optionally `url | title`. Blank lines are skipped.
pub fn parse_source_list(text: &str) -> Vec<IndustrySource> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| match line.split_once('|') {
            Some((url, title)) if !title.trim().is_empty() => {
                IndustrySource::new(url.trim()).with_title(title.trim())
            }
            Some((url, _)) => IndustrySource::new(url.trim()),
            None => IndustrySource::new(line),
        })
        .collect()
}

/// Sources with a usable URL, trimmed; blank URLs are dropped
pub fn cleaned_sources(sources: &[IndustrySource]) -> Vec<IndustrySource> {
    sources
        .iter()
        .filter(|s| !s.url.trim().is_empty())
        .map(|s| IndustrySource {
            url: s.url.trim().to_string(),
            title: s.title.clone(),
        })
        .collect()
}

/// Resolves the display title of a source
pub trait TitleResolver: Send + Sync {
    fn resolve(&self, source: &IndustrySource) -> String;
}

/// Uses the supplied title, falling back to the URL. Never touches the network.
#[derive(Debug, Clone)]
pub struct ProvidedTitleResolver {
    max_len: usize,
}

impl ProvidedTitleResolver {
    pub fn new(max_len: usize) -> Self {
        Self { max_len }
    }
}

impl Default for ProvidedTitleResolver {
    fn default() -> Self {
        Self::new(120)
    }
}

impl TitleResolver for ProvidedTitleResolver {
    fn resolve(&self, source: &IndustrySource) -> String {
        let title = source
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(source.url.as_str());
        truncate_chars(title, self.max_len)
    }
}

fn truncate_chars(text: &str, max_len: usize) -> String {
    text.chars().take(max_len).collect()
}

/// A numbered citation, numbering starts at 1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub number: usize,
    pub title: String,
    pub url: String,
}

impl Citation {
    /// Body line referencing the footnote
    pub fn reference_line(&self) -> String {
        format!("- See: {} [^{}]", self.title, self.number)
    }

    /// Footnote line listing the URL
    pub fn source_line(&self) -> String {
        format!("  ^{} {}", self.number, self.url)
    }
}

pub fn cite(sources: &[IndustrySource], resolver: &dyn TitleResolver) -> Vec<Citation> {
    sources
        .iter()
        .enumerate()
        .map(|(i, source)| Citation {
            number: i + 1,
            title: resolver.resolve(source),
            url: source.url.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleaned_sources_trims_and_drops_blanks() {
        let sources = cleaned_sources(&[
            IndustrySource::new("   "),
            IndustrySource::new(" https://www.oecd.org ").with_title("OECD"),
            IndustrySource::new(""),
        ]);
        assert_eq!(
            sources,
            vec![IndustrySource::new("https://www.oecd.org").with_title("OECD")]
        );
    }

    #[test]
    fn test_parse_source_list() {
        let sources = parse_source_list(
            "https://www.oecd.org/tax/transfer-pricing/\n\n  https://data.worldbank.org | World Bank Open Data \nhttps://imf.org | \n",
        );

        assert_eq!(sources.len(), 3);
        assert_eq!(sources[0], IndustrySource::new("https://www.oecd.org/tax/transfer-pricing/"));
        assert_eq!(sources[1].title.as_deref(), Some("World Bank Open Data"));
        assert_eq!(sources[2], IndustrySource::new("https://imf.org"));
    }

    #[test]
    fn test_resolver_prefers_title() {
        let resolver = ProvidedTitleResolver::default();
        let source = IndustrySource::new("https://example.org").with_title("  Sector outlook ");
        assert_eq!(resolver.resolve(&source), "Sector outlook");
    }

    #[test]
    fn test_resolver_falls_back_to_url_and_truncates() {
        let resolver = ProvidedTitleResolver::new(10);
        let source = IndustrySource::new("https://example.org/very/long/path");
        assert_eq!(resolver.resolve(&source), "https://ex");
    }

    #[test]
    fn test_truncation_counts_characters() {
        let resolver = ProvidedTitleResolver::new(3);
        let source = IndustrySource::new("x").with_title("ÉÉÉÉ");
        assert_eq!(resolver.resolve(&source), "ÉÉÉ");
    }

    #[test]
    fn test_citation_lines() {
        let sources = vec![
            IndustrySource::new("https://a.example").with_title("Alpha"),
            IndustrySource::new("https://b.example"),
        ];
        let citations = cite(&sources, &ProvidedTitleResolver::default());

        assert_eq!(citations[0].reference_line(), "- See: Alpha [^1]");
        assert_eq!(citations[1].reference_line(), "- See: https://b.example [^2]");
        assert_eq!(citations[1].source_line(), "  ^2 https://b.example");
    }
}
