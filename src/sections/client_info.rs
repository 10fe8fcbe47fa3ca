//! Client information block.

use serde::{Deserialize, Serialize};

/// Free-text client information, one item per line
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    #[serde(default)]
    pub text: String,
}

impl ClientInfo {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// One `- a | b | c` line per row of fields
    pub fn from_rows<R, F>(rows: R) -> Self
    where
        R: IntoIterator<Item = F>,
        F: IntoIterator,
        F::Item: AsRef<str>,
    {
        let lines: Vec<String> = rows
            .into_iter()
            .map(|row| {
                let fields: Vec<String> = row
                    .into_iter()
                    .map(|field| field.as_ref().to_string())
                    .collect();
                format!("- {}", fields.join(" | "))
            })
            .collect();
        Self {
            text: lines.join("\n"),
        }
    }

    /// Non-blank lines, trimmed
    pub fn lines(&self) -> Vec<&str> {
        self.text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.lines().is_empty()
    }
}
