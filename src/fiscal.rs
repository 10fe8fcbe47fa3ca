//! Fiscal-year token detection and roll-forward rule planning.
//!
//! The detector scans paragraph text for fiscal-year tokens such as
//! `FY2023`, `FY 2023`, `fy-2023` or `FY_2023`. The planner turns the detected
//! years into literal replacement rules for the target year.

use crate::error::{Result, RollForwardError};
use crate::replace::Replacement;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Default fiscal-year token pattern; group 1 is the year
pub const DEFAULT_PATTERN: &str = r"(?i)\bFY\s*-?_?\s*(20\d{2})";

/// Placeholder substituted into token formats
pub const YEAR_PLACEHOLDER: &str = "{year}";

/// Fiscal years found in a document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    /// Distinct years referenced by fiscal-year tokens
    pub years: BTreeSet<i32>,
    /// Literal tokens as written in the document, with their year
    pub tokens: BTreeMap<String, i32>,
}

impl Detection {
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// Years to roll forward from; the year before `new_fy` when none were found
    pub fn prior_years(&self, new_fy: i32) -> BTreeSet<i32> {
        if self.years.is_empty() {
            BTreeSet::from([new_fy - 1])
        } else {
            self.years.clone()
        }
    }
}

/// Regex-driven fiscal-year token detector
#[derive(Debug, Clone)]
pub struct FiscalYearDetector {
    pattern: Regex,
}

impl FiscalYearDetector {
    /// Compile a detection pattern. The pattern must capture the year in group 1.
    pub fn new(pattern: &str) -> Result<Self> {
        let invalid = |details: String| RollForwardError::InvalidPattern {
            pattern: pattern.to_string(),
            details,
        };

        let regex = Regex::new(pattern).map_err(|e| invalid(e.to_string()))?;
        if regex.captures_len() < 2 {
            return Err(invalid("pattern has no capture group for the year".to_string()).into());
        }
        Ok(Self { pattern: regex })
    }

    /// Scan a sequence of paragraph texts
    pub fn detect<I, S>(&self, texts: I) -> Detection
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut detection = Detection::default();
        for text in texts {
            for caps in self.pattern.captures_iter(text.as_ref()) {
                let (Some(token), Some(year)) = (caps.get(0), caps.get(1)) else {
                    continue;
                };
                let Ok(year_value) = year.as_str().parse::<i32>() else {
                    continue;
                };
                // Token must end with the year so it can be rewritten in place
                if year.end() != token.end() {
                    continue;
                }
                detection.years.insert(year_value);
                detection
                    .tokens
                    .insert(token.as_str().to_string(), year_value);
            }
        }
        debug!(
            "Detected fiscal years {:?} from {} distinct tokens",
            detection.years,
            detection.tokens.len()
        );
        detection
    }
}

/// Inputs to rule planning besides the detection itself
#[derive(Debug, Clone, Default)]
pub struct PlanOptions<'a> {
    /// Token formats containing `{year}`, e.g. `FY {year}`
    pub token_formats: &'a [String],
    /// Report date inserted after the `Report Date` label
    pub report_date: Option<&'a str>,
    /// Caller-supplied literal rules, applied after the fiscal-year rules
    pub extra: &'a [Replacement],
}

/// Build the ordered replacement rules rolling `detection` forward to `new_fy`
pub fn plan_replacements(
    detection: &Detection,
    new_fy: i32,
    options: &PlanOptions<'_>,
) -> Vec<Replacement> {
    let mut rules = Vec::new();
    let target = new_fy.to_string();

    for year in detection.prior_years(new_fy) {
        if year == new_fy {
            continue;
        }
        let prior = year.to_string();
        for format in options.token_formats {
            if !format.contains(YEAR_PLACEHOLDER) {
                continue;
            }
            rules.push(Replacement::new(
                format.replace(YEAR_PLACEHOLDER, &prior),
                format.replace(YEAR_PLACEHOLDER, &target),
            ));
        }
    }

    // Spellings the formats don't cover (fy-2023, FY_2023, ...) keep their own prefix
    for (token, &year) in &detection.tokens {
        if year == new_fy {
            continue;
        }
        let Some(prefix) = token.strip_suffix(year.to_string().as_str()) else {
            continue;
        };
        rules.push(Replacement::new(token.clone(), format!("{}{}", prefix, target)));
    }

    if let Some(date) = options.report_date.map(str::trim).filter(|d| !d.is_empty()) {
        rules.push(Replacement::new(
            "Report Date",
            format!("Report Date: {}", date),
        ));
    }

    rules.extend(options.extra.iter().cloned());
    rules
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> FiscalYearDetector {
        FiscalYearDetector::new(DEFAULT_PATTERN).unwrap()
    }

    fn default_formats() -> Vec<String> {
        vec![
            "FY{year}".to_string(),
            "FY {year}".to_string(),
            "FYE {year}".to_string(),
        ]
    }

    #[test]
    fn test_detects_common_spellings() {
        let detector = detector();
        let detection = detector.detect([
            "Results for FY2023 and FY 2022.",
            "Prepared for fy-2021 and FY_2020 filings",
        ]);

        assert_eq!(
            detection.years,
            BTreeSet::from([2020, 2021, 2022, 2023])
        );
        assert!(detection.tokens.contains_key("FY2023"));
        assert!(detection.tokens.contains_key("FY 2022"));
        assert!(detection.tokens.contains_key("fy-2021"));
        assert!(detection.tokens.contains_key("FY_2020"));
    }

    #[test]
    fn test_ignores_plain_years_and_fye() {
        let detector = detector();
        let detection = detector.detect(["Founded in 2019; FYE 2023 closing"]);
        assert!(detection.is_empty());
    }

    #[test]
    fn test_ignores_words_ending_in_fy() {
        let detection =
            detector().detect(["We simplify 2023 flows; entities qualify 2023 rulings."]);
        assert!(detection.is_empty());

        let detection = detector().detect(["Report FY2023; we simplify 2023 flows."]);
        assert_eq!(detection.tokens.keys().collect::<Vec<_>>(), vec!["FY2023"]);
    }

    #[test]
    fn test_prior_year_defaults_to_previous() {
        let detection = Detection::default();
        assert_eq!(detection.prior_years(2024), BTreeSet::from([2023]));
    }

    #[test]
    fn test_pattern_without_group_rejected() {
        let err = FiscalYearDetector::new(r"FY\d{4}").unwrap_err();
        assert!(err.to_string().contains("capture group"));
    }

    #[test]
    fn test_invalid_regex_rejected() {
        assert!(FiscalYearDetector::new(r"FY(20\d{2}").is_err());
    }

    #[test]
    fn test_plan_uses_formats_and_tokens() {
        let detection = detector().detect(["FY2023 and fy-2023"]);
        let formats = default_formats();
        let rules = plan_replacements(
            &detection,
            2024,
            &PlanOptions {
                token_formats: &formats,
                ..Default::default()
            },
        );

        assert!(rules.contains(&Replacement::new("FY2023", "FY2024")));
        assert!(rules.contains(&Replacement::new("FY 2023", "FY 2024")));
        assert!(rules.contains(&Replacement::new("FYE 2023", "FYE 2024")));
        assert!(rules.contains(&Replacement::new("fy-2023", "fy-2024")));
    }

    #[test]
    fn test_plan_defaults_to_previous_year() {
        let formats = default_formats();
        let rules = plan_replacements(
            &Detection::default(),
            2025,
            &PlanOptions {
                token_formats: &formats,
                ..Default::default()
            },
        );
        assert_eq!(rules[0], Replacement::new("FY2024", "FY2025"));
        assert_eq!(rules.len(), 3);
    }

    #[test]
    fn test_plan_skips_target_year() {
        let detection = detector().detect(["FY2024 already current"]);
        let formats = default_formats();
        let rules = plan_replacements(
            &detection,
            2024,
            &PlanOptions {
                token_formats: &formats,
                ..Default::default()
            },
        );
        assert!(rules.is_empty());
    }

    #[test]
    fn test_plan_report_date_and_extras() {
        let extra = vec![Replacement::new("Prior Co Ltd", "New Co Ltd")];
        let rules = plan_replacements(
            &Detection::default(),
            2024,
            &PlanOptions {
                token_formats: &[],
                report_date: Some(" 30 June 2025 "),
                extra: &extra,
            },
        );
        assert_eq!(
            rules,
            vec![
                Replacement::new("Report Date", "Report Date: 30 June 2025"),
                Replacement::new("Prior Co Ltd", "New Co Ltd"),
            ]
        );
    }

    #[test]
    fn test_plan_blank_report_date_ignored() {
        let rules = plan_replacements(
            &Detection::default(),
            2024,
            &PlanOptions {
                token_formats: &[],
                report_date: Some("   "),
                extra: &[],
            },
        );
        assert!(rules.is_empty());
    }
}
