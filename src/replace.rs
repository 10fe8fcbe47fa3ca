//! Formatting-preserving text replacement.
//!
//! Matching runs over a paragraph's whole visible text, so a token split
//! across runs (`FY` bold, `2023` regular) is still found. Edits are then
//! confined to the `w:t` elements the match covers: the replacement lands in
//! the element holding the first matched character and the rest of the match
//! is cut from the following elements. Every run keeps its `w:rPr`, and runs
//! outside a match are never rewritten.

use crate::docx::paragraph::{collect_slots, for_each_paragraph_mut, set_slot_text, Slot};
use crate::docx::xml::{Element, XmlDocument};
use crate::error::{Result, RollForwardError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A literal text substitution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    pub from: String,
    pub to: String,
}

impl Replacement {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// A match of one rule inside a paragraph's text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleMatch {
    pub start: usize,
    pub end: usize,
    pub rule: usize,
}

/// Compiled set of replacement rules.
///
/// Matches are leftmost and non-overlapping; when two rules match at the
/// same position the longer `from` wins.
#[derive(Debug, Clone)]
pub struct ReplacementSet {
    rules: Vec<Replacement>,
    index: HashMap<String, usize>,
    matcher: Option<Regex>,
}

impl ReplacementSet {
    /// Compile rules, dropping empty and no-op rules and duplicate `from`s
    pub fn new(rules: Vec<Replacement>) -> Result<Self> {
        let mut kept: Vec<Replacement> = Vec::new();
        let mut index = HashMap::new();
        for rule in rules {
            if rule.from.is_empty() || rule.from == rule.to || index.contains_key(&rule.from) {
                continue;
            }
            index.insert(rule.from.clone(), kept.len());
            kept.push(rule);
        }

        let matcher = if kept.is_empty() {
            None
        } else {
            let mut literals: Vec<&str> = kept.iter().map(|r| r.from.as_str()).collect();
            literals.sort_by(|a, b| b.len().cmp(&a.len()));
            let pattern = literals
                .iter()
                .map(|l| anchored(l))
                .collect::<Vec<_>>()
                .join("|");
            let regex = Regex::new(&pattern).map_err(|e| RollForwardError::InvalidPattern {
                pattern: pattern.clone(),
                details: e.to_string(),
            })?;
            Some(regex)
        };

        Ok(Self {
            rules: kept,
            index,
            matcher,
        })
    }

    pub fn rules(&self) -> &[Replacement] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Find all rule matches in `text`
    pub fn find_matches(&self, text: &str) -> Vec<RuleMatch> {
        let Some(matcher) = &self.matcher else {
            return Vec::new();
        };
        matcher
            .find_iter(text)
            .filter_map(|m| {
                self.index.get(m.as_str()).map(|&rule| RuleMatch {
                    start: m.start(),
                    end: m.end(),
                    rule,
                })
            })
            .collect()
    }
}

/// Escaped literal that only matches at word edges where it starts or ends
/// with a word character, so `fy 2023` never fires inside `simplify 2023`
fn anchored(literal: &str) -> String {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let mut pattern = String::new();
    if literal.starts_with(is_word) {
        pattern.push_str(r"\b");
    }
    pattern.push_str(&regex::escape(literal));
    if literal.ends_with(is_word) {
        pattern.push_str(r"\b");
    }
    pattern
}

/// Replacement counts for one or more parts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaceStats {
    /// Occurrences replaced, indexed like `ReplacementSet::rules`
    pub per_rule: Vec<usize>,
    /// Paragraphs whose text changed
    pub paragraphs_changed: usize,
    /// Matches left alone because they spanned a tab or break
    pub skipped: usize,
}

impl ReplaceStats {
    pub fn for_set(set: &ReplacementSet) -> Self {
        Self {
            per_rule: vec![0; set.rules().len()],
            ..Default::default()
        }
    }

    pub fn total(&self) -> usize {
        self.per_rule.iter().sum()
    }

    pub fn merge(&mut self, other: &ReplaceStats) {
        if self.per_rule.len() < other.per_rule.len() {
            self.per_rule.resize(other.per_rule.len(), 0);
        }
        for (acc, n) in self.per_rule.iter_mut().zip(&other.per_rule) {
            *acc += n;
        }
        self.paragraphs_changed += other.paragraphs_changed;
        self.skipped += other.skipped;
    }
}

/// Apply the rule set to every paragraph of a part
pub fn replace_in_document(doc: &mut XmlDocument, set: &ReplacementSet) -> ReplaceStats {
    let mut stats = ReplaceStats::for_set(set);
    if set.is_empty() {
        return stats;
    }
    if let Some(root) = doc.root_mut() {
        for_each_paragraph_mut(root, &mut |p| {
            if replace_in_paragraph(p, set, &mut stats) {
                stats.paragraphs_changed += 1;
            }
        });
    }
    stats
}

/// Apply the rule set to one paragraph. Returns true when text changed.
pub fn replace_in_paragraph(
    paragraph: &mut Element,
    set: &ReplacementSet,
    stats: &mut ReplaceStats,
) -> bool {
    let mut slots = collect_slots(paragraph);
    if slots.is_empty() {
        return false;
    }

    // Byte range of each slot inside the paragraph text
    let mut texts: Vec<Option<String>> = Vec::with_capacity(slots.len());
    let mut ranges: Vec<(usize, usize)> = Vec::with_capacity(slots.len());
    let mut full = String::new();
    for slot in &slots {
        let start = full.len();
        match slot {
            Slot::Text(t) => {
                let text = t.text();
                full.push_str(&text);
                texts.push(Some(text));
            }
            Slot::Fixed(c) => {
                full.push(*c);
                texts.push(None);
            }
        }
        ranges.push((start, full.len()));
    }

    let matches = set.find_matches(&full);
    if matches.is_empty() {
        return false;
    }

    let mut dirty = vec![false; slots.len()];
    let mut changed = false;

    // Back to front, so earlier offsets stay valid
    for m in matches.iter().rev() {
        let Some(first) = ranges.iter().position(|&(s, e)| s <= m.start && m.start < e) else {
            continue;
        };
        let Some(last) = ranges.iter().position(|&(s, e)| s < m.end && m.end <= e) else {
            continue;
        };
        if texts[first..=last].iter().any(Option::is_none) {
            stats.skipped += 1;
            continue;
        }

        let to = &set.rules()[m.rule].to;
        let local_start = m.start - ranges[first].0;
        let local_end = m.end - ranges[last].0;

        if first == last {
            if let Some(text) = texts[first].as_mut() {
                text.replace_range(local_start..local_end, to);
            }
        } else {
            if let Some(text) = texts[first].as_mut() {
                text.replace_range(local_start.., to);
            }
            for text in texts[first + 1..last].iter_mut().flatten() {
                text.clear();
            }
            if let Some(text) = texts[last].as_mut() {
                text.replace_range(..local_end, "");
            }
        }

        dirty[first..=last].iter_mut().for_each(|d| *d = true);
        stats.per_rule[m.rule] += 1;
        changed = true;
    }

    for ((slot, text), dirty) in slots.iter_mut().zip(&texts).zip(&dirty) {
        if let (true, Slot::Text(t), Some(text)) = (*dirty, slot, text) {
            set_slot_text(t, text);
        }
    }

    changed
}
