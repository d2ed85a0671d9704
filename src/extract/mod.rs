//! Speech-to-number extraction
//!
//! Turns a noisy transcription ("uh my pin is four eight two one") into the
//! digit strings the caller most likely meant. Five overlapping heuristics run
//! over the same normalized text; their candidates are merged, deduplicated
//! and ranked longest-first. Extraction is pure and never fails: garbage in
//! gives an empty result with zero confidence.

mod methods;
mod tables;

pub use tables::ExtractorTables;

use methods::KeywordPatterns;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Shortest digit string worth reporting
pub const MIN_DIGITS: usize = 3;

/// Longest digit string worth reporting
pub const MAX_DIGITS: usize = 20;

static PUNCTUATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s\-]").unwrap());

/// Heuristic that proposed a candidate, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    DirectDigits,
    WordNumbers,
    ContextKeyword,
    SequentialDigits,
    Pattern,
}

impl ExtractionMethod {
    /// All methods in the order their candidates are merged
    pub const ALL: [ExtractionMethod; 5] = [
        ExtractionMethod::DirectDigits,
        ExtractionMethod::WordNumbers,
        ExtractionMethod::ContextKeyword,
        ExtractionMethod::SequentialDigits,
        ExtractionMethod::Pattern,
    ];

    /// Fixed confidence weight contributed when the method finds something
    pub fn weight(self) -> f32 {
        match self {
            ExtractionMethod::DirectDigits => 0.90,
            ExtractionMethod::WordNumbers => 0.80,
            ExtractionMethod::ContextKeyword => 0.85,
            ExtractionMethod::SequentialDigits => 0.75,
            ExtractionMethod::Pattern => 0.70,
        }
    }
}

/// A digit string proposed by one method, not yet confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionCandidate {
    pub digits: String,
    pub method: ExtractionMethod,
}

impl ExtractionCandidate {
    fn in_range(&self) -> bool {
        (MIN_DIGITS..=MAX_DIGITS).contains(&self.digits.len())
    }
}

/// Final result of one extraction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    /// Unique digit strings, longest first, ties in ascending order
    pub numbers: Vec<String>,

    /// Highest weight among methods that produced a surviving candidate
    pub confidence: f32,
}

/// Stateless extractor over injected vocabulary tables.
///
/// Cheap to share behind an `Arc`; `extract` takes `&self` and touches no
/// interior state.
#[derive(Debug)]
pub struct NumberExtractor {
    tables: ExtractorTables,
    keywords: Vec<KeywordPatterns>,
}

impl NumberExtractor {
    pub fn new(tables: ExtractorTables) -> Self {
        let keywords = tables
            .context_keywords
            .iter()
            .filter_map(|kw| KeywordPatterns::compile(kw))
            .collect();

        Self { tables, keywords }
    }

    /// Extract digit strings from a raw transcription.
    pub fn extract(&self, transcription: &str) -> Extraction {
        let text = normalize(transcription);
        if text.is_empty() {
            return Extraction::default();
        }

        let candidates = self.candidates(&text);
        let confidence = confidence(&candidates);
        let numbers = rank(dedupe(candidates));

        debug!(
            "Extracted {:?} (confidence {:.2}) from {:?}",
            numbers, confidence, text
        );

        Extraction {
            numbers,
            confidence,
        }
    }

    /// Every candidate from every method, merged in method order.
    pub fn candidates(&self, normalized: &str) -> Vec<ExtractionCandidate> {
        ExtractionMethod::ALL
            .iter()
            .flat_map(|&method| {
                self.run_method(method, normalized)
                    .into_iter()
                    .map(move |digits| ExtractionCandidate { digits, method })
            })
            .collect()
    }

    /// Run a single heuristic over already-normalized text.
    pub fn run_method(&self, method: ExtractionMethod, normalized: &str) -> Vec<String> {
        match method {
            ExtractionMethod::DirectDigits => methods::direct_digits(normalized),
            ExtractionMethod::WordNumbers => methods::word_numbers(&self.tables, normalized),
            ExtractionMethod::ContextKeyword => {
                methods::context_keywords(&self.tables, &self.keywords, normalized)
            }
            ExtractionMethod::SequentialDigits => {
                methods::sequential_singles(&self.tables, normalized)
            }
            ExtractionMethod::Pattern => methods::high_value_patterns(normalized),
        }
    }
}

impl Default for NumberExtractor {
    fn default() -> Self {
        Self::new(ExtractorTables::default())
    }
}

/// Lowercase, replace punctuation (hyphens excepted) with spaces and collapse
/// whitespace.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = PUNCTUATION.replace_all(&lowered, " ");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Highest weight among methods with an in-range candidate; 0.0 if none.
fn confidence(candidates: &[ExtractionCandidate]) -> f32 {
    candidates
        .iter()
        .filter(|c| c.in_range())
        .map(|c| c.method.weight())
        .fold(0.0_f32, f32::max)
}

/// First occurrence wins; out-of-range lengths are dropped.
fn dedupe(candidates: Vec<ExtractionCandidate>) -> Vec<String> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| c.in_range())
        .filter_map(|c| seen.insert(c.digits.clone()).then_some(c.digits))
        .collect()
}

/// Longest first, then ascending digit order.
fn rank(mut numbers: Vec<String>) -> Vec<String> {
    numbers.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    numbers
}
