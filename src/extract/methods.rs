//! The five independent extraction heuristics.
//!
//! Every method takes normalized text (lowercase, single-spaced) and returns
//! the raw digit strings it found, in match order. Length filtering and
//! deduplication happen later in the pipeline.

use super::tables::ExtractorTables;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

static DIRECT_DIGIT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // Bare runs of 3+ digits
        r"\b([0-9]{3,})\b",
        // Exactly eight digits
        r"\b([0-9]{8})\b",
        // Eight digits said as two halves
        r"\b([0-9]{4}\s*[0-9]{4})\b",
        // Three short groups joined by a space or hyphen
        r"([0-9]{1,4}[-\s][0-9]{1,4}[-\s][0-9]{1,4})",
        // Four short space-separated groups
        r"([0-9]{1,3}\s+[0-9]{1,3}\s+[0-9]{1,3}\s+[0-9]{1,3})",
        // Four pairs
        r"([0-9]{2}\s+[0-9]{2}\s+[0-9]{2}\s+[0-9]{2})",
        // Eight individually spoken digits
        r"([0-9]\s+[0-9]\s+[0-9]\s+[0-9]\s+[0-9]\s+[0-9]\s+[0-9]\s+[0-9])",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static HIGH_VALUE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // Phone number after a dial keyword
        r"(?:call|phone|dial)\s+([0-9]{10,})",
        // ZIP code
        r"(?:zip|postal)\s+(?:code)?\s*([0-9]{5})",
        // Social security number, 3-2-4
        r"(?:ssn|social)\s+(?:security)?\s*([0-9]{3}[-\s]?[0-9]{2}[-\s]?[0-9]{4})",
        // Card number, four groups of four
        r"([0-9]{4}[-\s][0-9]{4}[-\s][0-9]{4}[-\s][0-9]{4})",
        // Account / member number
        r"(?:account|member)\s+(?:number)?\s*([0-9]{6,})",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Compiled patterns for one context keyword.
#[derive(Debug)]
pub(crate) struct KeywordPatterns {
    direct: Regex,
    spelled: Regex,
    after_my: Regex,
    after_the: Regex,
}

impl KeywordPatterns {
    /// Compile the patterns for `keyword`; `None` if the keyword cannot be
    /// turned into a pattern (it is then skipped).
    pub fn compile(keyword: &str) -> Option<Self> {
        let kw = regex::escape(keyword);

        let build = |pattern: String| match Regex::new(&pattern) {
            Ok(re) => Some(re),
            Err(e) => {
                warn!("Skipping context keyword {:?}: {}", keyword, e);
                None
            }
        };

        Some(Self {
            direct: build(format!(r"{kw}\s+(?:is|number|code)?\s*([0-9]{{3,}})"))?,
            // Spelled-out runs are matched over the letters of "zero-nine" only;
            // a word using any other letter ends the run.
            spelled: build(format!(
                r"{kw}\s+(?:is|number|code)?\s*([zero\-nine\s]{{10,}})"
            ))?,
            after_my: build(format!(r"my\s+{kw}\s+(?:is|number)?\s*([0-9]{{3,}})"))?,
            after_the: build(format!(r"the\s+{kw}\s+(?:is|number)?\s*([0-9]{{3,}})"))?,
        })
    }
}

fn digits_only(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

fn is_digit_token(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

/// First capture group of every non-overlapping match, left to right
fn captures<'t>(re: &Regex, text: &'t str) -> Vec<&'t str> {
    re.captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect()
}

/// Digit runs written as digits, including grouped forms ("1234 5678", "12-34-56").
pub(crate) fn direct_digits(text: &str) -> Vec<String> {
    let mut found = Vec::new();
    for pattern in DIRECT_DIGIT_PATTERNS.iter() {
        for m in captures(pattern, text) {
            let digits = digits_only(m);
            if digits.len() >= 3 {
                found.push(digits);
            }
        }
    }
    found
}

/// Runs of two or more spoken number words (or digit tokens), fillers skipped.
///
/// Multiplier words keep a run going but add no digits, so "one hundred
/// twenty three" reads as "1203", not "123".
pub(crate) fn word_numbers(tables: &ExtractorTables, text: &str) -> Vec<String> {
    let mut runs: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for token in text.split_whitespace() {
        if tables.is_number_word(token) || is_digit_token(token) {
            current.push(token);
        } else if !tables.is_filler(token) && !current.is_empty() {
            if current.len() >= 2 {
                runs.push(std::mem::take(&mut current));
            } else {
                current.clear();
            }
        }
    }
    if current.len() >= 2 {
        runs.push(current);
    }

    runs.into_iter()
        .map(|run| convert_tokens(tables, run.into_iter()))
        .filter(|digits| digits.len() >= 3)
        .collect()
}

/// Figures announced by a context keyword ("pin is 4821", "account number 99812").
pub(crate) fn context_keywords(
    tables: &ExtractorTables,
    keywords: &[KeywordPatterns],
    text: &str,
) -> Vec<String> {
    let mut found = Vec::new();

    for patterns in keywords {
        found.extend(captures(&patterns.direct, text).into_iter().map(str::to_string));

        for m in captures(&patterns.spelled, text) {
            let digits = convert_tokens(tables, m.split_whitespace());
            if digits.len() >= 3 {
                found.push(digits);
            }
        }

        found.extend(captures(&patterns.after_my, text).into_iter().map(str::to_string));
        found.extend(captures(&patterns.after_the, text).into_iter().map(str::to_string));
    }

    found
}

/// Digits spoken one at a time ("four eight two one"), three or more in a row.
pub(crate) fn sequential_singles(tables: &ExtractorTables, text: &str) -> Vec<String> {
    let mut sequences = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for token in text.split_whitespace() {
        if let Some(digits) = tables.digits_for(token) {
            current.push(digits);
        } else if token.len() == 1 && is_digit_token(token) {
            current.push(token);
        } else if !tables.is_filler(token) {
            if current.len() >= 3 {
                sequences.push(current.concat());
            }
            current.clear();
        }
    }
    if current.len() >= 3 {
        sequences.push(current.concat());
    }

    sequences
}

/// Fixed shapes of well-known figures: phone, ZIP, SSN, card, account numbers.
pub(crate) fn high_value_patterns(text: &str) -> Vec<String> {
    let mut found = Vec::new();
    for pattern in HIGH_VALUE_PATTERNS.iter() {
        for m in captures(pattern, text) {
            let digits = digits_only(m);
            if digits.len() >= 3 {
                found.push(digits);
            }
        }
    }
    found
}

fn convert_tokens<'a>(tables: &ExtractorTables, tokens: impl Iterator<Item = &'a str>) -> String {
    let mut digits = String::new();
    for token in tokens {
        if is_digit_token(token) {
            digits.push_str(token);
        } else if let Some(value) = tables.digits_for(token) {
            digits.push_str(value);
        }
    }
    digits
}
