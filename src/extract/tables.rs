use std::collections::{HashMap, HashSet};

/// Vocabulary the extractor works from.
///
/// Injected into [`NumberExtractor`](super::NumberExtractor) at construction and
/// never mutated afterwards. `Default` gives the stock English tables.
#[derive(Debug, Clone)]
pub struct ExtractorTables {
    /// Spoken word → digit string ("seven" → "7", "forty" → "40")
    pub number_words: HashMap<String, String>,

    /// Words that are recognized as numeric but contribute no digits
    pub multiplier_words: HashSet<String>,

    /// Disfluencies and glue words that never break a spoken run
    pub filler_words: HashSet<String>,

    /// Words that usually announce the figure the caller is about to say
    pub context_keywords: Vec<String>,
}

const NUMBER_WORDS: &[(&str, &str)] = &[
    ("zero", "0"),
    ("one", "1"),
    ("two", "2"),
    ("three", "3"),
    ("four", "4"),
    ("five", "5"),
    ("six", "6"),
    ("seven", "7"),
    ("eight", "8"),
    ("nine", "9"),
    ("oh", "0"),
    ("o", "0"),
    ("ten", "10"),
    ("eleven", "11"),
    ("twelve", "12"),
    ("thirteen", "13"),
    ("fourteen", "14"),
    ("fifteen", "15"),
    ("sixteen", "16"),
    ("seventeen", "17"),
    ("eighteen", "18"),
    ("nineteen", "19"),
    ("twenty", "20"),
    ("thirty", "30"),
    ("forty", "40"),
    ("fifty", "50"),
    ("sixty", "60"),
    ("seventy", "70"),
    ("eighty", "80"),
    ("ninety", "90"),
];

const MULTIPLIER_WORDS: &[&str] = &["hundred", "thousand"];

const FILLER_WORDS: &[&str] = &[
    "um", "uh", "er", "ah", "like", "you", "know", "well", "so", "and", "the", "is", "it", "my",
    "its", "that", "this", "yes", "okay", "alright", "sure", "hello", "hi", "speaking",
];

const CONTEXT_KEYWORDS: &[&str] = &[
    "pin",
    "password",
    "code",
    "number",
    "id",
    "verification",
    "security",
    "access",
    "account",
    "phone",
    "social",
    "zip",
    "postal",
    "credit",
    "card",
    "ssn",
    "license",
    "passport",
];

impl ExtractorTables {
    /// Whether `word` counts as a spoken number (multipliers included)
    pub fn is_number_word(&self, word: &str) -> bool {
        self.number_words.contains_key(word) || self.multiplier_words.contains(word)
    }

    pub fn is_multiplier(&self, word: &str) -> bool {
        self.multiplier_words.contains(word)
    }

    pub fn is_filler(&self, word: &str) -> bool {
        self.filler_words.contains(word)
    }

    /// Digit value of a non-multiplier number word
    pub fn digits_for(&self, word: &str) -> Option<&str> {
        self.number_words.get(word).map(String::as_str)
    }
}

impl Default for ExtractorTables {
    fn default() -> Self {
        Self {
            number_words: NUMBER_WORDS
                .iter()
                .map(|(word, digits)| (word.to_string(), digits.to_string()))
                .collect(),
            multiplier_words: MULTIPLIER_WORDS.iter().map(|w| w.to_string()).collect(),
            filler_words: FILLER_WORDS.iter().map(|w| w.to_string()).collect(),
            context_keywords: CONTEXT_KEYWORDS.iter().map(|w| w.to_string()).collect(),
        }
    }
}
