//! English noun lemmatizer.
//!
//! Reduces plural nouns to their singular base form using an exception table
//! for irregular plurals followed by WordNet-style detachment rules:
//!
//! 1. Irregular forms (`children → child`, `teeth → tooth`, `diagnoses → diagnosis`)
//! 2. `-ies → -y` (`allergies → allergy`)
//! 3. `-sses → -ss`, `-xes → -x`, `-ches / -shes → -ch / -sh`
//! 4. Plain `-s` removal, except after `s`, `u`, `i` (`illness`, `virus`, `arthritis`)
//!
//! Words that are already singular despite a trailing `s` (`diabetes`,
//! `measles`) are kept as is. Words of three letters or fewer and words
//! containing non-alphabetic characters are never rewritten.
//!
//! # Examples
//!
//! ```
//! use medintent::analysis::token_filter::lemma::Lemmatizer;
//! use medintent::analysis::token_filter::lemma::english::EnglishLemmatizer;
//!
//! let lemmatizer = EnglishLemmatizer::new();
//!
//! assert_eq!(lemmatizer.lemmatize("appointments"), "appointment");
//! assert_eq!(lemmatizer.lemmatize("headaches"), "headache");
//! assert_eq!(lemmatizer.lemmatize("teeth"), "tooth");
//! assert_eq!(lemmatizer.lemmatize("diabetes"), "diabetes");
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use crate::analysis::token_filter::lemma::Lemmatizer;

const IRREGULAR_FORMS: &[(&str, &str)] = &[
    ("children", "child"),
    ("men", "man"),
    ("women", "woman"),
    ("people", "person"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("geese", "goose"),
    ("mice", "mouse"),
    ("lice", "louse"),
    ("lives", "life"),
    ("wives", "wife"),
    ("knives", "knife"),
    ("leaves", "leaf"),
    ("halves", "half"),
    ("calves", "calf"),
    ("selves", "self"),
    ("diagnoses", "diagnosis"),
    ("prognoses", "prognosis"),
    ("analyses", "analysis"),
    ("crises", "crisis"),
    ("doses", "dose"),
    ("vertebrae", "vertebra"),
    ("bacteria", "bacterium"),
    ("buses", "bus"),
    ("viruses", "virus"),
];

const UNCHANGED_FORMS: &[&str] = &[
    "diabetes",
    "measles",
    "mumps",
    "rabies",
    "herpes",
    "scabies",
    "rickets",
    "shingles",
    "series",
    "species",
    "news",
    "lens",
    "gas",
    "always",
    "perhaps",
    "whereas",
    "thus",
    "yes",
];

static IRREGULAR_MAP: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| IRREGULAR_FORMS.iter().copied().collect());

static UNCHANGED_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| UNCHANGED_FORMS.iter().copied().collect());

/// Rule-based English lemmatizer for nouns.
#[derive(Debug, Clone, Default)]
pub struct EnglishLemmatizer;

impl EnglishLemmatizer {
    /// Create a new English lemmatizer.
    pub fn new() -> Self {
        EnglishLemmatizer
    }

    fn detach_suffix(word: &str) -> Option<String> {
        if let Some(stem) = word.strip_suffix("ies") {
            if stem.len() >= 2 {
                return Some(format!("{stem}y"));
            }
            return None;
        }

        if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
            return None;
        }

        if let Some(stem) = word.strip_suffix("sses") {
            return Some(format!("{stem}ss"));
        }

        if word.ends_with("aches") {
            return word.strip_suffix('s').map(str::to_string);
        }

        for suffix in ["xes", "ches", "shes"] {
            if word.ends_with(suffix) {
                return word.strip_suffix("es").map(str::to_string);
            }
        }

        word.strip_suffix('s').map(str::to_string)
    }
}

impl Lemmatizer for EnglishLemmatizer {
    fn lemmatize(&self, word: &str) -> String {
        if let Some(lemma) = IRREGULAR_MAP.get(word) {
            return (*lemma).to_string();
        }

        if word.len() <= 3
            || UNCHANGED_SET.contains(word)
            || !word.chars().all(|c| c.is_ascii_alphabetic())
        {
            return word.to_string();
        }

        Self::detach_suffix(word).unwrap_or_else(|| word.to_string())
    }

    fn name(&self) -> &'static str {
        "english"
    }
}
