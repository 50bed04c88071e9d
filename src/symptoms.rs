//! Symptom span extraction.
//!
//! An extractor finds symptom mentions in raw text and reports each one as a
//! [`SymptomSpan`] with a confidence score. [`ConfidentSymptoms`] wraps any
//! extractor and drops low-confidence spans. The crate ships a dictionary
//! based [`LexiconExtractor`]; model-backed extractors plug in through the
//! [`SymptomExtractor`] trait.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analysis::token::Token;
use crate::analysis::tokenizer::Tokenizer;
use crate::analysis::tokenizer::unicode_word::UnicodeWordTokenizer;
use crate::error::{IntentError, Result};

/// Default minimum score a span must exceed to be kept.
pub const DEFAULT_MIN_SCORE: f32 = 0.8;

/// A symptom mention located in the input text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymptomSpan {
    /// The matched text as it appears in the input.
    pub text: String,
    /// Extractor confidence in [0, 1].
    pub score: f32,
    /// Start byte offset in the input.
    pub start: usize,
    /// End byte offset in the input (exclusive).
    pub end: usize,
}

/// Finds symptom spans in text.
pub trait SymptomExtractor: Send + Sync {
    /// Extract spans in order of appearance.
    fn extract(&self, text: &str) -> Result<Vec<SymptomSpan>>;

    /// Get the name of this extractor for debugging and logging.
    fn name(&self) -> &str;
}

/// Keeps only spans whose score is strictly greater than a minimum.
#[derive(Debug, Clone)]
pub struct ConfidentSymptoms<E> {
    inner: E,
    min_score: f32,
}

impl<E: SymptomExtractor> ConfidentSymptoms<E> {
    /// Wrap an extractor with the default minimum score.
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            min_score: DEFAULT_MIN_SCORE,
        }
    }

    /// Wrap an extractor with a custom minimum score.
    pub fn with_min_score(inner: E, min_score: f32) -> Result<Self> {
        if !min_score.is_finite() {
            return Err(IntentError::configuration(format!(
                "min_score must be finite, got {min_score}"
            )));
        }
        Ok(Self { inner, min_score })
    }

    /// The minimum score.
    pub fn min_score(&self) -> f32 {
        self.min_score
    }
}

impl<E: SymptomExtractor> SymptomExtractor for ConfidentSymptoms<E> {
    fn extract(&self, text: &str) -> Result<Vec<SymptomSpan>> {
        let spans = self.inner.extract(text)?;
        let total = spans.len();
        let kept: Vec<SymptomSpan> = spans
            .into_iter()
            .filter(|span| span.score > self.min_score)
            .collect();
        log::debug!(
            "{}: kept {} of {} spans above {}",
            self.inner.name(),
            kept.len(),
            total,
            self.min_score
        );
        Ok(kept)
    }

    fn name(&self) -> &str {
        "confident"
    }
}

/// Lexicon file contents: a list of terms, or terms mapped to scores.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LexiconFile {
    Terms(Vec<String>),
    Scored(BTreeMap<String, f32>),
}

/// A lexicon term split into lowercase words.
#[derive(Debug, Clone)]
struct Term {
    words: Vec<String>,
    score: f32,
}

/// Dictionary extractor matching whole-word, case-insensitive symptom terms.
///
/// Multi-word terms match consecutive words. When several terms start at the
/// same word the longest one wins, and matches never overlap.
#[derive(Debug, Clone)]
pub struct LexiconExtractor {
    tokenizer: UnicodeWordTokenizer,
    terms: Vec<Term>,
}

impl LexiconExtractor {
    /// Build an extractor scoring every term 1.0.
    pub fn new<I, S>(terms: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::with_scores(terms.into_iter().map(|t| (t, 1.0)))
    }

    /// Build an extractor from terms with explicit scores.
    pub fn with_scores<I, S>(terms: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, f32)>,
        S: AsRef<str>,
    {
        let tokenizer = UnicodeWordTokenizer::new();
        let mut parsed = Vec::new();
        for (term, score) in terms {
            let words: Vec<String> = Self::words(&tokenizer, term.as_ref())?
                .into_iter()
                .map(|t| t.text)
                .collect();
            if words.is_empty() {
                return Err(IntentError::configuration(format!(
                    "symptom term {:?} has no words",
                    term.as_ref()
                )));
            }
            parsed.push(Term { words, score });
        }
        // Longest terms first so the first hit at a position is the longest.
        parsed.sort_by(|a, b| b.words.len().cmp(&a.words.len()));
        Ok(Self {
            tokenizer,
            terms: parsed,
        })
    }

    /// Parse a lexicon from JSON: either `["fever", ...]` (every term scored
    /// 1.0) or `{"fever": 0.95, ...}`.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: LexiconFile = serde_json::from_str(json)?;
        match file {
            LexiconFile::Terms(terms) => Self::new(terms),
            LexiconFile::Scored(terms) => Self::with_scores(terms),
        }
    }

    /// Load a lexicon from a JSON file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let lexicon = Self::from_json_str(&content)?;
        log::info!(
            "loaded symptom lexicon from {} ({} terms)",
            path.as_ref().display(),
            lexicon.terms.len()
        );
        Ok(lexicon)
    }

    fn words(tokenizer: &UnicodeWordTokenizer, text: &str) -> Result<Vec<Token>> {
        Ok(tokenizer
            .tokenize(text)?
            .filter(|t| t.text.chars().any(char::is_alphanumeric))
            .map(|t| {
                let lower = t.text.to_lowercase();
                t.with_text(lower)
            })
            .collect())
    }
}

impl SymptomExtractor for LexiconExtractor {
    fn extract(&self, text: &str) -> Result<Vec<SymptomSpan>> {
        let words = Self::words(&self.tokenizer, text)?;
        let mut spans = Vec::new();
        let mut position = 0;

        while position < words.len() {
            let hit = self.terms.iter().find(|term| {
                let end = position + term.words.len();
                end <= words.len()
                    && words[position..end]
                        .iter()
                        .zip(&term.words)
                        .all(|(word, expected)| word.text == *expected)
            });

            match hit {
                Some(term) => {
                    let first = &words[position];
                    let last = &words[position + term.words.len() - 1];
                    spans.push(SymptomSpan {
                        text: text[first.start_offset..last.end_offset].to_string(),
                        score: term.score,
                        start: first.start_offset,
                        end: last.end_offset,
                    });
                    position += term.words.len();
                }
                None => position += 1,
            }
        }

        Ok(spans)
    }

    fn name(&self) -> &str {
        "lexicon"
    }
}
