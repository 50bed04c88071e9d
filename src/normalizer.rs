//! Text normalizer turning raw utterances into canonical tokens.
//!
//! The normalizer is the single entry point both the vocabulary builder and
//! the online classification path use, so a pattern seen at training time and
//! the same words typed by a patient always map to the same tokens.
//!
//! # Examples
//!
//! ```
//! use medintent::normalizer::{NormalizerConfig, TextNormalizer};
//!
//! let normalizer = TextNormalizer::new(&NormalizerConfig::default()).unwrap();
//! let tokens = normalizer.normalize("I want to book two Appointments!").unwrap();
//!
//! assert_eq!(tokens, vec!["want", "book", "two", "appointment"]);
//! ```

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::Analyzer;
use crate::analysis::analyzer::pipeline::PipelineAnalyzer;
use crate::analysis::token_filter::lemma::{
    EnglishLemmatizer, IdentityLemmatizer, LemmaFilter, Lemmatizer,
};
use crate::analysis::token_filter::lowercase::LowercaseFilter;
use crate::analysis::token_filter::remove_empty::RemoveEmptyFilter;
use crate::analysis::token_filter::stop::{DEFAULT_ENGLISH_STOP_WORDS, StopFilter};
use crate::analysis::token_filter::symbol::{DEFAULT_IGNORED_SYMBOLS, SymbolFilter};
use crate::analysis::tokenizer::unicode_word::UnicodeWordTokenizer;
use crate::error::{IntentError, Result};

/// Lemmatizer applied after the first stop word pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LemmatizerKind {
    /// English noun lemmatizer.
    #[default]
    English,
    /// Leave words unchanged.
    Identity,
}

impl LemmatizerKind {
    fn build(self) -> Box<dyn Lemmatizer> {
        match self {
            LemmatizerKind::English => Box::new(EnglishLemmatizer::new()),
            LemmatizerKind::Identity => Box::new(IdentityLemmatizer::new()),
        }
    }
}

/// Exclusion sets and lemmatizer applied during normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NormalizerConfig {
    /// Symbols dropped outright (in addition to any punctuation-only token).
    pub ignored_symbols: BTreeSet<String>,
    /// Words dropped before and after lemmatization. Matched in lowercase.
    pub stop_words: BTreeSet<String>,
    /// Lemmatizer reducing words to their base form.
    pub lemmatizer: LemmatizerKind,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            ignored_symbols: DEFAULT_IGNORED_SYMBOLS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            stop_words: DEFAULT_ENGLISH_STOP_WORDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            lemmatizer: LemmatizerKind::default(),
        }
    }
}

impl NormalizerConfig {
    /// Validate the exclusion sets.
    pub fn validate(&self) -> Result<()> {
        if self.ignored_symbols.iter().any(|s| s.is_empty()) {
            return Err(IntentError::configuration(
                "ignored_symbols must not contain an empty string",
            ));
        }
        if let Some(word) = self.stop_words.iter().find(|w| w.to_lowercase() != **w) {
            return Err(IntentError::configuration(format!(
                "stop word '{word}' must be lowercase"
            )));
        }
        Ok(())
    }
}

/// Deterministic tokenizer + canonicalizer for utterances.
#[derive(Clone)]
pub struct TextNormalizer {
    config: NormalizerConfig,
    analyzer: PipelineAnalyzer,
}

impl TextNormalizer {
    /// Build a normalizer from validated exclusion sets.
    pub fn new(config: &NormalizerConfig) -> Result<Self> {
        config.validate()?;

        // A lemma may itself be a stop word ("doings" -> "doing"), so the same
        // filter runs on both sides of the lemmatizer.
        let stop: Arc<StopFilter> = Arc::new(StopFilter::from_words(
            config.stop_words.iter().cloned(),
        ));

        let analyzer = PipelineAnalyzer::new(Arc::new(UnicodeWordTokenizer::new()))
            .add_filter(Arc::new(LowercaseFilter::new()))
            .add_filter(Arc::new(SymbolFilter::from_symbols(
                config.ignored_symbols.iter().cloned(),
            )))
            .add_filter(stop.clone())
            .add_filter(Arc::new(LemmaFilter::with_lemmatizer(
                config.lemmatizer.build(),
            )))
            .add_filter(stop)
            .add_filter(Arc::new(RemoveEmptyFilter::new()))
            .with_name("normalizer");

        Ok(Self {
            config: config.clone(),
            analyzer,
        })
    }

    /// Configuration the normalizer was built from.
    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Normalize raw text into an ordered token sequence.
    ///
    /// Empty input yields an empty sequence.
    pub fn normalize(&self, text: &str) -> Result<Vec<String>> {
        let tokens: Vec<String> = self.analyzer.analyze(text)?.map(|t| t.text).collect();
        log::debug!("normalized {:?} into {} tokens", text, tokens.len());
        Ok(tokens)
    }
}

impl std::fmt::Debug for TextNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextNormalizer")
            .field("config", &self.config)
            .field("analyzer", &self.analyzer)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> TextNormalizer {
        TextNormalizer::new(&NormalizerConfig::default()).unwrap()
    }

    #[test]
    fn test_scenario_sentences() {
        let normalizer = normalizer();
        assert_eq!(
            normalizer.normalize("I want to book an appointment").unwrap(),
            vec!["want", "book", "appointment"]
        );
        assert_eq!(normalizer.normalize("I have a fever").unwrap(), vec!["fever"]);
        assert_eq!(
            normalizer.normalize("My stomach is hurting, badly!!").unwrap(),
            vec!["stomach", "hurting", "badly"]
        );
    }

    #[test]
    fn test_empty_input() {
        let normalizer = normalizer();
        assert!(normalizer.normalize("").unwrap().is_empty());
        assert!(normalizer.normalize("?!  ...").unwrap().is_empty());
        assert!(normalizer.normalize("the and of").unwrap().is_empty());
    }

    #[test]
    fn test_custom_exclusions() {
        let config = NormalizerConfig {
            ignored_symbols: BTreeSet::new(),
            stop_words: ["please".to_string()].into_iter().collect(),
            lemmatizer: LemmatizerKind::English,
        };
        let normalizer = TextNormalizer::new(&config).unwrap();

        assert_eq!(
            normalizer.normalize("Please check the Tests").unwrap(),
            vec!["check", "the", "test"]
        );
    }

    #[test]
    fn test_identity_lemmatizer() {
        let config: NormalizerConfig = serde_json::from_str(r#"{"lemmatizer": "identity"}"#).unwrap();
        assert_eq!(config.lemmatizer, LemmatizerKind::Identity);

        let identity = TextNormalizer::new(&config).unwrap();
        assert_eq!(identity.config(), &config);
        assert_eq!(
            identity.normalize("two Appointments").unwrap(),
            vec!["two", "appointments"]
        );
        assert_eq!(
            normalizer().normalize("two Appointments").unwrap(),
            vec!["two", "appointment"]
        );

        assert!(serde_json::from_str::<NormalizerConfig>(r#"{"lemmatizer": "porter"}"#).is_err());
    }

    #[test]
    fn test_lemma_turned_stop_word_is_dropped() {
        let normalizer = normalizer();
        assert!(normalizer.normalize("doings").unwrap().is_empty());
    }

    #[test]
    fn test_rejects_uppercase_stop_words() {
        let config = NormalizerConfig {
            stop_words: ["The".to_string()].into_iter().collect(),
            ..NormalizerConfig::default()
        };
        assert!(matches!(
            TextNormalizer::new(&config),
            Err(IntentError::Configuration(_))
        ));
    }

    #[test]
    fn test_config_rejects_unknown_fields() {
        let json = r#"{"stop_words": ["a"], "stemmer": "porter"}"#;
        assert!(serde_json::from_str::<NormalizerConfig>(json).is_err());

        let json = r#"{"stop_words": ["a"]}"#;
        let config: NormalizerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.stop_words.len(), 1);
        assert!(config.ignored_symbols.contains("?"));
        assert_eq!(config.lemmatizer, LemmatizerKind::English);
    }
}
