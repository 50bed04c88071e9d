//! Labeled intent corpus.
//!
//! A corpus is a list of intent records, each holding a tag, the example
//! phrasings ("patterns") that express it and the canned responses a front-end
//! returns once it is recognized:
//!
//! ```json
//! {
//!   "intents": [
//!     {"tag": "symptom_fever", "patterns": ["I have a fever"], "responses": ["..."]}
//!   ]
//! }
//! ```
//!
//! The singular key `"pattern"` is accepted as an alias for `"patterns"`.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{IntentError, Result};

/// One intent with its phrasings and responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IntentRecord {
    /// Intent tag.
    pub tag: String,
    /// Example phrasings of this intent.
    #[serde(default, alias = "pattern")]
    pub patterns: Vec<String>,
    /// Canned responses for this intent.
    #[serde(default)]
    pub responses: Vec<String>,
}

impl IntentRecord {
    /// Create a record with patterns and no responses.
    pub fn new<T, I, S>(tag: T, patterns: I) -> Self
    where
        T: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tag: tag.into(),
            patterns: patterns.into_iter().map(Into::into).collect(),
            responses: Vec::new(),
        }
    }

    /// Attach canned responses.
    pub fn with_responses<I, S>(mut self, responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.responses = responses.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CorpusFile {
    intents: Vec<IntentRecord>,
}

/// A validated collection of intent records.
///
/// Tags are non-empty and unique, so every pattern belongs to exactly one tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Corpus {
    intents: Vec<IntentRecord>,
}

impl Corpus {
    /// Validate and wrap a list of intent records.
    pub fn new(intents: Vec<IntentRecord>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(intents.len());
        for record in &intents {
            if record.tag.trim().is_empty() {
                return Err(IntentError::configuration("intent tag must not be empty"));
            }
            if !seen.insert(record.tag.as_str()) {
                return Err(IntentError::configuration(format!(
                    "duplicate intent tag '{}'",
                    record.tag
                )));
            }
        }
        Ok(Self { intents })
    }

    /// Parse a corpus from its JSON representation.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: CorpusFile = serde_json::from_str(json)?;
        Self::new(file.intents)
    }

    /// Load a corpus from a JSON file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let corpus = Self::from_json_str(&content)?;
        log::info!(
            "loaded corpus from {} ({} intents)",
            path.as_ref().display(),
            corpus.len()
        );
        Ok(corpus)
    }

    /// The intent records in corpus order.
    pub fn intents(&self) -> &[IntentRecord] {
        &self.intents
    }

    /// Number of intent records.
    pub fn len(&self) -> usize {
        self.intents.len()
    }

    /// Whether the corpus has no intents.
    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }

    /// Total number of patterns across all intents.
    pub fn pattern_count(&self) -> usize {
        self.intents.iter().map(|r| r.patterns.len()).sum()
    }
}

/// A normalized pattern paired with its intent tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    /// Normalized tokens of the pattern.
    pub tokens: Vec<String>,
    /// Intent tag the pattern belongs to.
    pub tag: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_corpus() {
        let json = r#"{
            "intents": [
                {"tag": "book_appointment", "patterns": ["I want to book an appointment"],
                 "responses": ["Sure, when?"]},
                {"tag": "symptom_fever", "pattern": ["I have a fever", "feeling hot"]}
            ]
        }"#;

        let corpus = Corpus::from_json_str(json).unwrap();
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.pattern_count(), 3);
        assert_eq!(corpus.intents()[0].responses, vec!["Sure, when?"]);
        assert!(corpus.intents()[1].responses.is_empty());
    }

    #[test]
    fn test_rejects_duplicate_tags() {
        let result = Corpus::new(vec![
            IntentRecord::new("greeting", ["hi"]),
            IntentRecord::new("greeting", ["hello"]),
        ]);
        assert!(matches!(result, Err(IntentError::Configuration(_))));
    }

    #[test]
    fn test_rejects_empty_tag() {
        let result = Corpus::new(vec![IntentRecord::new("  ", ["hi"])]);
        assert!(matches!(result, Err(IntentError::Configuration(_))));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            Corpus::from_json_str(r#"{"intents": [{"name": "x"}]}"#),
            Err(IntentError::Json(_))
        ));
        assert!(matches!(
            Corpus::from_json_str(r#"{"intents": [{"tag": "x", "patterns": "hi"}]}"#),
            Err(IntentError::Json(_))
        ));
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("intents.json");
        std::fs::write(&path, r#"{"intents": [{"tag": "goodbye", "patterns": ["bye"]}]}"#)
            .unwrap();

        let corpus = Corpus::from_path(&path).unwrap();
        assert_eq!(corpus.intents()[0].tag, "goodbye");
    }
}
