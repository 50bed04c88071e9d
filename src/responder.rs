//! Canned replies for identified intents.

use std::collections::HashMap;

use serde::Serialize;

use crate::corpus::Corpus;
use crate::decoder::IdentifiedIntents;

/// An identified intent with its canned responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchedIntent {
    /// Intent tag.
    pub tag: String,
    /// Responses listed for the tag in the corpus; may be empty.
    pub responses: Vec<String>,
}

/// Reply to one utterance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reply {
    /// At least one intent passed the threshold, most likely first.
    Matched { intents: Vec<MatchedIntent> },
    /// Nothing passed the threshold; carries the utterance back unchanged.
    Fallback { text: String },
}

impl Reply {
    /// Whether any intent was matched.
    pub fn is_matched(&self) -> bool {
        matches!(self, Reply::Matched { .. })
    }
}

/// Maps intent tags to the responses listed in the corpus.
#[derive(Debug, Clone, Default)]
pub struct Responder {
    responses: HashMap<String, Vec<String>>,
}

impl Responder {
    /// Collect responses of every intent in the corpus.
    pub fn from_corpus(corpus: &Corpus) -> Self {
        let responses = corpus
            .intents()
            .iter()
            .map(|record| (record.tag.clone(), record.responses.clone()))
            .collect();
        Self { responses }
    }

    /// Responses for one tag.
    pub fn responses(&self, tag: &str) -> &[String] {
        self.responses.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Build the reply for an utterance and its decoded intents.
    pub fn respond(&self, text: &str, intents: &IdentifiedIntents) -> Reply {
        if intents.is_empty() {
            return Reply::Fallback {
                text: text.to_string(),
            };
        }

        Reply::Matched {
            intents: intents
                .iter()
                .map(|tag| MatchedIntent {
                    tag: tag.to_string(),
                    responses: self.responses(tag).to_vec(),
                })
                .collect(),
        }
    }
}
