//! Identity lemmatizer that returns words unchanged.

use crate::analysis::token_filter::lemma::Lemmatizer;

/// Lemmatizer that leaves every word as is.
#[derive(Debug, Clone, Default)]
pub struct IdentityLemmatizer;

impl IdentityLemmatizer {
    /// Create a new identity lemmatizer.
    pub fn new() -> Self {
        IdentityLemmatizer
    }
}

impl Lemmatizer for IdentityLemmatizer {
    fn lemmatize(&self, word: &str) -> String {
        word.to_string()
    }

    fn name(&self) -> &'static str {
        "identity"
    }
}
