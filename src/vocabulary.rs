//! Vocabulary and label set construction.
//!
//! Both the [`Vocabulary`] and the [`LabelSet`] are strictly ascending lists
//! of unique strings. The index of a token in the vocabulary is its feature
//! dimension; the index of a tag in the label set is its output dimension.
//! Once built they never change: a new training run produces a new pair.
//!
//! # Examples
//!
//! ```
//! use medintent::corpus::{Corpus, IntentRecord};
//! use medintent::normalizer::{NormalizerConfig, TextNormalizer};
//! use medintent::vocabulary::VocabularyBuilder;
//!
//! let corpus = Corpus::new(vec![
//!     IntentRecord::new("symptom_fever", ["I have a fever"]),
//!     IntentRecord::new("book_appointment", ["I want to book an appointment"]),
//! ]).unwrap();
//!
//! let normalizer = TextNormalizer::new(&NormalizerConfig::default()).unwrap();
//! let build = VocabularyBuilder::new(&normalizer).build(&corpus).unwrap();
//!
//! assert_eq!(build.vocabulary.as_slice(), ["appointment", "book", "fever", "want"]);
//! assert_eq!(build.labels.as_slice(), ["book_appointment", "symptom_fever"]);
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::artifacts::ArtifactStore;
use crate::corpus::{Corpus, Example};
use crate::error::{IntentError, Result};
use crate::normalizer::TextNormalizer;

/// Strictly ascending list of unique strings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct SortedTerms {
    terms: Vec<String>,
}

impl SortedTerms {
    fn from_sorted(terms: Vec<String>, what: &str) -> Result<Self> {
        if let Some(pair) = terms.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(IntentError::configuration(format!(
                "{what} must be strictly ascending, found '{}' before '{}'",
                pair[0], pair[1]
            )));
        }
        Ok(Self { terms })
    }

    fn from_unordered<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> = terms.into_iter().map(Into::into).collect();
        Self {
            terms: set.into_iter().collect(),
        }
    }

    fn index_of(&self, term: &str) -> Option<usize> {
        self.terms
            .binary_search_by(|probe| probe.as_str().cmp(term))
            .ok()
    }
}

/// Ordered token list defining the feature dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Vocabulary(SortedTerms);

impl Vocabulary {
    /// Build a vocabulary from any collection of tokens, sorting and deduplicating.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Vocabulary(SortedTerms::from_unordered(tokens))
    }

    /// Wrap an already sorted token list, rejecting unsorted or duplicate entries.
    pub fn from_sorted(tokens: Vec<String>) -> Result<Self> {
        SortedTerms::from_sorted(tokens, "vocabulary").map(Vocabulary)
    }

    /// Feature dimension of a token, if it is in the vocabulary.
    pub fn index_of(&self, token: &str) -> Option<usize> {
        self.0.index_of(token)
    }

    /// Whether the token is in the vocabulary.
    pub fn contains(&self, token: &str) -> bool {
        self.index_of(token).is_some()
    }

    /// Token at a feature dimension.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.terms.get(index).map(String::as_str)
    }

    /// Number of feature dimensions.
    pub fn len(&self) -> usize {
        self.0.terms.len()
    }

    /// Whether the vocabulary is empty.
    pub fn is_empty(&self) -> bool {
        self.0.terms.is_empty()
    }

    /// Tokens in dimension order.
    pub fn as_slice(&self) -> &[String] {
        &self.0.terms
    }

    /// Iterate over tokens in dimension order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.terms.iter().map(String::as_str)
    }
}

impl TryFrom<Vec<String>> for Vocabulary {
    type Error = IntentError;

    fn try_from(tokens: Vec<String>) -> Result<Self> {
        Self::from_sorted(tokens)
    }
}

impl From<Vocabulary> for Vec<String> {
    fn from(vocabulary: Vocabulary) -> Self {
        vocabulary.0.terms
    }
}

/// Ordered intent tag list defining the output dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct LabelSet(SortedTerms);

impl LabelSet {
    /// Build a label set from any collection of tags, sorting and deduplicating.
    pub fn from_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        LabelSet(SortedTerms::from_unordered(tags))
    }

    /// Wrap an already sorted tag list, rejecting unsorted or duplicate entries.
    pub fn from_sorted(tags: Vec<String>) -> Result<Self> {
        SortedTerms::from_sorted(tags, "label set").map(LabelSet)
    }

    /// Output dimension of a tag.
    pub fn index_of(&self, tag: &str) -> Option<usize> {
        self.0.index_of(tag)
    }

    /// Tag at an output dimension.
    pub fn tag(&self, index: usize) -> Option<&str> {
        self.0.terms.get(index).map(String::as_str)
    }

    /// Number of output dimensions.
    pub fn len(&self) -> usize {
        self.0.terms.len()
    }

    /// Whether the label set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.terms.is_empty()
    }

    /// Tags in dimension order.
    pub fn as_slice(&self) -> &[String] {
        &self.0.terms
    }

    /// Iterate over tags in dimension order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.terms.iter().map(String::as_str)
    }
}

impl TryFrom<Vec<String>> for LabelSet {
    type Error = IntentError;

    fn try_from(tags: Vec<String>) -> Result<Self> {
        Self::from_sorted(tags)
    }
}

impl From<LabelSet> for Vec<String> {
    fn from(labels: LabelSet) -> Self {
        labels.0.terms
    }
}

/// Non-fatal findings reported while building a vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BuildWarning {
    /// The intent has no patterns; it is a label without positive training signal.
    EmptyIntent { tag: String },
    /// The pattern normalized to zero tokens; its example has an all-zero feature vector.
    EmptyPattern { tag: String, pattern: String },
}

impl std::fmt::Display for BuildWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildWarning::EmptyIntent { tag } => {
                write!(f, "intent '{tag}' has no patterns")
            }
            BuildWarning::EmptyPattern { tag, pattern } => {
                write!(f, "pattern {pattern:?} of intent '{tag}' has no tokens")
            }
        }
    }
}

/// Output of a vocabulary build.
#[derive(Debug, Clone)]
pub struct VocabularyBuild {
    /// Sorted unique tokens.
    pub vocabulary: Vocabulary,
    /// Sorted unique intent tags.
    pub labels: LabelSet,
    /// One example per pattern, in corpus order.
    pub examples: Vec<Example>,
    /// Caller-visible warnings.
    pub warnings: Vec<BuildWarning>,
}

/// Scans a corpus into a vocabulary, a label set and examples.
#[derive(Debug, Clone)]
pub struct VocabularyBuilder<'a> {
    normalizer: &'a TextNormalizer,
}

impl<'a> VocabularyBuilder<'a> {
    /// Create a builder that normalizes with the given normalizer.
    pub fn new(normalizer: &'a TextNormalizer) -> Self {
        Self { normalizer }
    }

    /// Build the vocabulary and label set for a corpus.
    ///
    /// Fails with a configuration error when the corpus has no intents.
    pub fn build(&self, corpus: &Corpus) -> Result<VocabularyBuild> {
        if corpus.is_empty() {
            return Err(IntentError::configuration("corpus has no intents"));
        }

        let mut tokens = BTreeSet::new();
        let mut tags = BTreeSet::new();
        let mut examples = Vec::with_capacity(corpus.pattern_count());
        let mut warnings = Vec::new();

        for record in corpus.intents() {
            tags.insert(record.tag.clone());

            if record.patterns.is_empty() {
                log::warn!("intent '{}' has no patterns", record.tag);
                warnings.push(BuildWarning::EmptyIntent {
                    tag: record.tag.clone(),
                });
            }

            for pattern in &record.patterns {
                let pattern_tokens = self.normalizer.normalize(pattern)?;
                if pattern_tokens.is_empty() {
                    log::warn!(
                        "pattern {:?} of intent '{}' has no tokens",
                        pattern,
                        record.tag
                    );
                    warnings.push(BuildWarning::EmptyPattern {
                        tag: record.tag.clone(),
                        pattern: pattern.clone(),
                    });
                }
                tokens.extend(pattern_tokens.iter().cloned());
                examples.push(Example {
                    tokens: pattern_tokens,
                    tag: record.tag.clone(),
                });
            }
        }

        let vocabulary = Vocabulary::from_tokens(tokens);
        let labels = LabelSet::from_tags(tags);

        log::info!(
            "built vocabulary of {} tokens and {} labels from {} examples",
            vocabulary.len(),
            labels.len(),
            examples.len()
        );

        Ok(VocabularyBuild {
            vocabulary,
            labels,
            examples,
            warnings,
        })
    }

    /// Build and persist the vocabulary and label set under a model version.
    ///
    /// Fails if the version already holds a trained model.
    pub fn build_and_persist(
        &self,
        corpus: &Corpus,
        store: &ArtifactStore,
        version: &str,
    ) -> Result<VocabularyBuild> {
        let build = self.build(corpus)?;
        store.save_vocabulary(
            version,
            self.normalizer.config(),
            &build.vocabulary,
            &build.labels,
        )?;
        Ok(build)
    }
}
