//! Training set assembly.
//!
//! Every [`Example`] becomes one row: its bag-of-words [`FeatureVector`] and a
//! one-hot [`LabelVector`]. Rows are shuffled with a seeded RNG and then
//! split into a train and a validation partition. The split is a plain random
//! split; it does not balance classes across partitions.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::corpus::Example;
use crate::encoder::{FeatureEncoder, FeatureVector};
use crate::error::{IntentError, Result};
use crate::vocabulary::{LabelSet, Vocabulary};

/// One-hot vector selecting a single label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LabelVector {
    index: usize,
    len: usize,
}

impl LabelVector {
    /// One-hot vector of length `len` with `index` set.
    pub fn one_hot(index: usize, len: usize) -> Result<Self> {
        if index >= len {
            return Err(IntentError::shape_mismatch("one-hot label", len, index + 1));
        }
        Ok(Self { index, len })
    }

    /// The selected label index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of labels.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false; a one-hot vector has at least one entry.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Dense `0.0 / 1.0` representation.
    pub fn to_dense(&self) -> Vec<f32> {
        let mut dense = vec![0.0; self.len];
        dense[self.index] = 1.0;
        dense
    }
}

/// Train/validation split options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SplitConfig {
    /// Share of rows held out for validation, in (0, 1).
    pub validation_fraction: f64,
    /// Seed for the row shuffle.
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            validation_fraction: 0.2,
            seed: 42,
        }
    }
}

impl SplitConfig {
    /// Validate the fraction lies strictly between 0 and 1.
    pub fn validate(&self) -> Result<()> {
        if !(self.validation_fraction > 0.0 && self.validation_fraction < 1.0) {
            return Err(IntentError::configuration(format!(
                "validation_fraction must be in (0, 1), got {}",
                self.validation_fraction
            )));
        }
        Ok(())
    }

    /// Number of validation rows for `rows` total rows.
    pub fn validation_len(&self, rows: usize) -> usize {
        // Tolerance keeps 10 * 0.3 at 3 rows instead of 4.
        ((rows as f64 * self.validation_fraction) - 1e-9).ceil().max(0.0) as usize
    }
}

/// Row-aligned feature and label vectors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    /// Feature rows.
    pub features: Vec<FeatureVector>,
    /// Label rows, aligned with `features`.
    pub labels: Vec<LabelVector>,
}

impl Partition {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether the partition has no rows.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Iterate over (features, label) rows.
    pub fn rows(&self) -> impl Iterator<Item = (&FeatureVector, &LabelVector)> {
        self.features.iter().zip(self.labels.iter())
    }

    fn push(&mut self, features: FeatureVector, label: LabelVector) {
        self.features.push(features);
        self.labels.push(label);
    }
}

/// Shuffled and partitioned training data.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSet {
    /// Rows used for fitting.
    pub train: Partition,
    /// Rows held out for validation.
    pub validation: Partition,
    /// Feature dimensions (vocabulary size).
    pub num_features: usize,
    /// Output dimensions (label set size).
    pub num_labels: usize,
}

/// Turns examples into a shuffled train/validation split.
#[derive(Debug, Clone, Default)]
pub struct TrainingSetAssembler {
    config: SplitConfig,
}

impl TrainingSetAssembler {
    /// Create an assembler with the given split options.
    pub fn new(config: SplitConfig) -> Self {
        Self { config }
    }

    /// Split options in use.
    pub fn config(&self) -> &SplitConfig {
        &self.config
    }

    /// Encode, shuffle and partition examples.
    ///
    /// Fails with a configuration error when there are no examples, when the
    /// fraction is out of range, when either partition would be empty, or when
    /// an example's tag is not part of the label set.
    pub fn assemble(
        &self,
        examples: &[Example],
        vocabulary: &Vocabulary,
        labels: &LabelSet,
    ) -> Result<TrainingSet> {
        self.config.validate()?;

        if examples.is_empty() {
            return Err(IntentError::configuration("corpus yielded zero examples"));
        }

        let validation_len = self.config.validation_len(examples.len());
        let train_len = examples.len() - validation_len.min(examples.len());
        if validation_len == 0 || train_len == 0 {
            return Err(IntentError::configuration(format!(
                "validation_fraction {} splits {} examples into {} train / {} validation rows",
                self.config.validation_fraction,
                examples.len(),
                train_len,
                validation_len
            )));
        }

        let mut rows = examples
            .iter()
            .map(|example| {
                let index = labels.index_of(&example.tag).ok_or_else(|| {
                    IntentError::configuration(format!(
                        "example tag '{}' is not in the label set",
                        example.tag
                    ))
                })?;
                let label = LabelVector::one_hot(index, labels.len())?;
                Ok((FeatureEncoder::encode(&example.tokens, vocabulary), label))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        rows.shuffle(&mut rng);

        let mut train = Partition::default();
        let mut validation = Partition::default();
        for (position, (features, label)) in rows.into_iter().enumerate() {
            if position < train_len {
                train.push(features, label);
            } else {
                validation.push(features, label);
            }
        }

        log::info!(
            "assembled {} train and {} validation rows (seed {})",
            train.len(),
            validation.len(),
            self.config.seed
        );

        Ok(TrainingSet {
            train,
            validation,
            num_features: vocabulary.len(),
            num_labels: labels.len(),
        })
    }
}
