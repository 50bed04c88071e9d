//! Inference decoder turning a prediction into identified intents.
//!
//! Only labels whose probability is strictly greater than the confidence
//! threshold are kept. They are ranked by probability, highest first; equal
//! probabilities keep label set order.
//!
//! # Examples
//!
//! ```
//! use medintent::classifier::Prediction;
//! use medintent::decoder::{DecoderConfig, IntentDecoder};
//! use medintent::vocabulary::LabelSet;
//!
//! let labels = LabelSet::from_tags(["a", "b"]);
//! let decoder = IntentDecoder::new(DecoderConfig::default()).unwrap();
//!
//! let intents = decoder.decode(&Prediction::new(vec![0.1, 0.9]), &labels).unwrap();
//! assert_eq!(intents.tags(), ["b"]);
//! ```

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::classifier::Prediction;
use crate::error::{IntentError, Result};
use crate::vocabulary::LabelSet;

/// Decoder options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecoderConfig {
    /// A probability must exceed this value to be reported.
    pub threshold: f32,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self { threshold: 0.25 }
    }
}

impl DecoderConfig {
    /// Validate the threshold is a finite number.
    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() {
            return Err(IntentError::configuration(format!(
                "threshold must be finite, got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}

/// An intent tag with the probability the classifier assigned it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredIntent {
    /// Intent tag.
    pub tag: String,
    /// Predicted probability.
    pub probability: f32,
}

/// Ordered list of intent tags, most likely first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentifiedIntents(Vec<String>);

impl IdentifiedIntents {
    /// Tags in decoded order.
    pub fn tags(&self) -> &[String] {
        &self.0
    }

    /// The most likely tag, if any passed the threshold.
    pub fn top(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// Number of identified intents.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no intent passed the threshold.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over tags in decoded order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Unwrap into the tag list.
    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl From<Vec<ScoredIntent>> for IdentifiedIntents {
    fn from(scored: Vec<ScoredIntent>) -> Self {
        IdentifiedIntents(scored.into_iter().map(|s| s.tag).collect())
    }
}

/// Thresholds and ranks predictions.
#[derive(Debug, Clone)]
pub struct IntentDecoder {
    threshold: f32,
}

impl Default for IntentDecoder {
    fn default() -> Self {
        Self {
            threshold: DecoderConfig::default().threshold,
        }
    }
}

impl IntentDecoder {
    /// Create a decoder from validated options.
    pub fn new(config: DecoderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            threshold: config.threshold,
        })
    }

    /// The confidence threshold.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Decode a prediction into intent tags, most likely first.
    ///
    /// An empty result is not an error. A prediction whose length differs
    /// from the label set is a shape mismatch.
    pub fn decode(&self, prediction: &Prediction, labels: &LabelSet) -> Result<IdentifiedIntents> {
        self.decode_scored(prediction, labels).map(IdentifiedIntents::from)
    }

    /// Decode a prediction, keeping each tag's probability.
    pub fn decode_scored(
        &self,
        prediction: &Prediction,
        labels: &LabelSet,
    ) -> Result<Vec<ScoredIntent>> {
        if prediction.len() != labels.len() {
            return Err(IntentError::shape_mismatch(
                "decoder prediction",
                labels.len(),
                prediction.len(),
            ));
        }

        // NaN never compares greater, so it is dropped here.
        let mut kept: Vec<(usize, f32)> = prediction
            .as_slice()
            .iter()
            .copied()
            .enumerate()
            .filter(|&(_, p)| p > self.threshold)
            .collect();

        kept.sort_by(|a, b| match b.1.total_cmp(&a.1) {
            Ordering::Equal => a.0.cmp(&b.0),
            ordering => ordering,
        });

        kept.into_iter()
            .map(|(index, probability)| {
                let tag = labels.tag(index).ok_or_else(|| {
                    IntentError::shape_mismatch("decoder label", labels.len(), index + 1)
                })?;
                Ok(ScoredIntent {
                    tag: tag.to_string(),
                    probability,
                })
            })
            .collect()
    }
}
