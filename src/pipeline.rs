//! Online classification pipeline.
//!
//! A [`Pipeline`] ties one normalizer to one immutable (vocabulary, label
//! set, classifier) triple and a decoder. Classification only reads shared
//! state, so a single pipeline can be used from any number of threads.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use medintent::classifier::SoftmaxRegression;
//! use medintent::decoder::IntentDecoder;
//! use medintent::normalizer::{NormalizerConfig, TextNormalizer};
//! use medintent::pipeline::Pipeline;
//! use medintent::vocabulary::{LabelSet, Vocabulary};
//!
//! let pipeline = Pipeline::new(
//!     TextNormalizer::new(&NormalizerConfig::default()).unwrap(),
//!     Vocabulary::from_tokens(["fever"]),
//!     LabelSet::from_tags(["a", "b"]),
//!     Arc::new(SoftmaxRegression::zeros(1, 2).unwrap()),
//!     IntentDecoder::default(),
//! )
//! .unwrap();
//!
//! // An untrained model gives 0.5 to both labels, above the 0.25 threshold.
//! let intents = pipeline.classify("I have a fever").unwrap();
//! assert_eq!(intents.tags(), ["a", "b"]);
//! ```

use std::sync::Arc;

use rayon::prelude::*;

use crate::artifacts::ModelArtifacts;
use crate::classifier::{Classifier, Prediction};
use crate::decoder::{DecoderConfig, IdentifiedIntents, IntentDecoder, ScoredIntent};
use crate::encoder::FeatureEncoder;
use crate::error::{IntentError, Result};
use crate::normalizer::TextNormalizer;
use crate::vocabulary::{LabelSet, Vocabulary};

/// Immutable raw-text to intents classifier.
#[derive(Clone)]
pub struct Pipeline {
    normalizer: TextNormalizer,
    vocabulary: Vocabulary,
    labels: LabelSet,
    classifier: Arc<dyn Classifier>,
    decoder: IntentDecoder,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("vocabulary_size", &self.vocabulary.len())
            .field("labels", &self.labels.len())
            .field("classifier", &self.classifier.name())
            .field("threshold", &self.decoder.threshold())
            .finish()
    }
}

impl Pipeline {
    /// Assemble a pipeline, checking the classifier matches the mappings.
    pub fn new(
        normalizer: TextNormalizer,
        vocabulary: Vocabulary,
        labels: LabelSet,
        classifier: Arc<dyn Classifier>,
        decoder: IntentDecoder,
    ) -> Result<Self> {
        if classifier.num_features() != vocabulary.len() {
            return Err(IntentError::shape_mismatch(
                "pipeline classifier input",
                vocabulary.len(),
                classifier.num_features(),
            ));
        }
        if classifier.num_labels() != labels.len() {
            return Err(IntentError::shape_mismatch(
                "pipeline classifier output",
                labels.len(),
                classifier.num_labels(),
            ));
        }
        Ok(Self {
            normalizer,
            vocabulary,
            labels,
            classifier,
            decoder,
        })
    }

    /// Build a pipeline from loaded artifacts.
    ///
    /// The normalizer is rebuilt from the configuration saved with the
    /// vocabulary, so utterances are tokenized exactly as the patterns were.
    pub fn from_artifacts(artifacts: ModelArtifacts, decoder: DecoderConfig) -> Result<Self> {
        Self::new(
            TextNormalizer::new(&artifacts.normalizer)?,
            artifacts.vocabulary,
            artifacts.labels,
            Arc::new(artifacts.model),
            IntentDecoder::new(decoder)?,
        )
    }

    /// The vocabulary defining feature dimensions.
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// The label set defining output dimensions.
    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    /// Raw per-label probabilities for an utterance.
    pub fn predict(&self, text: &str) -> Result<Prediction> {
        let tokens = self.normalizer.normalize(text)?;
        let features = FeatureEncoder::encode(&tokens, &self.vocabulary);
        self.classifier.predict(&features)
    }

    /// Classify an utterance into intent tags, most likely first.
    pub fn classify(&self, text: &str) -> Result<IdentifiedIntents> {
        let prediction = self.predict(text)?;
        self.decoder.decode(&prediction, &self.labels)
    }

    /// Classify an utterance, keeping each tag's probability.
    pub fn classify_scored(&self, text: &str) -> Result<Vec<ScoredIntent>> {
        let prediction = self.predict(text)?;
        self.decoder.decode_scored(&prediction, &self.labels)
    }

    /// Classify many utterances in parallel. Results keep input order.
    pub fn classify_batch<S>(&self, texts: &[S]) -> Result<Vec<IdentifiedIntents>>
    where
        S: AsRef<str> + Sync,
    {
        texts
            .par_iter()
            .map(|text| self.classify(text.as_ref()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::FeatureVector;
    use crate::normalizer::NormalizerConfig;

    /// Puts all mass on the label with the same index as the first active feature.
    struct Echo {
        features: usize,
        labels: usize,
    }

    impl Classifier for Echo {
        fn predict(&self, features: &FeatureVector) -> Result<Prediction> {
            features.ensure_len(self.features, "echo")?;
            let mut probabilities = vec![0.0; self.labels];
            if let Some(index) = features.active_indices().next() {
                probabilities[index % self.labels] = 1.0;
            }
            Ok(Prediction::new(probabilities))
        }

        fn num_features(&self) -> usize {
            self.features
        }

        fn num_labels(&self) -> usize {
            self.labels
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    fn pipeline() -> Pipeline {
        Pipeline::new(
            TextNormalizer::new(&NormalizerConfig::default()).unwrap(),
            Vocabulary::from_tokens(["appointment", "fever"]),
            LabelSet::from_tags(["book_appointment", "symptom_fever"]),
            Arc::new(Echo {
                features: 2,
                labels: 2,
            }),
            IntentDecoder::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_classify() {
        let pipeline = pipeline();
        assert_eq!(
            pipeline.classify("I have a fever").unwrap().tags(),
            ["symptom_fever"]
        );
        assert_eq!(
            pipeline.classify("Appointments please").unwrap().tags(),
            ["book_appointment"]
        );
        assert!(pipeline.classify("hello there").unwrap().is_empty());
        assert!(pipeline.classify("").unwrap().is_empty());
    }

    #[test]
    fn test_classify_scored() {
        let scored = pipeline().classify_scored("fever").unwrap();
        assert_eq!(scored.len(), 1);
        assert_eq!(scored[0].probability, 1.0);
    }

    #[test]
    fn test_classify_batch_keeps_order() {
        let pipeline = pipeline();
        let texts = ["fever", "appointment", "nothing", "fever again"];
        let results = pipeline.classify_batch(&texts).unwrap();

        let tops: Vec<Option<&str>> = results.iter().map(|r| r.top()).collect();
        assert_eq!(
            tops,
            vec![
                Some("symptom_fever"),
                Some("book_appointment"),
                None,
                Some("symptom_fever")
            ]
        );
    }

    #[test]
    fn test_rejects_mismatched_classifier() {
        let result = Pipeline::new(
            TextNormalizer::new(&NormalizerConfig::default()).unwrap(),
            Vocabulary::from_tokens(["appointment", "fever", "rash"]),
            LabelSet::from_tags(["a", "b"]),
            Arc::new(Echo {
                features: 2,
                labels: 2,
            }),
            IntentDecoder::default(),
        );
        assert!(matches!(result, Err(IntentError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_pipeline_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Pipeline>();
    }
}
