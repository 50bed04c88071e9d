//! Offline training run.
//!
//! [`train`] chains the build-time stages: normalize the corpus into a
//! vocabulary and label set, assemble the shuffled split, fit the classifier
//! and measure its accuracy. The result bundles everything a [`Pipeline`]
//! needs, ready to be saved under a version.

use std::sync::Arc;

use serde::Serialize;

use crate::artifacts::{ArtifactStore, ModelArtifacts};
use crate::classifier::{SoftmaxRegression, evaluate};
use crate::config::EngineConfig;
use crate::corpus::Corpus;
use crate::dataset::TrainingSetAssembler;
use crate::decoder::IntentDecoder;
use crate::error::Result;
use crate::normalizer::TextNormalizer;
use crate::pipeline::Pipeline;
use crate::vocabulary::{BuildWarning, VocabularyBuilder};

/// Outcome of a training run.
#[derive(Debug, Clone)]
pub struct TrainingRun {
    /// The trained artifacts.
    pub artifacts: ModelArtifacts,
    /// Warnings raised while building the vocabulary.
    pub warnings: Vec<BuildWarning>,
    /// Metrics of the fitted model.
    pub report: TrainingReport,
}

/// Accuracy and split sizes of a training run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingReport {
    /// Model version.
    pub version: String,
    /// Number of feature dimensions.
    pub vocabulary_size: usize,
    /// Number of labels.
    pub num_labels: usize,
    /// Rows used for fitting.
    pub train_rows: usize,
    /// Rows held out for validation.
    pub validation_rows: usize,
    /// Top-1 accuracy on the training rows.
    pub train_accuracy: f64,
    /// Top-1 accuracy on the validation rows.
    pub validation_accuracy: f64,
    /// Epochs completed.
    pub epochs_run: usize,
    /// Whether early stopping was triggered.
    pub early_stopped: bool,
}

impl TrainingRun {
    /// Build a pipeline serving the trained model with the run's normalizer
    /// and the decoder settings of `config`.
    pub fn pipeline(&self, config: &EngineConfig) -> Result<Pipeline> {
        Pipeline::new(
            TextNormalizer::new(&self.artifacts.normalizer)?,
            self.artifacts.vocabulary.clone(),
            self.artifacts.labels.clone(),
            Arc::new(self.artifacts.model.clone()),
            IntentDecoder::new(config.decoder.clone())?,
        )
    }

    /// Save the trained artifacts under the run's version.
    pub fn save(&self, store: &ArtifactStore) -> Result<()> {
        store.save(&self.artifacts)
    }
}

/// Run the offline stages on a corpus and return the trained artifacts.
pub fn train(corpus: &Corpus, config: &EngineConfig, version: &str) -> Result<TrainingRun> {
    config.validate()?;

    let normalizer = TextNormalizer::new(&config.normalizer)?;
    let build = VocabularyBuilder::new(&normalizer).build(corpus)?;

    let set = TrainingSetAssembler::new(config.split.clone()).assemble(
        &build.examples,
        &build.vocabulary,
        &build.labels,
    )?;

    let model = SoftmaxRegression::fit(&set, &config.fit)?;
    let train_accuracy = evaluate(&model, &set.train)?;
    let validation_accuracy = evaluate(&model, &set.validation)?;
    let (epochs_run, early_stopped) = model
        .training_stats()
        .map(|stats| (stats.epochs_run, stats.early_stopped))
        .unwrap_or_default();

    let report = TrainingReport {
        version: version.to_string(),
        vocabulary_size: build.vocabulary.len(),
        num_labels: build.labels.len(),
        train_rows: set.train.len(),
        validation_rows: set.validation.len(),
        train_accuracy,
        validation_accuracy,
        epochs_run,
        early_stopped,
    };

    log::info!(
        "training run {version}: train accuracy {train_accuracy:.3}, validation accuracy {validation_accuracy:.3}"
    );

    Ok(TrainingRun {
        artifacts: ModelArtifacts::new(
            version,
            normalizer.config().clone(),
            build.vocabulary,
            build.labels,
            model,
        )?,
        warnings: build.warnings,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::IntentRecord;
    use crate::error::IntentError;

    fn corpus() -> Corpus {
        Corpus::new(vec![
            IntentRecord::new(
                "book_appointment",
                [
                    "I want to book an appointment",
                    "Can I schedule an appointment",
                    "book a visit with the doctor",
                    "I need an appointment",
                ],
            ),
            IntentRecord::new(
                "symptom_fever",
                [
                    "I have a fever",
                    "fever since yesterday",
                    "high fever and chills",
                    "my fever is getting worse",
                ],
            ),
        ])
        .unwrap()
    }

    fn config() -> EngineConfig {
        let mut config = EngineConfig::default();
        config.fit.early_stop_patience = 0;
        config
    }

    #[test]
    fn test_train_end_to_end() {
        let config = config();
        let run = train(&corpus(), &config, "v1").unwrap();

        assert_eq!(run.report.num_labels, 2);
        assert_eq!(run.report.train_rows + run.report.validation_rows, 8);
        assert_eq!(run.report.validation_rows, 2);
        assert_eq!(run.report.train_accuracy, 1.0);
        assert!(run.warnings.is_empty());

        let pipeline = run.pipeline(&config).unwrap();
        assert_eq!(
            pipeline.classify("I have a fever").unwrap().top(),
            Some("symptom_fever")
        );
        assert_eq!(
            pipeline.classify("I want to book an appointment").unwrap().top(),
            Some("book_appointment")
        );
    }

    #[test]
    fn test_train_rejects_tiny_corpus() {
        let corpus = Corpus::new(vec![IntentRecord::new("only", ["one pattern"])]).unwrap();
        assert!(matches!(
            train(&corpus, &EngineConfig::default(), "v1"),
            Err(IntentError::Configuration(_))
        ));
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let run = train(&corpus(), &config(), "v1").unwrap();
        run.save(&store).unwrap();

        let loaded = store.load("v1").unwrap();
        assert_eq!(loaded.vocabulary, run.artifacts.vocabulary);
        assert_eq!(loaded.labels, run.artifacts.labels);
        assert_eq!(loaded.normalizer, run.artifacts.normalizer);
        assert_eq!(loaded.run_id, run.artifacts.run_id);
    }
}
