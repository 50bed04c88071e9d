//! Intent classifier contract and shared training types.
//!
//! A [`Classifier`] maps a [`FeatureVector`] to a [`Prediction`], one
//! probability per label. Prediction takes `&self` and never mutates the
//! model, so one trained classifier can serve many threads at once.

pub mod softmax;

pub use softmax::SoftmaxRegression;

use serde::{Deserialize, Serialize};

use crate::dataset::Partition;
use crate::encoder::FeatureVector;
use crate::error::{IntentError, Result};

/// Trained model mapping a feature vector to per-label probabilities.
pub trait Classifier: Send + Sync {
    /// Predict probabilities for one feature vector.
    ///
    /// Fails with a shape mismatch when the vector length differs from
    /// [`Classifier::num_features`].
    fn predict(&self, features: &FeatureVector) -> Result<Prediction>;

    /// Number of input dimensions.
    fn num_features(&self) -> usize;

    /// Number of output dimensions.
    fn num_labels(&self) -> usize;

    /// Get the name of this classifier for debugging and logging.
    fn name(&self) -> &str;
}

/// Per-label probabilities, aligned with the label set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Prediction(Vec<f32>);

impl Prediction {
    /// Wrap raw probabilities.
    pub fn new(probabilities: Vec<f32>) -> Self {
        Prediction(probabilities)
    }

    /// Probabilities in label order.
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Number of labels covered.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the prediction is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Index of the highest probability; ties go to the lower index.
    pub fn argmax(&self) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (index, &p) in self.0.iter().enumerate() {
            match best {
                Some((_, top)) if p.total_cmp(&top).is_le() => {}
                _ => best = Some((index, p)),
            }
        }
        best.map(|(index, _)| index)
    }

    /// Unwrap into the raw probabilities.
    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }
}

impl From<Vec<f32>> for Prediction {
    fn from(probabilities: Vec<f32>) -> Self {
        Prediction(probabilities)
    }
}

/// Hyperparameters for fitting a classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FitConfig {
    /// Maximum number of passes over the training partition.
    pub epochs: usize,
    /// Rows per gradient step.
    pub batch_size: usize,
    /// Gradient descent step size.
    pub learning_rate: f32,
    /// Epochs without validation improvement before stopping; 0 disables early stopping.
    pub early_stop_patience: usize,
    /// Seed for batch shuffling.
    pub seed: u64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            epochs: 200,
            batch_size: 8,
            learning_rate: 0.5,
            early_stop_patience: 20,
            seed: 42,
        }
    }
}

impl FitConfig {
    /// Validate the hyperparameters.
    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(IntentError::configuration("epochs must be at least 1"));
        }
        if self.batch_size == 0 {
            return Err(IntentError::configuration("batch_size must be at least 1"));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(IntentError::configuration(format!(
                "learning_rate must be a positive finite number, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }
}

/// Training statistics for a fitted model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingStats {
    /// Mean training loss per epoch.
    pub training_losses: Vec<f64>,
    /// Validation loss per epoch.
    pub validation_losses: Vec<f64>,
    /// Number of epochs completed.
    pub epochs_run: usize,
    /// Epoch (1-based) with the lowest validation loss.
    pub best_epoch: usize,
    /// Lowest validation loss seen.
    pub best_validation_loss: f64,
    /// Whether early stopping was triggered.
    pub early_stopped: bool,
    /// Training time in milliseconds.
    pub training_time_ms: u64,
}

/// Top-1 accuracy of a classifier on a partition.
///
/// A row counts as correct when the highest-probability label is the row's
/// label. Fails on an empty partition or a row of the wrong length.
pub fn evaluate(classifier: &dyn Classifier, partition: &Partition) -> Result<f64> {
    if partition.is_empty() {
        return Err(IntentError::configuration(
            "cannot evaluate on an empty partition",
        ));
    }

    let mut correct = 0usize;
    for (features, label) in partition.rows() {
        let prediction = classifier.predict(features)?;
        if prediction.argmax() == Some(label.index()) {
            correct += 1;
        }
    }

    Ok(correct as f64 / partition.len() as f64)
}
