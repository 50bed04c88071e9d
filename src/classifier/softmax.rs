//! Multinomial logistic regression over bag-of-words features.
//!
//! Weights are stored row-major, one row of `num_labels` logits per feature.
//! Feature vectors are binary, so the logits of a row are the bias plus the sum
//! of the weight rows of its active features; training and prediction only
//! touch those rows.

use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::{Classifier, FitConfig, Prediction, TrainingStats};
use crate::dataset::{LabelVector, Partition, TrainingSet};
use crate::encoder::FeatureVector;
use crate::error::{IntentError, Result};

/// Smallest probability fed to the log in cross-entropy.
const MIN_PROBABILITY: f64 = 1e-12;

/// Softmax regression classifier trained with mini-batch gradient descent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SoftmaxState")]
pub struct SoftmaxRegression {
    num_features: usize,
    num_labels: usize,
    weights: Vec<f32>,
    bias: Vec<f32>,
    stats: Option<TrainingStats>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct SoftmaxState {
    num_features: usize,
    num_labels: usize,
    weights: Vec<f32>,
    bias: Vec<f32>,
    #[serde(default)]
    stats: Option<TrainingStats>,
}

impl TryFrom<SoftmaxState> for SoftmaxRegression {
    type Error = IntentError;

    fn try_from(state: SoftmaxState) -> Result<Self> {
        if state.num_labels == 0 {
            return Err(IntentError::model("model has zero output dimensions"));
        }
        let expected = weight_count(state.num_features, state.num_labels)?;
        if state.weights.len() != expected {
            return Err(IntentError::shape_mismatch(
                "model weights",
                expected,
                state.weights.len(),
            ));
        }
        if state.bias.len() != state.num_labels {
            return Err(IntentError::shape_mismatch(
                "model bias",
                state.num_labels,
                state.bias.len(),
            ));
        }
        if state.weights.iter().chain(&state.bias).any(|w| !w.is_finite()) {
            return Err(IntentError::model("model parameters must be finite"));
        }
        Ok(Self {
            num_features: state.num_features,
            num_labels: state.num_labels,
            weights: state.weights,
            bias: state.bias,
            stats: state.stats,
        })
    }
}

fn weight_count(num_features: usize, num_labels: usize) -> Result<usize> {
    num_features.checked_mul(num_labels).ok_or_else(|| {
        IntentError::model(format!(
            "model dimensions {num_features} x {num_labels} overflow"
        ))
    })
}

/// Weight and bias update produced by one row.
struct RowGradient {
    active: Vec<usize>,
    delta: Vec<f32>,
}

impl SoftmaxRegression {
    /// Classifier kind recorded in persisted models.
    pub const NAME: &'static str = "softmax_regression";

    /// An untrained model with all parameters at zero.
    ///
    /// It predicts the uniform distribution for every input.
    pub fn zeros(num_features: usize, num_labels: usize) -> Result<Self> {
        if num_labels == 0 {
            return Err(IntentError::configuration(
                "classifier needs at least one label",
            ));
        }
        Ok(Self {
            num_features,
            num_labels,
            weights: vec![0.0; weight_count(num_features, num_labels)?],
            bias: vec![0.0; num_labels],
            stats: None,
        })
    }

    /// Fit a model on a training set.
    ///
    /// Each epoch shuffles the training rows with an RNG seeded from
    /// `config.seed` and takes one gradient step per batch. After every epoch
    /// the validation loss is measured; when it has not improved for
    /// `early_stop_patience` epochs training stops, and the returned model
    /// carries the weights of the epoch with the lowest validation loss. With a
    /// patience of 0 all epochs run and the final weights are kept.
    pub fn fit(set: &TrainingSet, config: &FitConfig) -> Result<Self> {
        config.validate()?;
        if set.train.is_empty() || set.validation.is_empty() {
            return Err(IntentError::configuration(
                "training and validation partitions must both be non-empty",
            ));
        }

        let mut model = Self::zeros(set.num_features, set.num_labels)?;
        model.check_partition(&set.train, "training partition")?;
        model.check_partition(&set.validation, "validation partition")?;

        let started = Instant::now();
        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut order: Vec<usize> = (0..set.train.len()).collect();

        let mut stats = TrainingStats {
            best_validation_loss: f64::INFINITY,
            ..TrainingStats::default()
        };
        let mut best: Option<(Vec<f32>, Vec<f32>)> = None;
        let mut epochs_without_improvement = 0usize;
        let early_stopping = config.early_stop_patience > 0;

        for epoch in 1..=config.epochs {
            order.shuffle(&mut rng);

            let mut loss_sum = 0.0f64;
            for batch in order.chunks(config.batch_size) {
                loss_sum += model.step(&set.train, batch, config.learning_rate);
            }
            let training_loss = loss_sum / set.train.len() as f64;
            let validation_loss = model.loss(&set.validation);

            if !training_loss.is_finite() || !validation_loss.is_finite() {
                return Err(IntentError::model(format!(
                    "loss diverged at epoch {epoch} (train {training_loss}, validation {validation_loss})"
                )));
            }

            stats.training_losses.push(training_loss);
            stats.validation_losses.push(validation_loss);
            stats.epochs_run = epoch;

            log::debug!(
                "epoch {epoch}: training loss {training_loss:.6}, validation loss {validation_loss:.6}"
            );

            if validation_loss < stats.best_validation_loss {
                stats.best_validation_loss = validation_loss;
                stats.best_epoch = epoch;
                if early_stopping {
                    best = Some((model.weights.clone(), model.bias.clone()));
                }
                epochs_without_improvement = 0;
            } else if early_stopping {
                epochs_without_improvement += 1;
                if epochs_without_improvement >= config.early_stop_patience {
                    log::warn!(
                        "early stopping at epoch {epoch}, restoring weights from epoch {}",
                        stats.best_epoch
                    );
                    stats.early_stopped = true;
                    break;
                }
            }
        }

        if let Some((weights, bias)) = best {
            model.weights = weights;
            model.bias = bias;
        }
        stats.training_time_ms = started.elapsed().as_millis() as u64;

        log::info!(
            "trained softmax regression ({} features, {} labels) for {} epochs, best validation loss {:.6}",
            model.num_features,
            model.num_labels,
            stats.epochs_run,
            stats.best_validation_loss
        );

        model.stats = Some(stats);
        Ok(model)
    }

    /// Statistics from the fit that produced this model, if any.
    pub fn training_stats(&self) -> Option<&TrainingStats> {
        self.stats.as_ref()
    }

    fn check_partition(&self, partition: &Partition, context: &str) -> Result<()> {
        for (features, label) in partition.rows() {
            features.ensure_len(self.num_features, context)?;
            if label.len() != self.num_labels {
                return Err(IntentError::shape_mismatch(
                    context,
                    self.num_labels,
                    label.len(),
                ));
            }
        }
        Ok(())
    }

    fn probabilities(&self, active: &[usize]) -> Vec<f32> {
        let mut logits = self.bias.clone();
        for &feature in active {
            let row = &self.weights[feature * self.num_labels..(feature + 1) * self.num_labels];
            for (logit, weight) in logits.iter_mut().zip(row) {
                *logit += weight;
            }
        }
        softmax(&mut logits);
        logits
    }

    fn row_loss(probabilities: &[f32], label: &LabelVector) -> f64 {
        -(probabilities[label.index()] as f64).max(MIN_PROBABILITY).ln()
    }

    /// Mean cross-entropy over a partition.
    fn loss(&self, partition: &Partition) -> f64 {
        let total: f64 = partition
            .rows()
            .map(|(features, label)| {
                let active: Vec<usize> = features.active_indices().collect();
                Self::row_loss(&self.probabilities(&active), label)
            })
            .sum();
        total / partition.len() as f64
    }

    /// One gradient step over a batch, returning the summed batch loss.
    ///
    /// All row gradients are computed against the pre-step parameters before
    /// any of them is applied.
    fn step(&mut self, partition: &Partition, batch: &[usize], learning_rate: f32) -> f64 {
        let mut loss = 0.0;
        let gradients: Vec<RowGradient> = batch
            .iter()
            .map(|&row| {
                let active: Vec<usize> = partition.features[row].active_indices().collect();
                let label = &partition.labels[row];
                let mut delta = self.probabilities(&active);
                loss += Self::row_loss(&delta, label);
                delta[label.index()] -= 1.0;
                RowGradient { active, delta }
            })
            .collect();

        let scale = learning_rate / batch.len() as f32;
        for gradient in &gradients {
            for (bias, d) in self.bias.iter_mut().zip(&gradient.delta) {
                *bias -= scale * d;
            }
            for &feature in &gradient.active {
                let row =
                    &mut self.weights[feature * self.num_labels..(feature + 1) * self.num_labels];
                for (weight, d) in row.iter_mut().zip(&gradient.delta) {
                    *weight -= scale * d;
                }
            }
        }
        loss
    }
}

/// In-place numerically stable softmax.
fn softmax(logits: &mut [f32]) {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let mut sum = 0.0;
    for logit in logits.iter_mut() {
        *logit = (*logit - max).exp();
        sum += *logit;
    }
    for logit in logits.iter_mut() {
        *logit /= sum;
    }
}

impl Classifier for SoftmaxRegression {
    fn predict(&self, features: &FeatureVector) -> Result<Prediction> {
        features.ensure_len(self.num_features, "classifier input")?;
        let active: Vec<usize> = features.active_indices().collect();
        Ok(Prediction::new(self.probabilities(&active)))
    }

    fn num_features(&self) -> usize {
        self.num_features
    }

    fn num_labels(&self) -> usize {
        self.num_labels
    }

    fn name(&self) -> &str {
        Self::NAME
    }
}
