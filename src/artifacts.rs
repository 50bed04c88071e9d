//! Versioned on-disk artifacts.
//!
//! Every trained model version lives in its own directory:
//!
//! ```text
//! <root>/<version>/vocabulary.json
//! <root>/<version>/labels.json
//! <root>/<version>/model.json
//! ```
//!
//! Each file records the version it belongs to and the id of the run that
//! wrote it. Loading checks that all three agree on both, and that the model
//! dimensions match the vocabulary and the label set, so a model can never be
//! paired with mappings it was not trained on. The vocabulary file also
//! carries the normalizer configuration the mappings were built with.
//!
//! Files are written to a temporary name and renamed into place, so readers
//! never observe a partially written artifact. A version that holds a model
//! is immutable: neither its vocabulary nor its model can be overwritten.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::classifier::{Classifier, SoftmaxRegression, TrainingStats};
use crate::error::{IntentError, Result};
use crate::normalizer::NormalizerConfig;
use crate::vocabulary::{LabelSet, Vocabulary};

/// Vocabulary file name inside a version directory.
pub const VOCABULARY_FILE: &str = "vocabulary.json";
/// Label set file name inside a version directory.
pub const LABELS_FILE: &str = "labels.json";
/// Model file name inside a version directory.
pub const MODEL_FILE: &str = "model.json";

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ArtifactFile<T> {
    version: String,
    run_id: Uuid,
    created_at: DateTime<Utc>,
    content: T,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct VocabularyFile<N, V> {
    normalizer: N,
    tokens: V,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ModelFile<M> {
    classifier: String,
    model: M,
}

/// The vocabulary, label set and model of one version, loaded together.
#[derive(Debug, Clone)]
pub struct ModelArtifacts {
    /// Version all three artifacts belong to.
    pub version: String,
    /// Id of the run that produced the artifacts.
    pub run_id: Uuid,
    /// When the model was saved.
    pub created_at: DateTime<Utc>,
    /// Normalizer configuration the vocabulary was built with.
    pub normalizer: NormalizerConfig,
    /// Feature dimensions.
    pub vocabulary: Vocabulary,
    /// Output dimensions.
    pub labels: LabelSet,
    /// Trained classifier.
    pub model: SoftmaxRegression,
}

impl ModelArtifacts {
    /// Bundle artifacts under a fresh run id, checking the model dimensions
    /// against the mappings.
    pub fn new<S: Into<String>>(
        version: S,
        normalizer: NormalizerConfig,
        vocabulary: Vocabulary,
        labels: LabelSet,
        model: SoftmaxRegression,
    ) -> Result<Self> {
        check_dimensions(&vocabulary, &labels, &model)?;
        Ok(Self {
            version: version.into(),
            run_id: Uuid::new_v4(),
            created_at: Utc::now(),
            normalizer,
            vocabulary,
            labels,
            model,
        })
    }

    /// Summary suitable for display.
    pub fn summary(&self) -> ArtifactSummary {
        ArtifactSummary {
            version: self.version.clone(),
            run_id: self.run_id,
            created_at: self.created_at,
            classifier: self.model.name().to_string(),
            vocabulary_size: self.vocabulary.len(),
            labels: self.labels.as_slice().to_vec(),
            training_stats: self.model.training_stats().cloned(),
        }
    }
}

/// Human-facing description of a stored version.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactSummary {
    /// Version name.
    pub version: String,
    /// Id of the run that wrote the version.
    pub run_id: Uuid,
    /// When the model was saved.
    pub created_at: DateTime<Utc>,
    /// Classifier kind.
    pub classifier: String,
    /// Number of feature dimensions.
    pub vocabulary_size: usize,
    /// Intent tags in output order.
    pub labels: Vec<String>,
    /// Statistics of the fit, if recorded.
    pub training_stats: Option<TrainingStats>,
}

fn check_dimensions(
    vocabulary: &Vocabulary,
    labels: &LabelSet,
    model: &SoftmaxRegression,
) -> Result<()> {
    if model.num_features() != vocabulary.len() {
        return Err(IntentError::shape_mismatch(
            "model input dimensions",
            vocabulary.len(),
            model.num_features(),
        ));
    }
    if model.num_labels() != labels.len() {
        return Err(IntentError::shape_mismatch(
            "model output dimensions",
            labels.len(),
            model.num_labels(),
        ));
    }
    Ok(())
}

fn check_run(name: &str, expected: Uuid, found: Uuid) -> Result<()> {
    if found != expected {
        return Err(IntentError::version_mismatch(
            name,
            format!("run {expected}"),
            format!("run {found}"),
        ));
    }
    Ok(())
}

/// Directory-backed store of model versions.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Create a store rooted at `root`. The directory is created on first save.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist the vocabulary and label set of a version under a new run id.
    ///
    /// Returns the run id a later [`save_model`](Self::save_model) must use.
    /// Fails with a configuration error if the version already holds a model.
    pub fn save_vocabulary(
        &self,
        version: &str,
        normalizer: &NormalizerConfig,
        vocabulary: &Vocabulary,
        labels: &LabelSet,
    ) -> Result<Uuid> {
        let dir = self.writable_version_dir(version)?;
        let run_id = Uuid::new_v4();
        write_vocabulary(&dir, version, run_id, normalizer, vocabulary, labels)?;
        Ok(run_id)
    }

    /// Persist the trained model of a version.
    ///
    /// The vocabulary and label set on disk must have been written by the
    /// same run.
    pub fn save_model(&self, version: &str, run_id: Uuid, model: &SoftmaxRegression) -> Result<()> {
        let dir = self.unsealed_version_dir(version)?;
        let vocabulary: ArtifactFile<IgnoredAny> = read_artifact(&dir, VOCABULARY_FILE, version)?;
        check_run(VOCABULARY_FILE, run_id, vocabulary.run_id)?;
        let labels: ArtifactFile<IgnoredAny> = read_artifact(&dir, LABELS_FILE, version)?;
        check_run(LABELS_FILE, run_id, labels.run_id)?;

        write_atomic(
            &dir.join(MODEL_FILE),
            &ArtifactFile {
                version: version.to_string(),
                run_id,
                created_at: Utc::now(),
                content: ModelFile {
                    classifier: model.name().to_string(),
                    model,
                },
            },
        )?;
        log::info!("saved model for version {version} (run {run_id})");
        Ok(())
    }

    /// Persist all artifacts of a bundle under its version and run id.
    pub fn save(&self, artifacts: &ModelArtifacts) -> Result<()> {
        check_dimensions(&artifacts.vocabulary, &artifacts.labels, &artifacts.model)?;
        let dir = self.writable_version_dir(&artifacts.version)?;
        write_vocabulary(
            &dir,
            &artifacts.version,
            artifacts.run_id,
            &artifacts.normalizer,
            &artifacts.vocabulary,
            &artifacts.labels,
        )?;
        self.save_model(&artifacts.version, artifacts.run_id, &artifacts.model)
    }

    /// Load and cross-check the three artifacts of a version.
    pub fn load(&self, version: &str) -> Result<ModelArtifacts> {
        let dir = self.version_dir(version)?;
        if !dir.is_dir() {
            return Err(IntentError::not_found(format!(
                "model version '{version}' under {}",
                self.root.display()
            )));
        }

        let vocabulary: ArtifactFile<VocabularyFile<NormalizerConfig, Vocabulary>> =
            read_artifact(&dir, VOCABULARY_FILE, version)?;
        let labels: ArtifactFile<LabelSet> = read_artifact(&dir, LABELS_FILE, version)?;
        let model: ArtifactFile<ModelFile<SoftmaxRegression>> =
            read_artifact(&dir, MODEL_FILE, version)?;

        check_run(VOCABULARY_FILE, model.run_id, vocabulary.run_id)?;
        check_run(LABELS_FILE, model.run_id, labels.run_id)?;

        if model.content.classifier != SoftmaxRegression::NAME {
            return Err(IntentError::model(format!(
                "unsupported classifier '{}' in {MODEL_FILE}",
                model.content.classifier
            )));
        }

        let vocabulary = vocabulary.content;
        vocabulary.normalizer.validate()?;
        check_dimensions(&vocabulary.tokens, &labels.content, &model.content.model)?;

        log::info!(
            "loaded model version {version} ({} tokens, {} labels)",
            vocabulary.tokens.len(),
            labels.content.len()
        );

        Ok(ModelArtifacts {
            version: version.to_string(),
            run_id: model.run_id,
            created_at: model.created_at,
            normalizer: vocabulary.normalizer,
            vocabulary: vocabulary.tokens,
            labels: labels.content,
            model: model.content.model,
        })
    }

    /// Stored versions in ascending order.
    pub fn versions(&self) -> Result<Vec<String>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let mut versions = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.is_dir() {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    versions.push(name.to_string());
                }
            }
        }

        versions.sort();
        Ok(versions)
    }

    fn version_dir(&self, version: &str) -> Result<PathBuf> {
        validate_version(version)?;
        Ok(self.root.join(version))
    }

    /// Directory of a version that does not hold a model yet.
    fn unsealed_version_dir(&self, version: &str) -> Result<PathBuf> {
        let dir = self.version_dir(version)?;
        if dir.join(MODEL_FILE).exists() {
            return Err(IntentError::configuration(format!(
                "model version '{version}' already holds a trained model; choose a new version"
            )));
        }
        Ok(dir)
    }

    fn writable_version_dir(&self, version: &str) -> Result<PathBuf> {
        let dir = self.unsealed_version_dir(version)?;
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

fn write_vocabulary(
    dir: &Path,
    version: &str,
    run_id: Uuid,
    normalizer: &NormalizerConfig,
    vocabulary: &Vocabulary,
    labels: &LabelSet,
) -> Result<()> {
    let created_at = Utc::now();
    write_atomic(
        &dir.join(VOCABULARY_FILE),
        &ArtifactFile {
            version: version.to_string(),
            run_id,
            created_at,
            content: VocabularyFile {
                normalizer,
                tokens: vocabulary,
            },
        },
    )?;
    write_atomic(
        &dir.join(LABELS_FILE),
        &ArtifactFile {
            version: version.to_string(),
            run_id,
            created_at,
            content: labels,
        },
    )?;
    log::info!(
        "saved vocabulary ({} tokens) and labels ({}) for version {version} (run {run_id})",
        vocabulary.len(),
        labels.len()
    );
    Ok(())
}

/// Version names become directory names, so they are restricted to a safe alphabet.
fn validate_version(version: &str) -> Result<()> {
    let valid = !version.is_empty()
        && !version.starts_with('.')
        && version
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if !valid {
        return Err(IntentError::configuration(format!(
            "invalid model version '{version}': use letters, digits, '-', '_' or '.'"
        )));
    }
    Ok(())
}

fn write_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_vec_pretty(value)?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| IntentError::invalid_argument(format!("{}", path.display())))?;
    let temp_path = path.with_file_name(format!(".{file_name}.{}.tmp", Uuid::new_v4()));

    fs::write(&temp_path, json)?;
    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(e.into());
    }
    log::debug!("wrote {}", path.display());
    Ok(())
}

fn read_artifact<T: DeserializeOwned>(
    dir: &Path,
    name: &str,
    version: &str,
) -> Result<ArtifactFile<T>> {
    let path = dir.join(name);
    if !path.is_file() {
        return Err(IntentError::not_found(format!(
            "{name} for model version '{version}'"
        )));
    }
    let content = fs::read(&path)?;
    let artifact: ArtifactFile<T> = serde_json::from_slice(&content)?;
    if artifact.version != version {
        return Err(IntentError::version_mismatch(name, version, artifact.version));
    }
    Ok(artifact)
}
