//! Error types for the medintent library.
//!
//! All fallible operations return [`Result`], whose error side is the
//! [`IntentError`] enum. Build-time problems (empty corpus, infeasible split,
//! malformed configuration) surface as [`IntentError::Configuration`], while a
//! vector of the wrong length reaching the encoder, classifier or decoder is
//! an [`IntentError::ShapeMismatch`].
//!
//! # Examples
//!
//! ```
//! use medintent::error::{IntentError, Result};
//!
//! fn split_rows(rows: usize) -> Result<usize> {
//!     if rows == 0 {
//!         return Err(IntentError::configuration("corpus yielded no examples"));
//!     }
//!     Ok(rows)
//! }
//!
//! assert!(split_rows(0).is_err());
//! ```

use std::io;

use thiserror::Error;

/// The main error type for medintent operations.
#[derive(Error, Debug)]
pub enum IntentError {
    /// I/O errors (artifact files, corpus files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Corpus or configuration cannot produce a usable run
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A feature vector or prediction has an unexpected length
    #[error("Shape mismatch in {context}: expected length {expected}, got {actual}")]
    ShapeMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    /// Text analysis errors (tokenization, filtering)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Classifier fitting or prediction errors
    #[error("Model error: {0}")]
    Model(String),

    /// Persisted artifacts disagree about which model version they belong to
    #[error("Version mismatch in {artifact}: expected {expected}, found {found}")]
    VersionMismatch {
        artifact: String,
        expected: String,
        found: String,
    },

    /// Requested artifact or version does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with IntentError.
pub type Result<T> = std::result::Result<T, IntentError>;

impl IntentError {
    /// Create a new configuration error.
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        IntentError::Configuration(msg.into())
    }

    /// Create a new shape mismatch error.
    pub fn shape_mismatch<S: Into<String>>(context: S, expected: usize, actual: usize) -> Self {
        IntentError::ShapeMismatch {
            context: context.into(),
            expected,
            actual,
        }
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        IntentError::Analysis(msg.into())
    }

    /// Create a new model error.
    pub fn model<S: Into<String>>(msg: S) -> Self {
        IntentError::Model(msg.into())
    }

    /// Create a new version mismatch error.
    pub fn version_mismatch<A, E, F>(artifact: A, expected: E, found: F) -> Self
    where
        A: Into<String>,
        E: Into<String>,
        F: Into<String>,
    {
        IntentError::VersionMismatch {
            artifact: artifact.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create a new not found error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        IntentError::NotFound(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        IntentError::Other(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        IntentError::Other(format!("Invalid argument: {}", msg.into()))
    }

    /// Whether this error signals a vocabulary/label set version mismatch.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            IntentError::ShapeMismatch { .. } | IntentError::VersionMismatch { .. }
        )
    }
}
