//! # medintent
//!
//! Intent classification for medical chat front-ends.
//!
//! Raw patient utterances are normalized into tokens, encoded as
//! bag-of-words vectors over a fixed vocabulary and scored by a trained
//! classifier. The decoder keeps every intent above a confidence threshold,
//! most likely first.
//!
//! ## Features
//!
//! - Deterministic text normalization (Unicode word splitting, lowercasing,
//!   stop words, lemmatization)
//! - Sorted vocabulary and label set shared by training and inference
//! - Seeded train/validation split and softmax regression with early stopping
//! - Versioned artifact store that refuses mismatched artifacts
//! - Immutable, thread-safe classification pipeline with batch support
//!
//! ## Example
//!
//! ```
//! use medintent::config::EngineConfig;
//! use medintent::corpus::{Corpus, IntentRecord};
//! use medintent::training::train;
//!
//! let corpus = Corpus::new(vec![
//!     IntentRecord::new(
//!         "book_appointment",
//!         ["I want to book an appointment", "schedule an appointment", "appointment please"],
//!     ),
//!     IntentRecord::new("symptom_fever", ["I have a fever", "high fever", "fever and chills"]),
//! ]).unwrap();
//!
//! let config = EngineConfig::default();
//! let run = train(&corpus, &config, "v1").unwrap();
//! let pipeline = run.pipeline(&config).unwrap();
//!
//! let intents = pipeline.classify("I think I have a fever").unwrap();
//! println!("{:?}", intents.tags());
//! ```

pub mod analysis;
pub mod artifacts;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod corpus;
pub mod dataset;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod normalizer;
pub mod pipeline;
pub mod responder;
pub mod symptoms;
pub mod training;
pub mod vocabulary;

pub mod prelude {
    pub use crate::classifier::{Classifier, FitConfig, Prediction, SoftmaxRegression};
    pub use crate::config::EngineConfig;
    pub use crate::corpus::{Corpus, IntentRecord};
    pub use crate::decoder::{IdentifiedIntents, IntentDecoder};
    pub use crate::error::{IntentError, Result};
    pub use crate::normalizer::TextNormalizer;
    pub use crate::pipeline::Pipeline;
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
