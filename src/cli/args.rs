//! Command line argument parsing for the medintent CLI using clap.

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// medintent - intent classification for medical chat front-ends
#[derive(Parser, Debug, Clone)]
#[command(name = "medintent")]
#[command(about = "Train and run an intent classifier for patient utterances")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct MedintentArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl MedintentArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Build and save the vocabulary and label set of a corpus
    #[command(name = "build-vocab")]
    BuildVocab(BuildVocabArgs),

    /// Train a model on a corpus and save all artifacts
    Train(TrainArgs),

    /// Classify utterances with a saved model
    Classify(ClassifyArgs),

    /// Show stored versions or the summary of one version
    Inspect(InspectArgs),
}

/// Arguments for building a vocabulary
#[derive(Parser, Debug, Clone)]
pub struct BuildVocabArgs {
    /// Corpus file (JSON)
    #[arg(value_name = "CORPUS_FILE")]
    pub corpus: PathBuf,

    /// Artifact store directory
    #[arg(short, long, value_name = "STORE_DIR", env = "MEDINTENT_STORE")]
    pub store: PathBuf,

    /// Model version to write
    #[arg(long = "model-version", value_name = "VERSION")]
    pub model_version: String,

    /// Engine configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,
}

/// Arguments for training
#[derive(Parser, Debug, Clone)]
pub struct TrainArgs {
    /// Corpus file (JSON)
    #[arg(value_name = "CORPUS_FILE")]
    pub corpus: PathBuf,

    /// Artifact store directory
    #[arg(short, long, value_name = "STORE_DIR", env = "MEDINTENT_STORE")]
    pub store: PathBuf,

    /// Model version to write (default: current UTC timestamp)
    #[arg(long = "model-version", value_name = "VERSION")]
    pub model_version: Option<String>,

    /// Engine configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Seed for both the split and batch shuffling (overrides the config)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Maximum number of epochs (overrides the config)
    #[arg(long)]
    pub epochs: Option<usize>,
}

/// Arguments for classifying utterances
#[derive(Parser, Debug, Clone)]
pub struct ClassifyArgs {
    /// Utterances to classify
    #[arg(value_name = "TEXT", required = true)]
    pub texts: Vec<String>,

    /// Artifact store directory
    #[arg(short, long, value_name = "STORE_DIR", env = "MEDINTENT_STORE")]
    pub store: PathBuf,

    /// Model version to load (default: latest)
    #[arg(long = "model-version", value_name = "VERSION")]
    pub model_version: Option<String>,

    /// Engine configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Confidence threshold (overrides the config)
    #[arg(short, long)]
    pub threshold: Option<f32>,

    /// Corpus file whose responses are attached to each result
    #[arg(long, value_name = "CORPUS_FILE")]
    pub corpus: Option<PathBuf>,

    /// Symptom lexicon (JSON list of terms, or terms mapped to scores)
    #[arg(long, value_name = "LEXICON_FILE")]
    pub symptoms: Option<PathBuf>,
}

/// Arguments for inspecting the store
#[derive(Parser, Debug, Clone)]
pub struct InspectArgs {
    /// Artifact store directory
    #[arg(short, long, value_name = "STORE_DIR", env = "MEDINTENT_STORE")]
    pub store: PathBuf,

    /// Model version to summarize (default: list versions)
    #[arg(long = "model-version", value_name = "VERSION")]
    pub model_version: Option<String>,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
