//! Output formatting for CLI commands.

use serde::Serialize;

use crate::artifacts::ArtifactSummary;
use crate::cli::args::{MedintentArgs, OutputFormat};
use crate::decoder::ScoredIntent;
use crate::error::Result;
use crate::responder::Reply;
use crate::symptoms::SymptomSpan;
use crate::training::TrainingReport;
use crate::vocabulary::BuildWarning;

/// Result structure for a vocabulary build.
#[derive(Debug, Serialize)]
pub struct VocabularyResult {
    pub version: String,
    pub vocabulary_size: usize,
    pub labels: Vec<String>,
    pub examples: usize,
    pub warnings: Vec<BuildWarning>,
}

/// Result structure for a training run.
#[derive(Debug, Serialize)]
pub struct TrainResult {
    pub report: TrainingReport,
    pub warnings: Vec<BuildWarning>,
    pub duration_ms: u64,
}

/// Classification of one utterance.
#[derive(Debug, Serialize)]
pub struct Classification {
    pub text: String,
    pub intents: Vec<ScoredIntent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<Reply>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symptoms: Option<Vec<SymptomSpan>>,
}

/// Result structure for classification.
#[derive(Debug, Serialize)]
pub struct ClassifyResults {
    pub version: String,
    pub threshold: f32,
    pub results: Vec<Classification>,
}

/// Result structure for `inspect` without a version.
#[derive(Debug, Serialize)]
pub struct VersionList {
    pub store: String,
    pub versions: Vec<String>,
}

/// Anything the CLI prints.
pub trait Render: Serialize {
    /// Print in human-readable form.
    fn render_human(&self, args: &MedintentArgs);
}

/// Output a result in the requested format.
pub fn output_result<T: Render>(message: &str, result: &T, args: &MedintentArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            if args.verbosity() > 0 && !message.is_empty() {
                println!("{message}");
                println!();
            }
            result.render_human(args);
            Ok(())
        }
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &MedintentArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}

fn print_warnings(warnings: &[BuildWarning]) {
    if warnings.is_empty() {
        return;
    }
    println!();
    println!("Warnings:");
    for warning in warnings {
        println!("  - {warning}");
    }
}

impl Render for VocabularyResult {
    fn render_human(&self, _args: &MedintentArgs) {
        println!("Version: {}", self.version);
        println!("Vocabulary size: {}", self.vocabulary_size);
        println!("Examples: {}", self.examples);
        println!("Labels ({}): {}", self.labels.len(), self.labels.join(", "));
        print_warnings(&self.warnings);
    }
}

impl Render for TrainResult {
    fn render_human(&self, _args: &MedintentArgs) {
        let report = &self.report;
        println!("Training Report:");
        println!("════════════════");
        println!("Version: {}", report.version);
        println!("Vocabulary size: {}", report.vocabulary_size);
        println!("Labels: {}", report.num_labels);
        println!(
            "Rows: {} train / {} validation",
            report.train_rows, report.validation_rows
        );
        println!("Train accuracy: {:.1}%", report.train_accuracy * 100.0);
        println!(
            "Validation accuracy: {:.1}%",
            report.validation_accuracy * 100.0
        );
        let stopped = if report.early_stopped {
            " (stopped early)"
        } else {
            ""
        };
        println!("Epochs: {}{stopped}", report.epochs_run);
        println!("Training time: {}ms", self.duration_ms);
        print_warnings(&self.warnings);
    }
}

impl Render for ClassifyResults {
    fn render_human(&self, args: &MedintentArgs) {
        if args.verbosity() > 1 {
            println!("Model version: {} (threshold {})", self.version, self.threshold);
            println!();
        }

        for classification in &self.results {
            println!("{}", classification.text);
            if classification.intents.is_empty() {
                println!("  (no intent above threshold)");
            }
            for intent in &classification.intents {
                println!("  {:<30} {:.3}", intent.tag, intent.probability);
            }
            match &classification.reply {
                Some(Reply::Matched { intents }) => {
                    for intent in intents {
                        for response in &intent.responses {
                            println!("  > {response}");
                        }
                    }
                }
                Some(Reply::Fallback { text }) => println!("  > {text}"),
                None => {}
            }
            for span in classification.symptoms.iter().flatten() {
                println!("  symptom: {} ({:.2})", span.text, span.score);
            }
        }
    }
}

impl Render for ArtifactSummary {
    fn render_human(&self, args: &MedintentArgs) {
        println!("Model Version: {}", self.version);
        println!("═══════════════");
        println!("Run: {}", self.run_id);
        println!("Created: {}", self.created_at.to_rfc3339());
        println!("Classifier: {}", self.classifier);
        println!("Vocabulary size: {}", self.vocabulary_size);
        println!("Labels ({}):", self.labels.len());
        for label in &self.labels {
            println!("  {label}");
        }

        if let Some(stats) = &self.training_stats {
            println!();
            println!("Training:");
            println!("  Epochs run: {}", stats.epochs_run);
            println!("  Best epoch: {}", stats.best_epoch);
            println!("  Best validation loss: {:.4}", stats.best_validation_loss);
            println!("  Early stopped: {}", stats.early_stopped);
            if args.verbosity() > 1 {
                println!("  Training time: {}ms", stats.training_time_ms);
            }
        }
    }
}

impl Render for VersionList {
    fn render_human(&self, _args: &MedintentArgs) {
        if self.versions.is_empty() {
            println!("No model versions in {}", self.store);
            return;
        }
        println!("Model versions in {}:", self.store);
        for version in &self.versions {
            println!("  {version}");
        }
    }
}
