//! Command implementations for the medintent CLI.

use std::path::Path;
use std::time::Instant;

use crate::artifacts::ArtifactStore;
use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::EngineConfig;
use crate::corpus::Corpus;
use crate::decoder::IdentifiedIntents;
use crate::error::{IntentError, Result};
use crate::normalizer::TextNormalizer;
use crate::pipeline::Pipeline;
use crate::responder::Responder;
use crate::symptoms::{ConfidentSymptoms, LexiconExtractor, SymptomExtractor};
use crate::training::train;
use crate::vocabulary::VocabularyBuilder;

/// Execute a CLI command.
pub fn execute_command(args: MedintentArgs) -> Result<()> {
    match &args.command {
        Command::BuildVocab(build_args) => build_vocab(build_args, &args),
        Command::Train(train_args) => train_model(train_args, &args),
        Command::Classify(classify_args) => classify(classify_args, &args),
        Command::Inspect(inspect_args) => inspect(inspect_args, &args),
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_path(path),
        None => Ok(EngineConfig::default()),
    }
}

/// Build and save the vocabulary and label set.
fn build_vocab(args: &BuildVocabArgs, cli_args: &MedintentArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let corpus = Corpus::from_path(&args.corpus)?;
    let normalizer = TextNormalizer::new(&config.normalizer)?;
    let store = ArtifactStore::new(&args.store);

    let build = VocabularyBuilder::new(&normalizer).build_and_persist(
        &corpus,
        &store,
        &args.model_version,
    )?;

    output_result(
        "Vocabulary built successfully",
        &VocabularyResult {
            version: args.model_version.clone(),
            vocabulary_size: build.vocabulary.len(),
            labels: build.labels.as_slice().to_vec(),
            examples: build.examples.len(),
            warnings: build.warnings,
        },
        cli_args,
    )
}

/// Train a model and save all artifacts.
fn train_model(args: &TrainArgs, cli_args: &MedintentArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        config.split.seed = seed;
        config.fit.seed = seed;
    }
    if let Some(epochs) = args.epochs {
        config.fit.epochs = epochs;
    }

    let version = args
        .model_version
        .clone()
        .unwrap_or_else(|| chrono::Utc::now().format("%Y%m%dT%H%M%SZ").to_string());

    let corpus = Corpus::from_path(&args.corpus)?;
    let store = ArtifactStore::new(&args.store);

    let start = Instant::now();
    let run = train(&corpus, &config, &version)?;
    run.save(&store)?;
    let duration_ms = start.elapsed().as_millis() as u64;

    output_result(
        &format!("Model {version} trained and saved"),
        &TrainResult {
            report: run.report,
            warnings: run.warnings,
            duration_ms,
        },
        cli_args,
    )
}

/// Resolve the requested version, falling back to the latest stored one.
fn resolve_version(store: &ArtifactStore, requested: Option<&str>) -> Result<String> {
    if let Some(version) = requested {
        return Ok(version.to_string());
    }
    store.versions()?.pop().ok_or_else(|| {
        IntentError::not_found(format!("no model versions in {}", store.root().display()))
    })
}

/// Classify utterances with a saved model.
///
/// The normalizer always comes from the stored version; only the decoder
/// settings of `--config` apply.
fn classify(args: &ClassifyArgs, cli_args: &MedintentArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(threshold) = args.threshold {
        config.decoder.threshold = threshold;
    }

    let store = ArtifactStore::new(&args.store);
    let version = resolve_version(&store, args.model_version.as_deref())?;
    let artifacts = store.load(&version)?;
    let pipeline = Pipeline::from_artifacts(artifacts, config.decoder.clone())?;

    let responder = match &args.corpus {
        Some(path) => Some(Responder::from_corpus(&Corpus::from_path(path)?)),
        None => None,
    };
    let symptoms = match &args.symptoms {
        Some(path) => Some(ConfidentSymptoms::new(LexiconExtractor::from_path(path)?)),
        None => None,
    };

    let mut results = Vec::with_capacity(args.texts.len());
    for text in &args.texts {
        let intents = pipeline.classify_scored(text)?;
        let reply = responder
            .as_ref()
            .map(|responder| responder.respond(text, &IdentifiedIntents::from(intents.clone())));
        let spans = match &symptoms {
            Some(extractor) => Some(extractor.extract(text)?),
            None => None,
        };
        results.push(Classification {
            text: text.clone(),
            intents,
            reply,
            symptoms: spans,
        });
    }

    output_result(
        "",
        &ClassifyResults {
            version,
            threshold: config.decoder.threshold,
            results,
        },
        cli_args,
    )
}

/// Show stored versions, or one version's summary.
fn inspect(args: &InspectArgs, cli_args: &MedintentArgs) -> Result<()> {
    let store = ArtifactStore::new(&args.store);

    match &args.model_version {
        Some(version) => {
            let artifacts = store.load(version)?;
            output_result("", &artifacts.summary(), cli_args)
        }
        None => output_result(
            "",
            &VersionList {
                store: args.store.display().to_string(),
                versions: store.versions()?,
            },
            cli_args,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    const CORPUS: &str = r#"{
        "intents": [
            {"tag": "book_appointment",
             "patterns": ["I want to book an appointment", "schedule an appointment",
                          "appointment with a doctor", "can I see a doctor"],
             "responses": ["When would you like to come in?"]},
            {"tag": "symptom_fever",
             "patterns": ["I have a fever", "fever and chills", "high fever", "my fever is back"],
             "responses": ["How high is your temperature?"]}
        ]
    }"#;

    fn run(args: &[&str]) -> Result<()> {
        let args = MedintentArgs::try_parse_from(args)
            .map_err(|e| IntentError::invalid_argument(e.to_string()))?;
        execute_command(args)
    }

    #[test]
    fn test_train_classify_inspect() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = dir.path().join("intents.json");
        std::fs::write(&corpus, CORPUS).unwrap();
        let store = dir.path().join("models");
        let corpus = corpus.to_str().unwrap();
        let store = store.to_str().unwrap();

        run(&["medintent", "-q", "train", corpus, "-s", store, "--model-version", "v1"]).unwrap();
        assert_eq!(
            ArtifactStore::new(store).versions().unwrap(),
            vec!["v1".to_string()]
        );

        let lexicon = dir.path().join("symptoms.json");
        std::fs::write(&lexicon, r#"{"fever": 0.95, "chills": 0.5}"#).unwrap();
        run(&[
            "medintent", "-q", "-f", "json", "classify", "-s", store, "--corpus", corpus,
            "--symptoms", lexicon.to_str().unwrap(), "I have a fever",
        ])
        .unwrap();

        // The trained version cannot be rebuilt in place.
        assert!(matches!(
            run(&["medintent", "-q", "build-vocab", corpus, "-s", store, "--model-version", "v1"]),
            Err(IntentError::Configuration(_))
        ));
        run(&["medintent", "-q", "inspect", "-s", store, "--model-version", "v1"]).unwrap();
        run(&["medintent", "-q", "inspect", "-s", store]).unwrap();
    }

    #[test]
    fn test_build_vocab() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = dir.path().join("intents.json");
        std::fs::write(&corpus, CORPUS).unwrap();
        let store = dir.path().join("models");

        run(&[
            "medintent",
            "-q",
            "build-vocab",
            corpus.to_str().unwrap(),
            "-s",
            store.to_str().unwrap(),
            "--model-version",
            "v1",
        ])
        .unwrap();

        // Only the vocabulary and labels exist, so loading the version fails.
        assert!(matches!(
            ArtifactStore::new(&store).load("v1"),
            Err(IntentError::NotFound(_))
        ));
    }

    #[test]
    fn test_classify_without_models() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().to_str().unwrap();
        assert!(matches!(
            run(&["medintent", "-q", "classify", "-s", store, "hello"]),
            Err(IntentError::NotFound(_))
        ));
    }
}
