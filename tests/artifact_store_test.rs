use std::fs;

use medintent::artifacts::{ArtifactStore, LABELS_FILE, MODEL_FILE, VOCABULARY_FILE};
use medintent::config::EngineConfig;
use medintent::corpus::{Corpus, IntentRecord};
use medintent::error::{IntentError, Result};
use medintent::normalizer::{NormalizerConfig, TextNormalizer};
use medintent::training::train;
use medintent::vocabulary::VocabularyBuilder;

fn corpus(extra: &str) -> Result<Corpus> {
    Corpus::new(vec![
        IntentRecord::new(
            "book_appointment",
            ["book an appointment", "schedule a visit", "see the doctor"],
        ),
        IntentRecord::new("symptom_fever", ["I have a fever", "high temperature", extra]),
    ])
}

#[test]
fn models_from_different_versions_are_not_mixed() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let store = ArtifactStore::new(dir.path());
    let config = EngineConfig::default();

    train(&corpus("fever and chills")?, &config, "v1")?.save(&store)?;
    train(&corpus("burning forehead and sweating")?, &config, "v2")?.save(&store)?;
    assert_eq!(store.versions()?, vec!["v1", "v2"]);

    fs::copy(
        dir.path().join("v1").join(MODEL_FILE),
        dir.path().join("v2").join(MODEL_FILE),
    )?;

    let error = store.load("v2").unwrap_err();
    assert!(error.is_contract_violation());
    assert!(matches!(
        error,
        IntentError::VersionMismatch { ref artifact, .. } if artifact == MODEL_FILE
    ));

    // v1 is untouched and still loads.
    assert_eq!(store.load("v1")?.version, "v1");
    Ok(())
}

#[test]
fn relabeled_files_from_another_version_are_rejected() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let store = ArtifactStore::new(dir.path());
    let config = EngineConfig::default();

    train(&corpus("fever and chills")?, &config, "v1")?.save(&store)?;
    train(&corpus("burning forehead and sweating")?, &config, "v2")?.save(&store)?;

    // Rewrite v1's vocabulary file so it claims to belong to v2.
    let v1_vocabulary = fs::read_to_string(dir.path().join("v1").join(VOCABULARY_FILE))?;
    fs::write(
        dir.path().join("v2").join(VOCABULARY_FILE),
        v1_vocabulary.replace("\"v1\"", "\"v2\""),
    )?;

    assert!(matches!(
        store.load("v2"),
        Err(IntentError::VersionMismatch { ref artifact, .. }) if artifact == VOCABULARY_FILE
    ));
    Ok(())
}

#[test]
fn trained_version_cannot_be_rebuilt_in_place() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let store = ArtifactStore::new(dir.path());
    let config = EngineConfig::default();
    let run = train(&corpus("fever and chills")?, &config, "v1")?;
    run.save(&store)?;

    let other = Corpus::new(vec![
        IntentRecord::new("a", ["rash"]),
        IntentRecord::new("b", ["zzz"]),
    ])?;
    let normalizer = TextNormalizer::new(&NormalizerConfig::default())?;
    assert!(matches!(
        VocabularyBuilder::new(&normalizer).build_and_persist(&other, &store, "v1"),
        Err(IntentError::Configuration(_))
    ));
    assert!(matches!(
        train(&corpus("burning forehead")?, &config, "v1")?.save(&store),
        Err(IntentError::Configuration(_))
    ));

    let loaded = store.load("v1")?;
    assert_eq!(loaded.vocabulary, run.artifacts.vocabulary);
    assert_eq!(loaded.run_id, run.artifacts.run_id);
    Ok(())
}

#[test]
fn interrupted_save_can_be_completed() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let store = ArtifactStore::new(dir.path());
    let config = EngineConfig::default();
    let normalizer = TextNormalizer::new(&config.normalizer)?;

    // A save that stopped after the vocabulary and labels were written.
    VocabularyBuilder::new(&normalizer).build_and_persist(
        &corpus("fever and chills")?,
        &store,
        "v1",
    )?;
    let stale_labels = fs::read(dir.path().join("v1").join(LABELS_FILE))?;
    assert!(matches!(store.load("v1"), Err(IntentError::NotFound(_))));

    let run = train(&corpus("burning forehead and sweating")?, &config, "v1")?;
    run.save(&store)?;
    let loaded = store.load("v1")?;
    assert_eq!(loaded.vocabulary, run.artifacts.vocabulary);
    assert_eq!(loaded.labels, run.artifacts.labels);

    // Labels left over from the earlier run never pair with the new model,
    // even though their dimensions match.
    fs::write(dir.path().join("v1").join(LABELS_FILE), stale_labels)?;
    assert!(matches!(
        store.load("v1"),
        Err(IntentError::VersionMismatch { ref artifact, .. }) if artifact == LABELS_FILE
    ));
    Ok(())
}

#[test]
fn corrupt_artifacts_are_reported() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let store = ArtifactStore::new(dir.path());
    train(&corpus("fever and chills")?, &EngineConfig::default(), "v1")?.save(&store)?;

    fs::write(dir.path().join("v1").join(LABELS_FILE), "{\"version\": \"v1\"")?;
    assert!(matches!(store.load("v1"), Err(IntentError::Json(_))));

    fs::remove_file(dir.path().join("v1").join(LABELS_FILE))?;
    assert!(matches!(store.load("v1"), Err(IntentError::NotFound(_))));
    Ok(())
}
