use std::sync::Arc;
use std::thread;

use medintent::artifacts::ArtifactStore;
use medintent::config::EngineConfig;
use medintent::corpus::Corpus;
use medintent::error::Result;
use medintent::pipeline::Pipeline;
use medintent::responder::{Reply, Responder};
use medintent::training::train;

const CORPUS: &str = r#"{
    "intents": [
        {
            "tag": "book_appointment",
            "patterns": [
                "I want to book an appointment",
                "Can I schedule an appointment for tomorrow",
                "I need an appointment with the doctor",
                "book me an appointment please",
                "appointment for next week"
            ],
            "responses": ["Sure, which day suits you?"]
        },
        {
            "tag": "symptom_fever",
            "patterns": [
                "I have a fever",
                "my fever will not go down",
                "fever and chills since yesterday",
                "high fever at night",
                "burning up with fever"
            ],
            "responses": ["Please measure your temperature."]
        },
        {
            "tag": "symptom_cough",
            "patterns": [
                "I keep coughing",
                "dry cough for a week",
                "my cough is getting worse",
                "coughing all night",
                "bad cough"
            ],
            "responses": ["Is the cough dry or productive?"]
        }
    ]
}"#;

fn config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.fit.early_stop_patience = 0;
    config
}

#[test]
fn trained_pipeline_classifies_known_phrasings() -> Result<()> {
    let corpus = Corpus::from_json_str(CORPUS)?;
    let config = config();
    let run = train(&corpus, &config, "v1")?;
    let pipeline = run.pipeline(&config)?;

    assert_eq!(
        run.artifacts.labels.as_slice(),
        ["book_appointment", "symptom_cough", "symptom_fever"]
    );
    assert_eq!(run.report.train_accuracy, 1.0);

    assert_eq!(pipeline.classify("I have a fever")?.top(), Some("symptom_fever"));
    assert_eq!(
        pipeline.classify("I want to book an appointment")?.top(),
        Some("book_appointment")
    );
    assert_eq!(pipeline.classify("bad cough")?.top(), Some("symptom_cough"));

    let scored = pipeline.classify_scored("fever")?;
    assert!(scored.windows(2).all(|pair| pair[0].probability >= pair[1].probability));
    assert!(scored.iter().all(|intent| intent.probability > 0.25));
    Ok(())
}

#[test]
fn saved_model_serves_the_same_predictions() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let store = ArtifactStore::new(dir.path());
    let corpus = Corpus::from_json_str(CORPUS)?;
    let config = config();

    let run = train(&corpus, &config, "2024-06-01")?;
    run.save(&store)?;
    let in_memory = run.pipeline(&config)?;

    let loaded = Pipeline::from_artifacts(store.load("2024-06-01")?, config.decoder.clone())?;

    for text in ["I have a fever", "dry cough", "appointment tomorrow", "hello"] {
        let expected = in_memory.predict(text)?;
        let actual = loaded.predict(text)?;
        for (a, b) in expected.as_slice().iter().zip(actual.as_slice()) {
            assert!((a - b).abs() < 1e-6, "{text}: {a} vs {b}");
        }
    }
    Ok(())
}

#[test]
fn saved_model_keeps_its_normalizer() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let store = ArtifactStore::new(dir.path());
    let corpus = Corpus::from_json_str(CORPUS)?;
    let mut config = config();
    config.normalizer.stop_words = ["fever".to_string()].into_iter().collect();

    let run = train(&corpus, &config, "custom")?;
    run.save(&store)?;
    assert!(!run.artifacts.vocabulary.contains("fever"));
    assert!(run.artifacts.vocabulary.contains("have"));
    let in_memory = run.pipeline(&config)?;

    // Serving with a default engine config still tokenizes like training did.
    let loaded = store.load("custom")?;
    assert_eq!(loaded.normalizer, config.normalizer);
    let served = Pipeline::from_artifacts(loaded, EngineConfig::default().decoder)?;

    for text in ["i have", "fever", "I have a fever", "dry cough"] {
        let expected = in_memory.predict(text)?;
        let actual = served.predict(text)?;
        for (a, b) in expected.as_slice().iter().zip(actual.as_slice()) {
            assert!((a - b).abs() < 1e-6, "{text}: {a} vs {b}");
        }
    }
    Ok(())
}

#[test]
fn training_is_reproducible_for_a_fixed_seed() -> Result<()> {
    let corpus = Corpus::from_json_str(CORPUS)?;
    let config = config();

    let first = train(&corpus, &config, "a")?.pipeline(&config)?;
    let second = train(&corpus, &config, "b")?.pipeline(&config)?;

    for text in ["fever and cough", "I need to see the doctor", ""] {
        assert_eq!(first.predict(text)?, second.predict(text)?);
    }
    Ok(())
}

#[test]
fn concurrent_classification_matches_sequential() -> Result<()> {
    let corpus = Corpus::from_json_str(CORPUS)?;
    let config = config();
    let pipeline = Arc::new(train(&corpus, &config, "v1")?.pipeline(&config)?);

    let texts = vec![
        "I have a fever",
        "bad cough",
        "book an appointment",
        "nothing relevant here",
        "fever and chills",
        "coughing all night",
    ];
    let sequential = texts
        .iter()
        .map(|text| pipeline.classify(text))
        .collect::<Result<Vec<_>>>()?;

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let pipeline = Arc::clone(&pipeline);
            let texts = texts.clone();
            thread::spawn(move || {
                texts
                    .iter()
                    .map(|text| pipeline.classify(text))
                    .collect::<Result<Vec<_>>>()
            })
        })
        .collect();

    for handle in handles {
        let results = handle.join().expect("classification thread panicked")?;
        assert_eq!(results, sequential);
    }

    assert_eq!(pipeline.classify_batch(&texts)?, sequential);
    Ok(())
}

#[test]
fn responder_falls_back_to_the_utterance() -> Result<()> {
    let corpus = Corpus::from_json_str(CORPUS)?;
    let config = config();
    let pipeline = train(&corpus, &config, "v1")?.pipeline(&config)?;
    let responder = Responder::from_corpus(&corpus);

    let reply = responder.respond("I have a fever", &pipeline.classify("I have a fever")?);
    match reply {
        Reply::Matched { intents } => {
            assert_eq!(intents[0].tag, "symptom_fever");
            assert_eq!(intents[0].responses, vec!["Please measure your temperature."]);
        }
        Reply::Fallback { .. } => panic!("expected a match"),
    }

    // An utterance with no known token scores every label at the prior.
    let strict = medintent::decoder::IntentDecoder::new(medintent::decoder::DecoderConfig {
        threshold: 0.9,
    })?;
    let prediction = pipeline.predict("zzz")?;
    let intents = strict.decode(&prediction, pipeline.labels())?;
    assert_eq!(
        responder.respond("zzz", &intents),
        Reply::Fallback {
            text: "zzz".to_string()
        }
    );
    Ok(())
}
