use proptest::prelude::*;

use medintent::classifier::Prediction;
use medintent::corpus::{Corpus, IntentRecord};
use medintent::decoder::{DecoderConfig, IntentDecoder};
use medintent::encoder::FeatureEncoder;
use medintent::normalizer::{NormalizerConfig, TextNormalizer};
use medintent::vocabulary::{LabelSet, Vocabulary, VocabularyBuilder};

fn normalizer() -> TextNormalizer {
    TextNormalizer::new(&NormalizerConfig::default()).unwrap()
}

fn word() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("fever".to_string()),
        Just("appointment".to_string()),
        Just("cough".to_string()),
        Just("doctor".to_string()),
        "[a-z]{1,8}",
    ]
}

proptest! {
    #[test]
    fn normalization_is_deterministic(text in "\\PC{0,80}") {
        let normalizer = normalizer();
        let first = normalizer.normalize(&text).unwrap();
        let second = normalizer.normalize(&text).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert!(first.iter().all(|token| !token.is_empty()));
        prop_assert!(first.iter().all(|token| token.to_lowercase() == *token));
    }

    #[test]
    fn encoding_ignores_order_and_repetition(
        vocabulary in prop::collection::btree_set("[a-z]{1,6}", 0..20),
        mut tokens in prop::collection::vec("[a-z]{1,6}", 0..30),
    ) {
        let vocabulary = Vocabulary::from_tokens(vocabulary);
        let features = FeatureEncoder::encode(&tokens, &vocabulary);
        prop_assert_eq!(features.len(), vocabulary.len());

        let mut shuffled = tokens.clone();
        shuffled.reverse();
        shuffled.extend(tokens.iter().cloned());
        prop_assert_eq!(&FeatureEncoder::encode(&shuffled, &vocabulary), &features);

        tokens.retain(|token| vocabulary.contains(token));
        tokens.sort();
        tokens.dedup();
        prop_assert_eq!(features.count_ones(), tokens.len());
    }

    #[test]
    fn vocabulary_and_labels_are_strictly_ascending(
        intents in prop::collection::vec(
            ("[a-z]{1,10}", prop::collection::vec(prop::collection::vec(word(), 1..6), 0..5)),
            1..6,
        ),
    ) {
        let mut seen = std::collections::HashSet::new();
        let records: Vec<IntentRecord> = intents
            .into_iter()
            .filter(|(tag, _)| seen.insert(tag.clone()))
            .map(|(tag, patterns)| {
                IntentRecord::new(tag, patterns.into_iter().map(|words| words.join(" ")))
            })
            .collect();
        let corpus = Corpus::new(records).unwrap();

        let normalizer = normalizer();
        let build = VocabularyBuilder::new(&normalizer).build(&corpus).unwrap();

        prop_assert!(build.vocabulary.as_slice().windows(2).all(|pair| pair[0] < pair[1]));
        prop_assert!(build.labels.as_slice().windows(2).all(|pair| pair[0] < pair[1]));
        prop_assert_eq!(build.labels.len(), corpus.len());
        for example in &build.examples {
            prop_assert!(example.tokens.iter().all(|token| build.vocabulary.contains(token)));
        }
    }

    #[test]
    fn raising_the_threshold_only_removes_intents(
        probabilities in prop::collection::vec(0.0f32..=1.0, 1..8),
        low in 0.0f32..1.0,
        delta in 0.0f32..1.0,
    ) {
        let labels = LabelSet::from_tags((0..probabilities.len()).map(|i| format!("tag_{i:02}")));
        let prediction = Prediction::new(probabilities);
        let loose = IntentDecoder::new(DecoderConfig { threshold: low }).unwrap();
        let strict = IntentDecoder::new(DecoderConfig { threshold: low + delta }).unwrap();

        let loose = loose.decode(&prediction, &labels).unwrap();
        let strict = strict.decode(&prediction, &labels).unwrap();

        prop_assert!(strict.len() <= loose.len());
        prop_assert!(strict.iter().all(|tag| loose.iter().any(|t| t == tag)));

        // The strict list is a prefix of the loose one.
        prop_assert_eq!(strict.tags(), &loose.tags()[..strict.len()]);
    }

    #[test]
    fn decoded_intents_are_sorted_by_probability(
        probabilities in prop::collection::vec(0.0f32..=1.0, 1..8),
    ) {
        let labels = LabelSet::from_tags((0..probabilities.len()).map(|i| format!("tag_{i:02}")));
        let scored = IntentDecoder::default()
            .decode_scored(&Prediction::new(probabilities), &labels)
            .unwrap();

        for pair in scored.windows(2) {
            prop_assert!(pair[0].probability >= pair[1].probability);
            if pair[0].probability == pair[1].probability {
                prop_assert!(pair[0].tag < pair[1].tag);
            }
        }
        prop_assert!(scored.iter().all(|intent| intent.probability > 0.25));
    }
}
