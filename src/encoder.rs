//! Bag-of-words feature encoding.
//!
//! A [`FeatureVector`] has one bit per vocabulary entry. Bit *i* is set iff
//! `vocabulary[i]` occurs in the token sequence at least once; repeats do not
//! matter and tokens outside the vocabulary are ignored.
//!
//! # Examples
//!
//! ```
//! use medintent::encoder::FeatureEncoder;
//! use medintent::vocabulary::Vocabulary;
//!
//! let vocabulary = Vocabulary::from_tokens(["appointment", "book", "fever", "want"]);
//! let features = FeatureEncoder::encode(&["fever", "fever", "chill"], &vocabulary);
//!
//! assert_eq!(features.to_dense(), vec![0.0, 0.0, 1.0, 0.0]);
//! ```

use bit_vec::BitVec;

use crate::error::{IntentError, Result};
use crate::vocabulary::Vocabulary;

/// Fixed-length binary presence vector over a vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeatureVector {
    bits: BitVec,
}

impl FeatureVector {
    /// An all-zero vector of the given length.
    pub fn zeros(len: usize) -> Self {
        Self {
            bits: BitVec::from_elem(len, false),
        }
    }

    /// Build a vector from explicit bits.
    pub fn from_bits<I: IntoIterator<Item = bool>>(bits: I) -> Self {
        Self {
            bits: bits.into_iter().collect(),
        }
    }

    /// Number of dimensions.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Whether the vector has zero dimensions.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Value of one dimension; out-of-range dimensions read as unset.
    pub fn get(&self, index: usize) -> bool {
        self.bits.get(index).unwrap_or(false)
    }

    /// Number of set dimensions.
    pub fn count_ones(&self) -> usize {
        self.bits.iter().filter(|bit| *bit).count()
    }

    /// Indices of set dimensions, ascending.
    pub fn active_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits
            .iter()
            .enumerate()
            .filter_map(|(index, bit)| bit.then_some(index))
    }

    /// Dense `0.0 / 1.0` representation.
    pub fn to_dense(&self) -> Vec<f32> {
        self.bits
            .iter()
            .map(|bit| if bit { 1.0 } else { 0.0 })
            .collect()
    }

    /// Fail with a shape mismatch unless this vector has `expected` dimensions.
    pub fn ensure_len(&self, expected: usize, context: &str) -> Result<()> {
        if self.len() != expected {
            return Err(IntentError::shape_mismatch(context, expected, self.len()));
        }
        Ok(())
    }

    fn set(&mut self, index: usize) {
        self.bits.set(index, true);
    }
}

/// Stateless bag-of-words encoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureEncoder;

impl FeatureEncoder {
    /// Encode a token sequence against a vocabulary.
    ///
    /// The output always has `vocabulary.len()` dimensions and depends only on
    /// the set of tokens, not their order or multiplicity.
    pub fn encode<S: AsRef<str>>(tokens: &[S], vocabulary: &Vocabulary) -> FeatureVector {
        let mut features = FeatureVector::zeros(vocabulary.len());
        for token in tokens {
            if let Some(index) = vocabulary.index_of(token.as_ref()) {
                features.set(index);
            }
        }
        features
    }
}
