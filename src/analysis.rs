//! Text analysis for utterance normalization.
//!
//! Raw text flows through a tokenizer and then a chain of token filters,
//! producing the canonical tokens that the vocabulary and feature encoder
//! operate on:
//!
//! ```text
//! Raw Text → Tokenizer → Lowercase → Symbols → Stop Words → Lemma → Stop Words → Remove Empty
//! ```

pub mod analyzer;
pub mod token;
pub mod token_filter;
pub mod tokenizer;
