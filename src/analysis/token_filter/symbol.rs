//! Symbol filter implementation.
//!
//! Removes tokens that belong to a configured set of ignored symbols, and any
//! token without a single alphanumeric character.
//!
//! # Examples
//!
//! ```
//! use medintent::analysis::token_filter::Filter;
//! use medintent::analysis::token_filter::symbol::SymbolFilter;
//! use medintent::analysis::token::Token;
//!
//! let filter = SymbolFilter::new();
//! let tokens = vec![Token::new("fever", 0), Token::new("?", 1), Token::new("--", 2)];
//! let result: Vec<_> = filter.filter(Box::new(tokens.into_iter())).unwrap().collect();
//!
//! assert_eq!(result.len(), 1);
//! assert_eq!(result[0].text, "fever");
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use crate::analysis::token::{Token, TokenStream};
use crate::analysis::token_filter::Filter;
use crate::error::Result;

/// Symbols ignored by default.
pub const DEFAULT_IGNORED_SYMBOLS: &[&str] = &["?", "!", ".", ",", ";", ":"];

/// A filter that drops ignored symbols and punctuation-only tokens.
#[derive(Clone, Debug)]
pub struct SymbolFilter {
    ignored: Arc<HashSet<String>>,
}

impl SymbolFilter {
    /// Create a symbol filter with the default ignored symbols.
    pub fn new() -> Self {
        Self::from_symbols(DEFAULT_IGNORED_SYMBOLS.iter().copied())
    }

    /// Create a symbol filter from a list of symbols.
    pub fn from_symbols<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SymbolFilter {
            ignored: Arc::new(symbols.into_iter().map(Into::into).collect()),
        }
    }

    /// Check if a token text should be dropped.
    pub fn is_ignored(&self, text: &str) -> bool {
        self.ignored.contains(text) || !text.chars().any(char::is_alphanumeric)
    }
}

impl Default for SymbolFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for SymbolFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let filtered_tokens: Vec<Token> = tokens
            .filter(|token| token.is_stopped() || !self.is_ignored(&token.text))
            .collect();

        Ok(Box::new(filtered_tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "symbol"
    }
}
