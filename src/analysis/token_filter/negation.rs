//! Negation scoping filter.
//!
//! A negator marks exactly the one token that follows it. Contrast words
//! (`but`, `however`, ...) pass through unchanged and do not affect scope.
//!
//! ```
//! use verdict::analysis::token_filter::Filter;
//! use verdict::analysis::token_filter::negation::NegationFilter;
//! use verdict::analysis::token::Token;
//!
//! let tokens = ["not", "good", "but", "great"]
//!     .into_iter()
//!     .map(Token::new)
//!     .collect::<Vec<_>>();
//!
//! let result: Vec<String> = NegationFilter::new()
//!     .filter(Box::new(tokens.into_iter()))
//!     .unwrap()
//!     .map(|token| token.text)
//!     .collect();
//!
//! assert_eq!(result, vec!["not", "NOT_good", "but", "great"]);
//! ```

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use crate::analysis::token::{Token, TokenStream};
use crate::analysis::token_filter::Filter;
use crate::error::Result;

/// Prefix attached to a negated token.
pub const NEGATION_PREFIX: &str = "NOT_";

/// Tokens that negate the token after them.
pub const NEGATORS: &[&str] = &[
    "not", "no", "never", "none", "nobody", "nothing", "nowhere", "neither", "nor", "hardly",
    "scarcely", "barely",
];

static NEGATOR_SET: LazyLock<HashSet<String>> =
    LazyLock::new(|| NEGATORS.iter().map(|&word| word.to_string()).collect());

/// Scope state carried across the token sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegationState {
    Idle,
    Negating,
}

/// A filter that prefixes the token following a negator with [`NEGATION_PREFIX`].
#[derive(Clone, Debug)]
pub struct NegationFilter {
    negators: Arc<HashSet<String>>,
    prefix: String,
}

impl NegationFilter {
    /// Create a negation filter with [`NEGATORS`] and [`NEGATION_PREFIX`].
    pub fn new() -> Self {
        NegationFilter {
            negators: Arc::new(NEGATOR_SET.clone()),
            prefix: NEGATION_PREFIX.to_string(),
        }
    }

    /// Use a custom negator list.
    pub fn with_negators<I, S>(mut self, negators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.negators = Arc::new(negators.into_iter().map(Into::into).collect());
        self
    }

    pub fn is_negator(&self, word: &str) -> bool {
        self.negators.contains(word)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Advance the scope state by one token, returning the emitted token.
    pub fn step(&self, state: NegationState, token: Token) -> (NegationState, Token) {
        if self.is_negator(&token.text) {
            return (NegationState::Negating, token);
        }
        match state {
            NegationState::Negating => {
                let text = format!("{}{}", self.prefix, token.text);
                (NegationState::Idle, token.with_text(text))
            }
            NegationState::Idle => (NegationState::Idle, token),
        }
    }
}

impl Default for NegationFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for NegationFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let (_, negated) = tokens.fold(
            (NegationState::Idle, Vec::new()),
            |(state, mut out), token| {
                let (next, emitted) = self.step(state, token);
                out.push(emitted);
                (next, out)
            },
        );

        Ok(Box::new(negated.into_iter()))
    }

    fn name(&self) -> &'static str {
        "negation"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(words: &[&str]) -> Vec<String> {
        let tokens: Vec<Token> = words.iter().map(|w| Token::new(*w)).collect();
        NegationFilter::new()
            .filter(Box::new(tokens.into_iter()))
            .unwrap()
            .map(|token| token.text)
            .collect()
    }

    #[test]
    fn test_negation_marks_single_token() {
        assert_eq!(
            run(&["not", "good", "product"]),
            vec!["not", "NOT_good", "product"]
        );
    }

    #[test]
    fn test_contrast_word_is_kept_and_not_a_trigger() {
        assert_eq!(
            run(&["not", "good", "but", "great"]),
            vec!["not", "NOT_good", "but", "great"]
        );
        assert_eq!(run(&["but", "great"]), vec!["but", "great"]);
    }

    #[test]
    fn test_contrast_word_does_not_reset_scope() {
        assert_eq!(run(&["not", "but", "bad"]), vec!["not", "NOT_but", "bad"]);
    }

    #[test]
    fn test_consecutive_negators() {
        assert_eq!(
            run(&["never", "not", "working"]),
            vec!["never", "not", "NOT_working"]
        );
    }

    #[test]
    fn test_trailing_negator() {
        assert_eq!(run(&["good", "no"]), vec!["good", "no"]);
    }
}
