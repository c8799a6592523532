//! Token types for text analysis.
//!
//! A [`Token`] is the unit that flows through the analysis pipeline, and a
//! [`TokenStream`] is a boxed iterator of tokens handed from one stage to the
//! next.
//!
//! # Examples
//!
//! ```
//! use verdict::analysis::token::Token;
//!
//! let token = Token::new("good").with_text("NOT_good");
//! assert_eq!(token.text, "NOT_good");
//! assert_eq!(token.to_string(), "NOT_good");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single term after tokenization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The text content of the token
    pub text: String,
}

impl Token {
    /// Create a new token with the given text.
    pub fn new<S: Into<String>>(text: S) -> Self {
        Token { text: text.into() }
    }

    /// Get the length of the token text.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Check if the token is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Replace the token text.
    pub fn with_text<S: Into<String>>(mut self, text: S) -> Self {
        self.text = text.into();
        self
    }

    /// Consume the token, returning its text.
    pub fn into_text(self) -> String {
        self.text
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// A stream of tokens produced by tokenizers and transformed by filters.
pub type TokenStream = Box<dyn Iterator<Item = Token> + Send>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_creation() {
        let token = Token::new("hello");
        assert_eq!(token.text, "hello");
        assert_eq!(token.len(), 5);
        assert!(!token.is_empty());
        assert!(Token::new("").is_empty());
    }

    #[test]
    fn test_token_rename() {
        let renamed = Token::new("good").with_text("NOT_good");
        assert_eq!(renamed.to_string(), "NOT_good");
        assert_eq!(renamed.into_text(), "NOT_good");
    }
}
