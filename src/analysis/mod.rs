//! Text analysis module for Verdict.
//!
//! Tokenization, char and token filtering, and the analysis pipelines that
//! turn raw review text into normalized terms.

pub mod analyzer;
pub mod char_filter;
pub mod token;
pub mod token_filter;
pub mod tokenizer;

// Re-export commonly used types
pub use analyzer::*;
pub use token::*;
pub use token_filter::*;
pub use tokenizer::*;
