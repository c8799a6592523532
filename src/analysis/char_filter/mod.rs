//! Char filter implementations for text normalization.
//!
//! Char filters pre-process the raw string before it reaches the tokenizer.
//! Each filter returns the rewritten text.
//!
//! # Available Filters
//!
//! - [`lowercase::LowercaseCharFilter`] - Unicode lowercasing
//! - [`pattern_replace::PatternReplaceCharFilter`] - Regex-based replacement
//! - [`contraction::ContractionCharFilter`] - Ordered literal contraction expansion

/// Trait for character filters that transform text before tokenization.
pub trait CharFilter: Send + Sync {
    /// Apply this filter to the input text, returning the filtered text.
    fn filter(&self, input: &str) -> String;

    /// Get the name of this char filter.
    fn name(&self) -> &'static str;
}

pub mod contraction;
pub mod lowercase;
pub mod pattern_replace;

pub use contraction::ContractionCharFilter;
pub use lowercase::LowercaseCharFilter;
pub use pattern_replace::PatternReplaceCharFilter;
