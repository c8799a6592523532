use regex::{NoExpand, Regex};

use super::CharFilter;
use crate::error::{Result, VerdictError};

/// Characters kept by [`PatternReplaceCharFilter::strip_symbols`]: ASCII
/// letters and digits, whitespace and the punctuation `! ? . , '`.
pub const SYMBOL_STRIP_PATTERN: &str = r"[^a-zA-Z0-9!?.,'\s]";

/// A char filter that replaces every match of a regex pattern.
#[derive(Debug, Clone)]
pub struct PatternReplaceCharFilter {
    pattern: Regex,
    replacement: String,
}

impl PatternReplaceCharFilter {
    /// Create a new pattern replace char filter.
    pub fn new(pattern: &str, replacement: &str) -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(pattern)
                .map_err(|e| VerdictError::analysis(format!("Invalid regex pattern: {e}")))?,
            replacement: replacement.to_string(),
        })
    }

    /// Filter removing everything outside [`SYMBOL_STRIP_PATTERN`]'s keep set.
    pub fn strip_symbols() -> Result<Self> {
        Self::new(SYMBOL_STRIP_PATTERN, "")
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

impl CharFilter for PatternReplaceCharFilter {
    fn filter(&self, input: &str) -> String {
        self.pattern
            .replace_all(input, NoExpand(&self.replacement))
            .into_owned()
    }

    fn name(&self) -> &'static str {
        "pattern_replace"
    }
}
