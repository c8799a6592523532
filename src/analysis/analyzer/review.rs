//! Negation-aware normalizer for product review text.
//!
//! The pipeline is fixed:
//!
//! 1. lowercase
//! 2. strip everything except ASCII letters, digits, whitespace and `! ? . , '`
//! 3. expand contractions, most specific rule first
//! 4. tokenize on `\b\w+(?:'\w+)?\b`
//! 5. drop stop words, keeping negation and contrast words
//! 6. prefix the token after each negator with `NOT_`
//!
//! The same normalizer is used for training and serving, and its
//! [`signature`](ReviewNormalizer::signature) is stored with every trained
//! model so a mismatch is detected when the model is loaded.

use std::sync::Arc;

use log::warn;

use crate::analysis::analyzer::analyzer::Analyzer;
use crate::analysis::analyzer::pipeline::PipelineAnalyzer;
use crate::analysis::char_filter::contraction::{ENGLISH_CONTRACTIONS, english_contraction_filters};
use crate::analysis::char_filter::lowercase::LowercaseCharFilter;
use crate::analysis::char_filter::pattern_replace::{
    PatternReplaceCharFilter, SYMBOL_STRIP_PATTERN,
};
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::negation::{NEGATION_PREFIX, NEGATORS, NegationFilter};
use crate::analysis::token_filter::stop::{REVIEW_STOP_WORDS_SET, StopFilter};
use crate::analysis::tokenizer::regex::{RegexTokenizer, WORD_PATTERN};
use crate::error::Result;

/// Version tag of the normalization rules; bump when any rule changes.
const NORMALIZER_VERSION: u32 = 1;

/// Turns raw review text into a negation-tagged token stream.
#[derive(Clone, Debug)]
pub struct ReviewNormalizer {
    pipeline: PipelineAnalyzer,
}

impl ReviewNormalizer {
    /// Build the review normalization pipeline.
    pub fn new() -> Result<Self> {
        let tokenizer = Arc::new(RegexTokenizer::new()?);
        let mut pipeline = PipelineAnalyzer::new(tokenizer)
            .add_char_filter(Arc::new(LowercaseCharFilter::new()))
            .add_char_filter(Arc::new(PatternReplaceCharFilter::strip_symbols()?));
        for filter in english_contraction_filters() {
            pipeline = pipeline.add_char_filter(Arc::new(filter));
        }
        let pipeline = pipeline
            .add_filter(Arc::new(StopFilter::new()))
            .add_filter(Arc::new(NegationFilter::new()))
            .with_name("review");

        Ok(ReviewNormalizer { pipeline })
    }

    /// Normalize review text into terms.
    ///
    /// Never fails: missing, empty or unusable input yields an empty stream.
    pub fn normalize(&self, text: Option<&str>) -> Vec<String> {
        let Some(text) = text else {
            return Vec::new();
        };
        if text.trim().is_empty() {
            return Vec::new();
        }
        match self.pipeline.analyze(text) {
            Ok(tokens) => tokens.map(|token| token.text).collect(),
            Err(e) => {
                warn!("normalization failed, treating review as empty: {e}");
                Vec::new()
            }
        }
    }

    /// Normalize many texts, preserving order.
    pub fn normalize_all<'a, I>(&self, texts: I) -> Vec<Vec<String>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        texts
            .into_iter()
            .map(|text| self.normalize(Some(text)))
            .collect()
    }

    /// Stable description of every rule in the pipeline.
    ///
    /// Two normalizers with equal signatures produce identical token streams.
    pub fn signature(&self) -> String {
        let contractions: Vec<String> = ENGLISH_CONTRACTIONS
            .iter()
            .map(|(from, to)| format!("{from}=>{to}"))
            .collect();
        let mut stop_words: Vec<&str> = REVIEW_STOP_WORDS_SET.iter().map(String::as_str).collect();
        stop_words.sort_unstable();

        format!(
            "v{NORMALIZER_VERSION};lowercase;strip:{SYMBOL_STRIP_PATTERN};contractions:{};tokens:{WORD_PATTERN};stop:{};negators:{};prefix:{NEGATION_PREFIX}",
            contractions.join("|"),
            stop_words.join(","),
            NEGATORS.join(","),
        )
    }

    /// Whether `term` is a stop word under this normalizer's rules.
    pub fn is_stop_word(&self, term: &str) -> bool {
        REVIEW_STOP_WORDS_SET.contains(term)
    }
}

impl Analyzer for ReviewNormalizer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        self.pipeline.analyze(text)
    }

    fn name(&self) -> &'static str {
        "review"
    }
}
