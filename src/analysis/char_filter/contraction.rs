//! Contraction expansion.
//!
//! Each [`ContractionCharFilter`] expands one contraction by literal
//! substring replacement over the whole text. Rules are meant to run in
//! sequence, most specific first, so that `"won't"` is handled before the
//! generic `"n't"` suffix ever sees it:
//!
//! ```
//! use verdict::analysis::char_filter::CharFilter;
//! use verdict::analysis::char_filter::contraction::english_contraction_filters;
//!
//! let mut text = "won't don't".to_string();
//! for filter in english_contraction_filters() {
//!     text = filter.filter(&text);
//! }
//! assert_eq!(text, "will not do not");
//! ```

use super::CharFilter;

/// English contraction rules in application order.
pub const ENGLISH_CONTRACTIONS: &[(&str, &str)] = &[
    ("won't", "will not"),
    ("can't", "can not"),
    ("n't", " not"),
    ("'re", " are"),
    ("'s", " is"),
    ("'d", " would"),
    ("'ll", " will"),
    ("'t", " not"),
    ("'ve", " have"),
    ("'m", " am"),
];

/// A char filter replacing every occurrence of one literal contraction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractionCharFilter {
    contraction: String,
    expansion: String,
}

impl ContractionCharFilter {
    pub fn new<S: Into<String>>(contraction: S, expansion: S) -> Self {
        ContractionCharFilter {
            contraction: contraction.into(),
            expansion: expansion.into(),
        }
    }

    pub fn contraction(&self) -> &str {
        &self.contraction
    }

    pub fn expansion(&self) -> &str {
        &self.expansion
    }
}

/// One filter per entry of [`ENGLISH_CONTRACTIONS`], in order.
pub fn english_contraction_filters() -> Vec<ContractionCharFilter> {
    ENGLISH_CONTRACTIONS
        .iter()
        .map(|&(contraction, expansion)| ContractionCharFilter::new(contraction, expansion))
        .collect()
}

impl CharFilter for ContractionCharFilter {
    fn filter(&self, input: &str) -> String {
        if self.contraction.is_empty() {
            return input.to_string();
        }
        input.replace(self.contraction.as_str(), &self.expansion)
    }

    fn name(&self) -> &'static str {
        "contraction"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand_all(text: &str) -> String {
        english_contraction_filters()
            .iter()
            .fold(text.to_string(), |acc, filter| filter.filter(&acc))
    }

    #[test]
    fn test_specific_rule_wins() {
        assert_eq!(expand_all("won't"), "will not");
        assert_eq!(expand_all("can't"), "can not");
    }

    #[test]
    fn test_generic_suffixes() {
        assert_eq!(expand_all("don't"), "do not");
        assert_eq!(expand_all("they're"), "they are");
        assert_eq!(expand_all("it's"), "it is");
        assert_eq!(expand_all("i'd"), "i would");
        assert_eq!(expand_all("we'll"), "we will");
        assert_eq!(expand_all("i've"), "i have");
        assert_eq!(expand_all("i'm"), "i am");
    }

    #[test]
    fn test_single_filter_replaces_every_occurrence() {
        let filter = ContractionCharFilter::new("n't", " not");
        assert_eq!(filter.filter("isn't bad, didn't break"), "is not bad, did not break");
    }

    #[test]
    fn test_no_match_is_identity() {
        let filter = ContractionCharFilter::new("won't", "will not");
        assert_eq!(filter.filter("works fine"), "works fine");
        assert_eq!(ContractionCharFilter::new("", "x").filter("works"), "works");
    }
}
