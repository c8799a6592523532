//! Lowercase char filter.

use super::CharFilter;

/// A char filter that lowercases the whole input.
#[derive(Clone, Debug, Default)]
pub struct LowercaseCharFilter;

impl LowercaseCharFilter {
    pub fn new() -> Self {
        LowercaseCharFilter
    }
}

impl CharFilter for LowercaseCharFilter {
    fn filter(&self, input: &str) -> String {
        if input.is_ascii() {
            input.to_ascii_lowercase()
        } else {
            input.to_lowercase()
        }
    }

    fn name(&self) -> &'static str {
        "lowercase"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase_ascii() {
        assert_eq!(LowercaseCharFilter::new().filter("Not GOOD"), "not good");
    }

    #[test]
    fn test_lowercase_unicode() {
        assert_eq!(LowercaseCharFilter::new().filter("ÉTÉ Ok"), "été ok");
    }
}
