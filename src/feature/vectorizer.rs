//! TF-IDF vectorizer over normalized review terms.

use std::collections::{BTreeMap, HashMap, HashSet};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::analysis::token_filter::stop::REVIEW_STOP_WORDS_SET;
use crate::config::VectorizerConfig;
use crate::error::{Result, VerdictError};
use crate::feature::sparse::SparseVector;

/// Frozen term space produced by [`TfIdfVectorizer::fit`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vocabulary {
    /// Term -> feature index, indices assigned in lexicographic term order.
    terms: BTreeMap<String, usize>,
    /// Document frequency per feature index.
    document_frequency: Vec<usize>,
    /// Smoothed inverse document frequency per feature index.
    idf: Vec<f64>,
    /// Number of documents the vocabulary was fit on.
    n_documents: usize,
}

impl Vocabulary {
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.terms.get(term).copied()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains_key(term)
    }

    /// Terms in index order.
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.terms.keys().map(String::as_str)
    }

    pub fn document_frequency(&self, term: &str) -> Option<usize> {
        self.index_of(term).map(|index| self.document_frequency[index])
    }

    pub fn idf(&self, term: &str) -> Option<f64> {
        self.index_of(term).map(|index| self.idf[index])
    }

    pub fn n_documents(&self) -> usize {
        self.n_documents
    }
}

/// TF-IDF vectorizer with unigram/bigram terms and document frequency bounds.
///
/// Fit once on training token streams; afterwards [`transform`](Self::transform)
/// maps any token stream into the frozen feature space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfIdfVectorizer {
    config: VectorizerConfig,
    vocabulary: Option<Vocabulary>,
}

impl TfIdfVectorizer {
    pub fn new(config: VectorizerConfig) -> Self {
        TfIdfVectorizer {
            config,
            vocabulary: None,
        }
    }

    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }

    pub fn is_fitted(&self) -> bool {
        self.vocabulary.is_some()
    }

    pub fn vocabulary(&self) -> Option<&Vocabulary> {
        self.vocabulary.as_ref()
    }

    /// Size of the fitted vocabulary (0 before fitting).
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.as_ref().map_or(0, Vocabulary::len)
    }

    /// Candidate terms of one document: stop words removed, then n-grams
    /// in `ngram_range`, bigrams joined by a single space.
    fn candidate_terms(&self, tokens: &[String]) -> Vec<String> {
        let kept: Vec<&str> = tokens
            .iter()
            .map(String::as_str)
            .filter(|token| !REVIEW_STOP_WORDS_SET.contains(*token))
            .collect();

        let (min_n, max_n) = self.config.ngram_range;
        let mut terms = Vec::new();
        for n in min_n..=max_n {
            if n == 0 || n > kept.len() {
                continue;
            }
            terms.extend(kept.windows(n).map(|window| window.join(" ")));
        }
        terms
    }

    /// Fit the vocabulary and IDF weights on training documents.
    pub fn fit(&mut self, documents: &[Vec<String>]) -> Result<()> {
        self.config.validate()?;
        if documents.is_empty() {
            return Err(VerdictError::invalid_config(
                "cannot fit the vectorizer on an empty corpus",
            ));
        }

        let n_documents = documents.len();
        let max_doc_count = self.config.max_df * n_documents as f64;
        if max_doc_count < self.config.min_df as f64 {
            return Err(VerdictError::invalid_config(format!(
                "max_df={} admits at most {max_doc_count} documents, fewer than min_df={}",
                self.config.max_df, self.config.min_df
            )));
        }

        let mut document_frequency: HashMap<String, usize> = HashMap::new();
        for tokens in documents {
            let unique: HashSet<String> = self.candidate_terms(tokens).into_iter().collect();
            for term in unique {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        let candidates = document_frequency.len();
        let admitted: BTreeMap<String, usize> = document_frequency
            .into_iter()
            .filter(|(_, df)| *df >= self.config.min_df && *df as f64 <= max_doc_count)
            .collect();

        if admitted.is_empty() {
            return Err(VerdictError::invalid_config(format!(
                "no terms remain after pruning {candidates} candidates (min_df={}, max_df={}); lower min_df or raise max_df",
                self.config.min_df, self.config.max_df
            )));
        }

        let mut terms = BTreeMap::new();
        let mut dfs = Vec::with_capacity(admitted.len());
        let mut idf = Vec::with_capacity(admitted.len());
        for (index, (term, df)) in admitted.into_iter().enumerate() {
            // IDF = ln((N + 1) / (df + 1)) + 1
            idf.push(((n_documents as f64 + 1.0) / (df as f64 + 1.0)).ln() + 1.0);
            dfs.push(df);
            terms.insert(term, index);
        }

        debug!(
            "vectorizer fit on {n_documents} documents: {} of {candidates} candidate terms admitted",
            terms.len()
        );

        self.vocabulary = Some(Vocabulary {
            terms,
            document_frequency: dfs,
            idf,
            n_documents,
        });
        Ok(())
    }

    /// Map one token stream into the fitted feature space.
    ///
    /// Terms outside the vocabulary are dropped; a stream with no known
    /// terms yields the zero vector.
    pub fn transform(&self, tokens: &[String]) -> Result<SparseVector> {
        let vocabulary = self.vocabulary.as_ref().ok_or_else(|| {
            VerdictError::not_trained("the vectorizer must be fit before transform")
        })?;

        let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
        for term in self.candidate_terms(tokens) {
            if let Some(index) = vocabulary.index_of(&term) {
                *counts.entry(index).or_insert(0) += 1;
            }
        }

        let pairs = counts
            .into_iter()
            .map(|(index, count)| {
                let tf = if self.config.sublinear_tf {
                    1.0 + (count as f64).ln()
                } else {
                    count as f64
                };
                (index, tf * vocabulary.idf[index])
            })
            .collect();

        let mut vector = SparseVector::from_pairs(vocabulary.len(), pairs);
        vector.l2_normalize();
        Ok(vector)
    }

    /// Transform many token streams, preserving order.
    pub fn transform_all(&self, documents: &[Vec<String>]) -> Result<Vec<SparseVector>> {
        documents.iter().map(|tokens| self.transform(tokens)).collect()
    }

    /// Fit on `documents` and return their vectors.
    pub fn fit_transform(&mut self, documents: &[Vec<String>]) -> Result<Vec<SparseVector>> {
        self.fit(documents)?;
        self.transform_all(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }

    fn loose_config() -> VectorizerConfig {
        VectorizerConfig {
            min_df: 1,
            max_df: 1.0,
            ..VectorizerConfig::default()
        }
    }

    #[test]
    fn test_vocabulary_is_sorted_with_bigrams() {
        let mut vectorizer = TfIdfVectorizer::new(loose_config());
        vectorizer
            .fit(&[doc("great phone"), doc("bad phone")])
            .unwrap();

        let vocabulary = vectorizer.vocabulary().unwrap();
        let terms: Vec<&str> = vocabulary.terms().collect();
        assert_eq!(
            terms,
            vec!["bad", "bad phone", "great", "great phone", "phone"]
        );
        assert_eq!(vocabulary.index_of("great"), Some(2));
        assert_eq!(vocabulary.document_frequency("phone"), Some(2));
    }

    #[test]
    fn test_idf_formula() {
        let mut vectorizer = TfIdfVectorizer::new(loose_config());
        vectorizer
            .fit(&[doc("great phone"), doc("bad phone"), doc("great battery")])
            .unwrap();
        let vocabulary = vectorizer.vocabulary().unwrap();
        let expected = (4.0_f64 / 3.0).ln() + 1.0;
        assert!((vocabulary.idf("great").unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_stop_words_dropped_before_ngrams() {
        let mut vectorizer = TfIdfVectorizer::new(loose_config());
        vectorizer.fit(&[doc("works the charm")]).unwrap();
        let vocabulary = vectorizer.vocabulary().unwrap();
        assert!(!vocabulary.contains("the"));
        assert!(vocabulary.contains("works charm"));
    }

    #[test]
    fn test_document_frequency_bounds() {
        let documents: Vec<Vec<String>> = (0..10)
            .map(|i| {
                if i < 6 {
                    doc("phone great")
                } else {
                    doc("phone bad")
                }
            })
            .collect();

        let mut vectorizer = TfIdfVectorizer::new(VectorizerConfig {
            min_df: 5,
            max_df: 0.8,
            ngram_range: (1, 1),
            ..VectorizerConfig::default()
        });
        vectorizer.fit(&documents).unwrap();
        let vocabulary = vectorizer.vocabulary().unwrap();
        // "phone" is in every document, "bad" in only four
        assert!(!vocabulary.contains("phone"));
        assert!(!vocabulary.contains("bad"));
        assert!(vocabulary.contains("great"));
    }

    #[test]
    fn test_fit_errors() {
        let mut vectorizer = TfIdfVectorizer::new(VectorizerConfig::default());
        assert!(matches!(
            vectorizer.fit(&[]),
            Err(VerdictError::InvalidConfig(_))
        ));

        let documents: Vec<Vec<String>> = (0..10).map(|i| doc(&format!("word{i}"))).collect();
        assert!(matches!(
            vectorizer.fit(&documents),
            Err(VerdictError::InvalidConfig(_))
        ));
        assert!(!vectorizer.is_fitted());
    }

    #[test]
    fn test_transform_before_fit() {
        let vectorizer = TfIdfVectorizer::new(VectorizerConfig::default());
        assert!(matches!(
            vectorizer.transform(&doc("great")),
            Err(VerdictError::ModelNotTrained(_))
        ));
    }

    #[test]
    fn test_transform_sublinear_and_normalized() {
        let mut vectorizer = TfIdfVectorizer::new(VectorizerConfig {
            ngram_range: (1, 1),
            ..loose_config()
        });
        vectorizer
            .fit(&[doc("great battery"), doc("great phone")])
            .unwrap();

        let vector = vectorizer.transform(&doc("great great battery")).unwrap();
        assert!((vector.norm() - 1.0).abs() < 1e-12);

        let vocabulary = vectorizer.vocabulary().unwrap();
        let great = (1.0 + 2.0_f64.ln()) * vocabulary.idf("great").unwrap();
        let battery = vocabulary.idf("battery").unwrap();
        let ratio = vector.get(vocabulary.index_of("great").unwrap())
            / vector.get(vocabulary.index_of("battery").unwrap());
        assert!((ratio - great / battery).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_terms_give_zero_vector() {
        let mut vectorizer = TfIdfVectorizer::new(loose_config());
        vectorizer.fit(&[doc("great phone")]).unwrap();

        let vector = vectorizer.transform(&doc("unseen words only")).unwrap();
        assert!(vector.is_zero());
        assert_eq!(vector.dimension(), vectorizer.vocabulary_size());
    }

    #[test]
    fn test_transform_is_deterministic() {
        let mut vectorizer = TfIdfVectorizer::new(loose_config());
        let documents = vec![doc("great phone love"), doc("bad phone NOT_love")];
        vectorizer.fit(&documents).unwrap();

        let first = vectorizer.transform(&documents[1]).unwrap();
        for _ in 0..5 {
            let again = vectorizer.transform(&documents[1]).unwrap();
            assert_eq!(first.indices(), again.indices());
            let same_bits = first
                .values()
                .iter()
                .zip(again.values())
                .all(|(a, b)| a.to_bits() == b.to_bits());
            assert!(same_bits);
        }
    }
}
