//! End-to-end training run.
//!
//! ```text
//! reviews -> labels -> normalize -> stratified split
//!         -> fit vectorizer on train -> transform train/test
//!         -> balance train -> grid search + selection -> SentimentModel
//! ```

use std::path::Path;

use chrono::Utc;
use log::info;
use rayon::prelude::*;

use crate::analysis::analyzer::ReviewNormalizer;
use crate::artifact::{ModelMetadata, SentimentModel};
use crate::balance::SmoteBalancer;
use crate::config::TrainingConfig;
use crate::corpus::{CsvReviewLoader, LoadedCorpus, stratified_split};
use crate::error::{Result, VerdictError};
use crate::evaluation::TrainingReport;
use crate::feature::TfIdfVectorizer;
use crate::model::{ModelCatalog, ModelSelector};
use crate::types::{LabeledSet, Review, SentimentLabel};

/// Trains a [`SentimentModel`] from labeled reviews.
#[derive(Debug, Clone)]
pub struct Trainer {
    config: TrainingConfig,
    catalog: ModelCatalog,
    normalizer: ReviewNormalizer,
}

impl Trainer {
    pub fn new(config: TrainingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Trainer {
            catalog: ModelCatalog::from_config(&config.selection),
            normalizer: ReviewNormalizer::new()?,
            config,
        })
    }

    /// Replace the catalog derived from the configuration.
    pub fn with_catalog(mut self, catalog: ModelCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Load a CSV corpus and train on it.
    pub fn train_csv<P: AsRef<Path>>(&self, path: P) -> Result<(SentimentModel, TrainingReport)> {
        let corpus = CsvReviewLoader::new(self.config.corpus.clone()).load_path(path)?;
        self.train_corpus(corpus)
    }

    /// Train on reviews; reviews without a usable rating are ignored.
    pub fn train(&self, reviews: &[Review]) -> Result<(SentimentModel, TrainingReport)> {
        self.train_corpus(LoadedCorpus {
            reviews: reviews.to_vec(),
            dropped: 0,
        })
    }

    fn train_corpus(&self, corpus: LoadedCorpus) -> Result<(SentimentModel, TrainingReport)> {
        let reviews_loaded = corpus.reviews.len();
        let mut rows_dropped = corpus.dropped;

        let (texts, labels): (Vec<String>, Vec<SentimentLabel>) = corpus
            .reviews
            .iter()
            .filter_map(|review| review.label().map(|label| (review.text(), label)))
            .unzip();
        rows_dropped += reviews_loaded - labels.len();
        if labels.is_empty() {
            return Err(VerdictError::invalid_input("no labeled reviews to train on"));
        }

        let tokens: Vec<Vec<String>> = texts
            .par_iter()
            .map(|text| self.normalizer.normalize(Some(text.as_str())))
            .collect();
        info!("normalized {} reviews", tokens.len());

        let (train, test) = stratified_split(&tokens, &labels, &self.config.split)?;
        let (train_tokens, train_labels): (Vec<Vec<String>>, Vec<SentimentLabel>) =
            train.into_iter().unzip();
        let (test_tokens, test_labels): (Vec<Vec<String>>, Vec<SentimentLabel>) =
            test.into_iter().unzip();
        info!(
            "split into {} training and {} test reviews",
            train_labels.len(),
            test_labels.len()
        );

        let mut vectorizer = TfIdfVectorizer::new(self.config.vectorizer.clone());
        let train_vectors = vectorizer.fit_transform(&train_tokens)?;
        let test_vectors = vectorizer.transform_all(&test_tokens)?;
        info!("vocabulary has {} terms", vectorizer.vocabulary_size());

        let train_set = LabeledSet::new(train_vectors, train_labels)?;
        let test_set = LabeledSet::new(test_vectors, test_labels)?;
        let class_counts = train_set.class_counts();

        let balanced = if self.config.balancer.enabled {
            SmoteBalancer::from_config(&self.config.balancer).balance(&train_set)?
        } else {
            train_set
        };

        let selector = ModelSelector::new(self.config.selection.clone());
        let outcome = selector.train_and_select(&balanced, &test_set, &self.catalog)?;

        let metadata = ModelMetadata {
            family: outcome.family,
            params: outcome.params.clone(),
            test_accuracy: outcome.accuracy,
            training_size: balanced.len(),
            vocabulary_size: vectorizer.vocabulary_size(),
            trained_at: Utc::now(),
            version: crate::VERSION.to_string(),
        };

        let report = TrainingReport {
            reviews_loaded,
            rows_dropped,
            training_size: class_counts.iter().sum(),
            test_size: test_set.len(),
            balanced_training_size: balanced.len(),
            vocabulary_size: vectorizer.vocabulary_size(),
            class_counts,
            families: outcome.reports,
            selected_family: outcome.family,
            selected_params: outcome.params,
            test_accuracy: outcome.accuracy,
            evaluation: outcome.evaluation,
        };

        let model = SentimentModel {
            normalizer_signature: self.normalizer.signature(),
            vectorizer,
            model: outcome.model,
            metadata,
        };
        Ok((model, report))
    }
}
