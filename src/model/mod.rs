//! Classifier families, the model catalog and cross-validated selection.
//!
//! Every family implements [`Classifier`] and reports its output through
//! [`ClassScores`], which tags whether the scores are probabilities, margins
//! or a bare label. Confidence is derived from that tag, never by probing
//! the concrete model type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::SelectionConfig;
use crate::error::{Result, VerdictError};
use crate::feature::SparseVector;
use crate::types::{LabeledSet, SentimentLabel};

pub mod catalog;
pub mod linear_svm;
pub mod logistic;
pub mod naive_bayes;
pub mod nearest_centroid;
pub mod params;
pub mod selection;

pub use catalog::{CatalogEntry, ModelCatalog};
pub use linear_svm::{LinearSvm, SvmLoss};
pub use logistic::{LogisticRegression, Penalty};
pub use naive_bayes::MultinomialNaiveBayes;
pub use nearest_centroid::{CentroidMetric, NearestCentroid};
pub use params::{ParamGrid, ParamSet, ParamValue};
pub use selection::{FamilyReport, ModelSelector, SelectionOutcome, StratifiedKFold};

const N_CLASSES: usize = SentimentLabel::COUNT;

/// Per-class output of a classifier, tagged by what the numbers mean.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClassScores {
    /// Class probabilities summing to one, in label order.
    Probabilities([f64; N_CLASSES]),
    /// Signed one-vs-rest decision values, in label order.
    Margins([f64; N_CLASSES]),
    /// Only the predicted label is available.
    Opaque(SentimentLabel),
}

impl ClassScores {
    /// The predicted label; ties go to the earliest label.
    pub fn label(&self) -> SentimentLabel {
        match self {
            ClassScores::Probabilities(scores) | ClassScores::Margins(scores) => {
                SentimentLabel::from_index(argmax(scores)).unwrap_or(SentimentLabel::Negative)
            }
            ClassScores::Opaque(label) => *label,
        }
    }
}

/// Numerically stable logistic function.
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Index of the largest value; the first index wins ties.
pub(crate) fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, value) in values.iter().enumerate().skip(1) {
        if *value > values[best] {
            best = i;
        }
    }
    best
}

/// Trait for three-way sentiment classifiers over sparse vectors.
pub trait Classifier: Send + Sync {
    /// Fit the classifier on labeled vectors.
    fn fit(&mut self, data: &LabeledSet) -> Result<()>;

    /// Score one vector.
    fn scores(&self, vector: &SparseVector) -> Result<ClassScores>;

    /// Predict the label of one vector.
    fn predict(&self, vector: &SparseVector) -> Result<SentimentLabel> {
        Ok(self.scores(vector)?.label())
    }

    /// Check if the model is trained.
    fn is_trained(&self) -> bool;

    /// Family this classifier belongs to.
    fn family(&self) -> ModelFamily;
}

/// Model families known to the selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelFamily {
    LogisticRegression,
    MultinomialNaiveBayes,
    LinearSvm,
    NearestCentroid,
}

impl ModelFamily {
    pub fn as_str(self) -> &'static str {
        match self {
            ModelFamily::LogisticRegression => "logistic_regression",
            ModelFamily::MultinomialNaiveBayes => "multinomial_naive_bayes",
            ModelFamily::LinearSvm => "linear_svm",
            ModelFamily::NearestCentroid => "nearest_centroid",
        }
    }

    /// Build an unfitted model of this family from a grid point.
    pub fn build(self, params: &ParamSet, settings: &SelectionConfig) -> Result<TrainedModel> {
        Ok(match self {
            ModelFamily::LogisticRegression => TrainedModel::LogisticRegression(
                LogisticRegression::from_params(params, settings.max_iter)?,
            ),
            ModelFamily::MultinomialNaiveBayes => {
                TrainedModel::MultinomialNaiveBayes(MultinomialNaiveBayes::from_params(params)?)
            }
            ModelFamily::LinearSvm => TrainedModel::LinearSvm(LinearSvm::from_params(
                params,
                settings.max_iter,
                settings.seed,
            )?),
            ModelFamily::NearestCentroid => {
                TrainedModel::NearestCentroid(NearestCentroid::from_params(params)?)
            }
        })
    }
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelFamily {
    type Err = VerdictError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "logistic_regression" | "logistic" => Ok(ModelFamily::LogisticRegression),
            "multinomial_naive_bayes" | "naive_bayes" => Ok(ModelFamily::MultinomialNaiveBayes),
            "linear_svm" | "svm" => Ok(ModelFamily::LinearSvm),
            "nearest_centroid" => Ok(ModelFamily::NearestCentroid),
            _ => Err(VerdictError::invalid_config(format!(
                "unknown model family: {s}"
            ))),
        }
    }
}

/// A model of any family, serializable as part of an artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "family", content = "model", rename_all = "snake_case")]
pub enum TrainedModel {
    LogisticRegression(LogisticRegression),
    MultinomialNaiveBayes(MultinomialNaiveBayes),
    LinearSvm(LinearSvm),
    NearestCentroid(NearestCentroid),
}

impl TrainedModel {
    fn inner(&self) -> &dyn Classifier {
        match self {
            TrainedModel::LogisticRegression(model) => model,
            TrainedModel::MultinomialNaiveBayes(model) => model,
            TrainedModel::LinearSvm(model) => model,
            TrainedModel::NearestCentroid(model) => model,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Classifier {
        match self {
            TrainedModel::LogisticRegression(model) => model,
            TrainedModel::MultinomialNaiveBayes(model) => model,
            TrainedModel::LinearSvm(model) => model,
            TrainedModel::NearestCentroid(model) => model,
        }
    }

    /// Accuracy on a labeled set.
    pub fn accuracy(&self, data: &LabeledSet) -> Result<f64> {
        if data.is_empty() {
            return Err(VerdictError::invalid_input("cannot score an empty set"));
        }
        let mut correct = 0;
        for (vector, label) in data.vectors.iter().zip(&data.labels) {
            if self.predict(vector)? == *label {
                correct += 1;
            }
        }
        Ok(correct as f64 / data.len() as f64)
    }
}

impl Classifier for TrainedModel {
    fn fit(&mut self, data: &LabeledSet) -> Result<()> {
        self.inner_mut().fit(data)
    }

    fn scores(&self, vector: &SparseVector) -> Result<ClassScores> {
        self.inner().scores(vector)
    }

    fn is_trained(&self) -> bool {
        self.inner().is_trained()
    }

    fn family(&self) -> ModelFamily {
        self.inner().family()
    }
}

/// Common input checks for `fit`.
pub(crate) fn check_training_data(data: &LabeledSet) -> Result<()> {
    if data.is_empty() {
        return Err(VerdictError::invalid_input("training set is empty"));
    }
    if data.dimension() == 0 {
        return Err(VerdictError::invalid_input("training vectors have no features"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argmax_ties_go_first() {
        assert_eq!(argmax(&[0.2, 0.5, 0.5]), 1);
        assert_eq!(argmax(&[0.4, 0.4, 0.2]), 0);
        assert_eq!(argmax(&[-1.0, -2.0, 0.0]), 2);
    }

    #[test]
    fn test_sigmoid() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!((sigmoid(2.0) + sigmoid(-2.0) - 1.0).abs() < 1e-12);
        assert!(sigmoid(-800.0) >= 0.0);
        assert!(sigmoid(800.0) <= 1.0);
    }

    #[test]
    fn test_scores_label() {
        assert_eq!(
            ClassScores::Probabilities([0.1, 0.2, 0.7]).label(),
            SentimentLabel::Positive
        );
        assert_eq!(
            ClassScores::Margins([0.3, -0.5, -1.0]).label(),
            SentimentLabel::Negative
        );
        assert_eq!(
            ClassScores::Opaque(SentimentLabel::Neutral).label(),
            SentimentLabel::Neutral
        );
    }

    #[test]
    fn test_family_parse() {
        assert_eq!(
            "linear_svm".parse::<ModelFamily>().unwrap(),
            ModelFamily::LinearSvm
        );
        assert_eq!(
            "Naive_Bayes".parse::<ModelFamily>().unwrap(),
            ModelFamily::MultinomialNaiveBayes
        );
        assert!("forest".parse::<ModelFamily>().is_err());
    }
}
