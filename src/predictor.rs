//! Sentiment prediction for raw review text.
//!
//! ```no_run
//! use verdict::artifact::{ArtifactStore, JsonArtifactStore};
//! use verdict::predictor::SentimentPredictor;
//!
//! let model = JsonArtifactStore::new("models/latest").load().unwrap();
//! let predictor = SentimentPredictor::new(model).unwrap();
//! let result = predictor.predict("Not worth the money").unwrap();
//! println!("{} ({} stars, confidence {})", result.label, result.rating, result.confidence);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::ReviewNormalizer;
use crate::artifact::SentimentModel;
use crate::error::{Result, VerdictError};
use crate::model::{ClassScores, Classifier, sigmoid};
use crate::types::SentimentLabel;

/// How sure the model is about its label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Confidence {
    /// Percentage in `[0, 100]`.
    Percent(f64),
    /// The model exposes neither probabilities nor margins.
    Unavailable,
}

impl Confidence {
    /// Confidence implied by a classifier's scores.
    ///
    /// Probabilities give `100 * max(p)`; margins give `100 * sigmoid(|m|)`
    /// for the margin of the predicted class.
    pub fn from_scores(scores: &ClassScores) -> Self {
        match scores {
            ClassScores::Probabilities(p) => {
                let best = p[scores.label().index()];
                Confidence::Percent((100.0 * best).clamp(0.0, 100.0))
            }
            ClassScores::Margins(m) => {
                let winner = m[scores.label().index()];
                Confidence::Percent(100.0 * sigmoid(winner.abs()))
            }
            ClassScores::Opaque(_) => Confidence::Unavailable,
        }
    }

    pub fn percent(&self) -> Option<f64> {
        match self {
            Confidence::Percent(value) => Some(*value),
            Confidence::Unavailable => None,
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::Percent(value) => write!(f, "{value:.2}%"),
            Confidence::Unavailable => f.write_str("unavailable"),
        }
    }
}

/// Outcome of classifying one review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub label: SentimentLabel,
    pub confidence: Confidence,
    /// Star rating implied by the label (1, 3 or 5).
    pub rating: u8,
}

impl fmt::Display for PredictionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} stars, confidence {})",
            self.label, self.rating, self.confidence
        )
    }
}

/// Classifies raw text with a trained [`SentimentModel`].
///
/// Read-only after construction and safe to share between threads.
#[derive(Debug, Clone)]
pub struct SentimentPredictor {
    normalizer: ReviewNormalizer,
    model: SentimentModel,
}

impl SentimentPredictor {
    /// Wrap a trained model, verifying it matches this normalizer.
    pub fn new(model: SentimentModel) -> Result<Self> {
        let normalizer = ReviewNormalizer::new()?;
        model.validate(&normalizer)?;
        Ok(SentimentPredictor { normalizer, model })
    }

    pub fn model(&self) -> &SentimentModel {
        &self.model
    }

    /// Classify one review text.
    pub fn predict(&self, text: &str) -> Result<PredictionResult> {
        if text.trim().is_empty() {
            return Err(VerdictError::invalid_input("review text is empty"));
        }
        let tokens = self.normalizer.normalize(Some(text));
        let vector = self.model.vectorizer.transform(&tokens)?;
        let scores = self.model.model.scores(&vector)?;
        let label = scores.label();

        Ok(PredictionResult {
            label,
            confidence: Confidence::from_scores(&scores),
            rating: label.star_rating(),
        })
    }

    /// Classify many texts, preserving order.
    pub fn predict_all<'a, I>(&self, texts: I) -> Result<Vec<PredictionResult>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        texts.into_iter().map(|text| self.predict(text)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probability_confidence() {
        let confidence = Confidence::from_scores(&ClassScores::Probabilities([0.1, 0.2, 0.7]));
        let percent = confidence.percent().unwrap();
        assert!((percent - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_margin_confidence_uses_winner() {
        let margins = [-0.4, 1.5, -2.0];
        let confidence = Confidence::from_scores(&ClassScores::Margins(margins));
        let expected = 100.0 / (1.0 + (-1.5_f64).exp());
        assert!((confidence.percent().unwrap() - expected).abs() < 1e-9);

        // all margins negative: the least negative wins, confidence from |m|
        let confidence = Confidence::from_scores(&ClassScores::Margins([-0.5, -1.0, -3.0]));
        let expected = 100.0 / (1.0 + (-0.5_f64).exp());
        assert!((confidence.percent().unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_opaque_confidence_unavailable() {
        let confidence = Confidence::from_scores(&ClassScores::Opaque(SentimentLabel::Neutral));
        assert_eq!(confidence, Confidence::Unavailable);
        assert_eq!(confidence.to_string(), "unavailable");
        assert_eq!(serde_json::to_string(&confidence).unwrap(), "null");
    }

    #[test]
    fn test_result_display() {
        let result = PredictionResult {
            label: SentimentLabel::Negative,
            confidence: Confidence::Percent(81.234),
            rating: 1,
        };
        assert_eq!(result.to_string(), "Negative (1 stars, confidence 81.23%)");
    }
}
