//! Multinomial naive Bayes over non-negative feature weights.

use serde::{Deserialize, Serialize};

use crate::error::{Result, VerdictError};
use crate::feature::SparseVector;
use crate::model::params::ParamSet;
use crate::model::{Classifier, ClassScores, ModelFamily, N_CLASSES, check_training_data};
use crate::types::LabeledSet;

/// Multinomial naive Bayes with additive (Lidstone) smoothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultinomialNaiveBayes {
    alpha: f64,
    /// ln P(class); `f64::MIN` for a class absent from training so the
    /// model stays serializable.
    class_log_prior: Vec<f64>,
    /// ln P(feature | class), per class.
    feature_log_prob: Vec<Vec<f64>>,
}

impl MultinomialNaiveBayes {
    pub fn new(alpha: f64) -> Result<Self> {
        if !(alpha.is_finite() && alpha > 0.0) {
            return Err(VerdictError::invalid_config(format!(
                "alpha must be positive, got {alpha}"
            )));
        }
        Ok(MultinomialNaiveBayes {
            alpha,
            class_log_prior: Vec::new(),
            feature_log_prob: Vec::new(),
        })
    }

    pub fn from_params(params: &ParamSet) -> Result<Self> {
        params.check_known("multinomial_naive_bayes", &["alpha"])?;
        Self::new(params.float_or("alpha", 1.0)?)
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    fn joint_log_likelihood(&self, vector: &SparseVector) -> [f64; N_CLASSES] {
        let mut jll = [0.0; N_CLASSES];
        for (class, value) in jll.iter_mut().enumerate() {
            let log_prob = &self.feature_log_prob[class];
            *value = self.class_log_prior[class] + vector.dot_dense(log_prob);
        }
        jll
    }
}

impl Classifier for MultinomialNaiveBayes {
    fn fit(&mut self, data: &LabeledSet) -> Result<()> {
        check_training_data(data)?;
        let dimension = data.dimension();

        let mut feature_count = vec![vec![0.0; dimension]; N_CLASSES];
        let mut class_count = [0usize; N_CLASSES];
        for (vector, label) in data.vectors.iter().zip(&data.labels) {
            if !vector.is_non_negative() {
                return Err(VerdictError::invalid_input(
                    "multinomial naive Bayes requires non-negative features",
                ));
            }
            let counts = &mut feature_count[label.index()];
            for (index, value) in vector.iter() {
                counts[index] += value;
            }
            class_count[label.index()] += 1;
        }

        let total = data.len() as f64;
        self.class_log_prior = class_count
            .iter()
            .map(|&count| {
                if count == 0 {
                    f64::MIN
                } else {
                    (count as f64 / total).ln()
                }
            })
            .collect();

        self.feature_log_prob = feature_count
            .into_iter()
            .map(|counts| {
                let denominator =
                    (counts.iter().sum::<f64>() + self.alpha * dimension as f64).ln();
                counts
                    .into_iter()
                    .map(|count| (count + self.alpha).ln() - denominator)
                    .collect()
            })
            .collect();

        Ok(())
    }

    fn scores(&self, vector: &SparseVector) -> Result<ClassScores> {
        if !self.is_trained() {
            return Err(VerdictError::not_trained("multinomial naive Bayes"));
        }
        let jll = self.joint_log_likelihood(vector);

        // log-sum-exp normalization
        let max = jll.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mut probabilities = [0.0; N_CLASSES];
        for (p, value) in probabilities.iter_mut().zip(&jll) {
            *p = (value - max).exp();
        }
        let total: f64 = probabilities.iter().sum();
        for p in &mut probabilities {
            *p /= total;
        }
        Ok(ClassScores::Probabilities(probabilities))
    }

    fn is_trained(&self) -> bool {
        self.feature_log_prob.len() == N_CLASSES
    }

    fn family(&self) -> ModelFamily {
        ModelFamily::MultinomialNaiveBayes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SentimentLabel;

    fn word_counts() -> LabeledSet {
        let mut data = LabeledSet::default();
        // features: [great, fine, awful]
        data.push(SparseVector::from_dense(&[3.0, 0.0, 0.0]), SentimentLabel::Positive);
        data.push(SparseVector::from_dense(&[2.0, 1.0, 0.0]), SentimentLabel::Positive);
        data.push(SparseVector::from_dense(&[0.0, 2.0, 0.0]), SentimentLabel::Neutral);
        data.push(SparseVector::from_dense(&[0.0, 3.0, 1.0]), SentimentLabel::Neutral);
        data.push(SparseVector::from_dense(&[0.0, 0.0, 4.0]), SentimentLabel::Negative);
        data.push(SparseVector::from_dense(&[1.0, 0.0, 2.0]), SentimentLabel::Negative);
        data
    }

    #[test]
    fn test_smoothed_estimates() {
        let mut model = MultinomialNaiveBayes::new(1.0).unwrap();
        model.fit(&word_counts()).unwrap();

        // Positive totals: great=5, fine=1, awful=0 -> (5+1)/(6+3)
        let positive = SentimentLabel::Positive.index();
        let expected = (6.0_f64 / 9.0).ln();
        assert!((model.feature_log_prob[positive][0] - expected).abs() < 1e-12);
        assert!((model.class_log_prior[positive] - (1.0_f64 / 3.0).ln()).abs() < 1e-12);
    }

    #[test]
    fn test_predict() {
        let mut model = MultinomialNaiveBayes::new(0.5).unwrap();
        model.fit(&word_counts()).unwrap();

        assert_eq!(
            model.predict(&SparseVector::from_dense(&[2.0, 0.0, 0.0])).unwrap(),
            SentimentLabel::Positive
        );
        assert_eq!(
            model.predict(&SparseVector::from_dense(&[0.0, 0.0, 2.0])).unwrap(),
            SentimentLabel::Negative
        );
        match model.scores(&SparseVector::from_dense(&[0.0, 2.0, 0.0])).unwrap() {
            ClassScores::Probabilities(p) => {
                assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-12);
                assert_eq!(crate::model::argmax(&p), SentimentLabel::Neutral.index());
            }
            other => panic!("unexpected scores {other:?}"),
        }
    }

    #[test]
    fn test_rejects_negative_features() {
        let mut data = word_counts();
        data.push(SparseVector::from_dense(&[-1.0, 0.0, 0.0]), SentimentLabel::Neutral);
        let mut model = MultinomialNaiveBayes::new(1.0).unwrap();
        assert!(matches!(
            model.fit(&data),
            Err(VerdictError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_invalid_alpha() {
        assert!(MultinomialNaiveBayes::new(0.0).is_err());
        assert!(MultinomialNaiveBayes::from_params(&ParamSet::new().with("alpha", -1.0)).is_err());
    }
}
