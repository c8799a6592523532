//! One-vs-rest linear support vector machine.
//!
//! Each binary problem is solved in the dual by coordinate descent
//! (Hsieh et al., 2008). The intercept is learned as the weight of a constant
//! feature equal to 1, so it is regularized together with `w`. Training stops
//! once the spread of projected gradients in a pass is at most `0.1`; a fit
//! that has not reached it after `max_iter` passes is a convergence error.
//!
//! | loss | upper bound `U` | diagonal `D` |
//! |---|---|---|
//! | hinge | `C` | 0 |
//! | squared hinge | unbounded | `1 / (2C)` |

use std::fmt;
use std::str::FromStr;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VerdictError};
use crate::feature::SparseVector;
use crate::model::params::ParamSet;
use crate::model::{Classifier, ClassScores, ModelFamily, N_CLASSES, check_training_data};
use crate::types::LabeledSet;

/// SVM loss function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SvmLoss {
    Hinge,
    SquaredHinge,
}

impl FromStr for SvmLoss {
    type Err = VerdictError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "hinge" => Ok(SvmLoss::Hinge),
            "squared_hinge" => Ok(SvmLoss::SquaredHinge),
            _ => Err(VerdictError::invalid_config(format!(
                "unknown loss {s}; expected hinge or squared_hinge"
            ))),
        }
    }
}

impl fmt::Display for SvmLoss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SvmLoss::Hinge => f.write_str("hinge"),
            SvmLoss::SquaredHinge => f.write_str("squared_hinge"),
        }
    }
}

/// One-vs-rest linear SVM exposing per-class margins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearSvm {
    c: f64,
    loss: SvmLoss,
    max_iter: usize,
    seed: u64,
    tol: f64,
    weights: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
}

impl LinearSvm {
    pub fn new(c: f64, loss: SvmLoss, max_iter: usize, seed: u64) -> Result<Self> {
        if !(c.is_finite() && c > 0.0) {
            return Err(VerdictError::invalid_config(format!(
                "C must be positive, got {c}"
            )));
        }
        if max_iter == 0 {
            return Err(VerdictError::invalid_config("max_iter must be at least 1"));
        }
        Ok(LinearSvm {
            c,
            loss,
            max_iter,
            seed,
            tol: 0.1,
            weights: Vec::new(),
            intercepts: Vec::new(),
        })
    }

    /// Build from a grid point with `c` and `loss` entries.
    pub fn from_params(params: &ParamSet, max_iter: usize, seed: u64) -> Result<Self> {
        params.check_known("linear_svm", &["c", "loss"])?;
        let c = params.float_or("c", 1.0)?;
        let loss = params.text_or("loss", "squared_hinge")?.parse()?;
        Self::new(c, loss, max_iter, seed)
    }

    pub fn c(&self) -> f64 {
        self.c
    }

    pub fn loss(&self) -> SvmLoss {
        self.loss
    }

    /// Signed decision value of every class.
    pub fn margins(&self, vector: &SparseVector) -> [f64; N_CLASSES] {
        let mut margins = [0.0; N_CLASSES];
        for (class, margin) in margins.iter_mut().enumerate() {
            *margin = vector.dot_dense(&self.weights[class]) + self.intercepts[class];
        }
        margins
    }

    fn fit_binary(
        &self,
        vectors: &[SparseVector],
        signs: &[f64],
        dimension: usize,
        rng: &mut StdRng,
    ) -> Result<(Vec<f64>, f64)> {
        let (upper, diagonal) = match self.loss {
            SvmLoss::Hinge => (self.c, 0.0),
            SvmLoss::SquaredHinge => (f64::INFINITY, 0.5 / self.c),
        };

        let n = vectors.len();
        let q_diag: Vec<f64> = vectors
            .iter()
            .map(|x| x.squared_norm() + 1.0 + diagonal)
            .collect();
        let mut alpha = vec![0.0; n];
        let mut w = vec![0.0; dimension];
        let mut b = 0.0;
        let mut order: Vec<usize> = (0..n).collect();
        let mut converged = false;

        for _ in 0..self.max_iter {
            order.shuffle(rng);
            let mut pg_max = f64::NEG_INFINITY;
            let mut pg_min = f64::INFINITY;

            for &i in &order {
                let x = &vectors[i];
                let y = signs[i];
                let gradient = y * (x.dot_dense(&w) + b) - 1.0 + diagonal * alpha[i];

                let projected = if alpha[i] == 0.0 {
                    gradient.min(0.0)
                } else if alpha[i] == upper {
                    gradient.max(0.0)
                } else {
                    gradient
                };
                pg_max = pg_max.max(projected);
                pg_min = pg_min.min(projected);

                if projected.abs() > 1e-12 {
                    let old = alpha[i];
                    alpha[i] = (old - gradient / q_diag[i]).clamp(0.0, upper);
                    let delta = (alpha[i] - old) * y;
                    for (index, value) in x.iter() {
                        w[index] += delta * value;
                    }
                    b += delta;
                }
            }

            if !b.is_finite() || w.iter().any(|v| !v.is_finite()) {
                return Err(VerdictError::convergence(format!(
                    "linear SVM (C={}, loss={}) produced non-finite weights",
                    self.c, self.loss
                )));
            }
            if pg_max - pg_min <= self.tol {
                converged = true;
                break;
            }
        }

        if !converged {
            return Err(VerdictError::convergence(format!(
                "linear SVM (C={}, loss={}) did not converge in {} iterations",
                self.c, self.loss, self.max_iter
            )));
        }
        Ok((w, b))
    }
}

impl Classifier for LinearSvm {
    fn fit(&mut self, data: &LabeledSet) -> Result<()> {
        check_training_data(data)?;
        let dimension = data.dimension();
        let mut rng = StdRng::seed_from_u64(self.seed);

        let mut weights = Vec::with_capacity(N_CLASSES);
        let mut intercepts = Vec::with_capacity(N_CLASSES);
        for class in 0..N_CLASSES {
            let signs: Vec<f64> = data
                .labels
                .iter()
                .map(|label| if label.index() == class { 1.0 } else { -1.0 })
                .collect();
            let (w, b) = self.fit_binary(&data.vectors, &signs, dimension, &mut rng)?;
            weights.push(w);
            intercepts.push(b);
        }

        self.weights = weights;
        self.intercepts = intercepts;
        Ok(())
    }

    fn scores(&self, vector: &SparseVector) -> Result<ClassScores> {
        if !self.is_trained() {
            return Err(VerdictError::not_trained("linear SVM"));
        }
        Ok(ClassScores::Margins(self.margins(vector)))
    }

    fn is_trained(&self) -> bool {
        self.weights.len() == N_CLASSES
    }

    fn family(&self) -> ModelFamily {
        ModelFamily::LinearSvm
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SentimentLabel;

    fn clusters() -> LabeledSet {
        let mut data = LabeledSet::default();
        for i in 0..8 {
            let jitter = i as f64 * 0.02;
            data.push(SparseVector::from_dense(&[1.0, jitter, 0.0]), SentimentLabel::Negative);
            data.push(SparseVector::from_dense(&[jitter, 1.0, 0.0]), SentimentLabel::Neutral);
            data.push(SparseVector::from_dense(&[0.0, jitter, 1.0]), SentimentLabel::Positive);
        }
        data
    }

    #[test]
    fn test_fit_both_losses() {
        for loss in [SvmLoss::Hinge, SvmLoss::SquaredHinge] {
            let mut model = LinearSvm::new(1.0, loss, 1000, 42).unwrap();
            model.fit(&clusters()).unwrap();

            let data = clusters();
            for (vector, label) in data.vectors.iter().zip(&data.labels) {
                assert_eq!(model.predict(vector).unwrap(), *label, "loss {loss}");
            }
            match model.scores(&SparseVector::from_dense(&[0.0, 0.0, 1.0])).unwrap() {
                ClassScores::Margins(m) => assert!(m[2] > 0.0 && m[0] < 0.0),
                other => panic!("unexpected scores {other:?}"),
            }
        }
    }

    #[test]
    fn test_seeded_fit_is_reproducible() {
        let mut a = LinearSvm::new(10.0, SvmLoss::Hinge, 1000, 7).unwrap();
        let mut b = LinearSvm::new(10.0, SvmLoss::Hinge, 1000, 7).unwrap();
        a.fit(&clusters()).unwrap();
        b.fit(&clusters()).unwrap();
        let probe = SparseVector::from_dense(&[0.3, 0.2, 0.5]);
        assert_eq!(a.margins(&probe), b.margins(&probe));
    }

    #[test]
    fn test_iteration_cap_is_a_convergence_error() {
        let mut model = LinearSvm::new(10.0, SvmLoss::Hinge, 1, 42).unwrap();
        assert!(matches!(
            model.fit(&clusters()),
            Err(VerdictError::Convergence(_))
        ));
    }

    #[test]
    fn test_params() {
        let params = ParamSet::new().with("c", 0.1).with("loss", "hinge");
        let model = LinearSvm::from_params(&params, 100, 42).unwrap();
        assert_eq!(model.loss(), SvmLoss::Hinge);
        assert_eq!(model.c(), 0.1);

        let bad = ParamSet::new().with("loss", "log");
        assert!(LinearSvm::from_params(&bad, 100, 42).is_err());
        let unknown = ParamSet::new().with("gamma", 1.0);
        assert!(LinearSvm::from_params(&unknown, 100, 42).is_err());
    }
}
