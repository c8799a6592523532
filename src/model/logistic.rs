//! One-vs-rest logistic regression.
//!
//! Each class gets a binary model minimizing
//! `C * sum(log_loss) + R(w)` with `R = 0.5 * |w|^2` (l2) or `|w|_1` (l1).
//! The intercept is not regularized. Optimization is accelerated proximal
//! gradient descent with a fixed step of `1 / L`, where `L` bounds the
//! Lipschitz constant of the smooth part. A fit that does not meet the
//! tolerance within `max_iter` iterations fails with a convergence error.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VerdictError};
use crate::feature::SparseVector;
use crate::model::params::ParamSet;
use crate::model::{Classifier, ClassScores, ModelFamily, N_CLASSES, check_training_data, sigmoid};
use crate::types::LabeledSet;

const POWER_ITERATIONS: usize = 30;

/// Regularization penalty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Penalty {
    L1,
    L2,
}

impl FromStr for Penalty {
    type Err = VerdictError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "l1" => Ok(Penalty::L1),
            "l2" => Ok(Penalty::L2),
            _ => Err(VerdictError::invalid_config(format!(
                "unknown penalty {s}; expected l1 or l2"
            ))),
        }
    }
}

impl fmt::Display for Penalty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Penalty::L1 => f.write_str("l1"),
            Penalty::L2 => f.write_str("l2"),
        }
    }
}

/// One-vs-rest logistic regression over sparse vectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    c: f64,
    penalty: Penalty,
    max_iter: usize,
    tol: f64,
    /// Per-class weights, in label order.
    coefficients: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
}

impl LogisticRegression {
    pub fn new(c: f64, penalty: Penalty, max_iter: usize) -> Result<Self> {
        if !(c.is_finite() && c > 0.0) {
            return Err(VerdictError::invalid_config(format!(
                "C must be positive, got {c}"
            )));
        }
        if max_iter == 0 {
            return Err(VerdictError::invalid_config("max_iter must be at least 1"));
        }
        Ok(LogisticRegression {
            c,
            penalty,
            max_iter,
            tol: 1e-4,
            coefficients: Vec::new(),
            intercepts: Vec::new(),
        })
    }

    /// Build from a grid point with `c` and `penalty` entries.
    pub fn from_params(params: &ParamSet, max_iter: usize) -> Result<Self> {
        params.check_known("logistic_regression", &["c", "penalty"])?;
        let c = params.float_or("c", 1.0)?;
        let penalty = params.text_or("penalty", "l2")?.parse()?;
        Self::new(c, penalty, max_iter)
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    pub fn c(&self) -> f64 {
        self.c
    }

    pub fn penalty(&self) -> Penalty {
        self.penalty
    }

    pub fn coefficients(&self) -> &[Vec<f64>] {
        &self.coefficients
    }

    fn decision(&self, class: usize, vector: &SparseVector) -> f64 {
        vector.dot_dense(&self.coefficients[class]) + self.intercepts[class]
    }

    /// Upper estimate of the largest eigenvalue of `X^T X` with a bias column.
    fn spectral_bound(vectors: &[SparseVector], dimension: usize) -> f64 {
        let trace: f64 = vectors.iter().map(|x| x.squared_norm() + 1.0).sum();

        let mut v = vec![1.0; dimension + 1];
        let mut estimate = 0.0;
        for _ in 0..POWER_ITERATIONS {
            let mut next = vec![0.0; dimension + 1];
            for x in vectors {
                let u = x.dot_dense(&v[..dimension]) + v[dimension];
                for (index, value) in x.iter() {
                    next[index] += u * value;
                }
                next[dimension] += u;
            }
            let norm = next.iter().map(|a| a * a).sum::<f64>().sqrt();
            let v_norm = v.iter().map(|a| a * a).sum::<f64>().sqrt();
            if norm == 0.0 || v_norm == 0.0 {
                break;
            }
            estimate = norm / v_norm;
            v = next.into_iter().map(|a| a / norm).collect();
        }
        (estimate * 1.1).min(trace).max(f64::MIN_POSITIVE)
    }

    /// Fit one binary model; `targets[i]` is 1.0 for the positive class.
    fn fit_binary(
        &self,
        vectors: &[SparseVector],
        targets: &[f64],
        dimension: usize,
        lipschitz: f64,
    ) -> Result<(Vec<f64>, f64)> {
        let step = 1.0 / lipschitz;
        let mut w = vec![0.0; dimension];
        let mut b = 0.0;
        let mut y_w = w.clone();
        let mut y_b = b;
        let mut t: f64 = 1.0;
        let mut converged = false;

        for _ in 0..self.max_iter {
            let mut grad_w = vec![0.0; dimension];
            let mut grad_b = 0.0;
            for (x, target) in vectors.iter().zip(targets) {
                let z = x.dot_dense(&y_w) + y_b;
                let residual = self.c * (sigmoid(z) - target);
                for (index, value) in x.iter() {
                    grad_w[index] += residual * value;
                }
                grad_b += residual;
            }
            if self.penalty == Penalty::L2 {
                for (g, w) in grad_w.iter_mut().zip(&y_w) {
                    *g += w;
                }
            }

            let mut next_w: Vec<f64> = y_w
                .iter()
                .zip(&grad_w)
                .map(|(w, g)| w - step * g)
                .collect();
            if self.penalty == Penalty::L1 {
                for w in &mut next_w {
                    *w = soft_threshold(*w, step);
                }
            }
            let next_b = y_b - step * grad_b;

            if !next_b.is_finite() || next_w.iter().any(|w| !w.is_finite()) {
                return Err(VerdictError::convergence(format!(
                    "logistic regression (C={}, penalty={}) produced non-finite weights",
                    self.c, self.penalty
                )));
            }

            let mut change = (next_b - b).abs();
            let mut scale: f64 = b.abs();
            for (new, old) in next_w.iter().zip(&w) {
                change = change.max((new - old).abs());
                scale = scale.max(new.abs());
            }

            let next_t = (1.0 + (1.0 + 4.0 * t * t).sqrt()) / 2.0;
            let momentum = (t - 1.0) / next_t;
            y_w = next_w
                .iter()
                .zip(&w)
                .map(|(new, old)| new + momentum * (new - old))
                .collect();
            y_b = next_b + momentum * (next_b - b);

            w = next_w;
            b = next_b;
            t = next_t;

            if change <= self.tol * scale.max(1.0) {
                converged = true;
                break;
            }
        }

        if !converged {
            return Err(VerdictError::convergence(format!(
                "logistic regression (C={}, penalty={}) did not converge in {} iterations",
                self.c, self.penalty, self.max_iter
            )));
        }
        Ok((w, b))
    }
}

fn soft_threshold(value: f64, threshold: f64) -> f64 {
    if value > threshold {
        value - threshold
    } else if value < -threshold {
        value + threshold
    } else {
        0.0
    }
}

impl Classifier for LogisticRegression {
    fn fit(&mut self, data: &LabeledSet) -> Result<()> {
        check_training_data(data)?;
        let dimension = data.dimension();
        let mut lipschitz = 0.25 * self.c * Self::spectral_bound(&data.vectors, dimension);
        if self.penalty == Penalty::L2 {
            lipschitz += 1.0;
        }

        let mut coefficients = Vec::with_capacity(N_CLASSES);
        let mut intercepts = Vec::with_capacity(N_CLASSES);
        for class in 0..N_CLASSES {
            let targets: Vec<f64> = data
                .labels
                .iter()
                .map(|label| if label.index() == class { 1.0 } else { 0.0 })
                .collect();
            let (w, b) = self.fit_binary(&data.vectors, &targets, dimension, lipschitz)?;
            coefficients.push(w);
            intercepts.push(b);
        }

        self.coefficients = coefficients;
        self.intercepts = intercepts;
        Ok(())
    }

    fn scores(&self, vector: &SparseVector) -> Result<ClassScores> {
        if !self.is_trained() {
            return Err(VerdictError::not_trained("logistic regression"));
        }
        let mut probabilities = [0.0; N_CLASSES];
        for (class, p) in probabilities.iter_mut().enumerate() {
            *p = sigmoid(self.decision(class, vector));
        }
        let total: f64 = probabilities.iter().sum();
        if total > 0.0 {
            for p in &mut probabilities {
                *p /= total;
            }
        }
        Ok(ClassScores::Probabilities(probabilities))
    }

    fn is_trained(&self) -> bool {
        self.coefficients.len() == N_CLASSES
    }

    fn family(&self) -> ModelFamily {
        ModelFamily::LogisticRegression
    }
}
