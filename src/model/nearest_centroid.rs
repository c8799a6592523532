//! Nearest-centroid classifier.
//!
//! Each class is represented by the mean of its training vectors; a vector
//! is assigned to the closest centroid. Only the label is exposed, so the
//! predictor reports no confidence for this family.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VerdictError};
use crate::feature::SparseVector;
use crate::model::params::ParamSet;
use crate::model::{Classifier, ClassScores, ModelFamily, N_CLASSES, check_training_data};
use crate::types::{LabeledSet, SentimentLabel};

/// Distance used to find the closest centroid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CentroidMetric {
    Cosine,
    Euclidean,
}

impl FromStr for CentroidMetric {
    type Err = VerdictError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "cosine" => Ok(CentroidMetric::Cosine),
            "euclidean" => Ok(CentroidMetric::Euclidean),
            _ => Err(VerdictError::invalid_config(format!(
                "unknown metric {s}; expected cosine or euclidean"
            ))),
        }
    }
}

impl fmt::Display for CentroidMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CentroidMetric::Cosine => f.write_str("cosine"),
            CentroidMetric::Euclidean => f.write_str("euclidean"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearestCentroid {
    metric: CentroidMetric,
    /// One centroid per label; `None` for labels absent from training.
    centroids: Vec<Option<SparseVector>>,
}

impl NearestCentroid {
    pub fn new(metric: CentroidMetric) -> Self {
        NearestCentroid {
            metric,
            centroids: Vec::new(),
        }
    }

    pub fn from_params(params: &ParamSet) -> Result<Self> {
        params.check_known("nearest_centroid", &["metric"])?;
        Ok(Self::new(params.text_or("metric", "cosine")?.parse()?))
    }

    pub fn metric(&self) -> CentroidMetric {
        self.metric
    }

    /// Similarity to a centroid; larger is closer.
    fn similarity(&self, vector: &SparseVector, centroid: &SparseVector) -> f64 {
        match self.metric {
            CentroidMetric::Cosine => {
                let norms = vector.norm() * centroid.norm();
                if norms == 0.0 {
                    0.0
                } else {
                    vector.dot(centroid) / norms
                }
            }
            CentroidMetric::Euclidean => -vector.squared_distance(centroid),
        }
    }
}

impl Classifier for NearestCentroid {
    fn fit(&mut self, data: &LabeledSet) -> Result<()> {
        check_training_data(data)?;
        let dimension = data.dimension();

        let mut sums = vec![vec![0.0; dimension]; N_CLASSES];
        let mut counts = [0usize; N_CLASSES];
        for (vector, label) in data.vectors.iter().zip(&data.labels) {
            for (index, value) in vector.iter() {
                sums[label.index()][index] += value;
            }
            counts[label.index()] += 1;
        }

        self.centroids = sums
            .into_iter()
            .zip(counts)
            .map(|(sum, count)| {
                (count > 0).then(|| {
                    let mean: Vec<f64> = sum.iter().map(|v| v / count as f64).collect();
                    SparseVector::from_dense(&mean)
                })
            })
            .collect();
        Ok(())
    }

    fn scores(&self, vector: &SparseVector) -> Result<ClassScores> {
        if !self.is_trained() {
            return Err(VerdictError::not_trained("nearest centroid"));
        }

        let mut best: Option<(SentimentLabel, f64)> = None;
        for label in SentimentLabel::ALL {
            let Some(centroid) = &self.centroids[label.index()] else {
                continue;
            };
            let similarity = self.similarity(vector, centroid);
            if best.is_none_or(|(_, score)| similarity > score) {
                best = Some((label, similarity));
            }
        }

        let (label, _) =
            best.ok_or_else(|| VerdictError::not_trained("nearest centroid has no centroids"))?;
        Ok(ClassScores::Opaque(label))
    }

    fn is_trained(&self) -> bool {
        self.centroids.len() == N_CLASSES
    }

    fn family(&self) -> ModelFamily {
        ModelFamily::NearestCentroid
    }
}
