//! Class balancing by synthetic minority oversampling.
//!
//! [`SmoteBalancer`] grows every minority class up to the majority count by
//! interpolating between a class member and one of its nearest same-class
//! neighbors. It is applied to the training partition only.

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::BalancerConfig;
use crate::error::{Result, VerdictError};
use crate::feature::SparseVector;
use crate::types::{LabeledSet, SentimentLabel};

/// SMOTE-style oversampler.
#[derive(Debug, Clone)]
pub struct SmoteBalancer {
    k_neighbors: usize,
    seed: u64,
}

impl SmoteBalancer {
    pub fn new(k_neighbors: usize, seed: u64) -> Self {
        SmoteBalancer { k_neighbors, seed }
    }

    pub fn from_config(config: &BalancerConfig) -> Self {
        Self::new(config.k_neighbors, config.seed)
    }

    pub fn k_neighbors(&self) -> usize {
        self.k_neighbors
    }

    /// Return a copy of `data` with every present minority class oversampled
    /// to the majority count. Synthetic samples follow the originals.
    ///
    /// A label with no samples at all stays absent.
    pub fn balance(&self, data: &LabeledSet) -> Result<LabeledSet> {
        if self.k_neighbors == 0 {
            return Err(VerdictError::invalid_config(
                "k_neighbors must be at least 1",
            ));
        }

        let counts = data.class_counts();
        let target = counts.iter().copied().max().unwrap_or(0);

        // Validate every class before generating anything.
        for label in SentimentLabel::ALL {
            let count = counts[label.index()];
            if count > 0 && count < target && count < self.k_neighbors + 1 {
                return Err(VerdictError::invalid_config(format!(
                    "class {label} has {count} samples; oversampling with k_neighbors={} needs at least {}",
                    self.k_neighbors,
                    self.k_neighbors + 1
                )));
            }
        }

        let mut balanced = data.clone();
        if counts.iter().all(|&count| count == 0 || count == target) {
            debug!("classes already balanced at {target} samples each");
            return Ok(balanced);
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        for label in SentimentLabel::ALL {
            let count = counts[label.index()];
            if count == 0 || count == target {
                continue;
            }

            let members: Vec<&SparseVector> = data
                .vectors
                .iter()
                .zip(&data.labels)
                .filter(|(_, l)| **l == label)
                .map(|(v, _)| v)
                .collect();

            let mut neighbors: Vec<Option<Vec<usize>>> = vec![None; members.len()];
            let needed = target - count;
            for _ in 0..needed {
                let sample = rng.random_range(0..members.len());
                let nearest = neighbors[sample]
                    .get_or_insert_with(|| nearest_neighbors(&members, sample, self.k_neighbors));
                let neighbor = nearest[rng.random_range(0..nearest.len())];
                let gap: f64 = rng.random();
                balanced.push(members[sample].interpolate(members[neighbor], gap), label);
            }

            info!("oversampled {label}: {count} -> {target} ({needed} synthetic)");
        }

        Ok(balanced)
    }
}

impl Default for SmoteBalancer {
    fn default() -> Self {
        Self::from_config(&BalancerConfig::default())
    }
}

/// Indices of the `k` members closest to `members[sample]`, excluding itself.
/// Equal distances are ordered by index.
fn nearest_neighbors(members: &[&SparseVector], sample: usize, k: usize) -> Vec<usize> {
    let origin = members[sample];
    let mut distances: Vec<(f64, usize)> = members
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != sample)
        .map(|(i, v)| (origin.squared_distance(v), i))
        .collect();
    distances.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    distances.into_iter().take(k).map(|(_, i)| i).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(x: f64, y: f64) -> SparseVector {
        SparseVector::from_dense(&[x, y])
    }

    fn skewed_set() -> LabeledSet {
        let mut set = LabeledSet::default();
        for i in 0..20 {
            set.push(point(1.0, i as f64 * 0.1), SentimentLabel::Positive);
        }
        for i in 0..8 {
            set.push(point(-1.0, i as f64 * 0.1), SentimentLabel::Negative);
        }
        for i in 0..6 {
            set.push(point(0.0, 1.0 + i as f64), SentimentLabel::Neutral);
        }
        set
    }

    #[test]
    fn test_counts_equal_majority() {
        let data = skewed_set();
        let balanced = SmoteBalancer::new(5, 42).balance(&data).unwrap();
        assert_eq!(balanced.class_counts(), [20, 20, 20]);
        // originals come first, unchanged
        assert_eq!(&balanced.vectors[..data.len()], &data.vectors[..]);
        assert_eq!(&balanced.labels[..data.len()], &data.labels[..]);
    }

    #[test]
    fn test_synthetic_points_lie_between_members() {
        let data = skewed_set();
        let balanced = SmoteBalancer::new(3, 7).balance(&data).unwrap();
        for (vector, label) in balanced.vectors.iter().zip(&balanced.labels).skip(data.len()) {
            let dense = vector.to_dense();
            match label {
                SentimentLabel::Negative => {
                    assert!((dense[0] + 1.0).abs() < 1e-12);
                    assert!((0.0..=0.7 + 1e-12).contains(&dense[1]));
                }
                SentimentLabel::Neutral => {
                    assert!(dense[0].abs() < 1e-12);
                    assert!((1.0 - 1e-12..=6.0 + 1e-12).contains(&dense[1]));
                }
                SentimentLabel::Positive => panic!("majority class must not be oversampled"),
            }
        }
    }

    #[test]
    fn test_deterministic_for_seed() {
        let data = skewed_set();
        let a = SmoteBalancer::new(5, 42).balance(&data).unwrap();
        let b = SmoteBalancer::new(5, 42).balance(&data).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_balanced_input_is_noop() {
        let mut data = LabeledSet::default();
        for label in SentimentLabel::ALL {
            for i in 0..3 {
                data.push(point(label.index() as f64, i as f64), label);
            }
        }
        let balanced = SmoteBalancer::new(5, 42).balance(&data).unwrap();
        assert_eq!(balanced, data);
    }

    #[test]
    fn test_too_small_minority_class() {
        let data = skewed_set();
        let mut tiny = LabeledSet::default();
        for (vector, label) in data.vectors.iter().zip(&data.labels) {
            if *label != SentimentLabel::Neutral {
                tiny.push(vector.clone(), *label);
            }
        }
        tiny.push(point(0.0, 1.0), SentimentLabel::Neutral);
        tiny.push(point(0.0, 2.0), SentimentLabel::Neutral);

        let result = SmoteBalancer::new(5, 42).balance(&tiny);
        assert!(matches!(result, Err(VerdictError::InvalidConfig(_))));
    }

    #[test]
    fn test_neighbor_ties_break_by_index() {
        let a = point(0.0, 0.0);
        let b = point(1.0, 0.0);
        let c = point(-1.0, 0.0);
        let d = point(0.0, 1.0);
        let members = vec![&a, &b, &c, &d];
        assert_eq!(nearest_neighbors(&members, 0, 2), vec![1, 2]);
        assert_eq!(nearest_neighbors(&members, 0, 5), vec![1, 2, 3]);
    }
}
