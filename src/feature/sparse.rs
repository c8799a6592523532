//! Sparse feature vectors.

use serde::{Deserialize, Serialize};

/// A sparse vector with sorted, unique indices and non-zero values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    dimension: usize,
    indices: Vec<usize>,
    values: Vec<f64>,
}

impl SparseVector {
    /// The all-zero vector of the given dimension.
    pub fn zeros(dimension: usize) -> Self {
        SparseVector {
            dimension,
            indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Build a vector from `(index, value)` pairs.
    ///
    /// Pairs are sorted, duplicate indices are summed, zeros and indices
    /// outside `dimension` are dropped.
    pub fn from_pairs(dimension: usize, mut pairs: Vec<(usize, f64)>) -> Self {
        pairs.sort_by_key(|&(index, _)| index);

        let mut indices = Vec::with_capacity(pairs.len());
        let mut values: Vec<f64> = Vec::with_capacity(pairs.len());
        for (index, value) in pairs {
            if index >= dimension {
                continue;
            }
            if indices.last() == Some(&index) {
                if let Some(last) = values.last_mut() {
                    *last += value;
                }
            } else {
                indices.push(index);
                values.push(value);
            }
        }

        let mut vector = SparseVector {
            dimension,
            indices,
            values,
        };
        vector.prune_zeros();
        vector
    }

    /// Build a sparse vector from a dense slice.
    pub fn from_dense(dense: &[f64]) -> Self {
        let pairs = dense
            .iter()
            .enumerate()
            .filter(|(_, value)| **value != 0.0)
            .map(|(index, value)| (index, *value))
            .collect();
        Self::from_pairs(dense.len(), pairs)
    }

    fn prune_zeros(&mut self) {
        let mut keep = 0;
        for i in 0..self.indices.len() {
            if self.values[i] != 0.0 {
                self.indices[keep] = self.indices[i];
                self.values[keep] = self.values[i];
                keep += 1;
            }
        }
        self.indices.truncate(keep);
        self.values.truncate(keep);
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of stored (non-zero) entries.
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn is_zero(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Iterate over `(index, value)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    /// Value at `index` (zero when not stored).
    pub fn get(&self, index: usize) -> f64 {
        match self.indices.binary_search(&index) {
            Ok(pos) => self.values[pos],
            Err(_) => 0.0,
        }
    }

    pub fn to_dense(&self) -> Vec<f64> {
        let mut dense = vec![0.0; self.dimension];
        for (index, value) in self.iter() {
            dense[index] = value;
        }
        dense
    }

    /// Dot product with a dense weight vector.
    pub fn dot_dense(&self, weights: &[f64]) -> f64 {
        self.iter()
            .map(|(index, value)| weights.get(index).copied().unwrap_or(0.0) * value)
            .sum()
    }

    /// Dot product of two sparse vectors.
    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.indices.len() && j < other.indices.len() {
            match self.indices[i].cmp(&other.indices[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += self.values[i] * other.values[j];
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    pub fn squared_norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum()
    }

    pub fn norm(&self) -> f64 {
        self.squared_norm().sqrt()
    }

    /// Scale to unit L2 norm; the zero vector is left unchanged.
    pub fn l2_normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            for value in &mut self.values {
                *value /= norm;
            }
        }
    }

    /// Squared Euclidean distance.
    pub fn squared_distance(&self, other: &SparseVector) -> f64 {
        (self.squared_norm() + other.squared_norm() - 2.0 * self.dot(other)).max(0.0)
    }

    /// `self + gap * (other - self)`.
    pub fn interpolate(&self, other: &SparseVector, gap: f64) -> SparseVector {
        let mut pairs: Vec<(usize, f64)> = self
            .iter()
            .map(|(index, value)| (index, value * (1.0 - gap)))
            .collect();
        pairs.extend(other.iter().map(|(index, value)| (index, value * gap)));
        SparseVector::from_pairs(self.dimension.max(other.dimension), pairs)
    }

    /// Whether every stored value is finite and non-negative.
    pub fn is_non_negative(&self) -> bool {
        self.values.iter().all(|v| v.is_finite() && *v >= 0.0)
    }
}
