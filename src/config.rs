//! Training configuration.
//!
//! Every stage of a training run has its own section. All sections have
//! defaults matching the reference pipeline, and the whole tree can be read
//! from a JSON file where any omitted field keeps its default:
//!
//! ```
//! use verdict::config::TrainingConfig;
//!
//! let config = TrainingConfig::from_json(r#"{ "vectorizer": { "min_df": 2 } }"#).unwrap();
//! assert_eq!(config.vectorizer.min_df, 2);
//! assert_eq!(config.selection.folds, 5);
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VerdictError};

/// Feature extractor settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorizerConfig {
    /// Minimum number of documents a term must appear in.
    pub min_df: usize,
    /// Maximum fraction of documents a term may appear in.
    pub max_df: f64,
    /// Inclusive n-gram range.
    pub ngram_range: (usize, usize),
    /// Use `1 + ln(count)` instead of raw counts.
    pub sublinear_tf: bool,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        VectorizerConfig {
            min_df: 5,
            max_df: 0.8,
            ngram_range: (1, 2),
            sublinear_tf: true,
        }
    }
}

impl VectorizerConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.max_df > 0.0 && self.max_df <= 1.0) {
            return Err(VerdictError::invalid_config(format!(
                "max_df must be in (0, 1], got {}",
                self.max_df
            )));
        }
        let (min_n, max_n) = self.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(VerdictError::invalid_config(format!(
                "invalid ngram_range ({min_n}, {max_n})"
            )));
        }
        Ok(())
    }
}

/// Synthetic minority oversampling settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalancerConfig {
    pub enabled: bool,
    pub k_neighbors: usize,
    pub seed: u64,
}

impl Default for BalancerConfig {
    fn default() -> Self {
        BalancerConfig {
            enabled: true,
            k_neighbors: 5,
            seed: 42,
        }
    }
}

/// Grid search and model selection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Number of cross-validation folds.
    pub folds: usize,
    /// Evaluate grid points in parallel.
    pub parallel: bool,
    /// Also compete the nearest-centroid family.
    pub include_nearest_centroid: bool,
    /// Seed for solvers that shuffle.
    pub seed: u64,
    /// Iteration cap for iterative solvers.
    pub max_iter: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        SelectionConfig {
            folds: 5,
            parallel: true,
            include_nearest_centroid: false,
            seed: 42,
            max_iter: 1000,
        }
    }
}

/// Train/test split settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    pub test_fraction: f64,
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        SplitConfig {
            test_fraction: 0.2,
            seed: 42,
        }
    }
}

impl SplitConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(VerdictError::invalid_config(format!(
                "test_fraction must be in (0, 1), got {}",
                self.test_fraction
            )));
        }
        Ok(())
    }
}

/// Review CSV layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    pub summary_column: String,
    pub body_column: String,
    pub rating_column: String,
    pub delimiter: char,
    pub flexible: bool,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        CorpusConfig {
            summary_column: "Summary".to_string(),
            body_column: "Review".to_string(),
            rating_column: "Rate".to_string(),
            delimiter: ',',
            flexible: true,
        }
    }
}

/// Complete configuration of a training run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub corpus: CorpusConfig,
    pub split: SplitConfig,
    pub vectorizer: VectorizerConfig,
    pub balancer: BalancerConfig,
    pub selection: SelectionConfig,
}

impl TrainingConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: TrainingConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    pub fn validate(&self) -> Result<()> {
        self.split.validate()?;
        self.vectorizer.validate()?;
        if self.selection.folds < 2 {
            return Err(VerdictError::invalid_config(format!(
                "at least 2 folds are required, got {}",
                self.selection.folds
            )));
        }
        if self.balancer.k_neighbors == 0 {
            return Err(VerdictError::invalid_config(
                "k_neighbors must be at least 1",
            ));
        }
        if !self.corpus.delimiter.is_ascii() {
            return Err(VerdictError::invalid_config(format!(
                "CSV delimiter must be ASCII, got {:?}",
                self.corpus.delimiter
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TrainingConfig::default();
        assert_eq!(config.vectorizer.min_df, 5);
        assert_eq!(config.vectorizer.max_df, 0.8);
        assert_eq!(config.vectorizer.ngram_range, (1, 2));
        assert_eq!(config.balancer.k_neighbors, 5);
        assert_eq!(config.split.test_fraction, 0.2);
        assert_eq!(config.split.seed, 42);
        assert_eq!(config.corpus.rating_column, "Rate");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config =
            TrainingConfig::from_json(r#"{"split": {"test_fraction": 0.25}, "balancer": {"enabled": false}}"#)
                .unwrap();
        assert_eq!(config.split.test_fraction, 0.25);
        assert_eq!(config.split.seed, 42);
        assert!(!config.balancer.enabled);
        assert_eq!(config.balancer.k_neighbors, 5);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            TrainingConfig::from_json(r#"{"split": {"test_fraction": 1.5}}"#),
            Err(VerdictError::InvalidConfig(_))
        ));
        assert!(matches!(
            TrainingConfig::from_json(r#"{"vectorizer": {"max_df": 0.0}}"#),
            Err(VerdictError::InvalidConfig(_))
        ));
        assert!(matches!(
            TrainingConfig::from_json(r#"{"selection": {"folds": 1}}"#),
            Err(VerdictError::InvalidConfig(_))
        ));
        assert!(matches!(
            TrainingConfig::from_json("not json"),
            Err(VerdictError::Json(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"selection": {"folds": 3}}"#).unwrap();
        let config = TrainingConfig::load(&path).unwrap();
        assert_eq!(config.selection.folds, 3);
    }
}
