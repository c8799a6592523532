//! Declarative catalog of competing model families.

use serde::{Deserialize, Serialize};

use crate::config::SelectionConfig;
use crate::model::ModelFamily;
use crate::model::params::ParamGrid;

/// A family and the hyperparameter grid searched for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub family: ModelFamily,
    pub grid: ParamGrid,
}

impl CatalogEntry {
    pub fn new(family: ModelFamily, grid: ParamGrid) -> Self {
        CatalogEntry { family, grid }
    }
}

/// Ordered list of catalog entries. Order breaks ties between families.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelCatalog {
    entries: Vec<CatalogEntry>,
}

impl ModelCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        ModelCatalog { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn push(&mut self, entry: CatalogEntry) {
        self.entries.push(entry);
    }

    /// The catalog used for a training run with these settings.
    pub fn from_config(config: &SelectionConfig) -> Self {
        let mut catalog = Self::default();
        if config.include_nearest_centroid {
            catalog.push(Self::nearest_centroid_entry());
        }
        catalog
    }

    pub fn nearest_centroid_entry() -> CatalogEntry {
        CatalogEntry::new(
            ModelFamily::NearestCentroid,
            ParamGrid::new().axis("metric", vec!["cosine", "euclidean"]),
        )
    }
}

impl Default for ModelCatalog {
    /// Logistic regression, multinomial naive Bayes and linear SVM.
    fn default() -> Self {
        ModelCatalog::new(vec![
            CatalogEntry::new(
                ModelFamily::LogisticRegression,
                ParamGrid::new()
                    .axis("c", vec![0.1, 1.0, 10.0])
                    .axis("penalty", vec!["l1", "l2"]),
            ),
            CatalogEntry::new(
                ModelFamily::MultinomialNaiveBayes,
                ParamGrid::new().axis("alpha", vec![0.1, 0.5, 1.0]),
            ),
            CatalogEntry::new(
                ModelFamily::LinearSvm,
                ParamGrid::new()
                    .axis("c", vec![0.1, 1.0, 10.0])
                    .axis("loss", vec!["hinge", "squared_hinge"]),
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog() {
        let catalog = ModelCatalog::default();
        let families: Vec<ModelFamily> = catalog.entries().iter().map(|e| e.family).collect();
        assert_eq!(
            families,
            vec![
                ModelFamily::LogisticRegression,
                ModelFamily::MultinomialNaiveBayes,
                ModelFamily::LinearSvm
            ]
        );
        let sizes: Vec<usize> = catalog.entries().iter().map(|e| e.grid.len()).collect();
        assert_eq!(sizes, vec![6, 3, 6]);
    }

    #[test]
    fn test_nearest_centroid_is_opt_in() {
        let config = SelectionConfig {
            include_nearest_centroid: true,
            ..SelectionConfig::default()
        };
        let catalog = ModelCatalog::from_config(&config);
        assert_eq!(catalog.len(), 4);
        assert_eq!(
            catalog.entries()[3].family,
            ModelFamily::NearestCentroid
        );
        assert_eq!(ModelCatalog::from_config(&SelectionConfig::default()).len(), 3);
    }
}
