//! Cross-validated grid search and model selection.
//!
//! For every catalog entry the selector scores each grid point with
//! stratified k-fold cross-validation on the (balanced) training set, refits
//! the best point on the full training set and evaluates it once on the
//! held-out test set. The family with the highest test accuracy wins; ties
//! go to the family listed first.

use log::{debug, info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::SelectionConfig;
use crate::error::{Result, VerdictError};
use crate::evaluation::{Evaluation, evaluate};
use crate::model::catalog::{CatalogEntry, ModelCatalog};
use crate::model::params::ParamSet;
use crate::model::{Classifier, ModelFamily, TrainedModel};
use crate::types::{LabeledSet, SentimentLabel};

/// Stratified k-fold splitter.
///
/// Samples of each label are dealt into folds round-robin in input order,
/// so every fold holds a near-equal share of every label.
#[derive(Debug, Clone, Copy)]
pub struct StratifiedKFold {
    n_splits: usize,
}

/// Training and validation indices of one fold.
pub type Fold = (Vec<usize>, Vec<usize>);

impl StratifiedKFold {
    pub fn new(n_splits: usize) -> Result<Self> {
        if n_splits < 2 {
            return Err(VerdictError::invalid_config(format!(
                "cross-validation needs at least 2 folds, got {n_splits}"
            )));
        }
        Ok(StratifiedKFold { n_splits })
    }

    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    /// Split sample indices into `(train, validation)` pairs.
    pub fn split(&self, labels: &[SentimentLabel]) -> Result<Vec<Fold>> {
        let mut counts = [0usize; SentimentLabel::COUNT];
        for label in labels {
            counts[label.index()] += 1;
        }
        for label in SentimentLabel::ALL {
            let count = counts[label.index()];
            if count > 0 && count < self.n_splits {
                return Err(VerdictError::invalid_config(format!(
                    "class {label} has {count} samples, fewer than the {} folds requested",
                    self.n_splits
                )));
            }
        }
        if labels.is_empty() {
            return Err(VerdictError::invalid_input("cannot split an empty set"));
        }

        let mut fold_of = vec![0usize; labels.len()];
        let mut next = [0usize; SentimentLabel::COUNT];
        for (i, label) in labels.iter().enumerate() {
            fold_of[i] = next[label.index()] % self.n_splits;
            next[label.index()] += 1;
        }

        Ok((0..self.n_splits)
            .map(|fold| {
                let (validation, train): (Vec<usize>, Vec<usize>) =
                    (0..labels.len()).partition(|&i| fold_of[i] == fold);
                (train, validation)
            })
            .collect())
    }
}

/// Cross-validation result of one grid point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridPointReport {
    pub params: ParamSet,
    /// Mean validation accuracy; absent when the point failed.
    pub cv_accuracy: Option<f64>,
    pub error: Option<String>,
}

/// What happened to one family during selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FamilyStatus {
    Trained {
        best_params: ParamSet,
        cv_accuracy: f64,
        test_accuracy: f64,
        evaluation: Evaluation,
    },
    Failed {
        reason: String,
    },
}

/// Per-family summary of the grid search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyReport {
    pub family: ModelFamily,
    pub grid: Vec<GridPointReport>,
    pub status: FamilyStatus,
}

impl FamilyReport {
    pub fn test_accuracy(&self) -> Option<f64> {
        match &self.status {
            FamilyStatus::Trained { test_accuracy, .. } => Some(*test_accuracy),
            FamilyStatus::Failed { .. } => None,
        }
    }

    pub fn is_trained(&self) -> bool {
        matches!(self.status, FamilyStatus::Trained { .. })
    }
}

/// The selected model with every family's report.
#[derive(Debug, Clone)]
pub struct SelectionOutcome {
    pub model: TrainedModel,
    pub family: ModelFamily,
    pub params: ParamSet,
    /// Test accuracy of the selected model.
    pub accuracy: f64,
    pub evaluation: Evaluation,
    pub reports: Vec<FamilyReport>,
}

/// Runs the grid search over a [`ModelCatalog`].
#[derive(Debug, Clone, Default)]
pub struct ModelSelector {
    config: SelectionConfig,
}

impl ModelSelector {
    pub fn new(config: SelectionConfig) -> Self {
        ModelSelector { config }
    }

    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    /// Search every catalog entry and keep the best family by test accuracy.
    pub fn train_and_select(
        &self,
        train: &LabeledSet,
        test: &LabeledSet,
        catalog: &ModelCatalog,
    ) -> Result<SelectionOutcome> {
        if catalog.is_empty() {
            return Err(VerdictError::invalid_config("the model catalog is empty"));
        }
        if test.is_empty() {
            return Err(VerdictError::invalid_input("the test set is empty"));
        }
        let folds = StratifiedKFold::new(self.config.folds)?.split(&train.labels)?;

        let mut reports = Vec::with_capacity(catalog.len());
        let mut best: Option<(TrainedModel, ParamSet, Evaluation)> = None;
        for entry in catalog.entries() {
            let (report, fitted) = self.search_family(entry, train, test, &folds);
            if let Some((model, params, evaluation)) = fitted {
                let better = best
                    .as_ref()
                    .is_none_or(|(_, _, current)| evaluation.accuracy > current.accuracy);
                if better {
                    best = Some((model, params, evaluation));
                }
            }
            reports.push(report);
        }

        let Some((model, params, evaluation)) = best else {
            let causes: Vec<String> = reports
                .iter()
                .filter_map(|report| match &report.status {
                    FamilyStatus::Failed { reason } => Some(format!("{}: {reason}", report.family)),
                    FamilyStatus::Trained { .. } => None,
                })
                .collect();
            return Err(VerdictError::training(format!(
                "no model family could be trained ({})",
                causes.join("; ")
            )));
        };

        let family = model.family();
        info!(
            "selected {family} {params} with test accuracy {:.4}",
            evaluation.accuracy
        );
        Ok(SelectionOutcome {
            family,
            params,
            accuracy: evaluation.accuracy,
            model,
            evaluation,
            reports,
        })
    }

    /// Grid search one family, then refit and evaluate its best point.
    fn search_family(
        &self,
        entry: &CatalogEntry,
        train: &LabeledSet,
        test: &LabeledSet,
        folds: &[Fold],
    ) -> (FamilyReport, Option<(TrainedModel, ParamSet, Evaluation)>) {
        let family = entry.family;
        let points = entry.grid.points();

        let scores: Vec<Result<f64>> = if self.config.parallel {
            points
                .par_iter()
                .map(|params| self.cross_validate(family, params, train, folds))
                .collect()
        } else {
            points
                .iter()
                .map(|params| self.cross_validate(family, params, train, folds))
                .collect()
        };

        let mut grid = Vec::with_capacity(points.len());
        let mut best: Option<(usize, f64)> = None;
        for (index, (params, score)) in points.iter().zip(scores).enumerate() {
            match score {
                Ok(accuracy) => {
                    debug!("{family} {params}: mean cv accuracy {accuracy:.4}");
                    if best.is_none_or(|(_, current)| accuracy > current) {
                        best = Some((index, accuracy));
                    }
                    grid.push(GridPointReport {
                        params: params.clone(),
                        cv_accuracy: Some(accuracy),
                        error: None,
                    });
                }
                Err(e) => {
                    warn!("{family} {params}: skipped ({e})");
                    grid.push(GridPointReport {
                        params: params.clone(),
                        cv_accuracy: None,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        let failed = |grid: Vec<GridPointReport>, reason: String| {
            warn!("{family} excluded: {reason}");
            (
                FamilyReport {
                    family,
                    grid,
                    status: FamilyStatus::Failed { reason },
                },
                None,
            )
        };

        let Some((best_index, cv_accuracy)) = best else {
            let reason = grid
                .iter()
                .find_map(|point| point.error.clone())
                .unwrap_or_else(|| "empty parameter grid".to_string());
            return failed(grid, format!("every grid point failed, first error: {reason}"));
        };

        let params = points[best_index].clone();
        let refit = family.build(&params, &self.config).and_then(|mut model| {
            model.fit(train)?;
            let evaluation = evaluate(&model, test)?;
            Ok((model, evaluation))
        });

        match refit {
            Ok((model, evaluation)) => {
                info!(
                    "{family}: best {params} (cv {cv_accuracy:.4}), test accuracy {:.4}",
                    evaluation.accuracy
                );
                let report = FamilyReport {
                    family,
                    grid,
                    status: FamilyStatus::Trained {
                        best_params: params.clone(),
                        cv_accuracy,
                        test_accuracy: evaluation.accuracy,
                        evaluation: evaluation.clone(),
                    },
                };
                (report, Some((model, params, evaluation)))
            }
            Err(e) => failed(grid, format!("refit failed: {e}")),
        }
    }

    /// Mean validation accuracy of one grid point over all folds.
    fn cross_validate(
        &self,
        family: ModelFamily,
        params: &ParamSet,
        data: &LabeledSet,
        folds: &[Fold],
    ) -> Result<f64> {
        let mut total = 0.0;
        for (train_indices, validation_indices) in folds {
            let mut model = family.build(params, &self.config)?;
            model.fit(&data.subset(train_indices))?;
            total += model.accuracy(&data.subset(validation_indices))?;
        }
        Ok(total / folds.len() as f64)
    }
}
