//! Held-out evaluation: accuracy, per-class report and confusion matrix.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VerdictError};
use crate::model::{Classifier, FamilyReport, ModelFamily, ParamSet};
use crate::types::{LabeledSet, SentimentLabel};

const N_CLASSES: usize = SentimentLabel::COUNT;

/// Counts of (true, predicted) label pairs; rows are true labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    counts: [[usize; N_CLASSES]; N_CLASSES],
}

impl ConfusionMatrix {
    pub fn from_labels(truth: &[SentimentLabel], predicted: &[SentimentLabel]) -> Result<Self> {
        if truth.len() != predicted.len() {
            return Err(VerdictError::invalid_input(format!(
                "{} true labels but {} predictions",
                truth.len(),
                predicted.len()
            )));
        }
        let mut counts = [[0; N_CLASSES]; N_CLASSES];
        for (t, p) in truth.iter().zip(predicted) {
            counts[t.index()][p.index()] += 1;
        }
        Ok(ConfusionMatrix { counts })
    }

    pub fn get(&self, truth: SentimentLabel, predicted: SentimentLabel) -> usize {
        self.counts[truth.index()][predicted.index()]
    }

    pub fn rows(&self) -> &[[usize; N_CLASSES]; N_CLASSES] {
        &self.counts
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    pub fn correct(&self) -> usize {
        (0..N_CLASSES).map(|i| self.counts[i][i]).sum()
    }

    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.correct() as f64 / total as f64
        }
    }

    fn support(&self, label: SentimentLabel) -> usize {
        self.counts[label.index()].iter().sum()
    }

    fn predicted(&self, label: SentimentLabel) -> usize {
        self.counts.iter().map(|row| row[label.index()]).sum()
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>12}", "true\\pred")?;
        for label in SentimentLabel::ALL {
            write!(f, "{:>10}", label.as_str())?;
        }
        writeln!(f)?;
        for label in SentimentLabel::ALL {
            write!(f, "{:>12}", label.as_str())?;
            for count in &self.counts[label.index()] {
                write!(f, "{count:>10}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Precision, recall and F1 for one label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub label: SentimentLabel,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Averaged precision, recall and F1.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AverageMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Per-class metrics with macro and support-weighted averages.
///
/// A ratio with a zero denominator is reported as 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: AverageMetrics,
    pub weighted_avg: AverageMetrics,
    pub support: usize,
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

impl ClassificationReport {
    pub fn from_confusion(matrix: &ConfusionMatrix) -> Self {
        let classes: Vec<ClassMetrics> = SentimentLabel::ALL
            .iter()
            .map(|&label| {
                let hits = matrix.get(label, label);
                let support = matrix.support(label);
                let precision = ratio(hits, matrix.predicted(label));
                let recall = ratio(hits, support);
                let f1 = if precision + recall == 0.0 {
                    0.0
                } else {
                    2.0 * precision * recall / (precision + recall)
                };
                ClassMetrics {
                    label,
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect();

        let total = matrix.total();
        let n = classes.len() as f64;
        let macro_avg = AverageMetrics {
            precision: classes.iter().map(|c| c.precision).sum::<f64>() / n,
            recall: classes.iter().map(|c| c.recall).sum::<f64>() / n,
            f1: classes.iter().map(|c| c.f1).sum::<f64>() / n,
        };
        let weighted = |metric: fn(&ClassMetrics) -> f64| {
            if total == 0 {
                0.0
            } else {
                classes
                    .iter()
                    .map(|c| metric(c) * c.support as f64)
                    .sum::<f64>()
                    / total as f64
            }
        };
        let weighted_avg = AverageMetrics {
            precision: weighted(|c| c.precision),
            recall: weighted(|c| c.recall),
            f1: weighted(|c| c.f1),
        };

        ClassificationReport {
            accuracy: matrix.accuracy(),
            classes,
            macro_avg,
            weighted_avg,
            support: total,
        }
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>14}{:>11}{:>11}{:>11}{:>11}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        for class in &self.classes {
            writeln!(
                f,
                "{:>14}{:>11.2}{:>11.2}{:>11.2}{:>11}",
                class.label.as_str(),
                class.precision,
                class.recall,
                class.f1,
                class.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>14}{:>11}{:>11}{:>11.2}{:>11}",
            "accuracy", "", "", self.accuracy, self.support
        )?;
        for (name, avg) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                f,
                "{:>14}{:>11.2}{:>11.2}{:>11.2}{:>11}",
                name, avg.precision, avg.recall, avg.f1, self.support
            )?;
        }
        Ok(())
    }
}

/// Result of scoring a fitted model on a held-out set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub accuracy: f64,
    pub report: ClassificationReport,
    pub confusion: ConfusionMatrix,
}

/// Score `model` once on `test`.
pub fn evaluate<C: Classifier + ?Sized>(model: &C, test: &LabeledSet) -> Result<Evaluation> {
    if test.is_empty() {
        return Err(VerdictError::invalid_input("evaluation set is empty"));
    }
    let predicted = test
        .vectors
        .iter()
        .map(|vector| model.predict(vector))
        .collect::<Result<Vec<_>>>()?;
    let confusion = ConfusionMatrix::from_labels(&test.labels, &predicted)?;
    let report = ClassificationReport::from_confusion(&confusion);
    Ok(Evaluation {
        accuracy: report.accuracy,
        report,
        confusion,
    })
}

/// Fraction of matching labels.
pub fn accuracy(truth: &[SentimentLabel], predicted: &[SentimentLabel]) -> f64 {
    if truth.is_empty() {
        return 0.0;
    }
    let correct = truth
        .iter()
        .zip(predicted)
        .filter(|(t, p)| t == p)
        .count();
    correct as f64 / truth.len() as f64
}

/// Everything a training run reports, ready to be rendered or serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub reviews_loaded: usize,
    pub rows_dropped: usize,
    pub training_size: usize,
    pub test_size: usize,
    pub balanced_training_size: usize,
    pub vocabulary_size: usize,
    /// Per-label counts of the training partition before balancing.
    pub class_counts: [usize; N_CLASSES],
    pub families: Vec<FamilyReport>,
    pub selected_family: ModelFamily,
    pub selected_params: ParamSet,
    pub test_accuracy: f64,
    pub evaluation: Evaluation,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SentimentLabel::*;

    #[test]
    fn test_confusion_matrix_orientation() {
        let truth = [Negative, Negative, Neutral, Positive, Positive];
        let predicted = [Negative, Positive, Neutral, Positive, Neutral];
        let matrix = ConfusionMatrix::from_labels(&truth, &predicted).unwrap();
        assert_eq!(matrix.get(Negative, Positive), 1);
        assert_eq!(matrix.get(Positive, Neutral), 1);
        assert_eq!(matrix.rows()[0], [1, 0, 1]);
        assert_eq!(matrix.total(), 5);
        assert_eq!(matrix.correct(), 3);
        assert!((matrix.accuracy() - 0.6).abs() < 1e-12);
        assert!((accuracy(&truth, &predicted) - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_report_metrics() {
        let truth = [Negative, Negative, Neutral, Positive, Positive];
        let predicted = [Negative, Positive, Neutral, Positive, Neutral];
        let matrix = ConfusionMatrix::from_labels(&truth, &predicted).unwrap();
        let report = ClassificationReport::from_confusion(&matrix);

        let negative = &report.classes[0];
        assert_eq!(negative.precision, 1.0);
        assert_eq!(negative.recall, 0.5);
        assert!((negative.f1 - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(negative.support, 2);

        let neutral = &report.classes[1];
        assert_eq!(neutral.precision, 0.5);
        assert_eq!(neutral.recall, 1.0);

        let expected_macro = (1.0 + 0.5 + 0.5) / 3.0;
        assert!((report.macro_avg.precision - expected_macro).abs() < 1e-12);
        let expected_weighted = (1.0 * 2.0 + 0.5 * 1.0 + 0.5 * 2.0) / 5.0;
        assert!((report.weighted_avg.precision - expected_weighted).abs() < 1e-12);
        assert_eq!(report.support, 5);
    }

    #[test]
    fn test_zero_division_reports_zero() {
        let truth = [Positive, Positive];
        let predicted = [Positive, Positive];
        let matrix = ConfusionMatrix::from_labels(&truth, &predicted).unwrap();
        let report = ClassificationReport::from_confusion(&matrix);
        assert_eq!(report.classes[0].precision, 0.0);
        assert_eq!(report.classes[0].f1, 0.0);
        assert_eq!(report.classes[2].f1, 1.0);
        assert!(report.to_string().contains("weighted avg"));
    }

    #[test]
    fn test_length_mismatch() {
        assert!(ConfusionMatrix::from_labels(&[Positive], &[]).is_err());
    }
}
