//! Core domain types shared across the pipeline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VerdictError};
use crate::feature::SparseVector;

/// Three-way sentiment of a review.
///
/// Variant order is significant: it fixes class indices, report row order
/// and every tie-break that falls back to "earliest label".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SentimentLabel {
    Negative,
    Neutral,
    Positive,
}

impl SentimentLabel {
    /// All labels in index order.
    pub const ALL: [SentimentLabel; 3] = [
        SentimentLabel::Negative,
        SentimentLabel::Neutral,
        SentimentLabel::Positive,
    ];

    /// Number of labels.
    pub const COUNT: usize = 3;

    /// Derive a label from a numeric star rating.
    ///
    /// Returns `None` for NaN or infinite ratings.
    pub fn from_rating(rating: f64) -> Option<Self> {
        if !rating.is_finite() {
            return None;
        }
        Some(if rating > 3.0 {
            SentimentLabel::Positive
        } else if rating < 3.0 {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        })
    }

    /// Fixed star rating reported for a predicted label.
    pub fn star_rating(self) -> u8 {
        match self {
            SentimentLabel::Negative => 1,
            SentimentLabel::Neutral => 3,
            SentimentLabel::Positive => 5,
        }
    }

    /// Class index in `[0, COUNT)`.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Inverse of [`SentimentLabel::index`].
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SentimentLabel::Negative => "Negative",
            SentimentLabel::Neutral => "Neutral",
            SentimentLabel::Positive => "Positive",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SentimentLabel {
    type Err = VerdictError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "negative" => Ok(SentimentLabel::Negative),
            "neutral" => Ok(SentimentLabel::Neutral),
            "positive" => Ok(SentimentLabel::Positive),
            other => Err(VerdictError::invalid_input(format!(
                "unknown sentiment label '{other}'"
            ))),
        }
    }
}

/// A product review as read from the corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    /// Short summary line.
    pub summary: Option<String>,
    /// Review body.
    pub body: Option<String>,
    /// Source star rating, `None` when missing or not numeric.
    pub rating: Option<f64>,
}

impl Review {
    pub fn new<S: Into<String>>(summary: S, body: S, rating: f64) -> Self {
        Review {
            summary: Some(summary.into()),
            body: Some(body.into()),
            rating: Some(rating),
        }
    }

    /// Summary and body joined by a single space.
    pub fn text(&self) -> String {
        format!(
            "{} {}",
            self.summary.as_deref().unwrap_or(""),
            self.body.as_deref().unwrap_or("")
        )
    }

    /// Label derived from the rating, if the rating is valid.
    pub fn label(&self) -> Option<SentimentLabel> {
        self.rating.and_then(SentimentLabel::from_rating)
    }
}

/// Feature vectors paired with their labels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabeledSet {
    pub vectors: Vec<SparseVector>,
    pub labels: Vec<SentimentLabel>,
}

impl LabeledSet {
    pub fn new(vectors: Vec<SparseVector>, labels: Vec<SentimentLabel>) -> Result<Self> {
        if vectors.len() != labels.len() {
            return Err(VerdictError::invalid_input(format!(
                "{} vectors but {} labels",
                vectors.len(),
                labels.len()
            )));
        }
        Ok(LabeledSet { vectors, labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Feature dimension, taken from the first vector.
    pub fn dimension(&self) -> usize {
        self.vectors.first().map(|v| v.dimension()).unwrap_or(0)
    }

    /// Per-label sample counts, indexed by [`SentimentLabel::index`].
    pub fn class_counts(&self) -> [usize; SentimentLabel::COUNT] {
        let mut counts = [0; SentimentLabel::COUNT];
        for label in &self.labels {
            counts[label.index()] += 1;
        }
        counts
    }

    /// Build a subset from sample indices, keeping their order.
    pub fn subset(&self, indices: &[usize]) -> LabeledSet {
        LabeledSet {
            vectors: indices.iter().map(|&i| self.vectors[i].clone()).collect(),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
        }
    }

    pub fn push(&mut self, vector: SparseVector, label: SentimentLabel) {
        self.vectors.push(vector);
        self.labels.push(label);
    }
}
