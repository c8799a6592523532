//! # Verdict
//!
//! A three-way sentiment classifier for product reviews.
//!
//! ## Features
//!
//! - Review normalization with contraction expansion and negation scoping
//! - TF-IDF features over word n-grams
//! - Synthetic minority oversampling of the training set
//! - Cross-validated grid search over several classifier families
//! - JSON model artifacts and a prediction API with confidence scores

pub mod analysis;
pub mod artifact;
pub mod balance;
pub mod cli;
pub mod config;
pub mod corpus;
pub mod error;
pub mod evaluation;
pub mod feature;
pub mod model;
pub mod pipeline;
pub mod predictor;
pub mod types;

pub mod prelude {
    pub use crate::artifact::{ArtifactStore, JsonArtifactStore, SentimentModel};
    pub use crate::config::TrainingConfig;
    pub use crate::error::{Result, VerdictError};
    pub use crate::pipeline::Trainer;
    pub use crate::predictor::{Confidence, PredictionResult, SentimentPredictor};
    pub use crate::types::{Review, SentimentLabel};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
