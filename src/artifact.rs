//! Trained model artifacts and their persistence.
//!
//! A [`SentimentModel`] bundles everything inference needs: the normalizer
//! signature, the fitted vectorizer and the selected classifier. Loading an
//! artifact whose signature differs from the running normalizer fails, so a
//! model is never served with a different text pipeline than it was trained
//! with.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::ReviewNormalizer;
use crate::error::{Result, VerdictError};
use crate::feature::TfIdfVectorizer;
use crate::model::{Classifier, ModelFamily, ParamSet, TrainedModel};

/// File name used inside an artifact directory.
pub const MODEL_FILE_NAME: &str = "model.json";

/// Descriptive data stored with a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub family: ModelFamily,
    pub params: ParamSet,
    pub test_accuracy: f64,
    /// Size of the (balanced) training set the final model was fit on.
    pub training_size: usize,
    pub vocabulary_size: usize,
    pub trained_at: DateTime<Utc>,
    /// Crate version that produced the artifact.
    pub version: String,
}

/// A trained sentiment model ready to be served.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentModel {
    pub normalizer_signature: String,
    pub vectorizer: TfIdfVectorizer,
    pub model: TrainedModel,
    pub metadata: ModelMetadata,
}

impl SentimentModel {
    /// Check that the artifact is usable with `normalizer`.
    pub fn validate(&self, normalizer: &ReviewNormalizer) -> Result<()> {
        if self.normalizer_signature != normalizer.signature() {
            return Err(VerdictError::invalid_config(
                "model was trained with different normalization rules; retrain it with this version",
            ));
        }
        if !self.vectorizer.is_fitted() {
            return Err(VerdictError::not_trained("artifact vectorizer is not fitted"));
        }
        if !self.model.is_trained() {
            return Err(VerdictError::not_trained("artifact model is not trained"));
        }
        Ok(())
    }
}

/// Storage for trained models.
pub trait ArtifactStore {
    /// Persist a model, replacing any previous one.
    fn save(&self, model: &SentimentModel) -> Result<()>;

    /// Load the stored model.
    fn load(&self) -> Result<SentimentModel>;
}

/// Stores a model as pretty-printed JSON in a directory.
#[derive(Debug, Clone)]
pub struct JsonArtifactStore {
    directory: PathBuf,
}

impl JsonArtifactStore {
    pub fn new<P: AsRef<Path>>(directory: P) -> Self {
        JsonArtifactStore {
            directory: directory.as_ref().to_path_buf(),
        }
    }

    pub fn model_path(&self) -> PathBuf {
        self.directory.join(MODEL_FILE_NAME)
    }
}

impl ArtifactStore for JsonArtifactStore {
    fn save(&self, model: &SentimentModel) -> Result<()> {
        fs::create_dir_all(&self.directory)?;
        let json = serde_json::to_string_pretty(model)?;
        let path = self.model_path();
        fs::write(&path, json)?;
        info!("saved {} model to {}", model.metadata.family, path.display());
        Ok(())
    }

    fn load(&self) -> Result<SentimentModel> {
        let path = self.model_path();
        let content = fs::read_to_string(&path).map_err(|e| {
            VerdictError::Io(std::io::Error::new(
                e.kind(),
                format!("cannot read model {}: {e}", path.display()),
            ))
        })?;
        let model: SentimentModel = serde_json::from_str(&content)?;
        info!(
            "loaded {} model trained at {}",
            model.metadata.family, model.metadata.trained_at
        );
        Ok(model)
    }
}
