//! Model persistence.
//!
//! Trained artifacts are addressed by stable names in a
//! [`ModelArtifactStore`]; the JSON payloads round-trip to bit-identical
//! predictions. A missing or undecodable artifact triggers a retrain from
//! the seeded synthetic dataset followed by a persist, so training cost is
//! amortized across process lifetimes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::ml::dataset::{
    synthesize_crop_dataset, synthesize_price_series, SOIL_VOCABULARY, TRAINING_SEED,
};
use crate::ml::encoder::{FeatureEncoder, SoilTypeEncoder};
use crate::ml::forest::{CropClassifier, PriceRegressor, MODEL_VERSION};

/// Stable artifact names.
pub mod artifacts {
    pub const CROP_CLASSIFIER: &str = "crop_classifier";
    pub const PRICE_FORECASTER: &str = "price_forecaster";
    pub const SOIL_ENCODER: &str = "soil_encoder";
}

#[derive(Debug, Error)]
pub enum ArtifactStoreError {
    #[error("artifact storage failure: {0}")]
    Storage(String),
    #[error("model training failed: {0}")]
    Training(String),
}

#[async_trait]
pub trait ModelArtifactStore: Send + Sync {
    async fn load(&self, name: &str) -> Result<Option<String>, ArtifactStoreError>;
    async fn save(&self, name: &str, payload: &str) -> Result<(), ArtifactStoreError>;
}

/// The trained encoder, classifier and regressor as one explicit handle.
/// Engines receive it by reference, which keeps test doubles trivial.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelSet {
    pub encoder: FeatureEncoder,
    pub classifier: CropClassifier,
    pub regressor: PriceRegressor,
}

impl ModelSet {
    /// Train all models from the seeded synthetic dataset.
    pub fn train(seed: u64) -> Result<Self, ArtifactStoreError> {
        let encoder = FeatureEncoder::new(SoilTypeEncoder::from_vocabulary(&SOIL_VOCABULARY));

        let dataset = synthesize_crop_dataset(seed, &encoder.soil);
        let mut classifier = CropClassifier::new(MODEL_VERSION);
        let accuracy = classifier
            .train(&dataset)
            .map_err(|error| ArtifactStoreError::Training(error.to_string()))?;

        let series = synthesize_price_series(seed);
        let mut regressor = PriceRegressor::new(MODEL_VERSION);
        let rmse = regressor
            .train(&series)
            .map_err(|error| ArtifactStoreError::Training(error.to_string()))?;

        info!(
            event_name = "ml.models.trained",
            accuracy,
            rmse,
            samples = dataset.features.len(),
            "trained crop classifier and price regressor"
        );

        Ok(Self { encoder, classifier, regressor })
    }

    /// Load persisted artifacts, or retrain and persist when any artifact is
    /// absent or fails to decode. Idempotent: repeated calls yield a model
    /// set with identical predictions for identical inputs.
    pub async fn load_or_train(store: &dyn ModelArtifactStore) -> Result<Self, ArtifactStoreError> {
        if let Some(models) = Self::load(store).await? {
            info!(
                event_name = "ml.models.loaded",
                version = %models.classifier.version,
                "loaded persisted model artifacts"
            );
            return Ok(models);
        }

        info!(event_name = "ml.models.training", "no usable persisted artifacts, training");
        let models = Self::train(TRAINING_SEED)?;
        models.persist(store).await?;
        Ok(models)
    }

    async fn load(store: &dyn ModelArtifactStore) -> Result<Option<Self>, ArtifactStoreError> {
        let encoder = store.load(artifacts::SOIL_ENCODER).await?;
        let classifier = store.load(artifacts::CROP_CLASSIFIER).await?;
        let regressor = store.load(artifacts::PRICE_FORECASTER).await?;

        let (Some(encoder), Some(classifier), Some(regressor)) = (encoder, classifier, regressor)
        else {
            return Ok(None);
        };

        let decoded = (
            serde_json::from_str::<FeatureEncoder>(&encoder),
            serde_json::from_str::<CropClassifier>(&classifier),
            serde_json::from_str::<PriceRegressor>(&regressor),
        );
        match decoded {
            (Ok(encoder), Ok(classifier), Ok(regressor)) => {
                Ok(Some(Self { encoder, classifier, regressor }))
            }
            _ => {
                warn!(
                    event_name = "ml.models.decode_failed",
                    "persisted artifacts could not be decoded, retraining"
                );
                Ok(None)
            }
        }
    }

    pub async fn persist(&self, store: &dyn ModelArtifactStore) -> Result<(), ArtifactStoreError> {
        let encoder = serde_json::to_string(&self.encoder)
            .map_err(|error| ArtifactStoreError::Storage(error.to_string()))?;
        let classifier = serde_json::to_string(&self.classifier)
            .map_err(|error| ArtifactStoreError::Storage(error.to_string()))?;
        let regressor = serde_json::to_string(&self.regressor)
            .map_err(|error| ArtifactStoreError::Storage(error.to_string()))?;

        store.save(artifacts::SOIL_ENCODER, &encoder).await?;
        store.save(artifacts::CROP_CLASSIFIER, &classifier).await?;
        store.save(artifacts::PRICE_FORECASTER, &regressor).await?;
        Ok(())
    }
}
