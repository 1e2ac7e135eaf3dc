//! Deterministic, in-process models for crop recommendation and price
//! forecasting. Training data is synthesized from fixed agronomic rules and
//! a fixed seed, so retraining is reproducible and predictions are
//! auditable across process lifetimes.

pub mod dataset;
pub mod encoder;
pub mod forest;
pub mod store;
pub mod tree;

pub use dataset::{CropDataset, PriceDataset, SOIL_VOCABULARY, TRAINING_SEED};
pub use encoder::{FeatureEncoder, SoilTypeEncoder};
pub use forest::{CropClassifier, ForestParams, PriceRegressor, MODEL_VERSION};
pub use store::{ArtifactStoreError, ModelArtifactStore, ModelSet};
