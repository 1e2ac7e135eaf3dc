//! Bagged tree ensembles for the crop classifier and the price regressor.
//!
//! Each tree is grown on a bootstrap sample drawn from a seeded generator,
//! so a fixed seed reproduces the exact same ensemble and the exact same
//! predictions.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::domain::crop::Crop;
use crate::errors::DomainError;
use crate::ml::dataset::{CropDataset, PriceDataset, TRAINING_SEED};
use crate::ml::tree::{fit_classification_tree, fit_regression_tree, DecisionTree, TreeParams};

pub const MODEL_VERSION: &str = "1.0.0";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestParams {
    pub trees: usize,
    pub max_depth: usize,
    pub min_leaf: usize,
    pub seed: u64,
}

impl ForestParams {
    pub fn classifier_defaults() -> Self {
        Self { trees: 30, max_depth: 10, min_leaf: 4, seed: TRAINING_SEED }
    }

    pub fn regressor_defaults() -> Self {
        Self { trees: 15, max_depth: 8, min_leaf: 20, seed: TRAINING_SEED }
    }
}

fn bootstrap_sample(rng: &mut StdRng, population: usize) -> Vec<usize> {
    (0..population).map(|_| rng.gen_range(0..population)).collect()
}

/// Multiclass crop classifier over the fixed vocabulary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CropClassifier {
    pub version: String,
    pub trained_at: DateTime<Utc>,
    pub training_samples: usize,
    pub params: ForestParams,
    trees: Vec<DecisionTree<Vec<f64>>>,
    n_classes: usize,
}

impl CropClassifier {
    pub fn new(version: impl Into<String>) -> Self {
        Self::with_params(version, ForestParams::classifier_defaults())
    }

    pub fn with_params(version: impl Into<String>, params: ForestParams) -> Self {
        Self {
            version: version.into(),
            trained_at: Utc::now(),
            training_samples: 0,
            params,
            trees: Vec::new(),
            n_classes: Crop::VOCABULARY.len(),
        }
    }

    pub fn is_trained(&self) -> bool {
        !self.trees.is_empty()
    }

    /// Fit the ensemble and return training-set accuracy.
    pub fn train(&mut self, dataset: &CropDataset) -> Result<f64, DomainError> {
        if dataset.features.is_empty() || dataset.features.len() != dataset.labels.len() {
            return Err(DomainError::Validation(
                "classifier dataset must be non-empty with matching labels".to_owned(),
            ));
        }

        let tree_params =
            TreeParams { max_depth: self.params.max_depth, min_leaf: self.params.min_leaf };
        let n_classes = self.n_classes;
        let mut rng = StdRng::seed_from_u64(self.params.seed);

        let trees: Vec<_> = (0..self.params.trees)
            .map(|_| {
                let sample = bootstrap_sample(&mut rng, dataset.features.len());
                fit_classification_tree(
                    &dataset.features,
                    &dataset.labels,
                    n_classes,
                    &sample,
                    tree_params,
                )
            })
            .collect();
        self.trees = trees;
        self.training_samples = dataset.features.len();
        self.trained_at = Utc::now();

        let correct = dataset
            .features
            .iter()
            .zip(&dataset.labels)
            .filter(|(features, label)| self.predict_class(features) == Some(**label))
            .count();
        Ok(correct as f64 / dataset.features.len() as f64)
    }

    /// Averaged per-tree leaf distributions over the full vocabulary. An
    /// untrained ensemble yields all zeros, which callers treat as a
    /// degenerate output.
    pub fn predict_proba(&self, features: &[f64]) -> Vec<f64> {
        let mut distribution = vec![0.0; self.n_classes];
        if self.trees.is_empty() {
            return distribution;
        }

        for tree in &self.trees {
            for (slot, share) in distribution.iter_mut().zip(tree.predict(features)) {
                *slot += share;
            }
        }
        for slot in &mut distribution {
            *slot /= self.trees.len() as f64;
        }
        distribution
    }

    fn predict_class(&self, features: &[f64]) -> Option<usize> {
        let distribution = self.predict_proba(features);
        distribution
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(index, _)| index)
    }
}

/// Regressor mapping (month, year) to a base commodity price.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceRegressor {
    pub version: String,
    pub trained_at: DateTime<Utc>,
    pub training_samples: usize,
    pub params: ForestParams,
    trees: Vec<DecisionTree<f64>>,
}

impl PriceRegressor {
    pub fn new(version: impl Into<String>) -> Self {
        Self::with_params(version, ForestParams::regressor_defaults())
    }

    pub fn with_params(version: impl Into<String>, params: ForestParams) -> Self {
        Self {
            version: version.into(),
            trained_at: Utc::now(),
            training_samples: 0,
            params,
            trees: Vec::new(),
        }
    }

    pub fn is_trained(&self) -> bool {
        !self.trees.is_empty()
    }

    /// Fit the ensemble and return root-mean-squared error on the training
    /// series.
    pub fn train(&mut self, series: &PriceDataset) -> Result<f64, DomainError> {
        if series.features.is_empty() || series.features.len() != series.targets.len() {
            return Err(DomainError::Validation(
                "price series must be non-empty with matching targets".to_owned(),
            ));
        }

        let tree_params =
            TreeParams { max_depth: self.params.max_depth, min_leaf: self.params.min_leaf };
        let mut rng = StdRng::seed_from_u64(self.params.seed);

        let trees: Vec<_> = (0..self.params.trees)
            .map(|_| {
                let sample = bootstrap_sample(&mut rng, series.features.len());
                fit_regression_tree(&series.features, &series.targets, &sample, tree_params)
            })
            .collect();
        self.trees = trees;
        self.training_samples = series.features.len();
        self.trained_at = Utc::now();

        let squared_error: f64 = series
            .features
            .iter()
            .zip(&series.targets)
            .map(|(features, target)| {
                let error = self.predict_row(features) - target;
                error * error
            })
            .sum();
        Ok((squared_error / series.features.len() as f64).sqrt())
    }

    /// Average of per-tree predictions; NaN when untrained so degenerate
    /// outputs are detectable at the engine boundary.
    pub fn predict(&self, month: u32, year: i32) -> f64 {
        self.predict_row(&[f64::from(month), f64::from(year)])
    }

    fn predict_row(&self, features: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return f64::NAN;
        }
        let sum: f64 = self.trees.iter().map(|tree| *tree.predict(features)).sum();
        sum / self.trees.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::{CropClassifier, ForestParams, PriceRegressor, MODEL_VERSION};
    use crate::domain::crop::Crop;
    use crate::ml::dataset::{
        synthesize_crop_dataset, synthesize_price_series, SOIL_VOCABULARY, TRAINING_SEED,
    };
    use crate::ml::encoder::SoilTypeEncoder;

    fn small_params(seed: u64) -> ForestParams {
        ForestParams { trees: 8, max_depth: 8, min_leaf: 4, seed }
    }

    #[test]
    fn classifier_probabilities_cover_the_vocabulary_and_sum_to_one() {
        let encoder = SoilTypeEncoder::from_vocabulary(&SOIL_VOCABULARY);
        let dataset = synthesize_crop_dataset(TRAINING_SEED, &encoder);
        let mut model = CropClassifier::with_params(MODEL_VERSION, small_params(TRAINING_SEED));
        let accuracy = model.train(&dataset).expect("training succeeds");

        assert!(accuracy > 0.7, "rule-derived data should be largely separable, got {accuracy}");

        let distribution = model.predict_proba(&dataset.features[0]);
        assert_eq!(distribution.len(), Crop::VOCABULARY.len());
        let total: f64 = distribution.iter().sum();
        assert!((total - 1.0).abs() < 1e-9, "probabilities must sum to 1, got {total}");
    }

    #[test]
    fn classifier_training_is_deterministic_for_a_fixed_seed() {
        let encoder = SoilTypeEncoder::from_vocabulary(&SOIL_VOCABULARY);
        let dataset = synthesize_crop_dataset(TRAINING_SEED, &encoder);

        let mut first = CropClassifier::with_params(MODEL_VERSION, small_params(TRAINING_SEED));
        let mut second = CropClassifier::with_params(MODEL_VERSION, small_params(TRAINING_SEED));
        first.train(&dataset).expect("first fit");
        second.train(&dataset).expect("second fit");

        let probe = &dataset.features[17];
        assert_eq!(first.predict_proba(probe), second.predict_proba(probe));
    }

    #[test]
    fn untrained_models_return_degenerate_outputs() {
        let classifier = CropClassifier::new(MODEL_VERSION);
        let regressor = PriceRegressor::new(MODEL_VERSION);

        assert!(!classifier.is_trained());
        assert!(classifier.predict_proba(&[0.0; 10]).iter().all(|share| *share == 0.0));
        assert!(regressor.predict(6, 2025).is_nan());
    }

    #[test]
    fn regressor_learns_the_seasonal_price_shape() {
        let series = synthesize_price_series(TRAINING_SEED);
        let mut model = PriceRegressor::with_params(MODEL_VERSION, small_params(TRAINING_SEED));
        let rmse = model.train(&series).expect("training succeeds");

        // Pooled base prices average 3380; noise stdev alone is ~338.
        assert!(rmse < 2000.0, "rmse should be bounded, got {rmse}");

        // The seasonal factor peaks in March (sin(2*pi*3/12) = 1) and bottoms
        // in September.
        let march = model.predict(3, 2024);
        let september = model.predict(9, 2024);
        assert!(march > september, "march {march} should price above september {september}");
    }

    #[test]
    fn serialized_models_round_trip_with_identical_predictions() {
        let encoder = SoilTypeEncoder::from_vocabulary(&SOIL_VOCABULARY);
        let dataset = synthesize_crop_dataset(TRAINING_SEED, &encoder);
        let mut model = CropClassifier::with_params(MODEL_VERSION, small_params(TRAINING_SEED));
        model.train(&dataset).expect("training succeeds");

        let payload = serde_json::to_string(&model).expect("serialize");
        let restored: CropClassifier = serde_json::from_str(&payload).expect("deserialize");

        let probe = &dataset.features[3];
        assert_eq!(model.predict_proba(probe), restored.predict_proba(probe));
        assert_eq!(model, restored);
    }
}
