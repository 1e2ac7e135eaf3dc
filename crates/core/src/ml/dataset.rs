//! Seeded synthetic training data.
//!
//! Label generation is a pure function of the sampled attributes, so the
//! rule set is testable on its own and the full dataset is reproducible
//! from the seed alone.

use chrono::{Datelike, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::crop::Crop;
use crate::ml::encoder::SoilTypeEncoder;

/// Seed shared by dataset synthesis and model training.
pub const TRAINING_SEED: u64 = 42;

/// Soil categories the encoder is trained on.
pub const SOIL_VOCABULARY: [&str; 4] = ["clay", "sandy", "loamy", "silty"];

/// Number of labeled samples synthesized for the classifier.
pub const CROP_SAMPLES: usize = 1000;

#[derive(Clone, Debug, PartialEq)]
pub struct CropDataset {
    /// Rows of [`crate::ml::encoder::FeatureEncoder::FEATURE_DIM`] features.
    pub features: Vec<Vec<f64>>,
    /// Class indices in [`Crop::VOCABULARY`] order.
    pub labels: Vec<usize>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PriceDataset {
    /// Rows of `[month, year]`.
    pub features: Vec<Vec<f64>>,
    pub targets: Vec<f64>,
}

/// Standard normal via Box-Muller over the seeded uniform generator.
fn gaussian(rng: &mut StdRng, mean: f64, std_dev: f64) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(f64::EPSILON);
    let u2: f64 = rng.gen();
    let radius = (-2.0 * u1.ln()).sqrt();
    mean + std_dev * radius * (std::f64::consts::TAU * u2).cos()
}

/// Ground-truth crop for one sampled growing condition.
pub fn rule_label(soil: &str, ph: f64, temperature: f64, rainfall: f64, budget: f64) -> Crop {
    if soil == "loamy" && (6.0..=7.5).contains(&ph) && temperature > 25.0 {
        if rainfall > 700.0 && budget > 40_000.0 {
            Crop::Rice
        } else if rainfall < 600.0 && budget > 30_000.0 {
            Crop::Wheat
        } else {
            Crop::Maize
        }
    } else if soil == "sandy" && temperature > 30.0 {
        Crop::Cotton
    } else if soil == "clay" && ph > 7.0 {
        Crop::Sugarcane
    } else {
        Crop::Vegetables
    }
}

/// Synthesize the labeled classifier dataset from the fixed rule set.
pub fn synthesize_crop_dataset(seed: u64, encoder: &SoilTypeEncoder) -> CropDataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut features = Vec::with_capacity(CROP_SAMPLES);
    let mut labels = Vec::with_capacity(CROP_SAMPLES);

    for _ in 0..CROP_SAMPLES {
        let soil = SOIL_VOCABULARY[rng.gen_range(0..SOIL_VOCABULARY.len())];
        let ph = gaussian(&mut rng, 6.5, 1.0);
        let rainfall = gaussian(&mut rng, 800.0, 200.0);
        let temperature = gaussian(&mut rng, 28.0, 5.0);
        let humidity = gaussian(&mut rng, 70.0, 10.0);
        let nitrogen = gaussian(&mut rng, 50.0, 15.0);
        let phosphorus = gaussian(&mut rng, 30.0, 10.0);
        let potassium = gaussian(&mut rng, 40.0, 12.0);
        let budget = gaussian(&mut rng, 50_000.0, 15_000.0);
        let land_size = gaussian(&mut rng, 2.0, 1.0);

        let crop = rule_label(soil, ph, temperature, rainfall, budget);

        features.push(vec![
            encoder.encode(soil),
            ph,
            rainfall,
            temperature,
            humidity,
            nitrogen,
            phosphorus,
            potassium,
            budget,
            land_size,
        ]);
        labels.push(crop.class_index());
    }

    CropDataset { features, labels }
}

/// Synthesize the pooled daily price series: per-crop base price, a
/// sinusoidal seasonal factor (amplitude 20%, period 12 months) and
/// multiplicative gaussian noise (mean 1, stdev 0.1).
pub fn synthesize_price_series(seed: u64) -> PriceDataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut features = Vec::new();
    let mut targets = Vec::new();

    let start = NaiveDate::from_ymd_opt(2020, 1, 1);
    let end = NaiveDate::from_ymd_opt(2024, 1, 1);
    let (Some(start), Some(end)) = (start, end) else {
        return PriceDataset { features, targets };
    };

    for crop in Crop::VOCABULARY {
        let Some(base_price) = crop.base_price() else {
            continue;
        };

        let mut date = start;
        while date <= end {
            let month = f64::from(date.month());
            let seasonal = 1.0 + 0.2 * (std::f64::consts::TAU * month / 12.0).sin();
            let noise = gaussian(&mut rng, 1.0, 0.1);
            let price = (base_price * seasonal * noise).max(0.0);

            features.push(vec![month, f64::from(date.year())]);
            targets.push(price);

            match date.succ_opt() {
                Some(next) => date = next,
                None => break,
            }
        }
    }

    PriceDataset { features, targets }
}

#[cfg(test)]
mod tests {
    use super::{
        rule_label, synthesize_crop_dataset, synthesize_price_series, CROP_SAMPLES,
        SOIL_VOCABULARY, TRAINING_SEED,
    };
    use crate::domain::crop::Crop;
    use crate::ml::encoder::SoilTypeEncoder;

    #[test]
    fn rule_labels_follow_the_agronomic_rules() {
        assert_eq!(rule_label("loamy", 6.8, 27.0, 750.0, 45_000.0), Crop::Rice);
        assert_eq!(rule_label("loamy", 6.8, 27.0, 550.0, 35_000.0), Crop::Wheat);
        assert_eq!(rule_label("loamy", 6.8, 27.0, 650.0, 20_000.0), Crop::Maize);
        assert_eq!(rule_label("sandy", 6.0, 32.0, 400.0, 20_000.0), Crop::Cotton);
        assert_eq!(rule_label("clay", 7.4, 22.0, 800.0, 50_000.0), Crop::Sugarcane);
        assert_eq!(rule_label("silty", 6.5, 20.0, 800.0, 50_000.0), Crop::Vegetables);
    }

    #[test]
    fn crop_dataset_is_reproducible_from_the_seed() {
        let encoder = SoilTypeEncoder::from_vocabulary(&SOIL_VOCABULARY);
        let first = synthesize_crop_dataset(TRAINING_SEED, &encoder);
        let second = synthesize_crop_dataset(TRAINING_SEED, &encoder);

        assert_eq!(first, second);
        assert_eq!(first.features.len(), CROP_SAMPLES);
        assert_eq!(first.labels.len(), CROP_SAMPLES);
    }

    #[test]
    fn different_seeds_produce_different_samples() {
        let encoder = SoilTypeEncoder::from_vocabulary(&SOIL_VOCABULARY);
        let first = synthesize_crop_dataset(TRAINING_SEED, &encoder);
        let other = synthesize_crop_dataset(TRAINING_SEED + 1, &encoder);
        assert_ne!(first.features, other.features);
    }

    #[test]
    fn price_series_pools_five_crops_over_the_full_span() {
        let series = synthesize_price_series(TRAINING_SEED);

        // 2020-01-01..=2024-01-01 is 1462 days (2020 is a leap year).
        assert_eq!(series.features.len(), 5 * 1462);
        assert_eq!(series.features.len(), series.targets.len());
        assert!(series.targets.iter().all(|price| *price >= 0.0));
        assert!(series.features.iter().all(|row| row[0] >= 1.0 && row[0] <= 12.0));
    }

    #[test]
    fn price_series_is_reproducible_from_the_seed() {
        assert_eq!(synthesize_price_series(7), synthesize_price_series(7));
    }
}
