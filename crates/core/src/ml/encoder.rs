use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::farmer::SoilProfile;
use crate::ml::dataset::SOIL_VOCABULARY;

/// Categorical soil-type encoding established at training time.
///
/// Values outside the trained vocabulary map deterministically to the
/// default class code instead of failing, so a stray form value can never
/// break inference.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoilTypeEncoder {
    classes: Vec<String>,
}

impl SoilTypeEncoder {
    pub const DEFAULT_CLASS: &'static str = "loamy";

    pub fn from_vocabulary(values: &[&str]) -> Self {
        let mut classes: Vec<String> =
            values.iter().map(|value| value.trim().to_ascii_lowercase()).collect();
        classes.sort();
        classes.dedup();
        Self { classes }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn encode(&self, raw: &str) -> f64 {
        let normalized = raw.trim().to_ascii_lowercase();
        match self.classes.iter().position(|class| *class == normalized) {
            Some(code) => code as f64,
            None => {
                tracing::warn!(
                    event_name = "ml.encoder.unseen_category",
                    soil_type = %normalized,
                    "soil type outside trained vocabulary, encoding as default class"
                );
                self.default_code()
            }
        }
    }

    fn default_code(&self) -> f64 {
        self.classes.iter().position(|class| class == Self::DEFAULT_CLASS).unwrap_or(0) as f64
    }
}

impl Default for SoilTypeEncoder {
    fn default() -> Self {
        Self::from_vocabulary(&SOIL_VOCABULARY)
    }
}

/// Maps a raw [`SoilProfile`] into the fixed-length numeric feature vector
/// the classifier was trained on, filling missing fields with the fixed
/// defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureEncoder {
    pub soil: SoilTypeEncoder,
}

impl FeatureEncoder {
    pub const FEATURE_DIM: usize = 10;

    pub const DEFAULT_SOIL_PH: f64 = 6.5;
    pub const DEFAULT_RAINFALL_MM: f64 = 800.0;
    pub const DEFAULT_TEMPERATURE_C: f64 = 28.0;
    pub const DEFAULT_HUMIDITY_PCT: f64 = 70.0;
    pub const DEFAULT_NITROGEN: f64 = 50.0;
    pub const DEFAULT_PHOSPHORUS: f64 = 30.0;
    pub const DEFAULT_POTASSIUM: f64 = 40.0;
    pub const DEFAULT_BUDGET: f64 = 50_000.0;
    pub const DEFAULT_LAND_SIZE_ACRES: f64 = 2.0;

    pub fn new(soil: SoilTypeEncoder) -> Self {
        Self { soil }
    }

    pub fn encode(&self, profile: &SoilProfile) -> Vec<f64> {
        let soil_code = match profile.soil_type.as_deref() {
            Some(raw) => self.soil.encode(raw),
            None => self.soil.encode(SoilTypeEncoder::DEFAULT_CLASS),
        };

        vec![
            soil_code,
            profile.soil_ph.unwrap_or(Self::DEFAULT_SOIL_PH),
            profile.rainfall_mm.unwrap_or(Self::DEFAULT_RAINFALL_MM),
            profile.temperature_c.unwrap_or(Self::DEFAULT_TEMPERATURE_C),
            profile.humidity_pct.unwrap_or(Self::DEFAULT_HUMIDITY_PCT),
            profile.nitrogen.unwrap_or(Self::DEFAULT_NITROGEN),
            profile.phosphorus.unwrap_or(Self::DEFAULT_PHOSPHORUS),
            profile.potassium.unwrap_or(Self::DEFAULT_POTASSIUM),
            self.budget_feature(profile.budget),
            profile.land_size_acres.unwrap_or(Self::DEFAULT_LAND_SIZE_ACRES),
        ]
    }

    fn budget_feature(&self, budget: Option<Decimal>) -> f64 {
        budget.map(|amount| amount.try_into().unwrap_or(Self::DEFAULT_BUDGET))
            .unwrap_or(Self::DEFAULT_BUDGET)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{FeatureEncoder, SoilTypeEncoder};
    use crate::domain::farmer::SoilProfile;

    #[test]
    fn vocabulary_is_sorted_and_codes_are_stable() {
        let encoder = SoilTypeEncoder::default();
        assert_eq!(encoder.classes(), ["clay", "loamy", "sandy", "silty"]);
        assert_eq!(encoder.encode("clay"), 0.0);
        assert_eq!(encoder.encode("loamy"), 1.0);
        assert_eq!(encoder.encode(" Silty "), 3.0);
    }

    #[test]
    fn unseen_soil_types_map_to_the_default_class() {
        let encoder = SoilTypeEncoder::default();
        assert_eq!(encoder.encode("volcanic"), encoder.encode("loamy"));
    }

    #[test]
    fn missing_fields_are_filled_with_the_documented_defaults() {
        let encoder = FeatureEncoder::default();
        let features = encoder.encode(&SoilProfile::default());

        assert_eq!(features.len(), FeatureEncoder::FEATURE_DIM);
        assert_eq!(features[0], encoder.soil.encode("loamy"));
        assert_eq!(features[1], 6.5);
        assert_eq!(features[2], 800.0);
        assert_eq!(features[3], 28.0);
        assert_eq!(features[8], 50_000.0);
        assert_eq!(features[9], 2.0);
    }

    #[test]
    fn provided_fields_override_the_defaults() {
        let encoder = FeatureEncoder::default();
        let profile = SoilProfile {
            soil_type: Some("sandy".to_owned()),
            soil_ph: Some(7.2),
            budget: Some(Decimal::from(80_000)),
            ..SoilProfile::default()
        };

        let features = encoder.encode(&profile);
        assert_eq!(features[0], encoder.soil.encode("sandy"));
        assert_eq!(features[1], 7.2);
        assert_eq!(features[8], 80_000.0);
    }
}
