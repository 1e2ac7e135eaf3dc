//! Ranked crop recommendations.
//!
//! Any fault during inference degrades to a fixed default recommendation
//! set rather than propagating; the degrade path is logged so it is never
//! silent.

use std::sync::Arc;

use tracing::warn;

use crate::domain::crop::{Crop, CropRecommendation, RankedCrop};
use crate::domain::farmer::SoilProfile;
use crate::errors::DomainError;
use crate::ml::store::ModelSet;

pub struct RecommendationEngine {
    models: Arc<ModelSet>,
}

impl RecommendationEngine {
    /// Number of recommendations surfaced from the full distribution.
    pub const TOP_N: usize = 3;

    pub fn new(models: Arc<ModelSet>) -> Self {
        Self { models }
    }

    pub fn recommend_crop(&self, profile: &SoilProfile) -> CropRecommendation {
        match self.try_recommend(profile) {
            Ok(recommendation) => recommendation,
            Err(error) => {
                warn!(
                    event_name = "recommend.fallback",
                    error = %error,
                    "crop inference failed, serving default recommendations"
                );
                Self::fallback()
            }
        }
    }

    fn try_recommend(&self, profile: &SoilProfile) -> Result<CropRecommendation, DomainError> {
        let features = self.models.encoder.encode(profile);
        let distribution = self.models.classifier.predict_proba(&features);

        if distribution.len() != Crop::VOCABULARY.len() {
            return Err(DomainError::DegenerateModelOutput(format!(
                "distribution covers {} classes, expected {}",
                distribution.len(),
                Crop::VOCABULARY.len()
            )));
        }
        let total: f64 = distribution.iter().sum();
        if !total.is_finite() || total <= 0.0 {
            return Err(DomainError::DegenerateModelOutput(format!(
                "distribution mass is {total}"
            )));
        }

        // Stable sort over vocabulary order, so equal probabilities rank in
        // vocabulary order.
        let mut ranked: Vec<(Crop, f64)> = Crop::VOCABULARY
            .iter()
            .map(|crop| (*crop, distribution[crop.class_index()]))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        let recommendations: Vec<RankedCrop> = ranked
            .iter()
            .take(Self::TOP_N)
            .map(|(crop, confidence)| RankedCrop {
                crop: *crop,
                confidence: *confidence,
                estimated_yield: crop.estimated_yield().to_owned(),
                required_investment: crop.required_investment().to_owned(),
            })
            .collect();

        let (best_crop, confidence) = ranked[0];
        Ok(CropRecommendation { recommendations, best_crop, confidence })
    }

    /// Fixed default recommendation set served on any inference fault.
    pub fn fallback() -> CropRecommendation {
        let recommendations = [(Crop::Wheat, 0.8), (Crop::Rice, 0.7), (Crop::Maize, 0.6)]
            .into_iter()
            .map(|(crop, confidence)| RankedCrop {
                crop,
                confidence,
                estimated_yield: crop.estimated_yield().to_owned(),
                required_investment: crop.required_investment().to_owned(),
            })
            .collect();

        CropRecommendation { recommendations, best_crop: Crop::Wheat, confidence: 0.8 }
    }
}
