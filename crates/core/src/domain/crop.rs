use serde::{Deserialize, Serialize};

/// Closed crop vocabulary. The classifier's probability distribution is
/// indexed by [`Crop::VOCABULARY`] order, which is also the ranking
/// tie-break order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Crop {
    Wheat,
    Rice,
    Maize,
    Cotton,
    Sugarcane,
    Vegetables,
}

impl Crop {
    pub const VOCABULARY: [Crop; 6] = [
        Crop::Wheat,
        Crop::Rice,
        Crop::Maize,
        Crop::Cotton,
        Crop::Sugarcane,
        Crop::Vegetables,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wheat => "wheat",
            Self::Rice => "rice",
            Self::Maize => "maize",
            Self::Cotton => "cotton",
            Self::Sugarcane => "sugarcane",
            Self::Vegetables => "vegetables",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "wheat" => Some(Self::Wheat),
            "rice" => Some(Self::Rice),
            "maize" => Some(Self::Maize),
            "cotton" => Some(Self::Cotton),
            "sugarcane" => Some(Self::Sugarcane),
            "vegetables" => Some(Self::Vegetables),
            _ => None,
        }
    }

    pub fn class_index(&self) -> usize {
        Self::VOCABULARY.iter().position(|crop| crop == self).unwrap_or(0)
    }

    pub fn from_class_index(index: usize) -> Option<Self> {
        Self::VOCABULARY.get(index).copied()
    }

    /// Static per-crop yield range used on recommendation cards.
    pub fn estimated_yield(&self) -> &'static str {
        match self {
            Self::Wheat | Self::Maize => "2-3 tons/acre",
            Self::Rice => "3-4 tons/acre",
            Self::Cotton => "1-2 tons/acre",
            Self::Sugarcane => "60-80 tons/acre",
            Self::Vegetables => "15-25 tons/acre",
        }
    }

    /// Static per-crop investment range used on recommendation cards.
    pub fn required_investment(&self) -> &'static str {
        match self {
            Self::Wheat => "₹40,000-50,000",
            Self::Rice => "₹45,000-60,000",
            Self::Maize => "₹35,000-45,000",
            Self::Cotton => "₹50,000-70,000",
            Self::Sugarcane => "₹60,000-80,000",
            Self::Vegetables => "₹30,000-50,000",
        }
    }

    /// Multiplier applied to the regressor's base price. Crops without a
    /// dedicated series (and unknown crop names) use 1.0.
    pub fn price_multiplier(name: &str) -> f64 {
        match Self::parse(name) {
            Some(Self::Wheat) => 1.0,
            Some(Self::Rice) => 1.46,
            Some(Self::Maize) => 0.75,
            Some(Self::Cotton) => 2.5,
            Some(Self::Sugarcane) => 1.33,
            Some(Self::Vegetables) | None => 1.0,
        }
    }

    /// Base price of the synthetic market series. Vegetables carry no
    /// dedicated series.
    pub fn base_price(&self) -> Option<f64> {
        match self {
            Self::Wheat => Some(2400.0),
            Self::Rice => Some(3500.0),
            Self::Maize => Some(1800.0),
            Self::Cotton => Some(6000.0),
            Self::Sugarcane => Some(3200.0),
            Self::Vegetables => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankedCrop {
    pub crop: Crop,
    pub confidence: f64,
    pub estimated_yield: String,
    pub required_investment: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CropRecommendation {
    /// Highest confidence first; exactly the top three of the distribution.
    pub recommendations: Vec<RankedCrop>,
    pub best_crop: Crop,
    pub confidence: f64,
}

#[cfg(test)]
mod tests {
    use super::Crop;

    #[test]
    fn vocabulary_round_trips_through_class_indices() {
        for (index, crop) in Crop::VOCABULARY.iter().enumerate() {
            assert_eq!(crop.class_index(), index);
            assert_eq!(Crop::from_class_index(index), Some(*crop));
        }
        assert_eq!(Crop::from_class_index(Crop::VOCABULARY.len()), None);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Crop::parse("Wheat"), Some(Crop::Wheat));
        assert_eq!(Crop::parse(" RICE "), Some(Crop::Rice));
        assert_eq!(Crop::parse("quinoa"), None);
    }

    #[test]
    fn unknown_crops_fall_back_to_unit_multiplier() {
        assert_eq!(Crop::price_multiplier("rice"), 1.46);
        assert_eq!(Crop::price_multiplier("quinoa"), 1.0);
        assert_eq!(Crop::price_multiplier("vegetables"), 1.0);
    }
}
