use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Raw soil and budget readings as submitted by the farmer. Every field is
/// optional on input; the feature encoder fills the documented defaults.
///
/// `soil_type` is kept as free text because readings arrive from forms and
/// chat flows; the encoder owns the trained vocabulary and the policy for
/// values outside it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoilProfile {
    pub soil_type: Option<String>,
    pub soil_ph: Option<f64>,
    pub rainfall_mm: Option<f64>,
    pub temperature_c: Option<f64>,
    pub humidity_pct: Option<f64>,
    pub nitrogen: Option<f64>,
    pub phosphorus: Option<f64>,
    pub potassium: Option<f64>,
    pub budget: Option<Decimal>,
    pub land_size_acres: Option<f64>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Irrigation {
    #[default]
    Rainfed,
    Canal,
    Borewell,
    Drip,
    Sprinkler,
}

impl Irrigation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rainfed => "rainfed",
            Self::Canal => "canal",
            Self::Borewell => "borewell",
            Self::Drip => "drip",
            Self::Sprinkler => "sprinkler",
        }
    }
}

/// Everything the farmer tells us when opening a plan.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FarmerInput {
    pub location: Option<String>,
    pub soil: SoilProfile,
    pub irrigation: Option<Irrigation>,
    pub experience_years: Option<u32>,
    pub goal: Option<String>,
}

impl FarmerInput {
    pub const DEFAULT_LOCATION: &'static str = "Delhi";

    pub fn location(&self) -> &str {
        self.location.as_deref().unwrap_or(Self::DEFAULT_LOCATION)
    }

    pub fn irrigation(&self) -> Irrigation {
        self.irrigation.unwrap_or_default()
    }
}
