pub mod advice;
pub mod config;
pub mod domain;
pub mod errors;
pub mod forecast;
pub mod journey;
pub mod ml;
pub mod providers;
pub mod recommend;

pub use domain::crop::{Crop, CropRecommendation, RankedCrop};
pub use domain::farmer::{FarmerInput, Irrigation, SoilProfile};
pub use domain::plan::{
    Alert, FarmingPlan, PlanId, Priority, ProgressUpdate, Reminder, PLANNING_PHASE,
};
pub use domain::timeline::{PhasePlan, Timeline};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use forecast::{PriceForecaster, PricePath, PricePoint, Trend};
pub use journey::{DashboardView, FarmingJourney, MissingPhasePolicy, PlanStore};
pub use ml::encoder::{FeatureEncoder, SoilTypeEncoder};
pub use ml::forest::{CropClassifier, PriceRegressor};
pub use ml::store::{ArtifactStoreError, ModelArtifactStore, ModelSet};
pub use providers::{
    AdviceProvider, CurrentWeather, ForecastDay, MarketProvider, MarketQuote, MarketSnapshot,
    ProviderFailure, WeatherProvider, WeatherSnapshot, ADVICE_FALLBACK,
};
pub use recommend::RecommendationEngine;
