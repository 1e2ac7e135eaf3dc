//! Farming-plan lifecycle orchestration.
//!
//! The orchestrator owns the keyed plan store (injected at construction)
//! and is the only writer of plan state. Each plan sits behind its own
//! lock, so phase transitions, reminder/alert regeneration and progress
//! appends on one plan are mutually exclusive while other plans proceed
//! unblocked. Live provider data is fetched outside the plan lock.

mod dashboard;

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use crate::advice::timeline_prompt;
use crate::domain::crop::CropRecommendation;
use crate::domain::farmer::{FarmerInput, SoilProfile};
use crate::domain::plan::{
    Alert, FarmingPlan, PlanId, Priority, ProgressUpdate, Reminder, PLANNING_PHASE,
};
use crate::domain::timeline::Timeline;
use crate::errors::ApplicationError;
use crate::forecast::{PriceForecaster, PricePath};
use crate::ml::store::ModelSet;
use crate::providers::{
    AdviceProvider, MarketProvider, MarketSnapshot, WeatherProvider, WeatherSnapshot,
    ADVICE_FALLBACK,
};
use crate::recommend::RecommendationEngine;

pub use dashboard::{
    build_view, financial_summary, CropHealthScore, DashboardView, FinancialSummary,
    MARKET_UNIT_FACTOR, ROI_PLACEHOLDER_PCT, YIELD_TONS_PER_ACRE,
};

/// Days of weather requested for the plan's stored snapshot.
pub const WEATHER_FORECAST_DAYS: u32 = 30;
/// Days of prices recomputed for every dashboard read.
pub const DASHBOARD_FORECAST_DAYS: u32 = 30;
/// Rain alerts consider at most this many leading forecast days.
pub const RAIN_ALERT_WINDOW_DAYS: usize = 7;
pub const RAIN_ALERT_THRESHOLD_PCT: u8 = 70;
pub const MARKET_ALERT_THRESHOLD_PCT: f64 = 5.0;

/// What a phase advance does when the plan's current phase is not found in
/// its timeline. `RestartFromFirst` reproduces the historical behavior of
/// treating the unknown phase as index zero; `HoldCurrent` leaves the plan
/// where it is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingPhasePolicy {
    #[default]
    RestartFromFirst,
    HoldCurrent,
}

/// Keyed plan store. Each plan is wrapped in its own lock so updates to
/// different plans never contend.
#[derive(Default)]
pub struct PlanStore {
    plans: RwLock<HashMap<String, Arc<Mutex<FarmingPlan>>>>,
}

impl PlanStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, plan: FarmingPlan) -> Arc<Mutex<FarmingPlan>> {
        let key = plan.plan_id.as_str().to_owned();
        let entry = Arc::new(Mutex::new(plan));
        self.plans.write().await.insert(key, entry.clone());
        entry
    }

    pub async fn get(&self, plan_id: &str) -> Option<Arc<Mutex<FarmingPlan>>> {
        self.plans.read().await.get(plan_id).cloned()
    }

    pub async fn count(&self) -> usize {
        self.plans.read().await.len()
    }
}

pub struct FarmingJourney {
    recommender: RecommendationEngine,
    forecaster: PriceForecaster,
    weather: Arc<dyn WeatherProvider>,
    market: Arc<dyn MarketProvider>,
    advice: Arc<dyn AdviceProvider>,
    plans: Arc<PlanStore>,
    policy: MissingPhasePolicy,
}

impl FarmingJourney {
    pub fn new(
        models: Arc<ModelSet>,
        weather: Arc<dyn WeatherProvider>,
        market: Arc<dyn MarketProvider>,
        advice: Arc<dyn AdviceProvider>,
        plans: Arc<PlanStore>,
    ) -> Self {
        Self {
            recommender: RecommendationEngine::new(models.clone()),
            forecaster: PriceForecaster::new(models),
            weather,
            market,
            advice,
            plans,
            policy: MissingPhasePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: MissingPhasePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn recommend_crop(&self, profile: &SoilProfile) -> CropRecommendation {
        self.recommender.recommend_crop(profile)
    }

    pub fn forecast_price(&self, crop: &str, days_ahead: u32) -> PricePath {
        self.forecaster.forecast_price(crop, days_ahead)
    }

    /// Build and store a plan from the farmer's input. Provider faults
    /// degrade to the fixed fallback payloads; creation itself never fails
    /// on a provider fault.
    pub async fn create_plan(&self, farmer: FarmerInput) -> FarmingPlan {
        let created_at = Utc::now();
        let plan_id = PlanId::from_timestamp(created_at);
        let today = created_at.date_naive();
        let location = farmer.location().to_owned();

        let recommendation = self.recommender.recommend_crop(&farmer.soil);
        let best_crop = recommendation.best_crop;

        let weather = match self.weather.forecast(&location, WEATHER_FORECAST_DAYS).await {
            Ok(snapshot) => snapshot,
            Err(error) => {
                warn!(
                    event_name = "journey.weather_fallback",
                    plan_id = %plan_id,
                    error = %error,
                    "weather provider failed, storing mock payload"
                );
                WeatherSnapshot::fallback(&location, today)
            }
        };

        let mut market = BTreeMap::new();
        for ranked in &recommendation.recommendations {
            let crop_name = ranked.crop.as_str().to_owned();
            let snapshot = match self.market.prices(&crop_name).await {
                Ok(snapshot) => snapshot,
                Err(error) => {
                    warn!(
                        event_name = "journey.market_fallback",
                        plan_id = %plan_id,
                        crop = %crop_name,
                        error = %error,
                        "market provider failed, storing mock payload"
                    );
                    MarketSnapshot::fallback()
                }
            };
            market.insert(crop_name, snapshot);
        }

        let advisory = match self.advice.generate(&timeline_prompt(best_crop, &farmer)).await {
            Ok(text) => text,
            Err(error) => {
                warn!(
                    event_name = "journey.advice_fallback",
                    plan_id = %plan_id,
                    error = %error,
                    "advice provider failed, storing apology text"
                );
                ADVICE_FALLBACK.to_owned()
            }
        };

        let mut plan = FarmingPlan {
            plan_id,
            created_at,
            last_updated: None,
            farmer,
            recommendation,
            weather,
            market,
            timeline: Timeline::for_crop(best_crop),
            current_phase: PLANNING_PHASE.to_owned(),
            reminders: Vec::new(),
            alerts: Vec::new(),
            progress_updates: Vec::new(),
            advisory: Some(advisory),
        };
        regenerate_reminders_and_alerts(&mut plan);

        info!(
            event_name = "journey.plan_created",
            plan_id = %plan.plan_id,
            best_crop = best_crop.as_str(),
            alerts = plan.alerts.len(),
            "farming plan created"
        );
        self.plans.insert(plan.clone()).await;
        plan
    }

    /// Append a progress update, advance the phase when the update marks it
    /// complete and regenerate the derived reminders/alerts.
    pub async fn record_progress(
        &self,
        plan_id: &str,
        update: ProgressUpdate,
    ) -> Result<FarmingPlan, ApplicationError> {
        let entry = self
            .plans
            .get(plan_id)
            .await
            .ok_or_else(|| ApplicationError::PlanNotFound { plan_id: plan_id.to_owned() })?;

        let mut plan = entry.lock().await;
        plan.last_updated = Some(Utc::now());
        let phase_completed = update.phase_completed;
        plan.progress_updates.push(update);

        if phase_completed {
            self.advance_phase(&mut plan);
        }
        regenerate_reminders_and_alerts(&mut plan);

        info!(
            event_name = "journey.progress_recorded",
            plan_id = %plan.plan_id,
            current_phase = %plan.current_phase,
            "progress update recorded"
        );
        Ok(plan.clone())
    }

    fn advance_phase(&self, plan: &mut FarmingPlan) {
        let resolved = match plan.timeline.phase_index(&plan.current_phase) {
            Some(index) => Some(index),
            None => match self.policy {
                MissingPhasePolicy::RestartFromFirst => Some(0),
                MissingPhasePolicy::HoldCurrent => {
                    warn!(
                        event_name = "journey.unknown_phase_held",
                        plan_id = %plan.plan_id,
                        phase = %plan.current_phase,
                        "current phase not in timeline, holding position"
                    );
                    None
                }
            },
        };

        let Some(index) = resolved else {
            return;
        };
        // Clamped at the terminal phase.
        if index + 1 < plan.timeline.phases.len() {
            plan.current_phase = plan.timeline.phases[index + 1].name.clone();
        }
    }

    /// Aggregate the dashboard: live 1-day weather, live market prices for
    /// the best crop and a fresh 30-day forecast over the stored plan state.
    pub async fn get_dashboard(&self, plan_id: &str) -> Result<DashboardView, ApplicationError> {
        let entry = self
            .plans
            .get(plan_id)
            .await
            .ok_or_else(|| ApplicationError::PlanNotFound { plan_id: plan_id.to_owned() })?;

        // Snapshot under the lock; live fetches happen after release so a
        // slow provider cannot block progress updates on the same plan.
        let snapshot = { entry.lock().await.clone() };

        let location = snapshot.farmer.location().to_owned();
        let current_weather = match self.weather.forecast(&location, 1).await {
            Ok(weather) => weather,
            Err(error) => {
                warn!(
                    event_name = "journey.weather_fallback",
                    plan_id = %snapshot.plan_id,
                    error = %error,
                    "weather provider failed, serving mock payload"
                );
                WeatherSnapshot::fallback(&location, Utc::now().date_naive())
            }
        };

        let best_crop = snapshot.recommendation.best_crop;
        let current_market = match self.market.prices(best_crop.as_str()).await {
            Ok(market) => market,
            Err(error) => {
                warn!(
                    event_name = "journey.market_fallback",
                    plan_id = %snapshot.plan_id,
                    crop = best_crop.as_str(),
                    error = %error,
                    "market provider failed, serving mock payload"
                );
                MarketSnapshot::fallback()
            }
        };

        let price_prediction =
            self.forecaster.forecast_price(best_crop.as_str(), DASHBOARD_FORECAST_DAYS);

        Ok(build_view(&snapshot, current_weather, current_market, price_prediction))
    }
}

/// Derive reminders and alerts from the current plan state. Always
/// recomputed as a whole, never merged with previous output.
pub fn regenerate_reminders_and_alerts(plan: &mut FarmingPlan) {
    let mut alerts = Vec::new();

    for day in plan.weather.forecast.iter().take(RAIN_ALERT_WINDOW_DAYS) {
        if day.rain_chance_pct > RAIN_ALERT_THRESHOLD_PCT {
            alerts.push(Alert::RainAlert {
                date: day.date,
                rain_chance_pct: day.rain_chance_pct,
                message: format!(
                    "High chance of rain ({}%) on {}. Consider protecting your crops.",
                    day.rain_chance_pct, day.date
                ),
                priority: Priority::High,
            });
        }
    }

    let mut reminders = Vec::new();
    if let Some(phase) = plan.timeline.phase_named(&plan.current_phase) {
        for activity in &phase.activities {
            reminders.push(Reminder {
                message: format!("Time to {}", activity.to_lowercase()),
                activity: activity.clone(),
                phase: phase.name.clone(),
                priority: Priority::Medium,
            });
        }
    }

    for (crop, snapshot) in &plan.market {
        if let Some(change) = snapshot.lead_change_percent() {
            if change.abs() > MARKET_ALERT_THRESHOLD_PCT {
                alerts.push(Alert::MarketAlert {
                    crop: crop.clone(),
                    change_percent: change,
                    message: format!(
                        "{crop} prices changed by {change}%. Consider timing your harvest/sale."
                    ),
                    priority: Priority::Medium,
                });
            }
        }
    }

    plan.reminders = reminders;
    plan.alerts = alerts;
}
