use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::farmer::FarmerInput;
use crate::domain::plan::{Alert, FarmingPlan, PlanId, Priority, Reminder};
use crate::domain::timeline::Timeline;
use crate::forecast::PricePath;
use crate::ml::encoder::FeatureEncoder;
use crate::providers::{MarketSnapshot, WeatherSnapshot};

/// Placeholder yield assumption until field telemetry is wired in.
pub const YIELD_TONS_PER_ACRE: f64 = 2.5;
/// Conversion from forecast price units to income per ton.
pub const MARKET_UNIT_FACTOR: f64 = 10.0;
pub const ROI_PLACEHOLDER_PCT: f64 = 25.5;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropHealthScore {
    pub score: u32,
    pub status: String,
    pub factors: Vec<String>,
}

impl CropHealthScore {
    /// Fixed composite until live weather/pest signals feed the score. The
    /// {score, status, factors} shape is stable for clients.
    pub fn placeholder() -> Self {
        Self {
            score: 85,
            status: "Good".to_owned(),
            factors: vec![
                "Weather favorable".to_owned(),
                "No pest alerts".to_owned(),
                "Growth on track".to_owned(),
            ],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FinancialSummary {
    pub total_budget: Decimal,
    pub estimated_yield_tons: f64,
    pub estimated_income: Decimal,
    pub roi_percentage: f64,
    pub market_trend: f64,
}

pub fn financial_summary(farmer: &FarmerInput, forecast: &PricePath) -> FinancialSummary {
    let total_budget = farmer
        .soil
        .budget
        .unwrap_or_else(|| Decimal::from(FeatureEncoder::DEFAULT_BUDGET as i64));
    let land_size =
        farmer.soil.land_size_acres.unwrap_or(FeatureEncoder::DEFAULT_LAND_SIZE_ACRES);
    let estimated_yield_tons = YIELD_TONS_PER_ACRE * land_size;
    let income = forecast.future_price * estimated_yield_tons * MARKET_UNIT_FACTOR;

    FinancialSummary {
        total_budget,
        estimated_yield_tons,
        estimated_income: Decimal::from_f64(income).unwrap_or_default().round_dp(2),
        roi_percentage: ROI_PLACEHOLDER_PCT,
        market_trend: forecast.trend_percentage,
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DashboardView {
    pub plan_id: PlanId,
    pub current_phase: String,
    pub current_weather: WeatherSnapshot,
    pub current_market: MarketSnapshot,
    pub price_prediction: PricePath,
    pub active_reminders: Vec<Reminder>,
    pub active_alerts: Vec<Alert>,
    pub timeline: Timeline,
    pub next_activities: Vec<String>,
    pub crop_health_score: CropHealthScore,
    pub financial_summary: FinancialSummary,
}

/// Assemble the dashboard from the stored plan and freshly fetched live
/// data. Reminders surface at high priority only; alerts surface at medium
/// and above so market moves stay actionable.
pub fn build_view(
    plan: &FarmingPlan,
    current_weather: WeatherSnapshot,
    current_market: MarketSnapshot,
    price_prediction: PricePath,
) -> DashboardView {
    let next_activities = plan
        .timeline
        .phase_named(&plan.current_phase)
        .map(|phase| phase.activities.clone())
        .unwrap_or_default();

    DashboardView {
        plan_id: plan.plan_id.clone(),
        current_phase: plan.current_phase.clone(),
        active_reminders: plan
            .reminders
            .iter()
            .filter(|reminder| reminder.priority == Priority::High)
            .cloned()
            .collect(),
        active_alerts: plan
            .alerts
            .iter()
            .filter(|alert| alert.priority() >= Priority::Medium)
            .cloned()
            .collect(),
        timeline: plan.timeline.clone(),
        next_activities,
        crop_health_score: CropHealthScore::placeholder(),
        financial_summary: financial_summary(&plan.farmer, &price_prediction),
        current_weather,
        current_market,
        price_prediction,
    }
}
