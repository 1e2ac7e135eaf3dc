use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::crop::CropRecommendation;
use crate::domain::farmer::FarmerInput;
use crate::domain::timeline::Timeline;
use crate::providers::{MarketSnapshot, WeatherSnapshot};

/// Pseudo-phase a plan starts in before the timeline's first phase.
pub const PLANNING_PHASE: &str = "planning";

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlanId(pub String);

impl PlanId {
    /// Plan ids are derived from the creation timestamp at one-second
    /// granularity, matching the id format exposed to clients.
    pub fn from_timestamp(created_at: DateTime<Utc>) -> Self {
        Self(created_at.format("plan_%Y%m%d_%H%M%S").to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// Activity reminder derived from the phase matching `current_phase`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub message: String,
    pub activity: String,
    pub phase: String,
    pub priority: Priority,
}

/// Derived alert. Regenerated as a whole on plan creation and on every
/// progress update, never merged incrementally.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Alert {
    RainAlert { date: NaiveDate, rain_chance_pct: u8, message: String, priority: Priority },
    MarketAlert { crop: String, change_percent: f64, message: String, priority: Priority },
}

impl Alert {
    pub fn priority(&self) -> Priority {
        match self {
            Self::RainAlert { priority, .. } | Self::MarketAlert { priority, .. } => *priority,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressUpdate {
    pub note: Option<String>,
    pub phase_completed: bool,
}

/// Aggregate root of a farmer's cultivation engagement. Created once,
/// mutated only through progress updates, never deleted here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FarmingPlan {
    pub plan_id: PlanId,
    pub created_at: DateTime<Utc>,
    pub last_updated: Option<DateTime<Utc>>,
    pub farmer: FarmerInput,
    pub recommendation: CropRecommendation,
    pub weather: WeatherSnapshot,
    /// Market payload per recommended crop, keyed by crop name.
    pub market: BTreeMap<String, MarketSnapshot>,
    pub timeline: Timeline,
    pub current_phase: String,
    pub reminders: Vec<Reminder>,
    pub alerts: Vec<Alert>,
    pub progress_updates: Vec<ProgressUpdate>,
    pub advisory: Option<String>,
}
