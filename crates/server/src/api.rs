//! JSON API surface over the journey orchestrator and engines.
//!
//! Handlers stay thin: deserialize, delegate, map application errors into
//! interface errors with a per-request correlation id.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use cropwise_core::advice::{build_prompt, AdviceRequest};
use cropwise_core::errors::InterfaceError;
use cropwise_core::forecast::PricePath;
use cropwise_core::journey::DashboardView;
use cropwise_core::providers::ADVICE_FALLBACK;
use cropwise_core::{CropRecommendation, FarmerInput, FarmingPlan, ProgressUpdate, SoilProfile};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::bootstrap::AppState;

/// Longest accepted price path; out-of-range requests are clamped, in line
/// with the default-fill input policy.
pub const MAX_FORECAST_DAYS: u32 = 365;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/recommend", post(recommend))
        .route("/api/forecast", post(forecast))
        .route("/api/plans", post(create_plan))
        .route("/api/plans/{plan_id}/progress", post(record_progress))
        .route("/api/plans/{plan_id}/dashboard", get(dashboard))
        .route("/api/advice", post(advice))
        .with_state(state)
}

#[derive(Debug)]
pub struct ApiError(pub InterfaceError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            InterfaceError::NotFound { .. } => StatusCode::NOT_FOUND,
            InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(serde_json::json!({
            "error": self.0.user_message(),
            "correlation_id": self.0.correlation_id(),
        }));
        (status, body).into_response()
    }
}

pub async fn recommend(
    State(state): State<AppState>,
    Json(profile): Json<SoilProfile>,
) -> Json<CropRecommendation> {
    Json(state.journey.recommend_crop(&profile))
}

#[derive(Debug, Deserialize)]
pub struct ForecastRequest {
    pub crop: String,
    #[serde(default = "default_days_ahead")]
    pub days_ahead: u32,
}

fn default_days_ahead() -> u32 {
    30
}

pub async fn forecast(
    State(state): State<AppState>,
    Json(request): Json<ForecastRequest>,
) -> Json<PricePath> {
    let days_ahead = request.days_ahead.clamp(1, MAX_FORECAST_DAYS);
    Json(state.journey.forecast_price(&request.crop, days_ahead))
}

pub async fn create_plan(
    State(state): State<AppState>,
    Json(farmer): Json<FarmerInput>,
) -> (StatusCode, Json<FarmingPlan>) {
    let plan = state.journey.create_plan(farmer).await;
    (StatusCode::CREATED, Json(plan))
}

pub async fn record_progress(
    State(state): State<AppState>,
    Path(plan_id): Path<String>,
    Json(update): Json<ProgressUpdate>,
) -> Result<Json<FarmingPlan>, ApiError> {
    let correlation_id = Uuid::new_v4().to_string();
    state.journey.record_progress(&plan_id, update).await.map(Json).map_err(|error| {
        warn!(
            event_name = "api.progress_rejected",
            correlation_id = %correlation_id,
            plan_id = %plan_id,
            error = %error,
            "progress update rejected"
        );
        ApiError(error.into_interface(correlation_id))
    })
}

pub async fn dashboard(
    State(state): State<AppState>,
    Path(plan_id): Path<String>,
) -> Result<Json<DashboardView>, ApiError> {
    let correlation_id = Uuid::new_v4().to_string();
    state.journey.get_dashboard(&plan_id).await.map(Json).map_err(|error| {
        warn!(
            event_name = "api.dashboard_rejected",
            correlation_id = %correlation_id,
            plan_id = %plan_id,
            error = %error,
            "dashboard read rejected"
        );
        ApiError(error.into_interface(correlation_id))
    })
}

#[derive(Debug, Serialize)]
pub struct AdviceResponse {
    pub advice: String,
}

pub async fn advice(
    State(state): State<AppState>,
    Json(request): Json<AdviceRequest>,
) -> Json<AdviceResponse> {
    let prompt = build_prompt(&request);
    let text = match state.advice.generate(&prompt).await {
        Ok(text) => text,
        Err(error) => {
            warn!(
                event_name = "api.advice_fallback",
                error = %error,
                "advice provider failed, serving apology text"
            );
            ADVICE_FALLBACK.to_owned()
        }
    };
    Json(AdviceResponse { advice: text })
}
