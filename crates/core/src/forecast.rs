//! Day-by-day price forecasting.
//!
//! The regressor predicts a base price from (month, year); each day is
//! scaled by the per-crop multiplier. Any fault returns the fixed fallback
//! forecast, logged, never raised to the caller.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::crop::Crop;
use crate::errors::DomainError;
use crate::ml::store::ModelSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
    /// Relative to the previous predicted day. The first day has no prior
    /// and is labeled `decreasing` by convention.
    pub trend: Trend,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricePath {
    pub predictions: Vec<PricePoint>,
    pub current_price: f64,
    pub future_price: f64,
    /// Signed percentage change from the first to the last predicted day,
    /// rounded to two decimals.
    pub trend_percentage: f64,
    pub recommendation: String,
}

pub struct PriceForecaster {
    models: Arc<ModelSet>,
}

impl PriceForecaster {
    pub const FALLBACK_CURRENT_PRICE: f64 = 2400.0;
    pub const FALLBACK_FUTURE_PRICE: f64 = 2450.0;
    pub const FALLBACK_TREND_PERCENTAGE: f64 = 2.08;
    pub const FALLBACK_RECOMMENDATION: &'static str =
        "Prices are rising slightly. Consider waiting a bit longer.";

    pub fn new(models: Arc<ModelSet>) -> Self {
        Self { models }
    }

    /// Forecast starting from today's calendar date.
    pub fn forecast_price(&self, crop: &str, days_ahead: u32) -> PricePath {
        self.forecast_price_from(crop, Utc::now().date_naive(), days_ahead)
    }

    /// Forecast from an explicit start date; the injectable start keeps the
    /// path reproducible in tests.
    pub fn forecast_price_from(&self, crop: &str, start: NaiveDate, days_ahead: u32) -> PricePath {
        match self.try_forecast(crop, start, days_ahead) {
            Ok(path) => path,
            Err(error) => {
                warn!(
                    event_name = "forecast.fallback",
                    crop = %crop,
                    error = %error,
                    "price inference failed, serving fallback forecast"
                );
                Self::fallback()
            }
        }
    }

    fn try_forecast(
        &self,
        crop: &str,
        start: NaiveDate,
        days_ahead: u32,
    ) -> Result<PricePath, DomainError> {
        let multiplier = Crop::price_multiplier(crop);
        let mut predictions: Vec<PricePoint> = Vec::with_capacity(days_ahead as usize);
        let mut date = start;

        for _ in 0..days_ahead {
            let base = self.models.regressor.predict(date.month(), date.year());
            if !base.is_finite() {
                return Err(DomainError::DegenerateModelOutput(format!(
                    "regressor produced {base} for {date}"
                )));
            }

            let price = round2(base * multiplier);
            let trend = match predictions.last() {
                Some(previous) if price > previous.price => Trend::Increasing,
                _ => Trend::Decreasing,
            };
            predictions.push(PricePoint { date, price, trend });

            match date.succ_opt() {
                Some(next) => date = next,
                None => break,
            }
        }

        let current_price = predictions.first().map(|point| point.price).unwrap_or(0.0);
        let future_price = predictions.last().map(|point| point.price).unwrap_or(0.0);
        let trend_percentage = if predictions.len() > 1 {
            if current_price <= 0.0 {
                return Err(DomainError::DegenerateModelOutput(
                    "first predicted price is not positive".to_owned(),
                ));
            }
            round2((future_price - current_price) / current_price * 100.0)
        } else {
            0.0
        };

        Ok(PricePath {
            predictions,
            current_price,
            future_price,
            trend_percentage,
            recommendation: selling_recommendation(trend_percentage).to_owned(),
        })
    }

    /// Fixed fallback forecast served on any fault.
    pub fn fallback() -> PricePath {
        PricePath {
            predictions: Vec::new(),
            current_price: Self::FALLBACK_CURRENT_PRICE,
            future_price: Self::FALLBACK_FUTURE_PRICE,
            trend_percentage: Self::FALLBACK_TREND_PERCENTAGE,
            recommendation: Self::FALLBACK_RECOMMENDATION.to_owned(),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Banded selling guidance from the overall trend percentage.
pub fn selling_recommendation(trend_percentage: f64) -> &'static str {
    if trend_percentage > 5.0 {
        "Prices are rising significantly. Consider selling soon to maximize profit."
    } else if trend_percentage > 0.0 {
        "Prices are rising slightly. You can wait a bit longer or sell now."
    } else if trend_percentage > -5.0 {
        "Prices are stable. Sell when convenient for you."
    } else {
        "Prices are declining. Consider selling soon to avoid further losses."
    }
}
