//! Trait interfaces for the external weather, market and advice providers.
//!
//! Every provider returns `Result<T, ProviderFailure>` so that failure
//! handling stays visible in signatures. Call sites own a documented
//! fallback payload and a warn-level log entry; a provider fault is never
//! surfaced as a request failure.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixed response substituted when the advice provider is unreachable.
pub const ADVICE_FALLBACK: &str =
    "I'm sorry, I'm having trouble connecting right now. Please try again later.";

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ProviderFailure {
    #[error("provider request failed: {0}")]
    Http(String),
    #[error("provider request timed out")]
    Timeout,
    #[error("provider payload could not be decoded: {0}")]
    Decode(String),
    #[error("provider is not configured: {0}")]
    Unconfigured(String),
    #[error("all provider endpoints failed, last error: {0}")]
    Exhausted(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub temp_c: f64,
    pub condition: String,
    pub humidity_pct: f64,
    pub wind_kph: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub max_temp_c: f64,
    pub min_temp_c: f64,
    pub condition: String,
    pub rain_chance_pct: u8,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location: String,
    pub current: CurrentWeather,
    pub forecast: Vec<ForecastDay>,
}

impl WeatherSnapshot {
    /// Fixed mock payload used whenever the live provider fails.
    pub fn fallback(location: &str, today: NaiveDate) -> Self {
        Self {
            location: location.to_owned(),
            current: CurrentWeather {
                temp_c: 28.0,
                condition: "Partly Cloudy".to_owned(),
                humidity_pct: 65.0,
                wind_kph: 12.0,
            },
            forecast: vec![ForecastDay {
                date: today,
                max_temp_c: 32.0,
                min_temp_c: 22.0,
                condition: "Sunny".to_owned(),
                rain_chance_pct: 10,
            }],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketQuote {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub change_percent: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub quotes: Vec<MarketQuote>,
}

impl MarketSnapshot {
    /// Fixed mock payload used whenever every live endpoint fails.
    pub fn fallback() -> Self {
        Self {
            quotes: vec![
                MarketQuote {
                    symbol: "WHEAT".to_owned(),
                    name: "Wheat".to_owned(),
                    price: 2400.0,
                    change_percent: 2.5,
                },
                MarketQuote {
                    symbol: "RICE".to_owned(),
                    name: "Rice".to_owned(),
                    price: 3500.0,
                    change_percent: -1.2,
                },
            ],
        }
    }

    /// Change percent of the lead quote, the figure market alerts key on.
    pub fn lead_change_percent(&self) -> Option<f64> {
        self.quotes.first().map(|quote| quote.change_percent)
    }
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn forecast(&self, location: &str, days: u32) -> Result<WeatherSnapshot, ProviderFailure>;
}

#[async_trait]
pub trait MarketProvider: Send + Sync {
    async fn prices(&self, crop: &str) -> Result<MarketSnapshot, ProviderFailure>;
}

#[async_trait]
pub trait AdviceProvider: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderFailure>;
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{MarketSnapshot, WeatherSnapshot};

    #[test]
    fn weather_fallback_matches_the_documented_mock_payload() {
        let today = NaiveDate::from_ymd_opt(2025, 7, 1).expect("valid date");
        let snapshot = WeatherSnapshot::fallback("Delhi", today);

        assert_eq!(snapshot.location, "Delhi");
        assert_eq!(snapshot.current.temp_c, 28.0);
        assert_eq!(snapshot.forecast.len(), 1);
        assert_eq!(snapshot.forecast[0].rain_chance_pct, 10);
    }

    #[test]
    fn market_fallback_leads_with_wheat() {
        let snapshot = MarketSnapshot::fallback();
        assert_eq!(snapshot.quotes[0].symbol, "WHEAT");
        assert_eq!(snapshot.lead_change_percent(), Some(2.5));
    }
}
