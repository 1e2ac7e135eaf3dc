use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use cropwise_core::config::WeatherConfig;
use cropwise_core::providers::{
    CurrentWeather, ForecastDay, ProviderFailure, WeatherProvider, WeatherSnapshot,
};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::map_request_error;

/// Client for a weatherapi.com-style forecast endpoint.
pub struct HttpWeatherProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<SecretString>,
}

impl HttpWeatherProvider {
    pub fn from_config(config: &WeatherConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl WeatherProvider for HttpWeatherProvider {
    async fn forecast(
        &self,
        location: &str,
        days: u32,
    ) -> Result<WeatherSnapshot, ProviderFailure> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            ProviderFailure::Unconfigured("weather.api_key is not set".to_owned())
        })?;

        let url = format!("{}/forecast.json", self.base_url);
        let days = days.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[("key", api_key.expose_secret()), ("q", location), ("days", days.as_str())])
            .send()
            .await
            .map_err(map_request_error)?
            .error_for_status()
            .map_err(map_request_error)?;

        let payload: WireForecastResponse = response.json().await.map_err(map_request_error)?;
        Ok(payload.into_snapshot(location))
    }
}

#[derive(Debug, Deserialize)]
struct WireForecastResponse {
    current: WireCurrent,
    forecast: WireForecast,
}

#[derive(Debug, Deserialize)]
struct WireCurrent {
    temp_c: f64,
    condition: WireCondition,
    humidity: f64,
    wind_kph: f64,
}

#[derive(Debug, Deserialize)]
struct WireCondition {
    text: String,
}

#[derive(Debug, Deserialize)]
struct WireForecast {
    forecastday: Vec<WireForecastDay>,
}

#[derive(Debug, Deserialize)]
struct WireForecastDay {
    date: NaiveDate,
    day: WireDay,
}

#[derive(Debug, Deserialize)]
struct WireDay {
    maxtemp_c: f64,
    mintemp_c: f64,
    condition: WireCondition,
    daily_chance_of_rain: u8,
}

impl WireForecastResponse {
    fn into_snapshot(self, location: &str) -> WeatherSnapshot {
        WeatherSnapshot {
            location: location.to_owned(),
            current: CurrentWeather {
                temp_c: self.current.temp_c,
                condition: self.current.condition.text,
                humidity_pct: self.current.humidity,
                wind_kph: self.current.wind_kph,
            },
            forecast: self
                .forecast
                .forecastday
                .into_iter()
                .map(|day| ForecastDay {
                    date: day.date,
                    max_temp_c: day.day.maxtemp_c,
                    min_temp_c: day.day.mintemp_c,
                    condition: day.day.condition.text,
                    rain_chance_pct: day.day.daily_chance_of_rain,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use cropwise_core::config::WeatherConfig;
    use cropwise_core::providers::{ProviderFailure, WeatherProvider};

    use super::{HttpWeatherProvider, WireForecastResponse};

    #[test]
    fn wire_payload_maps_into_the_core_snapshot() {
        let payload: WireForecastResponse = serde_json::from_str(
            r#"{
                "current": {
                    "temp_c": 31.5,
                    "condition": {"text": "Sunny"},
                    "humidity": 48.0,
                    "wind_kph": 14.0
                },
                "forecast": {
                    "forecastday": [
                        {
                            "date": "2025-06-02",
                            "day": {
                                "maxtemp_c": 34.0,
                                "mintemp_c": 25.0,
                                "condition": {"text": "Patchy rain"},
                                "daily_chance_of_rain": 78
                            }
                        }
                    ]
                }
            }"#,
        )
        .expect("wire payload parses");

        let snapshot = payload.into_snapshot("Delhi");
        assert_eq!(snapshot.location, "Delhi");
        assert_eq!(snapshot.current.condition, "Sunny");
        assert_eq!(snapshot.forecast.len(), 1);
        assert_eq!(snapshot.forecast[0].rain_chance_pct, 78);
    }

    #[tokio::test]
    async fn missing_api_key_fails_as_unconfigured() {
        let provider = HttpWeatherProvider::from_config(&WeatherConfig {
            api_key: None,
            base_url: "http://weather.invalid".to_owned(),
            timeout_secs: 5,
        })
        .expect("client builds");

        let error = provider.forecast("Delhi", 7).await.expect_err("no key configured");
        assert!(matches!(error, ProviderFailure::Unconfigured(_)));
    }
}
