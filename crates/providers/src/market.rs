use std::time::Duration;

use async_trait::async_trait;
use cropwise_core::config::MarketConfig;
use cropwise_core::providers::{MarketProvider, MarketQuote, MarketSnapshot, ProviderFailure};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use crate::map_request_error;

/// Endpoints tried in order until one returns usable data.
const ENDPOINTS: [&str; 3] = ["tickers", "eod", "intraday"];
const QUOTE_LIMIT: u32 = 10;

/// Client for a marketstack-style price API. Several backend endpoints are
/// tried before the call is reported as failed.
pub struct HttpMarketProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<SecretString>,
}

impl HttpMarketProvider {
    pub fn from_config(config: &MarketConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    async fn fetch_endpoint(
        &self,
        endpoint: &str,
        api_key: &SecretString,
        crop: &str,
    ) -> Result<MarketSnapshot, ProviderFailure> {
        let url = format!("{}/{endpoint}", self.base_url);
        let symbols = crop.to_ascii_uppercase();
        let limit = QUOTE_LIMIT.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("access_key", api_key.expose_secret()),
                ("symbols", symbols.as_str()),
                ("limit", limit.as_str()),
            ])
            .send()
            .await
            .map_err(map_request_error)?
            .error_for_status()
            .map_err(map_request_error)?;

        let payload: WireMarketResponse = response.json().await.map_err(map_request_error)?;
        let snapshot = payload.into_snapshot();
        if snapshot.quotes.is_empty() {
            return Err(ProviderFailure::Decode(format!("endpoint {endpoint} returned no data")));
        }
        Ok(snapshot)
    }
}

#[async_trait]
impl MarketProvider for HttpMarketProvider {
    async fn prices(&self, crop: &str) -> Result<MarketSnapshot, ProviderFailure> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            ProviderFailure::Unconfigured("market.api_key is not set".to_owned())
        })?;

        let mut last_error = None;
        for endpoint in ENDPOINTS {
            match self.fetch_endpoint(endpoint, api_key, crop).await {
                Ok(snapshot) => return Ok(snapshot),
                Err(error) => {
                    debug!(
                        event_name = "market.endpoint_failed",
                        endpoint,
                        crop,
                        error = %error,
                        "market endpoint failed, trying next"
                    );
                    last_error = Some(error);
                }
            }
        }

        Err(ProviderFailure::Exhausted(
            last_error.map(|error| error.to_string()).unwrap_or_else(|| "no endpoints".to_owned()),
        ))
    }
}

#[derive(Debug, Deserialize)]
struct WireMarketResponse {
    #[serde(default)]
    data: Vec<WireQuote>,
}

#[derive(Debug, Deserialize)]
struct WireQuote {
    symbol: String,
    #[serde(default)]
    name: Option<String>,
    price: f64,
    #[serde(default)]
    change_percent: f64,
}

impl WireMarketResponse {
    fn into_snapshot(self) -> MarketSnapshot {
        MarketSnapshot {
            quotes: self
                .data
                .into_iter()
                .map(|quote| MarketQuote {
                    name: quote.name.unwrap_or_else(|| quote.symbol.clone()),
                    symbol: quote.symbol,
                    price: quote.price,
                    change_percent: quote.change_percent,
                })
                .collect(),
        }
    }
}
