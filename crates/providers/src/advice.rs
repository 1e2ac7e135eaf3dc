use std::time::Duration;

use async_trait::async_trait;
use cropwise_core::config::AdviceConfig;
use cropwise_core::providers::{AdviceProvider, ProviderFailure};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::map_request_error;

/// Client for an ollama-style `generate` endpoint: prompt in, free text
/// out. An API key, when configured, is sent as a bearer token for hosted
/// deployments.
pub struct HttpAdviceProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<SecretString>,
}

impl HttpAdviceProvider {
    pub fn from_config(config: &AdviceConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[derive(Debug, Serialize)]
struct WireGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct WireGenerateResponse {
    response: String,
}

#[async_trait]
impl AdviceProvider for HttpAdviceProvider {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderFailure> {
        let url = format!("{}/api/generate", self.base_url);
        let mut request = self
            .client
            .post(&url)
            .json(&WireGenerateRequest { model: &self.model, prompt, stream: false });
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key.expose_secret());
        }

        let response = request
            .send()
            .await
            .map_err(map_request_error)?
            .error_for_status()
            .map_err(map_request_error)?;

        let payload: WireGenerateResponse = response.json().await.map_err(map_request_error)?;
        Ok(payload.response)
    }
}

#[cfg(test)]
mod tests {
    use super::{WireGenerateRequest, WireGenerateResponse};

    #[test]
    fn request_serializes_with_streaming_disabled() {
        let request = WireGenerateRequest {
            model: "llama3.1",
            prompt: "when should I sow wheat",
            stream: false,
        };
        let json = serde_json::to_value(&request).expect("serializable");
        assert_eq!(json["model"], "llama3.1");
        assert_eq!(json["stream"], false);
    }

    #[test]
    fn response_text_is_read_from_the_response_field() {
        let payload: WireGenerateResponse =
            serde_json::from_str(r#"{"response": "sow in early November", "done": true}"#)
                .expect("wire payload parses");
        assert_eq!(payload.response, "sow in early November");
    }
}
