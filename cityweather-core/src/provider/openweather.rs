use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::{
    config::{ApiKeySource, Config, DEFAULT_BASE_URL},
    error::{FetchError, truncate_body},
};

use super::{Endpoint, WeatherSource};

/// OpenWeather 2.5 REST API (`/weather`, `/forecast`), metric units.
#[derive(Debug, Clone)]
pub struct OpenWeatherSource {
    http: Client,
    base_url: String,
    key: ApiKeySource,
}

impl OpenWeatherSource {
    pub fn new(key: ApiKeySource) -> Self {
        Self::with_base_url(key, DEFAULT_BASE_URL)
    }

    /// Point the source at another host, e.g. a mock server.
    pub fn with_base_url(key: ApiKeySource, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: Client::new(),
            base_url,
            key,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::with_base_url(config.key_source(), config.base_url())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherSource {
    async fn fetch(&self, endpoint: Endpoint, city: &str) -> Result<Value, FetchError> {
        let api_key = self.key.resolve().ok_or_else(|| FetchError::MissingApiKey {
            env_var: self.key.env_var().to_string(),
        })?;

        let url = format!("{}/{}", self.base_url, endpoint.path());
        tracing::debug!(city, %endpoint, %url, "sending OpenWeather request");

        // Errors carry the request URL, which includes the key.
        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", city),
                ("units", "metric"),
                ("appid", api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.without_url()))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.without_url()))?;

        if !status.is_success() {
            return Err(FetchError::Status {
                status,
                body: truncate_body(&body),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}
