use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    model::{Coordinates, WeatherReport},
    provider::{ProviderId, join_url, truncate_body},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://wzma38ggvg.execute-api.us-east-2.amazonaws.com/prod";

/// Client for the hosted `/weather` endpoint, which already answers with
/// a flat weather report.
#[derive(Debug, Clone)]
pub struct ProxyProvider {
    base_url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
}

impl ProxyProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), http: Client::new() }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Ask the service for its health status, e.g. "healthy".
    pub async fn health(&self) -> Result<String> {
        let url = join_url(&self.base_url, "health");

        let res = self
            .http
            .get(&url)
            .send()
            .await
            .context("Failed to send health check request")?;

        let status = res.status();
        let body = res.text().await.context("Failed to read health check response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "Health check failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: HealthResponse =
            serde_json::from_str(&body).context("Failed to parse health check JSON")?;

        Ok(parsed.status)
    }
}

#[async_trait]
impl WeatherProvider for ProxyProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Proxy
    }

    async fn get_weather(&self, coords: &Coordinates) -> Result<WeatherReport> {
        let url = join_url(&self.base_url, "weather");

        let res = self
            .http
            .get(&url)
            .query(&[("lat", coords.latitude.as_str()), ("lon", coords.longitude.as_str())])
            .send()
            .await
            .context("Failed to send weather request")?;

        let status = res.status();
        let body = res.text().await.context("Failed to read weather response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "Weather request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let report: WeatherReport =
            serde_json::from_str(&body).context("Failed to parse weather JSON")?;

        Ok(report)
    }
}
