use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, Url, header::USER_AGENT};
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    model::{Coordinates, WeatherReport},
    provider::{ProviderId, truncate_body},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.weather.gov";

/// api.weather.gov rejects requests without an identifying User-Agent.
pub const DEFAULT_USER_AGENT: &str = "(weather-app, contact@example.com)";

/// Queries the National Weather Service in two steps: resolve the grid
/// point for the coordinates, then read its forecast and keep the first
/// period.
#[derive(Debug, Clone)]
pub struct NwsProvider {
    base_url: String,
    user_agent: String,
    http: Client,
}

impl NwsProvider {
    pub fn new(base_url: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), user_agent: user_agent.into(), http: Client::new() }
    }

    /// `<base>/points/{lat},{lon}`, with the pair percent-encoded as a
    /// single path segment so reserved characters reach the service as typed.
    fn points_url(&self, coords: &Coordinates) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .with_context(|| format!("Invalid NWS base URL: {}", self.base_url))?;

        url.path_segments_mut()
            .map_err(|_| anyhow!("NWS base URL cannot have a path: {}", self.base_url))?
            .pop_if_empty()
            .push("points")
            .push(&format!("{},{}", coords.latitude, coords.longitude));

        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, what: &str) -> Result<T> {
        let res = self
            .http
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await
            .with_context(|| format!("Failed to send NWS {what} request"))?;

        let status = res.status();
        let body =
            res.text().await.with_context(|| format!("Failed to read NWS {what} response body"))?;

        if !status.is_success() {
            return Err(anyhow!(
                "NWS {} request failed with status {}: {}",
                what,
                status,
                truncate_body(&body),
            ));
        }

        serde_json::from_str(&body).with_context(|| format!("Failed to parse NWS {what} JSON"))
    }
}

#[derive(Debug, Deserialize)]
struct PointsProperties {
    forecast: String,
}

#[derive(Debug, Deserialize)]
struct PointsResponse {
    properties: PointsProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NwsPeriod {
    temperature: serde_json::Number,
    temperature_unit: String,
    wind_speed: String,
    wind_direction: String,
    short_forecast: String,
    detailed_forecast: String,
}

#[derive(Debug, Deserialize)]
struct ForecastProperties {
    periods: Vec<NwsPeriod>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    properties: ForecastProperties,
}

impl From<NwsPeriod> for WeatherReport {
    fn from(p: NwsPeriod) -> Self {
        WeatherReport {
            temperature: Some(p.temperature),
            temperature_unit: Some(p.temperature_unit),
            wind_speed: Some(p.wind_speed),
            wind_direction: Some(p.wind_direction),
            short_forecast: Some(p.short_forecast),
            detailed_forecast: Some(p.detailed_forecast),
        }
    }
}

#[async_trait]
impl WeatherProvider for NwsProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Nws
    }

    async fn get_weather(&self, coords: &Coordinates) -> Result<WeatherReport> {
        let points_url = self.points_url(coords)?;
        let points: PointsResponse = self.get_json(points_url.as_str(), "points").await?;

        tracing::debug!(forecast_url = %points.properties.forecast, "resolved NWS grid point");

        let forecast: ForecastResponse =
            self.get_json(&points.properties.forecast, "forecast").await?;

        let current = forecast
            .properties
            .periods
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("NWS forecast response contained no periods"))?;

        Ok(current.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(base: &str, lat: &str, lon: &str) -> String {
        NwsProvider::new(base, DEFAULT_USER_AGENT)
            .points_url(&Coordinates::new(lat, lon))
            .unwrap()
            .to_string()
    }

    #[test]
    fn points_url_plain_coordinates() {
        assert_eq!(
            points("https://api.weather.gov", "40.0", "-75.0"),
            "https://api.weather.gov/points/40.0,-75.0"
        );
    }

    #[test]
    fn points_url_keeps_base_path() {
        assert_eq!(points("http://h/nws/", "1", "2"), "http://h/nws/points/1,2");
    }

    #[test]
    fn points_url_encodes_reserved_characters() {
        assert_eq!(
            points("http://h", "40.0#frag", "-75.0"),
            "http://h/points/40.0%23frag,-75.0"
        );
        assert_eq!(points("http://h", "1?x=2", "3/4"), "http://h/points/1%3Fx=2,3%2F4");
        assert_eq!(points("http://h", "1 ", "2"), "http://h/points/1%20,2");
    }

    #[test]
    fn invalid_base_url_is_an_error() {
        let err = NwsProvider::new("not a url", DEFAULT_USER_AGENT)
            .points_url(&Coordinates::new("1", "2"))
            .unwrap_err();
        assert!(err.to_string().contains("Invalid NWS base URL"));
    }
}
