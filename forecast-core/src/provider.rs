use crate::{
    Config, Coordinates, WeatherReport,
    provider::{nws::NwsProvider, proxy::ProxyProvider},
};
use async_trait::async_trait;
use std::{convert::TryFrom, fmt::Debug};

pub mod nws;
pub mod proxy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    /// The hosted `/weather` endpoint.
    Proxy,
    /// api.weather.gov, queried directly.
    Nws,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Proxy => "proxy",
            ProviderId::Nws => "nws",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderId::Proxy => proxy::DEFAULT_BASE_URL,
            ProviderId::Nws => nws::DEFAULT_BASE_URL,
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::Proxy, ProviderId::Nws]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "proxy" => Ok(ProviderId::Proxy),
            "nws" => Ok(ProviderId::Nws),
            _ => Err(anyhow::anyhow!("Unknown provider '{value}'. Supported providers: proxy, nws.")),
        }
    }
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    fn id(&self) -> ProviderId;

    async fn get_weather(&self, coords: &Coordinates) -> anyhow::Result<WeatherReport>;
}

/// Construct a provider from config and explicit ProviderId.
pub fn provider_from_config(
    id: ProviderId,
    config: &Config,
) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let base_url = config.provider_base_url(id).unwrap_or(id.default_base_url());

    let boxed: Box<dyn WeatherProvider> = match id {
        ProviderId::Proxy => Box::new(ProxyProvider::new(base_url)),
        ProviderId::Nws => Box::new(NwsProvider::new(
            base_url,
            config.provider_user_agent(id).unwrap_or(nws::DEFAULT_USER_AGENT),
        )),
    };

    tracing::debug!(provider = %id, "provider constructed");
    Ok(boxed)
}

/// Construct the default provider from config, using `default_provider` field.
pub fn default_provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let id = config.default_provider_id()?;
    provider_from_config(id, config)
}

/// Cut a response body down to something fit for an error message.
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

/// Join a base URL and a path without doubling the slash.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
