use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use forecast_core::{
    Config, Coordinates, FetchError, ProviderConfig, ProviderId, WeatherFetcher, WeatherReport,
    provider::{nws, provider_from_config, proxy::ProxyProvider},
};
use inquire::{Confirm, InquireError, Text};

use crate::{input, render};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "forecast", version, about = "Weather forecast for a latitude/longitude pair")]
pub struct Cli {
    /// Provider to use instead of the configured default ("proxy" or "nws").
    #[arg(long, global = true)]
    pub provider: Option<String>,

    /// Base URL to use instead of the provider's configured one.
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Log diagnostics to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure settings for a specific provider.
    Configure {
        /// Provider short name, e.g. "proxy" or "nws".
        provider: String,
    },

    /// Fetch and show the forecast once.
    Show {
        /// Latitude; prompted for if absent.
        #[arg(long, allow_hyphen_values = true)]
        lat: Option<String>,

        /// Longitude; prompted for if absent.
        #[arg(long, allow_hyphen_values = true)]
        lon: Option<String>,
    },

    /// Keep asking for coordinates and showing forecasts until told to stop.
    App,

    /// Check that the weather endpoint is up.
    Health,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        let Cli { provider, endpoint, command, .. } = self;

        match command {
            Command::Configure { provider: name } => configure(&name, endpoint.as_deref()),
            Command::Show { lat, lon } => {
                let fetcher = build_fetcher(provider.as_deref(), endpoint)?;
                let coords = input::collect(lat, lon, &Coordinates::default())?;

                match fetch_and_render(&fetcher, &coords).await {
                    Ok(_) => Ok(ExitCode::SUCCESS),
                    Err(_) => Ok(ExitCode::FAILURE),
                }
            }
            Command::App => {
                let fetcher = build_fetcher(provider.as_deref(), endpoint)?;
                app(&fetcher).await
            }
            Command::Health => health(provider.as_deref(), endpoint).await,
        }
    }
}

fn build_fetcher(provider: Option<&str>, endpoint: Option<String>) -> anyhow::Result<WeatherFetcher> {
    let explicit = provider.map(ProviderId::try_from).transpose()?;
    let mut config = Config::load()?;

    let id = match explicit {
        Some(id) => id,
        None => config.default_provider_id()?,
    };

    if let Some(url) = endpoint {
        config.override_base_url(id, url);
    }

    Ok(WeatherFetcher::new(provider_from_config(id, &config)?))
}

/// Run one fetch, printing each state the fetcher publishes along the way.
async fn fetch_and_render(
    fetcher: &WeatherFetcher,
    coords: &Coordinates,
) -> Result<WeatherReport, FetchError> {
    let mut rx = fetcher.subscribe();
    let fetch = fetcher.fetch(coords);
    tokio::pin!(fetch);

    loop {
        tokio::select! {
            result = &mut fetch => {
                if rx.has_changed().unwrap_or(false) {
                    render::print_state(&rx.borrow_and_update());
                }
                if matches!(result, Err(FetchError::InFlight)) {
                    tracing::warn!("{}", FetchError::InFlight);
                }
                return result;
            }
            Ok(()) = rx.changed() => {
                render::print_state(&rx.borrow_and_update());
            }
        }
    }
}

async fn app(fetcher: &WeatherFetcher) -> anyhow::Result<ExitCode> {
    println!("Weather App");

    let mut coords = Coordinates::default();
    loop {
        coords = match input::collect(None, None, &coords) {
            Ok(c) => c,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e.into()),
        };

        let _ = fetch_and_render(fetcher, &coords).await;

        match Confirm::new("Get weather again?").with_default(true).prompt() {
            Ok(true) => continue,
            Ok(false)
            | Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Pre-filled answer for the base URL prompt: `--endpoint`, then the saved
/// value, then the built-in default.
fn suggested_base_url<'a>(
    id: ProviderId,
    endpoint: Option<&'a str>,
    current: &'a ProviderConfig,
) -> &'a str {
    endpoint.or(current.base_url.as_deref()).unwrap_or(id.default_base_url())
}

fn configure(provider: &str, endpoint: Option<&str>) -> anyhow::Result<ExitCode> {
    let id = ProviderId::try_from(provider)?;
    let mut config = Config::load()?;
    let current = config.provider_config(id).cloned().unwrap_or_default();

    let default_url = id.default_base_url();
    let base_url = Text::new("Base URL:")
        .with_default(suggested_base_url(id, endpoint, &current))
        .prompt()?;

    let user_agent = match id {
        ProviderId::Nws => Some(
            Text::new("User-Agent:")
                .with_help_message("api.weather.gov wants contact details, e.g. (my-app, me@example.com)")
                .with_default(current.user_agent.as_deref().unwrap_or(nws::DEFAULT_USER_AGENT))
                .prompt()?,
        ),
        ProviderId::Proxy => None,
    };

    // Only overrides are stored so a changed built-in default still applies.
    let base_url = (base_url.trim_end_matches('/') != default_url).then_some(base_url);
    config.upsert_provider(id, ProviderConfig { base_url, user_agent });

    if config.default_provider_id()? != id {
        let question = format!("Make {id} the default provider?");
        if Confirm::new(&question).with_default(false).prompt()? {
            config.set_default_provider(id);
        }
    }

    let path = config.save()?;
    println!("Saved {id} settings to {}", path.display());

    Ok(ExitCode::SUCCESS)
}

/// Base URL for the health check. Only the hosted endpoint has one.
fn health_base_url(
    provider: Option<&str>,
    endpoint: Option<String>,
    config: &Config,
) -> anyhow::Result<String> {
    if let Some(name) = provider {
        let id = ProviderId::try_from(name)?;
        if id != ProviderId::Proxy {
            anyhow::bail!("Provider '{id}' has no health endpoint; only 'proxy' does.");
        }
    }

    Ok(endpoint
        .or_else(|| config.provider_base_url(ProviderId::Proxy).map(str::to_owned))
        .unwrap_or_else(|| ProviderId::Proxy.default_base_url().to_owned()))
}

async fn health(provider: Option<&str>, endpoint: Option<String>) -> anyhow::Result<ExitCode> {
    let config = Config::load()?;
    let provider = ProxyProvider::new(health_base_url(provider, endpoint, &config)?);
    let status = provider
        .health()
        .await
        .with_context(|| format!("Health check against {} failed", provider.base_url()))?;

    println!("{}: {status}", provider.base_url());
    Ok(ExitCode::SUCCESS)
}
