//! The fetch-and-publish cycle.
//!
//! [`WeatherFetcher`] owns the current [`FetchState`] and publishes every
//! transition on a `watch` channel, so a presentation layer can re-render
//! on each change without polling.

use thiserror::Error;
use tokio::sync::watch;

use crate::{Coordinates, WeatherProvider, WeatherReport};

/// The only failure text an end user ever sees.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch weather data. Please try again.";

/// What the presentation layer should currently show.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FetchState {
    #[default]
    Idle,
    Loading,
    Success(WeatherReport),
    Failure(String),
}

impl FetchState {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    /// True once a fetch has resolved one way or the other.
    pub fn is_settled(&self) -> bool {
        matches!(self, FetchState::Success(_) | FetchState::Failure(_))
    }

    pub fn report(&self) -> Option<&WeatherReport> {
        match self {
            FetchState::Success(report) => Some(report),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FetchState::Failure(msg) => Some(msg),
            _ => None,
        }
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FetchError {
    /// Network error, non-2xx status or malformed body; the cause is only logged.
    #[error("{}", FETCH_FAILED_MESSAGE)]
    Failed,

    /// Rejected because another fetch is still outstanding.
    #[error("A weather request is already in progress")]
    InFlight,
}

#[derive(Debug)]
pub struct WeatherFetcher {
    provider: Box<dyn WeatherProvider>,
    state: watch::Sender<FetchState>,
}

impl WeatherFetcher {
    pub fn new(provider: Box<dyn WeatherProvider>) -> Self {
        let (state, _) = watch::channel(FetchState::Idle);
        Self { provider, state }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> FetchState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState> {
        self.state.subscribe()
    }

    /// Issue exactly one request for `coords` and publish its outcome.
    ///
    /// Returns [`FetchError::InFlight`] without touching the state or the
    /// network if a previous call has not resolved yet. Dropping the
    /// returned future early resets the state to `Idle`.
    pub async fn fetch(&self, coords: &Coordinates) -> Result<WeatherReport, FetchError> {
        let started = self.state.send_if_modified(|state| {
            if state.is_loading() {
                return false;
            }
            *state = FetchState::Loading;
            true
        });

        if !started {
            tracing::debug!("fetch rejected, a request is already in flight");
            return Err(FetchError::InFlight);
        }

        let guard = LoadingGuard { state: &self.state, settled: false };

        tracing::info!(
            provider = %self.provider.id(),
            lat = %coords.latitude,
            lon = %coords.longitude,
            "fetching weather"
        );

        match self.provider.get_weather(coords).await {
            Ok(report) => {
                guard.settle(FetchState::Success(report.clone()));
                Ok(report)
            }
            Err(err) => {
                tracing::debug!("weather fetch failed: {err:#}");
                guard.settle(FetchState::Failure(FETCH_FAILED_MESSAGE.to_string()));
                Err(FetchError::Failed)
            }
        }
    }
}

/// Held while a fetch is outstanding. If the fetch future is dropped before
/// it settles, the state goes back to `Idle` so the fetcher stays usable.
struct LoadingGuard<'a> {
    state: &'a watch::Sender<FetchState>,
    settled: bool,
}

impl LoadingGuard<'_> {
    fn settle(mut self, next: FetchState) {
        self.settled = true;
        self.state.send_replace(next);
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        tracing::debug!("weather fetch abandoned before it resolved");
        self.state.send_if_modified(|state| {
            if !state.is_loading() {
                return false;
            }
            *state = FetchState::Idle;
            true
        });
    }
}
