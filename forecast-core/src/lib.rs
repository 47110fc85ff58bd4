//! Core library for the `forecast` client.
//!
//! This crate defines:
//! - Configuration handling
//! - Abstraction over weather providers (the hosted endpoint, NWS)
//! - The weather fetcher and its observable state
//! - Shared domain models (coordinates, reports)
//!
//! It is used by `forecast-cli`, but can also back any other front end that
//! can watch a `tokio::sync::watch` channel.

pub mod config;
pub mod fetcher;
pub mod model;
pub mod provider;

pub use config::{Config, ProviderConfig};
pub use fetcher::{FETCH_FAILED_MESSAGE, FetchError, FetchState, WeatherFetcher};
pub use model::{Coordinates, WeatherReport};
pub use provider::{ProviderId, WeatherProvider};
