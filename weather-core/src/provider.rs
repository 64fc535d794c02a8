use crate::{
    Config,
    model::{Coordinates, WeatherSnapshot},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Failure of a single provider call. No partial results are ever returned.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("failed to send {endpoint} request: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} request failed with status {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to parse {endpoint} response: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("no geocoding matches for '{city}'")]
    EmptyResult { city: String },
}

impl ProviderError {
    /// Upstream HTTP status, if the call got that far.
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            ProviderError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Resolve a place name to the coordinates of its first geocoding match.
    async fn coordinates(&self, city: &str) -> Result<Coordinates, ProviderError>;

    /// Current conditions at `at`.
    async fn weather(&self, at: Coordinates) -> Result<WeatherSnapshot, ProviderError>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.require_api_key()?;
    let provider = OpenWeatherProvider::from_settings(api_key.to_owned(), &config.openweather)?;

    Ok(Box::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = provider_from_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("No OpenWeather API key configured"));
    }

    #[test]
    fn provider_from_config_works_when_configured() {
        let mut cfg = Config::default();
        cfg.openweather.api_key = Some("KEY".to_string());

        assert!(provider_from_config(&cfg).is_ok());
    }

    #[test]
    fn status_is_exposed_only_for_status_errors() {
        let err = ProviderError::Status {
            endpoint: "geocoding",
            status: reqwest::StatusCode::UNAUTHORIZED,
            body: String::new(),
        };
        assert_eq!(err.status(), Some(reqwest::StatusCode::UNAUTHORIZED));

        let err = ProviderError::EmptyResult { city: "Nowhere".into() };
        assert_eq!(err.status(), None);
    }
}
