use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::{
    config::OpenWeatherSettings,
    model::{Coordinates, WeatherSnapshot},
};

use super::{ProviderError, WeatherProvider};

/// Shown when the provider returns no weather description entries.
pub const NO_DESCRIPTION: &str = "нет описания";

const GEOCODING: &str = "OpenWeather geocoding";
const CURRENT: &str = "OpenWeather current weather";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    units: String,
    lang: String,
    geocode_limit: u32,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn from_settings(api_key: String, settings: &OpenWeatherSettings) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .context("Failed to build OpenWeather HTTP client")?;

        Ok(Self {
            api_key,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            units: settings.units.clone(),
            lang: settings.lang.clone(),
            geocode_limit: settings.geocode_limit,
            http,
        })
    }

    /// Point the provider at another host, e.g. a mock server.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    async fn get_json<T>(
        &self,
        endpoint: &'static str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ProviderError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let res = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .query(query)
            .send()
            .await
            .map_err(|source| ProviderError::Transport {
                endpoint,
                source: source.without_url(),
            })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|source| ProviderError::Transport {
                endpoint,
                source: source.without_url(),
            })?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                endpoint,
                status,
                body: truncate_body(&body),
            });
        }

        serde_json::from_str(&body).map_err(|source| ProviderError::Decode { endpoint, source })
    }
}

#[derive(Debug, Deserialize)]
struct OwGeoMatch {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
    #[serde(default)]
    grnd_level: i64,
}

#[derive(Debug, Default, Deserialize)]
struct OwWind {
    #[serde(default)]
    speed: f64,
    #[serde(default)]
    gust: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwRain {
    #[serde(rename = "1h", default)]
    one_hour: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwClouds {
    #[serde(default)]
    all: u8,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    #[serde(default)]
    name: String,
    #[serde(default)]
    weather: Vec<OwWeather>,
    main: OwMain,
    #[serde(default)]
    visibility: u32,
    #[serde(default)]
    wind: OwWind,
    #[serde(default)]
    rain: OwRain,
    #[serde(default)]
    clouds: OwClouds,
}

impl From<OwCurrentResponse> for WeatherSnapshot {
    fn from(parsed: OwCurrentResponse) -> Self {
        let description = parsed
            .weather
            .into_iter()
            .next()
            .map(|w| w.description)
            .unwrap_or_else(|| NO_DESCRIPTION.to_string());

        WeatherSnapshot {
            city_name: parsed.name,
            temperature_c: parsed.main.temp,
            feels_like_c: parsed.main.feels_like,
            description,
            precipitation_mm_h: parsed.rain.one_hour,
            wind_speed_mps: parsed.wind.speed,
            wind_gust_mps: parsed.wind.gust,
            ground_pressure_hpa: parsed.main.grnd_level,
            humidity_pct: parsed.main.humidity,
            visibility_m: parsed.visibility,
            clouds_pct: parsed.clouds.all,
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn coordinates(&self, city: &str) -> Result<Coordinates, ProviderError> {
        let matches: Vec<OwGeoMatch> = self
            .get_json(
                GEOCODING,
                "/geo/1.0/direct",
                &[
                    ("q", city.to_string()),
                    ("limit", self.geocode_limit.to_string()),
                    ("appid", self.api_key.clone()),
                ],
            )
            .await?;

        let first = matches
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::EmptyResult { city: city.to_string() })?;

        tracing::debug!(city, lat = first.lat, lon = first.lon, "resolved coordinates");

        Ok(Coordinates { lat: first.lat, lon: first.lon })
    }

    async fn weather(&self, at: Coordinates) -> Result<WeatherSnapshot, ProviderError> {
        let parsed: OwCurrentResponse = self
            .get_json(
                CURRENT,
                "/data/2.5/weather",
                &[
                    ("lat", at.lat.to_string()),
                    ("lon", at.lon.to_string()),
                    ("appid", self.api_key.clone()),
                    ("units", self.units.clone()),
                    ("lang", self.lang.clone()),
                ],
            )
            .await?;

        Ok(parsed.into())
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }

    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
