use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Millimetres of mercury per hectopascal.
pub const HPA_TO_MMHG: f64 = 0.750063755419211;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Current conditions at a location, as reported by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub city_name: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub description: String,
    /// Rain over the last hour.
    pub precipitation_mm_h: f64,
    pub wind_speed_mps: f64,
    pub wind_gust_mps: f64,
    /// Ground-level pressure in hPa.
    pub ground_pressure_hpa: i64,
    pub humidity_pct: u8,
    pub visibility_m: u32,
    pub clouds_pct: u8,
}

impl WeatherSnapshot {
    pub fn pressure_mmhg(&self) -> f64 {
        self.ground_pressure_hpa as f64 * HPA_TO_MMHG
    }
}

/// A bot user and the city they asked to be remembered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    /// Empty until the user sets one with `/city`.
    pub city: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
