use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ─── Daily weather observation ───────────────────────────────────────────────

/// Where a [`WeatherObservation`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ObservationSource {
    Api,
    Cache,
    Mock,
}

/// Daily weather feeding the yield simulators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WeatherObservation {
    /// Daily horizontal insolation (kWh/m²/day)
    pub ghi_daily_kwh: f64,
    /// Mean air temperature (°C)
    pub temp_avg_c: f64,
    pub source: ObservationSource,
    /// When the upstream observation was taken (or synthesised)
    pub timestamp: DateTime<Utc>,
}

// ─── OpenWeatherMap wire types ───────────────────────────────────────────────

/// `GET /data/2.5/weather` response, reduced to the fields we read.
#[derive(Debug, Deserialize)]
pub struct OwmCurrentWeather {
    pub main: OwmMain,
    #[serde(default)]
    pub clouds: Option<OwmClouds>,
    #[serde(default)]
    pub sys: Option<OwmSys>,
    /// Observation time, unix seconds
    #[serde(default)]
    pub dt: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OwmMain {
    /// Air temperature (°C with `units=metric`)
    pub temp: f64,
}

#[derive(Debug, Deserialize)]
pub struct OwmClouds {
    /// Cloudiness (%)
    #[serde(default)]
    pub all: f64,
}

#[derive(Debug, Deserialize)]
pub struct OwmSys {
    #[serde(default)]
    pub sunrise: Option<i64>,
    #[serde(default)]
    pub sunset: Option<i64>,
}
