/// ====================================================================
/// Upstream current-weather source
/// ====================================================================
///
/// One request per call, bounded by the client timeout, never retried.
/// Every failure is classified into a [`WeatherError`] so the caller can
/// log it and fall back to the deterministic estimate.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use tracing::debug;

use crate::error::WeatherError;
use crate::models::site::Location;
use crate::models::weather::OwmCurrentWeather;

pub const OPENWEATHERMAP_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
/// Value shipped in sample env files; treated as no key at all.
const PLACEHOLDER_KEY: &str = "your_api_key_here";

/// Current conditions at a location, as reported upstream.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub temperature_c: f64,
    /// Cloud cover in [0, 1]
    pub cloud_fraction: f64,
    pub sunrise: Option<DateTime<Utc>>,
    pub sunset: Option<DateTime<Utc>>,
    pub timestamp: DateTime<Utc>,
    pub station: Option<String>,
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current(&self, location: Location) -> Result<WeatherReport, WeatherError>;
}

// ─── OpenWeatherMap ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct OpenWeatherMapProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenWeatherMapProvider {
    /// Builds the HTTP client once; it is reused for every request.
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WeatherError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty() && k != PLACEHOLDER_KEY),
        })
    }

    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }
}

fn classify_transport(e: reqwest::Error) -> WeatherError {
    if e.is_timeout() {
        WeatherError::Timeout
    } else {
        WeatherError::Transport(e.to_string())
    }
}

fn unix_to_utc(secs: Option<i64>) -> Option<DateTime<Utc>> {
    secs.and_then(|s| DateTime::from_timestamp(s, 0))
}

impl From<OwmCurrentWeather> for WeatherReport {
    fn from(resp: OwmCurrentWeather) -> Self {
        let cloud_pct = resp.clouds.map(|c| c.all).unwrap_or(0.0);
        let (sunrise, sunset) = resp
            .sys
            .map(|s| (unix_to_utc(s.sunrise), unix_to_utc(s.sunset)))
            .unwrap_or((None, None));

        Self {
            temperature_c: resp.main.temp,
            cloud_fraction: (cloud_pct / 100.0).clamp(0.0, 1.0),
            sunrise,
            sunset,
            timestamp: unix_to_utc(resp.dt).unwrap_or_else(Utc::now),
            station: resp.name.filter(|n| !n.is_empty()),
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherMapProvider {
    async fn current(&self, location: Location) -> Result<WeatherReport, WeatherError> {
        let api_key = self.api_key.as_deref().ok_or(WeatherError::MissingCredentials)?;

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("lat", location.latitude.to_string()),
                ("lon", location.longitude.to_string()),
                ("appid", api_key.to_string()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await
            .map_err(classify_transport)?;

        match response.status() {
            StatusCode::UNAUTHORIZED => return Err(WeatherError::Unauthorized),
            StatusCode::TOO_MANY_REQUESTS => return Err(WeatherError::RateLimited),
            s if !s.is_success() => return Err(WeatherError::Http { status: s.as_u16() }),
            _ => {}
        }

        let body = response.text().await.map_err(classify_transport)?;
        let parsed: OwmCurrentWeather =
            serde_json::from_str(&body).map_err(|e| WeatherError::Malformed(e.to_string()))?;

        debug!(
            lat = location.latitude,
            lon = location.longitude,
            temp = parsed.main.temp,
            "OpenWeatherMap observation received"
        );
        Ok(parsed.into())
    }
}
