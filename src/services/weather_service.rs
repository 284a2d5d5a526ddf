//! Grid-cached daily weather lookup with a deterministic fallback.
//!
//! Observations are cached per 0.01° grid cell. On a miss a single upstream
//! call is made for the cell, shared by every concurrent caller asking for the
//! same cell. Upstream and cache failures are logged and never surfaced: the
//! caller always gets an observation.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeDelta, Utc};
use futures_util::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::models::site::Location;
use crate::models::weather::{ObservationSource, WeatherObservation};
use crate::services::cache_store::CacheStore;
use crate::services::weather_provider::{WeatherProvider, WeatherReport};

pub const DEFAULT_TTL_HOURS: i64 = 6;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Tropical clear-day insolation (kWh/m²/day)
const CLEAR_DAY_GHI: f64 = 5.5;
/// Share of insolation removed by full overcast
const CLOUD_ATTENUATION: f64 = 0.7;
const MIN_DAILY_GHI: f64 = 2.0;
const MAX_DAILY_GHI: f64 = 7.0;

/// Cache key for a coordinate, rounded to two decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridKey {
    lat_centi: i64,
    lon_centi: i64,
}

impl GridKey {
    pub fn from_location(location: Location) -> Self {
        Self {
            lat_centi: (location.latitude * 100.0).round() as i64,
            lon_centi: (location.longitude * 100.0).round() as i64,
        }
    }
}

impl fmt::Display for GridKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "weather:{:.2}:{:.2}",
            self.lat_centi as f64 / 100.0,
            self.lon_centi as f64 / 100.0
        )
    }
}

/// Daily insolation estimate from current cloud cover.
pub fn daily_ghi_from_cloud_fraction(cloud_fraction: f64) -> f64 {
    (CLEAR_DAY_GHI * (1.0 - cloud_fraction * CLOUD_ATTENUATION)).clamp(MIN_DAILY_GHI, MAX_DAILY_GHI)
}

pub fn observation_from_report(report: &WeatherReport) -> WeatherObservation {
    WeatherObservation {
        ghi_daily_kwh: daily_ghi_from_cloud_fraction(report.cloud_fraction),
        temp_avg_c: report.temperature_c,
        source: ObservationSource::Api,
        timestamp: report.timestamp,
    }
}

/// Latitude-banded climatological guess used when the upstream is unusable.
pub fn mock_observation(location: Location) -> WeatherObservation {
    let abs_lat = location.latitude.abs();
    let ghi_daily_kwh = if abs_lat < 5.0 {
        5.2
    } else if abs_lat < 10.0 {
        4.8
    } else {
        4.5
    };

    WeatherObservation {
        ghi_daily_kwh,
        temp_avg_c: 28.0 - 0.3 * abs_lat,
        source: ObservationSource::Mock,
        timestamp: Utc::now(),
    }
}

type SharedRefresh = Shared<BoxFuture<'static, WeatherObservation>>;

#[derive(Clone)]
pub struct WeatherClient {
    provider: Arc<dyn WeatherProvider>,
    cache: Arc<dyn CacheStore>,
    ttl: TimeDelta,
    timeout: Duration,
    in_flight: Arc<Mutex<HashMap<GridKey, SharedRefresh>>>,
}

impl WeatherClient {
    pub fn new(provider: Arc<dyn WeatherProvider>, cache: Arc<dyn CacheStore>) -> Self {
        Self {
            provider,
            cache,
            ttl: TimeDelta::hours(DEFAULT_TTL_HOURS),
            timeout: DEFAULT_TIMEOUT,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn with_ttl(mut self, ttl: TimeDelta) -> Self {
        self.ttl = ttl;
        self
    }

    /// Upper bound on one upstream call, on top of any client-level timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Daily weather for `location`. Never fails.
    pub async fn observe(&self, location: Location) -> WeatherObservation {
        let key = GridKey::from_location(location);

        if let Some(hit) = self.cached(key).await {
            debug!(%key, "weather cache hit");
            return hit;
        }

        let refresh = {
            let mut in_flight = self.in_flight.lock().await;
            in_flight
                .entry(key)
                .or_insert_with(|| self.refresh(key, location))
                .clone()
        };
        refresh.await
    }

    async fn cached(&self, key: GridKey) -> Option<WeatherObservation> {
        let entry = match self.cache.get(&key.to_string()).await {
            Ok(Some(entry)) => entry,
            Ok(None) => return None,
            Err(e) => {
                warn!(%key, error = %e, "weather cache read failed, bypassing cache");
                return None;
            }
        };

        if Utc::now() - entry.cached_at >= self.ttl {
            return None;
        }

        match serde_json::from_str::<WeatherObservation>(&entry.value) {
            Ok(mut obs) => {
                obs.source = ObservationSource::Cache;
                Some(obs)
            }
            Err(e) => {
                warn!(%key, error = %e, "undecodable weather cache entry, ignoring");
                None
            }
        }
    }

    fn refresh(&self, key: GridKey, location: Location) -> SharedRefresh {
        let provider = Arc::clone(&self.provider);
        let cache = Arc::clone(&self.cache);
        let in_flight = Arc::clone(&self.in_flight);
        let ttl = self.ttl;
        let timeout = self.timeout;

        async move {
            let obs = match tokio::time::timeout(timeout, provider.current(location)).await {
                Ok(Ok(report)) => {
                    info!(
                        %key,
                        station = ?report.station,
                        cloud_fraction = report.cloud_fraction,
                        sunrise = ?report.sunrise,
                        sunset = ?report.sunset,
                        "weather fetched from API"
                    );
                    observation_from_report(&report)
                }
                Ok(Err(e)) => {
                    warn!(%key, error = %e, "weather API unavailable, using mock data");
                    mock_observation(location)
                }
                Err(_) => {
                    warn!(
                        %key,
                        timeout_ms = timeout.as_millis() as u64,
                        "weather API timed out, using mock data"
                    );
                    mock_observation(location)
                }
            };

            match serde_json::to_string(&obs) {
                Ok(json) => {
                    if let Err(e) = cache.set(&key.to_string(), json, ttl).await {
                        warn!(%key, error = %e, "weather cache write failed");
                    }
                }
                Err(e) => warn!(%key, error = %e, "weather observation could not be encoded"),
            }

            in_flight.lock().await.remove(&key);
            obs
        }
        .boxed()
        .shared()
    }
}
