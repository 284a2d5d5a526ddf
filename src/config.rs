use std::path::Path;
use std::time::Duration;

use chrono::TimeDelta;
use chrono_tz::Tz;
use serde::Deserialize;
use tracing::warn;

use crate::error::ConfigError;
use crate::services::climatology::Climatology;
use crate::services::finance::DEFAULT_CO2_KG_PER_KWH;
use crate::services::panel_layout::{LayoutSpacing, PanelSpec};
use crate::services::weather_provider::OPENWEATHERMAP_URL;

pub const CONFIG_PATH_ENV: &str = "SOLAR_CONFIG";
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

fn default_port() -> u16 { 8000 }
fn default_weather_url() -> String { OPENWEATHERMAP_URL.to_string() }
fn default_timeout_s() -> u64 { 10 }
fn default_cache_ttl_hours() -> i64 { 6 }
fn default_timezone() -> String { "Asia/Jakarta".to_string() }
fn default_co2_factor() -> f64 { DEFAULT_CO2_KG_PER_KWH }

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub panel: PanelConfig,
    /// Falls back to the tropical monsoon table when absent
    #[serde(default)]
    pub climatology: Option<Climatology>,
    #[serde(default)]
    pub finance: FinanceConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: default_port() }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherConfig {
    #[serde(default = "default_weather_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_s")]
    pub timeout_s: u64,
    #[serde(default = "default_cache_ttl_hours")]
    pub cache_ttl_hours: i64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_url(),
            api_key: None,
            timeout_s: default_timeout_s(),
            cache_ttl_hours: default_cache_ttl_hours(),
        }
    }
}

impl WeatherConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_s)
    }

    pub fn cache_ttl(&self) -> TimeDelta {
        TimeDelta::hours(self.cache_ttl_hours)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SiteConfig {
    /// IANA name of the civil timezone used for "today"
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self { timezone: default_timezone() }
    }
}

/// Panel module and spacing. Missing fields take the stock 550 W module.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct PanelConfig {
    pub width_m: f64,
    pub height_m: f64,
    pub wattage_kw: f64,
    pub setback_m: f64,
    pub row_spacing_m: f64,
    pub column_spacing_m: f64,
}

impl Default for PanelConfig {
    fn default() -> Self {
        let panel = PanelSpec::default();
        let spacing = LayoutSpacing::default();
        Self {
            width_m: panel.width_m,
            height_m: panel.height_m,
            wattage_kw: panel.wattage_kw,
            setback_m: spacing.setback_m,
            row_spacing_m: spacing.row_spacing_m,
            column_spacing_m: spacing.column_spacing_m,
        }
    }
}

impl PanelConfig {
    pub fn spec(&self) -> PanelSpec {
        PanelSpec {
            width_m: self.width_m,
            height_m: self.height_m,
            wattage_kw: self.wattage_kw,
        }
    }

    pub fn spacing(&self) -> LayoutSpacing {
        LayoutSpacing {
            setback_m: self.setback_m,
            row_spacing_m: self.row_spacing_m,
            column_spacing_m: self.column_spacing_m,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct FinanceConfig {
    #[serde(default = "default_co2_factor")]
    pub co2_kg_per_kwh: f64,
}

impl Default for FinanceConfig {
    fn default() -> Self {
        Self { co2_kg_per_kwh: default_co2_factor() }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path`, or defaults when the file does not exist. A file that
    /// exists but cannot be parsed is still an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match Self::load(path) {
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "config file not found, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Path from `SOLAR_CONFIG`, API key from `OPENWEATHER_API_KEY` if set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::load_or_default(&path)?;
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            config.apply_api_key(key);
        }
        Ok(config)
    }

    fn apply_api_key(&mut self, key: String) {
        if !key.trim().is_empty() {
            self.weather.api_key = Some(key);
        }
    }

    pub fn timezone(&self) -> Result<Tz, ConfigError> {
        self.site
            .timezone
            .parse::<Tz>()
            .map_err(|_| ConfigError::InvalidTimezone(self.site.timezone.clone()))
    }

    pub fn climatology(&self) -> Climatology {
        self.climatology.clone().unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.timezone()?;
        if self.weather.timeout_s == 0 {
            return Err(ConfigError::Invalid("weather.timeout_s must be positive".into()));
        }
        if self.weather.cache_ttl_hours <= 0 {
            return Err(ConfigError::Invalid("weather.cache_ttl_hours must be positive".into()));
        }
        let p = &self.panel;
        if !(p.width_m > 0.0 && p.height_m > 0.0 && p.wattage_kw > 0.0) {
            return Err(ConfigError::Invalid(
                "panel dimensions and wattage must be positive".into(),
            ));
        }
        if p.setback_m < 0.0 || p.row_spacing_m < 0.0 || p.column_spacing_m < 0.0 {
            return Err(ConfigError::Invalid("panel spacing must not be negative".into()));
        }
        if let Some(c) = &self.climatology {
            c.validate()?;
        }
        if !(self.finance.co2_kg_per_kwh >= 0.0) {
            return Err(ConfigError::Invalid("finance.co2_kg_per_kwh must not be negative".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_gives_defaults() {
        let c: Config = serde_json::from_str("{}").unwrap();
        assert!(c.validate().is_ok());
        assert_eq!(c.server.port, 8000);
        assert_eq!(c.weather.base_url, OPENWEATHERMAP_URL);
        assert_eq!(c.weather.cache_ttl(), TimeDelta::hours(6));
        assert_eq!(c.timezone().unwrap(), chrono_tz::Asia::Jakarta);
        assert_eq!(c.panel.spec(), PanelSpec::default());
        assert_eq!(c.panel.spacing(), LayoutSpacing::default());
        assert_eq!(c.climatology(), Climatology::default());
        assert_eq!(c.finance.co2_kg_per_kwh, 0.85);
    }

    #[test]
    fn test_partial_sections() {
        let c: Config = serde_json::from_str(
            r#"{
                "server": {"port": 9090},
                "weather": {"api_key": "abc", "timeout_s": 3},
                "site": {"timezone": "Asia/Makassar"},
                "panel": {"wattage_kw": 0.45}
            }"#,
        )
        .unwrap();
        assert!(c.validate().is_ok());
        assert_eq!(c.server.port, 9090);
        assert_eq!(c.weather.api_key.as_deref(), Some("abc"));
        assert_eq!(c.weather.timeout(), Duration::from_secs(3));
        assert_eq!(c.weather.cache_ttl_hours, 6);
        assert_eq!(c.timezone().unwrap(), chrono_tz::Asia::Makassar);
        assert_eq!(c.panel.wattage_kw, 0.45);
        assert_eq!(c.panel.width_m, 1.134);
    }

    #[test]
    fn test_rejects_bad_values() {
        let bad_tz: Config =
            serde_json::from_str(r#"{"site": {"timezone": "Mars/Olympus"}}"#).unwrap();
        assert!(matches!(bad_tz.validate(), Err(ConfigError::InvalidTimezone(_))));

        let bad_panel: Config = serde_json::from_str(r#"{"panel": {"width_m": 0}}"#).unwrap();
        assert!(matches!(bad_panel.validate(), Err(ConfigError::Invalid(_))));

        let bad_ttl: Config =
            serde_json::from_str(r#"{"weather": {"cache_ttl_hours": 0}}"#).unwrap();
        assert!(matches!(bad_ttl.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let c = Config::load_or_default("/nonexistent/solar/config.json").unwrap();
        assert_eq!(c.server.port, 8000);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let path = std::env::temp_dir().join(format!("solar-config-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, "{ not json").unwrap();
        let result = Config::load_or_default(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_api_key_override_ignores_blank() {
        let mut c = Config::default();
        c.apply_api_key("   ".into());
        assert_eq!(c.weather.api_key, None);
        c.apply_api_key("from-env".into());
        assert_eq!(c.weather.api_key.as_deref(), Some("from-env"));
    }
}
