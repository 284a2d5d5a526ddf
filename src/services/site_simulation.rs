/// ====================================================================
/// Site simulation pipeline
/// ====================================================================
///
/// polygon → area + centroid → weather (once) → daily ∥ monthly →
/// losses, layout. The two yield simulations are CPU-bound and run on the
/// blocking pool.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::info;

use crate::error::SimulationError;
use crate::models::site::{DayWeather, GeoPolygon, Location, SimulationParameters};
use crate::models::weather::WeatherObservation;
use crate::services::climatology::Climatology;
use crate::services::daily_yield::{self, DailyYield};
use crate::services::geodesic;
use crate::services::losses::{self, LossBreakdown};
use crate::services::panel_layout::{self, LayoutSpacing, PanelLayoutPlan, PanelSpec};
use crate::services::seasonal_yield::{self, MonthlyYield};
use crate::services::solar_geometry::SolarGeometry;
use crate::services::weather_service::WeatherClient;

/// Everything derived for one roof outline.
#[derive(Debug, Clone)]
pub struct SiteSimulation {
    pub area_sqm: f64,
    pub location: Location,
    pub utm_zone: u8,
    pub southern: bool,
    pub date: NaiveDate,
    pub weather: WeatherObservation,
    pub daily: DailyYield,
    pub monthly: MonthlyYield,
    pub losses: LossBreakdown,
    pub layout: PanelLayoutPlan,
}

/// Long-lived simulation service. Built once at start-up and shared.
#[derive(Clone)]
pub struct SiteSimulator {
    geometry: Arc<dyn SolarGeometry>,
    weather: WeatherClient,
    climatology: Arc<Climatology>,
    panel: PanelSpec,
    spacing: LayoutSpacing,
    timezone: Tz,
}

impl SiteSimulator {
    pub fn new(geometry: Arc<dyn SolarGeometry>, weather: WeatherClient, timezone: Tz) -> Self {
        Self {
            geometry,
            weather,
            climatology: Arc::new(Climatology::default()),
            panel: PanelSpec::default(),
            spacing: LayoutSpacing::default(),
            timezone,
        }
    }

    pub fn with_climatology(mut self, climatology: Climatology) -> Self {
        self.climatology = Arc::new(climatology);
        self
    }

    pub fn with_panel(mut self, panel: PanelSpec, spacing: LayoutSpacing) -> Self {
        self.panel = panel;
        self.spacing = spacing;
        self
    }

    /// Simulates the site for today in the configured civil timezone.
    pub async fn run_site_simulation(
        &self,
        polygon: &GeoPolygon,
        tilt_deg: f64,
        azimuth_deg: f64,
        panel_efficiency: f64,
    ) -> Result<SiteSimulation, SimulationError> {
        let today = Utc::now().with_timezone(&self.timezone).date_naive();
        self.run_on(polygon, tilt_deg, azimuth_deg, panel_efficiency, today)
            .await
    }

    /// Same as [`Self::run_site_simulation`] with an explicit daily date.
    /// The monthly simulation uses that date's year.
    pub async fn run_on(
        &self,
        polygon: &GeoPolygon,
        tilt_deg: f64,
        azimuth_deg: f64,
        panel_efficiency: f64,
        date: NaiveDate,
    ) -> Result<SiteSimulation, SimulationError> {
        let resolved = geodesic::resolve_area(polygon)?;
        let params = SimulationParameters {
            tilt_deg,
            azimuth_deg,
            panel_efficiency,
            area_sqm: resolved.area_sqm,
        };
        params.validate()?;

        let location = resolved.centroid;
        let weather = self.weather.observe(location).await;
        let day = DayWeather {
            ghi_daily_kwh: weather.ghi_daily_kwh,
            temp_avg_c: weather.temp_avg_c,
        };
        let tz = self.timezone;

        let daily_task = {
            let geometry = Arc::clone(&self.geometry);
            tokio::task::spawn_blocking(move || {
                daily_yield::simulate_daily(geometry.as_ref(), location, &params, day, date, tz)
            })
        };
        let monthly_task = {
            let geometry = Arc::clone(&self.geometry);
            let climatology = Arc::clone(&self.climatology);
            tokio::task::spawn_blocking(move || {
                seasonal_yield::simulate_monthly(
                    geometry.as_ref(),
                    location,
                    &params,
                    day,
                    &climatology,
                    date.year(),
                    tz,
                )
            })
        };

        let (daily, monthly) = tokio::join!(daily_task, monthly_task);
        let daily = daily.map_err(|e| SimulationError::Task(e.to_string()))??;
        let monthly = monthly.map_err(|e| SimulationError::Task(e.to_string()))??;

        let losses =
            losses::detailed_losses(location.latitude, tilt_deg, azimuth_deg, weather.temp_avg_c);
        let layout =
            panel_layout::optimize_layout(resolved.area_sqm, &self.panel, &self.spacing, tilt_deg);

        info!(
            area_sqm = resolved.area_sqm,
            lat = location.latitude,
            lon = location.longitude,
            weather_source = ?weather.source,
            daily_kwh = daily.daily_energy_kwh,
            annual_kwh = monthly.annual_total_kwh,
            panels = layout.total_panels,
            "site simulation complete"
        );

        Ok(SiteSimulation {
            area_sqm: resolved.area_sqm,
            location,
            utm_zone: resolved.utm_zone,
            southern: resolved.southern,
            date,
            weather,
            daily,
            monthly,
            losses,
            layout,
        })
    }
}
