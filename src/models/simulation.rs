use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::RequestError;
use crate::models::site::Location;
use crate::models::weather::{ObservationSource, WeatherObservation};
use crate::services::daily_yield::DailyYield;
use crate::services::finance::FinancialSummary;
use crate::services::losses::LossBreakdown;
use crate::services::panel_layout::{PanelLayoutPlan, PanelOrientation};
use crate::services::seasonal_yield::{MonthlyProduction, MonthlyYield};

/// Rounds to `digits` decimals; negative digits round to tens, hundreds, ...
pub fn round_to(value: f64, digits: i32) -> f64 {
    if digits >= 0 {
        let factor = 10f64.powi(digits);
        (value * factor).round() / factor
    } else {
        let step = 10f64.powi(-digits);
        (value / step).round() * step
    }
}

fn default_tilt() -> f64 { 20.0 }
fn default_azimuth() -> f64 { 180.0 }
fn default_efficiency() -> f64 { 0.20 }
fn default_cost_per_kwp() -> f64 { 15_000_000.0 }
fn default_tariff() -> f64 { 1444.7 }

pub const COST_PER_KWP_RANGE: (f64, f64) = (10_000_000.0, 25_000_000.0);
pub const TARIFF_RANGE: (f64, f64) = (1000.0, 5000.0);

// ─── Request ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SimulationRequest {
    /// Roof outline as `[latitude, longitude]` pairs
    pub polygon: Vec<Vec<f64>>,
    /// Roof tilt in degrees
    #[serde(default = "default_tilt")]
    pub tilt: f64,
    /// Roof azimuth in degrees (0 = North, 180 = South)
    #[serde(default = "default_azimuth")]
    pub azimuth: f64,
    /// Module efficiency (0.15 - 0.25)
    #[serde(default = "default_efficiency")]
    pub panel_efficiency: f64,
    /// Installed cost per kWp (IDR)
    #[serde(default = "default_cost_per_kwp")]
    pub system_cost_per_kwp: f64,
    /// Electricity tariff per kWh (IDR)
    #[serde(default = "default_tariff")]
    pub electricity_tariff: f64,
}

impl SimulationRequest {
    /// Checks the financial inputs and the shape of every vertex. Orientation
    /// and efficiency are checked by the simulator.
    pub fn validate(&self) -> Result<Vec<[f64; 2]>, RequestError> {
        check_range("system_cost_per_kwp", self.system_cost_per_kwp, COST_PER_KWP_RANGE)?;
        check_range("electricity_tariff", self.electricity_tariff, TARIFF_RANGE)?;

        self.polygon
            .iter()
            .enumerate()
            .map(|(i, p)| match p.as_slice() {
                [lat, lon] => Ok([*lat, *lon]),
                _ => Err(RequestError::MalformedPoint { index: i }),
            })
            .collect()
    }
}

fn check_range(
    field: &'static str,
    value: f64,
    (min, max): (f64, f64),
) -> Result<(), RequestError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(RequestError::OutOfRange { field, min, max })
    }
}

// ─── Response ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
pub struct SimulationResponse {
    pub site_details: SiteDetails,
    pub energy_output: EnergyOutput,
    pub financials: FinancialOutput,
    pub environment: EnvironmentOutput,
    pub meta: MetaInfo,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SiteDetails {
    pub roof_area_sqm: f64,
    /// Area-weighted centroid of the outline
    pub location: Location,
    /// Projection zone used for the area, e.g. "48S"
    pub utm_zone: String,
    pub panel_layout: PanelLayout,
    pub detailed_losses: DetailedLosses,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PanelDimensions {
    pub width_m: f64,
    pub height_m: f64,
    pub area_sqm: f64,
    pub wattage_kw: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PanelLayout {
    /// "portrait" or "landscape"; absent when no panel fits
    pub orientation: Option<String>,
    pub total_panels: u32,
    pub rows: u32,
    pub columns: u32,
    pub usable_area_sqm: f64,
    pub total_panel_area_sqm: f64,
    pub coverage_percentage: f64,
    pub effective_coverage_percentage: f64,
    pub layout_width_m: f64,
    pub layout_height_m: f64,
    pub panel_dimensions: PanelDimensions,
    pub estimated_system_kwp: f64,
    pub setback_distance_m: f64,
    pub row_spacing_m: f64,
    pub column_spacing_m: f64,
}

impl From<&PanelLayoutPlan> for PanelLayout {
    fn from(p: &PanelLayoutPlan) -> Self {
        Self {
            orientation: p.orientation.map(|o| match o {
                PanelOrientation::Portrait => "portrait".to_string(),
                PanelOrientation::Landscape => "landscape".to_string(),
            }),
            total_panels: p.total_panels,
            rows: p.rows,
            columns: p.columns,
            usable_area_sqm: round_to(p.usable_area_sqm, 2),
            total_panel_area_sqm: round_to(p.total_panel_area_sqm, 2),
            coverage_percentage: round_to(p.coverage_pct, 1),
            effective_coverage_percentage: round_to(p.effective_coverage_pct, 1),
            layout_width_m: round_to(p.layout_width_m, 2),
            layout_height_m: round_to(p.layout_height_m, 2),
            panel_dimensions: PanelDimensions {
                width_m: p.panel.width_m,
                height_m: p.panel.height_m,
                area_sqm: round_to(p.panel.area_sqm(), 2),
                wattage_kw: p.panel.wattage_kw,
            },
            estimated_system_kwp: round_to(p.estimated_kwp, 2),
            setback_distance_m: p.spacing.setback_m,
            row_spacing_m: p.spacing.row_spacing_m,
            column_spacing_m: p.spacing.column_spacing_m,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DetailedLosses {
    pub temperature_loss_percent: f64,
    pub soiling_loss_percent: f64,
    pub mismatch_loss_percent: f64,
    pub wiring_loss_percent: f64,
    pub inverter_loss_percent: f64,
    pub orientation_loss_percent: f64,
    pub total_dc_losses_percent: f64,
    pub dc_efficiency_percent: f64,
    pub ac_efficiency_percent: f64,
    pub performance_ratio: f64,
}

impl From<&LossBreakdown> for DetailedLosses {
    fn from(l: &LossBreakdown) -> Self {
        Self {
            temperature_loss_percent: round_to(l.temperature_loss_pct, 2),
            soiling_loss_percent: round_to(l.soiling_loss_pct, 2),
            mismatch_loss_percent: round_to(l.mismatch_loss_pct, 2),
            wiring_loss_percent: round_to(l.wiring_loss_pct, 2),
            inverter_loss_percent: round_to(l.inverter_loss_pct, 2),
            orientation_loss_percent: round_to(l.orientation_loss_pct, 2),
            total_dc_losses_percent: round_to(l.total_dc_loss_pct, 2),
            dc_efficiency_percent: round_to(l.dc_efficiency_pct, 2),
            ac_efficiency_percent: round_to(l.ac_efficiency_pct, 2),
            performance_ratio: round_to(l.performance_ratio, 3),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EnergyOutput {
    pub recommended_system_size_kwp: f64,
    /// Average over the monthly simulation
    pub daily_production_kwh: f64,
    pub annual_production_kwh: f64,
    pub daily_simulation: DailySimulation,
    pub monthly_breakdown: MonthlyBreakdown,
}

/// Simulation for today's weather observation.
#[derive(Debug, Serialize, ToSchema)]
pub struct DailySimulation {
    pub ghi_adj_kwh_m2: f64,
    pub transposition_factor: f64,
    pub pr_value: f64,
    pub t_cell_c: f64,
    pub daily_energy_kwh: f64,
    pub estimated_capacity_kwp: f64,
}

impl From<&DailyYield> for DailySimulation {
    fn from(d: &DailyYield) -> Self {
        Self {
            ghi_adj_kwh_m2: round_to(d.ghi_adjusted, 2),
            transposition_factor: round_to(d.k_trans, 3),
            pr_value: round_to(d.pr, 3),
            t_cell_c: round_to(d.t_cell_c, 1),
            daily_energy_kwh: round_to(d.daily_energy_kwh, 2),
            estimated_capacity_kwp: round_to(d.capacity_kwp, 2),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MonthlyEntry {
    pub month: String,
    pub month_number: u32,
    pub days: u32,
    pub ghi_daily_kwh: f64,
    pub temp_avg_c: f64,
    pub transposition_factor: f64,
    pub pr_value: f64,
    pub daily_energy_kwh: f64,
    pub monthly_energy_kwh: f64,
}

impl From<&MonthlyProduction> for MonthlyEntry {
    fn from(m: &MonthlyProduction) -> Self {
        Self {
            month: m.month_name.to_string(),
            month_number: m.month,
            days: m.days,
            ghi_daily_kwh: round_to(m.ghi_daily_kwh, 2),
            temp_avg_c: round_to(m.temp_avg_c, 1),
            transposition_factor: round_to(m.k_trans, 3),
            pr_value: round_to(m.pr, 3),
            daily_energy_kwh: round_to(m.daily_energy_kwh, 2),
            monthly_energy_kwh: round_to(m.monthly_energy_kwh, 0),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MonthlyBreakdown {
    pub monthly_breakdown: Vec<MonthlyEntry>,
    pub annual_total_kwh: f64,
    pub average_daily_kwh: f64,
    pub peak_month: String,
    pub lowest_month: String,
    pub seasonal_variation: f64,
}

impl From<&MonthlyYield> for MonthlyBreakdown {
    fn from(y: &MonthlyYield) -> Self {
        Self {
            monthly_breakdown: y.months.iter().map(MonthlyEntry::from).collect(),
            annual_total_kwh: round_to(y.annual_total_kwh, 0),
            average_daily_kwh: round_to(y.average_daily_kwh, 2),
            peak_month: y.peak_month.to_string(),
            lowest_month: y.lowest_month.to_string(),
            seasonal_variation: round_to(y.seasonal_variation_pct, 1),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FinancialOutput {
    /// Rounded to the nearest thousand
    pub estimated_system_cost_idr: f64,
    /// Rounded to the nearest thousand
    pub annual_savings_idr: f64,
    pub break_even_point_years: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EnvironmentOutput {
    pub co2_offset_ton: f64,
}

impl From<&FinancialSummary> for FinancialOutput {
    fn from(f: &FinancialSummary) -> Self {
        Self {
            estimated_system_cost_idr: round_to(f.estimated_cost, -3),
            annual_savings_idr: round_to(f.annual_savings, -3),
            break_even_point_years: round_to(f.break_even_years, 1),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MetaInfo {
    /// UUID v4
    pub simulation_id: String,
    pub weather_source: ObservationSource,
    pub weather: WeatherObservation,
    /// Civil date used for the daily simulation
    pub simulation_date: NaiveDate,
    pub calculation_timestamp: DateTime<Utc>,
}

// ─── Health & errors ─────────────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_s: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}
