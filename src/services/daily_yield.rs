//! Daily energy yield for one observed day.

use chrono::NaiveDate;
use chrono_tz::Tz;
use tracing::debug;

use crate::error::SolarGeometryError;
use crate::models::site::{DayWeather, Location, SimulationParameters};
use crate::services::performance;
use crate::services::solar_geometry::SolarGeometry;
use crate::services::transposition;

/// Daily yield, unrounded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyYield {
    /// Plane-of-array insolation (kWh/m²/day)
    pub ghi_adjusted: f64,
    pub k_trans: f64,
    pub pr: f64,
    pub t_cell_c: f64,
    pub daily_energy_kwh: f64,
    pub capacity_kwp: f64,
}

/// `E_day = A × GHI × k_trans × η × PR` for a known transposition factor.
pub fn yield_for_day(
    params: &SimulationParameters,
    weather: DayWeather,
    k_trans: f64,
) -> DailyYield {
    let ghi_adjusted = weather.ghi_daily_kwh * k_trans;
    let avg_ghi_w_m2 = performance::mean_daylight_irradiance(weather.ghi_daily_kwh);
    let t_cell_c = performance::cell_temperature(weather.temp_avg_c, avg_ghi_w_m2);
    let pr = performance::performance_ratio(t_cell_c);

    DailyYield {
        ghi_adjusted,
        k_trans,
        pr,
        t_cell_c,
        daily_energy_kwh: params.area_sqm * ghi_adjusted * params.panel_efficiency * pr,
        capacity_kwp: params.area_sqm * params.panel_efficiency,
    }
}

/// Runs the daily simulation for `date` (normally today in the site's
/// civil timezone).
pub fn simulate_daily(
    geometry: &dyn SolarGeometry,
    location: Location,
    params: &SimulationParameters,
    weather: DayWeather,
    date: NaiveDate,
    tz: Tz,
) -> Result<DailyYield, SolarGeometryError> {
    let trans = transposition::transposition_factor(
        geometry,
        location,
        params.tilt_deg,
        params.azimuth_deg,
        date,
        tz,
    )?;
    debug!(
        %date,
        k_trans = trans.k_trans,
        ghi_sum = trans.ghi_sum,
        poa_sum = trans.poa_sum,
        "daily transposition factor"
    );
    Ok(yield_for_day(params, weather, trans.k_trans))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::solar_geometry::AnalyticSolarGeometry;
    use chrono_tz::Asia::Jakarta;

    fn bandung_params() -> SimulationParameters {
        SimulationParameters {
            tilt_deg: 20.0,
            azimuth_deg: 0.0,
            panel_efficiency: 0.20,
            area_sqm: 50.0,
        }
    }

    #[test]
    fn test_daily_simulation_bandung() {
        let result = simulate_daily(
            &AnalyticSolarGeometry::default(),
            Location::new(-6.9175, 107.6191),
            &bandung_params(),
            DayWeather {
                ghi_daily_kwh: 5.0,
                temp_avg_c: 30.0,
            },
            NaiveDate::from_ymd_opt(2025, 3, 21).unwrap(),
            Jakarta,
        )
        .unwrap();

        // 50 m² × 20 %
        assert!((result.capacity_kwp - 10.0).abs() < 1e-12);
        // 30 + 0.025 × 5000/12
        assert!((result.t_cell_c - 40.4).abs() < 0.5, "t_cell {}", result.t_cell_c);
        assert!(result.pr > 0.75 && result.pr < 0.85, "pr {}", result.pr);
        assert!(
            result.daily_energy_kwh > 35.0 && result.daily_energy_kwh < 45.0,
            "energy {}",
            result.daily_energy_kwh
        );
        assert!((result.ghi_adjusted - 5.0 * result.k_trans).abs() < 1e-12);
    }

    #[test]
    fn test_yield_keeps_full_precision() {
        let y = yield_for_day(
            &bandung_params(),
            DayWeather {
                ghi_daily_kwh: 5.0,
                temp_avg_c: 30.0,
            },
            1.0,
        );
        let expected_pr = 1.0 - (0.004 * (30.0 + 0.025 * 5000.0 / 12.0 - 25.0) + 0.14);
        assert!((y.pr - expected_pr).abs() < 1e-15);
        assert!((y.daily_energy_kwh - 50.0 * 5.0 * 0.2 * expected_pr).abs() < 1e-12);
    }
}
