//! Twelve-month yield from one base observation and the climatology table.

use chrono::NaiveDate;
use chrono_tz::Tz;

use crate::error::SolarGeometryError;
use crate::models::site::{DayWeather, Location, SimulationParameters};
use crate::services::climatology::Climatology;
use crate::services::daily_yield::yield_for_day;
use crate::services::solar_geometry::SolarGeometry;
use crate::services::transposition;

pub const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Day of month used as the representative date for transposition.
const REPRESENTATIVE_DAY: u32 = 15;
const DAYS_PER_YEAR: f64 = 365.0;

/// Fixed calendar: February always has 28 days.
pub fn days_in_month(month: u32) -> u32 {
    match month {
        4 | 6 | 9 | 11 => 30,
        2 => 28,
        _ => 31,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyProduction {
    /// Calendar month 1..=12
    pub month: u32,
    pub month_name: &'static str,
    pub days: u32,
    pub ghi_daily_kwh: f64,
    pub temp_avg_c: f64,
    pub k_trans: f64,
    pub pr: f64,
    pub daily_energy_kwh: f64,
    pub monthly_energy_kwh: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyYield {
    pub months: Vec<MonthlyProduction>,
    pub annual_total_kwh: f64,
    pub average_daily_kwh: f64,
    pub peak_month: &'static str,
    pub lowest_month: &'static str,
    pub seasonal_variation_pct: f64,
}

/// Runs the seasonal simulation for `year`.
pub fn simulate_monthly(
    geometry: &dyn SolarGeometry,
    location: Location,
    params: &SimulationParameters,
    base: DayWeather,
    climatology: &Climatology,
    year: i32,
    tz: Tz,
) -> Result<MonthlyYield, SolarGeometryError> {
    let mut months = Vec::with_capacity(12);

    for (month, climate) in climatology.months() {
        let days = days_in_month(month);
        let weather = DayWeather {
            ghi_daily_kwh: base.ghi_daily_kwh * climate.irradiance_factor,
            temp_avg_c: base.temp_avg_c + climate.temperature_offset_c,
        };

        let date = NaiveDate::from_ymd_opt(year, month, REPRESENTATIVE_DAY).ok_or(
            SolarGeometryError::InvalidDate {
                year,
                month,
                day: REPRESENTATIVE_DAY,
            },
        )?;
        let trans = transposition::transposition_factor(
            geometry,
            location,
            params.tilt_deg,
            params.azimuth_deg,
            date,
            tz,
        )?;
        let day = yield_for_day(params, weather, trans.k_trans);

        months.push(MonthlyProduction {
            month,
            month_name: MONTH_NAMES[(month - 1) as usize],
            days,
            ghi_daily_kwh: weather.ghi_daily_kwh,
            temp_avg_c: weather.temp_avg_c,
            k_trans: trans.k_trans,
            pr: day.pr,
            daily_energy_kwh: day.daily_energy_kwh,
            monthly_energy_kwh: day.daily_energy_kwh * f64::from(days),
        });
    }

    Ok(aggregate(months))
}

fn aggregate(months: Vec<MonthlyProduction>) -> MonthlyYield {
    let annual_total_kwh: f64 = months.iter().map(|m| m.monthly_energy_kwh).sum();

    // First occurrence wins on ties
    let mut peak = &months[0];
    let mut lowest = &months[0];
    for m in &months[1..] {
        if m.monthly_energy_kwh > peak.monthly_energy_kwh {
            peak = m;
        }
        if m.monthly_energy_kwh < lowest.monthly_energy_kwh {
            lowest = m;
        }
    }

    let monthly_mean = annual_total_kwh / 12.0;
    let seasonal_variation_pct = if monthly_mean > 0.0 {
        (peak.monthly_energy_kwh - lowest.monthly_energy_kwh) / monthly_mean * 100.0
    } else {
        0.0
    };

    MonthlyYield {
        annual_total_kwh,
        average_daily_kwh: annual_total_kwh / DAYS_PER_YEAR,
        peak_month: peak.month_name,
        lowest_month: lowest.month_name,
        seasonal_variation_pct,
        months,
    }
}
