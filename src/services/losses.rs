//! Per-category system loss accounting.
//!
//! Independent of the dynamic PR in [`crate::services::performance`]: the
//! temperature term here only penalises positive excursions above 25 °C, and
//! the resulting `performance_ratio` includes an availability factor. The two
//! PR figures answer different questions and must not be mixed.

use crate::services::performance::{STC_CELL_TEMP_C, TEMP_COEFF};

pub const SOILING_LOSS: f64 = 0.02;
pub const MISMATCH_LOSS: f64 = 0.02;
pub const WIRING_LOSS: f64 = 0.015;
pub const INVERTER_EFFICIENCY: f64 = 0.97;
pub const AVAILABILITY_FACTOR: f64 = 0.95;

/// Loss per degree of tilt away from |latitude|
const TILT_LOSS_PER_DEG: f64 = 0.0015;
/// Loss per degree of azimuth away from the N/S axis
const AZIMUTH_LOSS_PER_DEG: f64 = 0.0005;
pub const MAX_ORIENTATION_LOSS: f64 = 0.15;
const OPTIMAL_AZIMUTH_DEG: f64 = 0.0;

/// Loss breakdown. Every field except `performance_ratio` is a percentage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LossBreakdown {
    pub temperature_loss_pct: f64,
    pub soiling_loss_pct: f64,
    pub mismatch_loss_pct: f64,
    pub wiring_loss_pct: f64,
    pub inverter_loss_pct: f64,
    pub orientation_loss_pct: f64,
    pub total_dc_loss_pct: f64,
    pub dc_efficiency_pct: f64,
    pub ac_efficiency_pct: f64,
    /// AC efficiency × availability, as a fraction
    pub performance_ratio: f64,
}

/// Tilt/azimuth deviation penalty, capped at 15 %.
pub fn orientation_loss(latitude: f64, tilt_deg: f64, azimuth_deg: f64) -> f64 {
    let optimal_tilt = latitude.abs();
    let tilt_loss = (tilt_deg - optimal_tilt).abs() * TILT_LOSS_PER_DEG;
    let azimuth_diff = (azimuth_deg - OPTIMAL_AZIMUTH_DEG)
        .abs()
        .min((azimuth_deg - 180.0).abs());
    let azimuth_loss = azimuth_diff * AZIMUTH_LOSS_PER_DEG;
    (tilt_loss + azimuth_loss).min(MAX_ORIENTATION_LOSS)
}

pub fn detailed_losses(
    latitude: f64,
    tilt_deg: f64,
    azimuth_deg: f64,
    temp_avg_c: f64,
) -> LossBreakdown {
    let temp_loss = TEMP_COEFF * (temp_avg_c - STC_CELL_TEMP_C).max(0.0);
    let orientation = orientation_loss(latitude, tilt_deg, azimuth_deg);

    let total_dc = temp_loss + SOILING_LOSS + MISMATCH_LOSS + WIRING_LOSS + orientation;
    let dc_efficiency = 1.0 - total_dc;
    let ac_efficiency = dc_efficiency * INVERTER_EFFICIENCY;

    LossBreakdown {
        temperature_loss_pct: temp_loss * 100.0,
        soiling_loss_pct: SOILING_LOSS * 100.0,
        mismatch_loss_pct: MISMATCH_LOSS * 100.0,
        wiring_loss_pct: WIRING_LOSS * 100.0,
        inverter_loss_pct: (1.0 - INVERTER_EFFICIENCY) * 100.0,
        orientation_loss_pct: orientation * 100.0,
        total_dc_loss_pct: total_dc * 100.0,
        dc_efficiency_pct: dc_efficiency * 100.0,
        ac_efficiency_pct: ac_efficiency * 100.0,
        performance_ratio: ac_efficiency * AVAILABILITY_FACTOR,
    }
}
