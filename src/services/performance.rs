//! Cell temperature and dynamic performance ratio.
//!
//! The PR is deliberately left unclamped: very hot cells push it toward zero
//! and below, very cold ones above one. Reference scenarios depend on it.

/// Cell heating per W/m² of irradiance (°C·m²/W)
pub const CELL_HEATING_COEFF: f64 = 0.025;
/// Power temperature coefficient (1/°C)
pub const TEMP_COEFF: f64 = 0.004;
/// Lumped system losses outside the thermal term
pub const SYSTEM_LOSS: f64 = 0.14;
/// Standard test condition cell temperature (°C)
pub const STC_CELL_TEMP_C: f64 = 25.0;
/// Fixed insolation window used to turn daily energy into mean irradiance (h)
pub const DAYLIGHT_HOURS: f64 = 12.0;

/// `T_cell = T_air + 0.025 × G` (no wind term).
pub fn cell_temperature(t_air_c: f64, ghi_w_m2: f64) -> f64 {
    t_air_c + CELL_HEATING_COEFF * ghi_w_m2
}

/// `PR = 1 − (0.004 × (T_cell − 25) + 0.14)`.
pub fn performance_ratio(t_cell_c: f64) -> f64 {
    let l_temp = TEMP_COEFF * (t_cell_c - STC_CELL_TEMP_C);
    1.0 - (l_temp + SYSTEM_LOSS)
}

/// Mean daylight irradiance (W/m²) for a daily insolation (kWh/m²/day),
/// spread over a fixed 12 h window regardless of actual day length.
pub fn mean_daylight_irradiance(ghi_daily_kwh: f64) -> f64 {
    ghi_daily_kwh * 1000.0 / DAYLIGHT_HOURS
}
