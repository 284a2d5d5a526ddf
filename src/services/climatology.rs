//! Monthly climatology calibration tables.
//!
//! The default table encodes the tropical wet/dry monsoon cycle: a wet
//! season from November to April with reduced insolation and a dry season
//! from May to October. Other climates are supplied through the config file.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Adjustment for one calendar month relative to the base observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthClimate {
    /// Ratio of the monthly mean insolation to the base value
    pub irradiance_factor: f64,
    /// Offset added to the base air temperature (°C)
    pub temperature_offset_c: f64,
}

const fn month(irradiance_factor: f64, temperature_offset_c: f64) -> MonthClimate {
    MonthClimate {
        irradiance_factor,
        temperature_offset_c,
    }
}

const TROPICAL_MONSOON: [MonthClimate; 12] = [
    month(0.95, -1.5), // Jan – wet
    month(0.92, -1.0), // Feb – peak wet
    month(0.93, -0.5), // Mar – wet
    month(0.96, 0.0),  // Apr – transition
    month(1.05, 0.5),  // May – dry season starts
    month(1.10, 1.0),  // Jun – dry
    month(1.12, 1.5),  // Jul – peak dry
    month(1.10, 1.0),  // Aug – dry
    month(1.05, 0.5),  // Sep – transition
    month(1.02, 0.0),  // Oct – transition
    month(0.98, -0.5), // Nov – wet season starts
    month(0.96, -1.0), // Dec – wet
];

/// Twelve monthly adjustments, January first. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Climatology {
    months: [MonthClimate; 12],
}

impl Default for Climatology {
    fn default() -> Self {
        Self::tropical_monsoon()
    }
}

impl Climatology {
    pub fn new(months: [MonthClimate; 12]) -> Self {
        Self { months }
    }

    pub fn tropical_monsoon() -> Self {
        Self::new(TROPICAL_MONSOON)
    }

    pub fn months(&self) -> impl Iterator<Item = (u32, &MonthClimate)> {
        (1u32..).zip(self.months.iter())
    }

    /// Non-positive or non-finite factors would make the monthly model
    /// meaningless; reject them at load time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (m, c) in self.months() {
            if !(c.irradiance_factor.is_finite() && c.irradiance_factor > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "month {m}: irradiance_factor must be positive"
                )));
            }
            if !c.temperature_offset_c.is_finite() {
                return Err(ConfigError::Invalid(format!(
                    "month {m}: temperature_offset_c must be finite"
                )));
            }
        }
        Ok(())
    }
}
