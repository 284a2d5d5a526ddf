//! Payback and emission figures derived from a site simulation.

/// Grid emission factor (kg CO₂ per kWh)
pub const DEFAULT_CO2_KG_PER_KWH: f64 = 0.85;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinancialSummary {
    pub system_size_kwp: f64,
    pub estimated_cost: f64,
    pub annual_savings: f64,
    /// 0 when there are no savings
    pub break_even_years: f64,
    pub co2_offset_ton: f64,
}

pub fn summarize(
    system_size_kwp: f64,
    annual_energy_kwh: f64,
    cost_per_kwp: f64,
    tariff_per_kwh: f64,
    co2_kg_per_kwh: f64,
) -> FinancialSummary {
    let estimated_cost = system_size_kwp * cost_per_kwp;
    let annual_savings = annual_energy_kwh * tariff_per_kwh;
    let break_even_years = if annual_savings > 0.0 {
        estimated_cost / annual_savings
    } else {
        0.0
    };

    FinancialSummary {
        system_size_kwp,
        estimated_cost,
        annual_savings,
        break_even_years,
        co2_offset_ton: annual_energy_kwh * co2_kg_per_kwh / 1000.0,
    }
}
