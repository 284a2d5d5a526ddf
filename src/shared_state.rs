use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::services::site_simulation::SiteSimulator;

#[derive(Clone)]
pub struct AppState {
    /// Simulation pipeline, built once at start-up with its weather client
    pub simulator: Arc<SiteSimulator>,
    /// Grid emission factor used for the CO₂ figure (kg/kWh)
    pub co2_kg_per_kwh: f64,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(simulator: SiteSimulator, co2_kg_per_kwh: f64) -> Self {
        Self {
            simulator: Arc::new(simulator),
            co2_kg_per_kwh,
            started_at: Utc::now(),
        }
    }

    pub fn uptime_s(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}
