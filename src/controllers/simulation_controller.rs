use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use tracing::{info, warn};

use crate::error::SimulationError;
use crate::models::simulation::{
    round_to, DetailedLosses, EnergyOutput, EnvironmentOutput, ErrorResponse, FinancialOutput,
    HealthResponse, MetaInfo, PanelLayout, SimulationRequest, SimulationResponse, SiteDetails,
};
use crate::models::site::GeoPolygon;
use crate::services::finance;
use crate::shared_state::AppState;

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorResponse { error: message.into() })).into_response()
}

impl IntoResponse for SimulationError {
    fn into_response(self) -> Response {
        let status = match &self {
            SimulationError::Geometry(_)
            | SimulationError::Request(_)
            | SimulationError::InvalidParameters(_) => StatusCode::BAD_REQUEST,
            SimulationError::SolarGeometry(_) | SimulationError::Task(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        error_response(status, self.to_string())
    }
}

/// POST /api/v1/simulation/calculate
/// Run a rooftop simulation
///
/// Resolves the roof area from the outline, fetches (or reuses) the local
/// weather observation, runs the daily and monthly yield simulations and
/// returns layout, losses, financial and environmental figures.
#[utoipa::path(
    post,
    path = "/api/v1/simulation/calculate",
    request_body = SimulationRequest,
    responses(
        (status = 200, description = "Simulation result", body = SimulationResponse),
        (status = 400, description = "Invalid polygon or parameters", body = ErrorResponse),
        (status = 500, description = "Internal simulation failure", body = ErrorResponse)
    )
)]
pub async fn calculate_simulation(
    State(state): State<AppState>,
    payload: Result<Json<SimulationRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(p) => p,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.body_text()),
    };

    let pairs = match request.validate() {
        Ok(p) => p,
        Err(e) => return SimulationError::from(e).into_response(),
    };
    let polygon = match GeoPolygon::from_lat_lon_pairs(&pairs) {
        Ok(p) => p,
        Err(e) => return SimulationError::from(e).into_response(),
    };

    let sim = match state
        .simulator
        .run_site_simulation(&polygon, request.tilt, request.azimuth, request.panel_efficiency)
        .await
    {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "simulation rejected");
            return e.into_response();
        }
    };

    let summary = finance::summarize(
        sim.layout.estimated_kwp,
        sim.monthly.annual_total_kwh,
        request.system_cost_per_kwp,
        request.electricity_tariff,
        state.co2_kg_per_kwh,
    );
    let simulation_id = uuid::Uuid::new_v4().to_string();
    info!(
        %simulation_id,
        area_sqm = sim.area_sqm,
        kwp = summary.system_size_kwp,
        "simulation served"
    );

    let response = SimulationResponse {
        site_details: SiteDetails {
            roof_area_sqm: round_to(sim.area_sqm, 2),
            location: sim.location,
            utm_zone: format!("{}{}", sim.utm_zone, if sim.southern { 'S' } else { 'N' }),
            panel_layout: PanelLayout::from(&sim.layout),
            detailed_losses: DetailedLosses::from(&sim.losses),
        },
        energy_output: EnergyOutput {
            recommended_system_size_kwp: round_to(summary.system_size_kwp, 2),
            daily_production_kwh: round_to(sim.monthly.average_daily_kwh, 2),
            annual_production_kwh: round_to(sim.monthly.annual_total_kwh, 2),
            daily_simulation: (&sim.daily).into(),
            monthly_breakdown: (&sim.monthly).into(),
        },
        financials: FinancialOutput::from(&summary),
        environment: EnvironmentOutput {
            co2_offset_ton: round_to(summary.co2_offset_ton, 2),
        },
        meta: MetaInfo {
            simulation_id,
            weather_source: sim.weather.source,
            weather: sim.weather,
            simulation_date: sim.date,
            calculation_timestamp: Utc::now(),
        },
    };

    (StatusCode::OK, Json(response)).into_response()
}

/// GET /api/v1/health
/// Service liveness
#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_s: state.uptime_s(),
    })
}
