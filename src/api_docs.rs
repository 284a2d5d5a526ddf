use utoipa::OpenApi;
use crate::controllers::simulation_controller;
use crate::models::{simulation, site, weather};

#[derive(OpenApi)]
#[openapi(
    paths(
        simulation_controller::calculate_simulation,
        simulation_controller::health
    ),
    components(
        schemas(
            simulation::SimulationRequest,
            simulation::SimulationResponse,
            simulation::SiteDetails,
            simulation::PanelLayout,
            simulation::PanelDimensions,
            simulation::DetailedLosses,
            simulation::EnergyOutput,
            simulation::DailySimulation,
            simulation::MonthlyBreakdown,
            simulation::MonthlyEntry,
            simulation::FinancialOutput,
            simulation::EnvironmentOutput,
            simulation::MetaInfo,
            simulation::HealthResponse,
            simulation::ErrorResponse,
            site::Location,
            weather::WeatherObservation,
            weather::ObservationSource
        )
    ),
    tags(
        (name = "solar-roof-sim", description = "Rooftop Solar Potential Simulation API")
    )
)]
pub struct ApiDoc;
