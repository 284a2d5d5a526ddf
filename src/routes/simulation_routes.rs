use axum::{routing::{get, post}, Router};
use crate::controllers::simulation_controller::{calculate_simulation, health};
use crate::shared_state::AppState;

/// Versioned prefix the web client calls.
pub const API_PREFIX: &str = "/api/v1";

/// Unversioned alias kept for existing callers.
pub const API_ALIAS: &str = "/api";

/// Build the API sub-router, mounted under [`API_PREFIX`] and [`API_ALIAS`].
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/simulation/calculate", post(calculate_simulation))
        .route("/health", get(health))
        .with_state(state)
}
