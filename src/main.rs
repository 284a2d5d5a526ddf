mod routes;
mod controllers;
mod services;
mod models;
mod api_docs;
mod shared_state;
mod config;
mod error;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{Router, routing::get, response::Html};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_scalar::Scalar;

use crate::api_docs::ApiDoc;
use crate::config::Config;
use crate::routes::simulation_routes::{API_ALIAS, API_PREFIX, api_routes};
use crate::services::cache_store::InMemoryCacheStore;
use crate::services::site_simulation::SiteSimulator;
use crate::services::solar_geometry::AnalyticSolarGeometry;
use crate::services::weather_provider::OpenWeatherMapProvider;
use crate::services::weather_service::WeatherClient;
use crate::shared_state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 1. Load configuration
    let config = Config::from_env().context("failed to load configuration")?;
    let timezone = config.timezone()?;
    info!(port = config.server.port, %timezone, "configuration loaded");

    // 2. Start-up scoped resources: one HTTP client, one cache store
    let provider = OpenWeatherMapProvider::new(
        config.weather.base_url.clone(),
        config.weather.api_key.clone(),
        config.weather.timeout(),
    )?;
    if !provider.has_credentials() {
        warn!("no OpenWeatherMap API key configured, weather will use mock data");
    }
    let weather = WeatherClient::new(Arc::new(provider), Arc::new(InMemoryCacheStore::new()))
        .with_ttl(config.weather.cache_ttl())
        .with_timeout(config.weather.timeout());

    // 3. Simulation pipeline
    let geometry = Arc::new(AnalyticSolarGeometry::default());
    let simulator = SiteSimulator::new(geometry, weather, timezone)
        .with_climatology(config.climatology())
        .with_panel(config.panel.spec(), config.panel.spacing());
    let state = AppState::new(simulator, config.finance.co2_kg_per_kwh);

    // 4. Start Axum HTTP server
    let app = Router::new()
        .nest(API_PREFIX, api_routes(state.clone()))
        .nest(API_ALIAS, api_routes(state))
        .route("/scalar", get(|| async {
            Html(Scalar::new(ApiDoc::openapi()).to_html())
        }))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("API Server listening on http://{}", addr);
    info!("Scalar UI: http://{}/scalar", addr);

    let server = axum_server::bind(addr).serve(app.into_make_service());
    tokio::select! {
        res = server => res.context("HTTP server failed")?,
        _ = tokio::signal::ctrl_c() => info!("shutdown signal received"),
    }
    Ok(())
}
