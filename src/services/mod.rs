pub mod cache_store;
pub mod climatology;
pub mod daily_yield;
pub mod finance;
pub mod geodesic;
pub mod losses;
pub mod panel_layout;
pub mod performance;
pub mod seasonal_yield;
pub mod site_simulation;
pub mod solar_geometry;
pub mod transposition;
pub mod weather_provider;
pub mod weather_service;
