//! Error types shared across the simulation core and the HTTP layer.

use thiserror::Error;

/// Invalid or degenerate roof outline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("polygon must have at least {min} points, got {got}")]
    TooFewVertices { got: usize, min: usize },

    #[error("vertex {index} has an invalid coordinate ({latitude}, {longitude})")]
    InvalidCoordinate {
        index: usize,
        latitude: f64,
        longitude: f64,
    },

    #[error("polygon has zero area after projection")]
    ZeroArea,

    #[error("polygon edges {first} and {second} intersect")]
    SelfIntersecting { first: usize, second: usize },

    #[error("projection produced a degenerate result: {0}")]
    Degenerate(String),
}

/// Failure inside the solar geometry capability.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolarGeometryError {
    #[error("series length mismatch: expected {expected}, got {got}")]
    SeriesMismatch { expected: usize, got: usize },

    #[error("invalid representative date {year}-{month:02}-{day:02}")]
    InvalidDate { year: i32, month: u32, day: u32 },

    #[error("local time {local} does not exist in timezone {timezone}")]
    NonexistentLocalTime { local: String, timezone: String },
}

/// Classified failure of the upstream weather source.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WeatherError {
    #[error("no weather API key configured")]
    MissingCredentials,

    #[error("weather API rejected the credentials (401)")]
    Unauthorized,

    #[error("weather API rate limit exceeded (429)")]
    RateLimited,

    #[error("weather API request timed out")]
    Timeout,

    #[error("weather API returned HTTP {status}")]
    Http { status: u16 },

    #[error("weather API transport error: {0}")]
    Transport(String),

    #[error("malformed weather payload: {0}")]
    Malformed(String),
}

/// Failure of the shared cache store. Always recovered by the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CacheError {
    #[error("cache store unavailable: {0}")]
    Unavailable(String),
}

/// Request body rejected before any simulation work.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    #[error("{field} must be within [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
    },

    #[error("polygon point {index} must be a [lat, lng] pair")]
    MalformedPoint { index: usize },
}

/// Errors surfaced by `run_site_simulation`.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("Geometry Error: {0}")]
    Geometry(#[from] GeometryError),

    #[error("solar geometry failure: {0}")]
    SolarGeometry(#[from] SolarGeometryError),

    #[error("invalid request: {0}")]
    Request(#[from] RequestError),

    #[error("invalid simulation parameters: {0}")]
    InvalidParameters(String),

    #[error("simulation task failed: {0}")]
    Task(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unknown timezone '{0}'")]
    InvalidTimezone(String),

    #[error("invalid config value: {0}")]
    Invalid(String),
}
