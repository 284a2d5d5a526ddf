use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{GeometryError, SimulationError};

// ─── Location & roof outline ─────────────────────────────────────────────────

/// WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Roof outline as an ordered ring of WGS84 vertices.
///
/// Construction enforces the caller-side preconditions (at least three
/// vertices, finite in-range coordinates) so the area resolver never sees a
/// polygon it cannot project. Self-intersection is only detectable after
/// projection and is checked there.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoPolygon {
    vertices: Vec<Location>,
}

impl GeoPolygon {
    pub const MIN_VERTICES: usize = 3;

    pub fn new(vertices: Vec<Location>) -> Result<Self, GeometryError> {
        if vertices.len() < Self::MIN_VERTICES {
            return Err(GeometryError::TooFewVertices {
                got: vertices.len(),
                min: Self::MIN_VERTICES,
            });
        }
        for (index, v) in vertices.iter().enumerate() {
            let valid = v.latitude.is_finite()
                && v.longitude.is_finite()
                && (-90.0..=90.0).contains(&v.latitude)
                && (-180.0..=180.0).contains(&v.longitude);
            if !valid {
                return Err(GeometryError::InvalidCoordinate {
                    index,
                    latitude: v.latitude,
                    longitude: v.longitude,
                });
            }
        }
        Ok(Self { vertices })
    }

    /// Builds a polygon from `[lat, lon]` pairs as sent by map front-ends.
    pub fn from_lat_lon_pairs(pairs: &[[f64; 2]]) -> Result<Self, GeometryError> {
        Self::new(pairs.iter().map(|p| Location::new(p[0], p[1])).collect())
    }

    pub fn vertices(&self) -> &[Location] {
        &self.vertices
    }
}

// ─── Simulation inputs ───────────────────────────────────────────────────────

/// Array orientation and sizing shared by the daily and monthly simulators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationParameters {
    /// Surface tilt from horizontal (deg, 0..=90)
    pub tilt_deg: f64,
    /// Surface azimuth (deg, 0 = North, clockwise, 0..360)
    pub azimuth_deg: f64,
    /// Module efficiency (0.15..=0.25)
    pub panel_efficiency: f64,
    /// Usable roof area (m²)
    pub area_sqm: f64,
}

impl SimulationParameters {
    pub fn validate(&self) -> Result<(), SimulationError> {
        if !(0.0..=90.0).contains(&self.tilt_deg) {
            return Err(SimulationError::InvalidParameters(format!(
                "tilt must be within [0, 90] degrees, got {}",
                self.tilt_deg
            )));
        }
        if !(0.0..360.0).contains(&self.azimuth_deg) {
            return Err(SimulationError::InvalidParameters(format!(
                "azimuth must be within [0, 360) degrees, got {}",
                self.azimuth_deg
            )));
        }
        if !(0.15..=0.25).contains(&self.panel_efficiency) {
            return Err(SimulationError::InvalidParameters(format!(
                "panel_efficiency must be within [0.15, 0.25], got {}",
                self.panel_efficiency
            )));
        }
        if !(self.area_sqm > 0.0 && self.area_sqm.is_finite()) {
            return Err(SimulationError::InvalidParameters(format!(
                "area must be positive, got {}",
                self.area_sqm
            )));
        }
        Ok(())
    }
}

/// One day's weather as consumed by the yield simulators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayWeather {
    /// Daily horizontal insolation (kWh/m²/day)
    pub ghi_daily_kwh: f64,
    /// Mean air temperature (°C)
    pub temp_avg_c: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polygon_requires_three_vertices() {
        let err = GeoPolygon::from_lat_lon_pairs(&[[-6.9, 107.6], [-6.91, 107.61]]).unwrap_err();
        assert_eq!(err, GeometryError::TooFewVertices { got: 2, min: 3 });
    }

    #[test]
    fn test_polygon_rejects_out_of_range_coordinates() {
        let err =
            GeoPolygon::from_lat_lon_pairs(&[[0.0, 0.0], [95.0, 0.0], [0.0, 1.0]]).unwrap_err();
        assert!(matches!(err, GeometryError::InvalidCoordinate { index: 1, .. }));

        let err = GeoPolygon::from_lat_lon_pairs(&[[0.0, 0.0], [1.0, f64::NAN], [0.0, 1.0]])
            .unwrap_err();
        assert!(matches!(err, GeometryError::InvalidCoordinate { index: 1, .. }));
    }

    #[test]
    fn test_parameter_ranges() {
        let ok = SimulationParameters {
            tilt_deg: 20.0,
            azimuth_deg: 0.0,
            panel_efficiency: 0.20,
            area_sqm: 50.0,
        };
        assert!(ok.validate().is_ok());
        assert!(SimulationParameters { tilt_deg: 91.0, ..ok }.validate().is_err());
        assert!(SimulationParameters { azimuth_deg: 360.0, ..ok }.validate().is_err());
        assert!(SimulationParameters { panel_efficiency: 0.30, ..ok }.validate().is_err());
        assert!(SimulationParameters { area_sqm: 0.0, ..ok }.validate().is_err());
    }
}
