/// ============================================================
///  Geodesic Area Resolver
///
///  Pipeline:
///   1. Drop repeated vertices, then take the centroid in degrees
///   2. UTM zone + hemisphere from the centroid
///   3. Transverse Mercator forward projection of every vertex
///      (WGS84, Snyder 1987 series)
///   4. Simplicity check and planar area on the projected ring
/// ============================================================

use geo::{Area, Centroid, Intersects};
use geo_types::{Coord, LineString, Polygon};

use crate::error::GeometryError;
use crate::models::site::{GeoPolygon, Location};

// ─── WGS84 / UTM constants ───────────────────────────────────
const A: f64 = 6_378_137.0; // semi-major axis (m)
const F: f64 = 1.0 / 298.257_223_563; // flattening
const K0: f64 = 0.9996; // central meridian scale
const FALSE_EASTING: f64 = 500_000.0;
const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// Below this the outline is treated as degenerate (m²).
const MIN_AREA_SQM: f64 = 1e-6;

/// Vertices closer than this (degrees, about 0.1 mm) are the same corner.
const VERTEX_EPSILON_DEG: f64 = 1e-9;

/// Result of resolving a roof outline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedArea {
    pub area_sqm: f64,
    pub centroid: Location,
    pub utm_zone: u8,
    pub southern: bool,
}

/// Main entry point: projects the polygon into its local UTM zone and
/// returns the planar area.
pub fn resolve_area(polygon: &GeoPolygon) -> Result<ResolvedArea, GeometryError> {
    let ring = distinct_ring(polygon.vertices());
    if ring.len() < 3 {
        return Err(GeometryError::ZeroArea);
    }

    let centroid = centroid_deg(&ring)?;
    let utm_zone = utm_zone(centroid.longitude);
    let southern = centroid.latitude <= 0.0;

    let projected: Vec<Coord<f64>> = ring
        .iter()
        .map(|v| project(*v, utm_zone, southern))
        .collect();

    if let Some(p) = projected.iter().find(|p| !p.x.is_finite() || !p.y.is_finite()) {
        return Err(GeometryError::Degenerate(format!(
            "non-finite projected coordinate ({}, {})",
            p.x, p.y
        )));
    }

    // Shift to the first vertex so large UTM offsets don't eat precision
    let origin = projected[0];
    let local = Polygon::new(
        LineString::from(projected.iter().map(|p| *p - origin).collect::<Vec<_>>()),
        vec![],
    );

    if let Some((first, second)) = first_crossing(&local) {
        return Err(GeometryError::SelfIntersecting { first, second });
    }
    let area_sqm = local.unsigned_area();
    if !area_sqm.is_finite() || area_sqm < MIN_AREA_SQM {
        return Err(GeometryError::ZeroArea);
    }

    Ok(ResolvedArea {
        area_sqm,
        centroid,
        utm_zone,
        southern,
    })
}

fn same_vertex(a: &Location, b: &Location) -> bool {
    (a.latitude - b.latitude).abs() <= VERTEX_EPSILON_DEG
        && (a.longitude - b.longitude).abs() <= VERTEX_EPSILON_DEG
}

/// Collapses runs of repeated vertices and drops an explicit closing vertex.
fn distinct_ring(vertices: &[Location]) -> Vec<Location> {
    let mut ring: Vec<Location> = Vec::with_capacity(vertices.len());
    for v in vertices {
        if ring.last().is_none_or(|last| !same_vertex(last, v)) {
            ring.push(*v);
        }
    }
    while ring.len() > 1 && same_vertex(&ring[0], &ring[ring.len() - 1]) {
        ring.pop();
    }
    ring
}

/// Zone index 1..=60 for a longitude.
pub fn utm_zone(lon_deg: f64) -> u8 {
    let zone = ((lon_deg + 180.0) / 6.0).floor() as i64 + 1;
    zone.clamp(1, 60) as u8
}

/// Area-weighted centroid treating (lon, lat) as planar coordinates.
/// A ring with no area in degrees falls back to its outline centroid.
fn centroid_deg(ring: &[Location]) -> Result<Location, GeometryError> {
    let outline = Polygon::new(
        ring.iter()
            .map(|v| Coord {
                x: v.longitude,
                y: v.latitude,
            })
            .collect::<LineString<f64>>(),
        vec![],
    );
    outline
        .centroid()
        .map(|p| Location::new(p.y(), p.x()))
        .ok_or_else(|| GeometryError::Degenerate("outline has no centroid".into()))
}

/// Transverse Mercator forward projection into the given UTM zone.
fn project(v: Location, zone: u8, southern: bool) -> Coord<f64> {
    let e2 = F * (2.0 - F);
    let e4 = e2 * e2;
    let e6 = e4 * e2;
    let ep2 = e2 / (1.0 - e2);

    let phi = v.latitude.to_radians();
    let lambda0 = (f64::from(zone) * 6.0 - 183.0).to_radians();
    let lambda = v.longitude.to_radians();

    let (sin_phi, cos_phi) = phi.sin_cos();
    let tan_phi = phi.tan();

    let n = A / (1.0 - e2 * sin_phi * sin_phi).sqrt();
    let t = tan_phi * tan_phi;
    let c = ep2 * cos_phi * cos_phi;
    let a = cos_phi * (lambda - lambda0);

    // Meridional arc
    let m = A
        * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * phi
            - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * phi).sin()
            + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * phi).sin()
            - (35.0 * e6 / 3072.0) * (6.0 * phi).sin());

    let x = K0
        * n
        * (a + (1.0 - t + c) * a.powi(3) / 6.0
            + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * a.powi(5) / 120.0)
        + FALSE_EASTING;

    let mut y = K0
        * (m + n
            * tan_phi
            * (a * a / 2.0
                + (5.0 - t + 9.0 * c + 4.0 * c * c) * a.powi(4) / 24.0
                + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * a.powi(6) / 720.0));
    if southern {
        y += FALSE_NORTHING_SOUTH;
    }

    Coord { x, y }
}

/// First pair of non-adjacent edges that touch or cross, if any.
fn first_crossing(polygon: &Polygon<f64>) -> Option<(usize, usize)> {
    let edges: Vec<_> = polygon.exterior().lines().collect();
    let n = edges.len();
    for i in 0..n {
        for j in (i + 2)..n {
            // Edge n-1 closes back onto edge 0
            if i == 0 && j == n - 1 {
                continue;
            }
            if edges[i].intersects(&edges[j]) {
                return Some((i, j));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Ellipsoidal cell area from meridional and prime-vertical radii of
    /// curvature, independent of any map projection.
    fn ellipsoid_cell_area(lat_deg: f64, dlat_deg: f64, dlon_deg: f64) -> f64 {
        let e2 = F * (2.0 - F);
        let phi = lat_deg.to_radians();
        let w = 1.0 - e2 * phi.sin().powi(2);
        let meridional = A * (1.0 - e2) / w.powf(1.5);
        let prime_vertical = A / w.sqrt();
        (dlat_deg.to_radians() * meridional) * (dlon_deg.to_radians() * prime_vertical * phi.cos())
    }

    fn square(lat0: f64, lon0: f64, side_deg: f64) -> GeoPolygon {
        GeoPolygon::from_lat_lon_pairs(&[
            [lat0, lon0],
            [lat0, lon0 + side_deg],
            [lat0 + side_deg, lon0 + side_deg],
            [lat0 + side_deg, lon0],
        ])
        .unwrap()
    }

    #[test]
    fn test_bandung_roof_area_matches_ellipsoid() {
        let poly = square(-6.9180, 107.6186, 0.001);
        let r = resolve_area(&poly).unwrap();
        let expected = ellipsoid_cell_area(-6.9175, 0.001, 0.001);
        let rel = (r.area_sqm - expected).abs() / expected;
        assert!(rel < 0.01, "area {:.2} vs {:.2} (rel {:.4})", r.area_sqm, expected, rel);
        assert_eq!(r.utm_zone, 48);
        assert!(r.southern);
        assert!((r.centroid.latitude + 6.9175).abs() < 1e-8);
        assert!((r.centroid.longitude - 107.6191).abs() < 1e-8);
    }

    #[test]
    fn test_northern_hemisphere_zone() {
        let poly = square(1.30, 103.80, 0.0005); // Singapore
        let r = resolve_area(&poly).unwrap();
        assert_eq!(r.utm_zone, 48);
        assert!(!r.southern);
        let expected = ellipsoid_cell_area(1.30025, 0.0005, 0.0005);
        assert!((r.area_sqm - expected).abs() / expected < 0.01);
    }

    #[test]
    fn test_vertex_order_and_closing_vertex_do_not_matter() {
        let cw = GeoPolygon::from_lat_lon_pairs(&[
            [-6.9180, 107.6186],
            [-6.9170, 107.6186],
            [-6.9170, 107.6196],
            [-6.9180, 107.6196],
            [-6.9180, 107.6186],
        ])
        .unwrap();
        let ccw = square(-6.9180, 107.6186, 0.001);
        let a = resolve_area(&cw).unwrap().area_sqm;
        let b = resolve_area(&ccw).unwrap().area_sqm;
        assert!((a - b).abs() < 1e-6 * b);
    }

    #[test]
    fn test_collinear_outline_is_zero_area() {
        let poly =
            GeoPolygon::from_lat_lon_pairs(&[[0.0, 99.0], [0.001, 99.0], [0.002, 99.0]]).unwrap();
        assert_eq!(resolve_area(&poly), Err(GeometryError::ZeroArea));
    }

    #[test]
    fn test_bowtie_is_rejected() {
        let poly = GeoPolygon::from_lat_lon_pairs(&[
            [0.0, 100.0],
            [0.001, 100.001],
            [0.0, 100.001],
            [0.001, 100.0],
        ])
        .unwrap();
        assert!(matches!(
            resolve_area(&poly),
            Err(GeometryError::SelfIntersecting { .. })
        ));
    }

    #[test]
    fn test_utm_zone_edges() {
        assert_eq!(utm_zone(-180.0), 1);
        assert_eq!(utm_zone(0.0), 31);
        assert_eq!(utm_zone(107.6191), 48);
        assert_eq!(utm_zone(108.0), 49);
        assert_eq!(utm_zone(180.0), 60);
    }

    #[test]
    fn test_repeated_corner_is_ignored() {
        let clean = square(-6.9180, 107.6186, 0.001);
        let doubled = GeoPolygon::from_lat_lon_pairs(&[
            [-6.9180, 107.6186],
            [-6.9180, 107.6196],
            [-6.9180, 107.6196],
            [-6.9170, 107.6196],
            [-6.9170, 107.6186],
        ])
        .unwrap();
        let a = resolve_area(&clean).unwrap();
        let b = resolve_area(&doubled).unwrap();
        assert!((a.area_sqm - b.area_sqm).abs() < 1e-6 * a.area_sqm);
        assert_eq!(a.utm_zone, b.utm_zone);
    }

    #[test]
    fn test_repeated_points_only_is_zero_area() {
        let poly = GeoPolygon::from_lat_lon_pairs(&[
            [-6.9180, 107.6186],
            [-6.9180, 107.6186],
            [-6.9170, 107.6196],
            [-6.9180, 107.6186],
        ])
        .unwrap();
        assert_eq!(resolve_area(&poly), Err(GeometryError::ZeroArea));
    }
}
