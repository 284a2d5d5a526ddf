/// ============================================================
///  Solar Geometry & Clear-Sky Irradiance
///
///  Algorithm pipeline (analytic implementation):
///   1. Solar geometry  – declination, equation of time, hour angle,
///                        elevation / zenith, azimuth (N = 0°, clockwise)
///   2. Extraterrestrial irradiance – eccentricity-corrected solar constant
///   3. Clear-sky model  – Bird & Hulstrom simplified: DNI, DHI, GHI
///   4. Transposition    – isotropic sky: beam + diffuse + ground reflected
///                         on a tilted plane
/// ============================================================

use chrono::{DateTime, Datelike, Timelike, Utc};
use chrono_tz::Tz;
use std::f64::consts::PI;

use crate::error::SolarGeometryError;
use crate::models::site::Location;

// ─── Physical constants ──────────────────────────────────────
const SC: f64 = 1361.0; // Solar constant W/m²
const DEG: f64 = PI / 180.0;
const DEFAULT_ALBEDO: f64 = 0.25;
/// Below this elevation the clear-sky model returns zero.
const MIN_ELEVATION_DEG: f64 = 0.1;

/// Sun position for one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarAngles {
    /// Zenith angle (deg); > 90 below the horizon
    pub zenith_deg: f64,
    /// Azimuth (deg from North, clockwise)
    pub azimuth_deg: f64,
}

/// Clear-sky irradiance triplet (W/m²).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearSkyIrradiance {
    pub ghi: f64,
    pub dni: f64,
    pub dhi: f64,
}

/// Solar angles, clear-sky irradiance and plane-of-array transposition.
///
/// Injected into the simulators so an analytic model, a test double or a
/// vendor library can be swapped in without touching them.
pub trait SolarGeometry: Send + Sync {
    fn solar_position(
        &self,
        location: Location,
        times: &[DateTime<Tz>],
    ) -> Result<Vec<SolarAngles>, SolarGeometryError>;

    fn clear_sky(
        &self,
        location: Location,
        times: &[DateTime<Tz>],
    ) -> Result<Vec<ClearSkyIrradiance>, SolarGeometryError>;

    /// Global plane-of-array irradiance for a surface (tilt from horizontal,
    /// azimuth from North) given the irradiance and sun position series.
    fn plane_of_array(
        &self,
        surface_tilt_deg: f64,
        surface_azimuth_deg: f64,
        irradiance: &[ClearSkyIrradiance],
        angles: &[SolarAngles],
    ) -> Result<Vec<f64>, SolarGeometryError>;
}

/// First-order analytic model: Spencer geometry, Bird clear sky,
/// isotropic transposition.
#[derive(Debug, Clone, Copy)]
pub struct AnalyticSolarGeometry {
    /// Ground reflectance for the reflected component
    pub albedo: f64,
}

impl Default for AnalyticSolarGeometry {
    fn default() -> Self {
        Self {
            albedo: DEFAULT_ALBEDO,
        }
    }
}

impl SolarGeometry for AnalyticSolarGeometry {
    fn solar_position(
        &self,
        location: Location,
        times: &[DateTime<Tz>],
    ) -> Result<Vec<SolarAngles>, SolarGeometryError> {
        Ok(times
            .iter()
            .map(|t| {
                let sun = sun_state(location, t.with_timezone(&Utc));
                SolarAngles {
                    zenith_deg: 90.0 - sun.elevation_deg,
                    azimuth_deg: sun.azimuth_deg,
                }
            })
            .collect())
    }

    fn clear_sky(
        &self,
        location: Location,
        times: &[DateTime<Tz>],
    ) -> Result<Vec<ClearSkyIrradiance>, SolarGeometryError> {
        Ok(times
            .iter()
            .map(|t| bird_clear_sky(&sun_state(location, t.with_timezone(&Utc))))
            .collect())
    }

    fn plane_of_array(
        &self,
        surface_tilt_deg: f64,
        surface_azimuth_deg: f64,
        irradiance: &[ClearSkyIrradiance],
        angles: &[SolarAngles],
    ) -> Result<Vec<f64>, SolarGeometryError> {
        if irradiance.len() != angles.len() {
            return Err(SolarGeometryError::SeriesMismatch {
                expected: irradiance.len(),
                got: angles.len(),
            });
        }

        let tilt = surface_tilt_deg * DEG;
        let (sin_tilt, cos_tilt) = tilt.sin_cos();

        Ok(irradiance
            .iter()
            .zip(angles)
            .map(|(sky, sun)| {
                // Angle of incidence between sun and panel normal
                let zen = sun.zenith_deg * DEG;
                let az_diff = (sun.azimuth_deg - surface_azimuth_deg) * DEG;
                let cos_aoi = zen.cos() * cos_tilt + zen.sin() * sin_tilt * az_diff.cos();

                let beam = if sun.zenith_deg < 90.0 {
                    sky.dni * cos_aoi.max(0.0)
                } else {
                    0.0
                };
                let diffuse = sky.dhi * (1.0 + cos_tilt) / 2.0;
                let reflected = sky.ghi * self.albedo * (1.0 - cos_tilt) / 2.0;

                (beam + diffuse + reflected).max(0.0)
            })
            .collect())
    }
}

// ─── Solar geometry ──────────────────────────────────────────

/// Sun state for one UTC instant.
struct SunState {
    elevation_deg: f64,
    azimuth_deg: f64,
    /// Extraterrestrial normal irradiance (W/m²)
    e0: f64,
}

fn sun_state(location: Location, utc: DateTime<Utc>) -> SunState {
    // ── 1. Time decomposition ──────────────────────────────────
    let doy = utc.ordinal() as f64;
    let ut_h = utc.hour() as f64 + utc.minute() as f64 / 60.0 + utc.second() as f64 / 3600.0;

    // ── 2. Declination (Spencer 1971) ──────────────────────────
    let b = 2.0 * PI * (doy - 1.0) / 365.0;
    let decl = 0.006918 - 0.399912 * b.cos() + 0.070257 * b.sin()
        - 0.006758 * (2.0 * b).cos()
        + 0.000907 * (2.0 * b).sin()
        - 0.002697 * (3.0 * b).cos()
        + 0.00148 * (3.0 * b).sin();

    // Equation of Time (minutes, Spencer 1971)
    let eot_min = 229.18
        * (0.000075 + 0.001868 * b.cos()
            - 0.032077 * b.sin()
            - 0.014615 * (2.0 * b).cos()
            - 0.04089 * (2.0 * b).sin());

    // ── 3. Local solar time & hour angle ───────────────────────
    let lst_h = ut_h + location.longitude / 15.0 + eot_min / 60.0;
    // Negative in the morning, positive in the afternoon, within ±180°
    let omega_deg = (15.0 * (lst_h - 12.0) + 180.0).rem_euclid(360.0) - 180.0;
    let omega = omega_deg * DEG;

    // ── 4. Elevation ───────────────────────────────────────────
    let lat = location.latitude * DEG;
    let sin_alpha =
        (lat.sin() * decl.sin() + lat.cos() * decl.cos() * omega.cos()).clamp(-1.0, 1.0);
    let alpha = sin_alpha.asin();

    // ── 5. Azimuth (N = 0°, clockwise) ─────────────────────────
    let denom = alpha.cos() * lat.cos();
    let cos_az = if denom.abs() > 1e-9 {
        (decl.sin() - sin_alpha * lat.sin()) / denom
    } else {
        0.0
    };
    let az_abs = cos_az.clamp(-1.0, 1.0).acos() / DEG;
    let azimuth_deg = if omega_deg > 0.0 { 360.0 - az_abs } else { az_abs };

    // ── 6. Extraterrestrial irradiance (eccentricity correction)
    let e0 = SC
        * (1.00011 + 0.034221 * b.cos() + 0.00128 * b.sin() + 0.000719 * (2.0 * b).cos()
            + 0.000077 * (2.0 * b).sin());

    SunState {
        elevation_deg: alpha / DEG,
        azimuth_deg,
        e0,
    }
}

// ─── Clear-sky model (Bird & Hulstrom simplified) ────────────

fn bird_clear_sky(sun: &SunState) -> ClearSkyIrradiance {
    if sun.elevation_deg <= MIN_ELEVATION_DEG {
        return ClearSkyIrradiance {
            ghi: 0.0,
            dni: 0.0,
            dhi: 0.0,
        };
    }
    let sin_alpha = (sun.elevation_deg * DEG).sin();

    // Air mass – Kasten & Young (1989)
    let am = (1.0 / (sin_alpha + 0.50572 * (sun.elevation_deg + 6.07995_f64).powf(-1.6364)))
        .max(1.0);

    // Rayleigh
    let tr = (-0.0903 * am.powf(0.84) * (1.0 + am - am.powf(1.01))).exp();
    // Ozone (standard column 0.3 atm-cm)
    let to = 1.0 - 0.0013 * am;
    // Aerosol (Linke turbidity 3.0)
    let tk = 3.0_f64;
    let ta = (-0.09 * tk.powf(0.978) * am.powf(0.9455)).exp();
    // Water vapour (precipitable water 1.5 cm)
    let tw = 1.0 - 0.0075 * am.powf(0.65);

    let total_t = tr * to * ta * tw;
    let dni = 0.9762 * sun.e0 * total_t;
    let scatter = 0.5 * (1.0 - tr) + ba_scatter_coeff(ta);
    let dhi = (0.79 * sun.e0 * sin_alpha * (1.0 - total_t) * scatter
        / (1.0 - am + am.powf(1.02)))
    .max(0.0);
    let ghi = (dni * sin_alpha + dhi).max(0.0);

    ClearSkyIrradiance { ghi, dni, dhi }
}

// ─── Helper: back-scatter term for Bird diffuse ──────────────
#[inline]
fn ba_scatter_coeff(ta: f64) -> f64 {
    // Approximated from Bird (1981) Table 2
    0.5 * (0.92 - ta.ln().abs() / 10.0).clamp(0.2, 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Asia::Jakarta;

    const BANDUNG: Location = Location {
        latitude: -6.9175,
        longitude: 107.6191,
    };

    #[test]
    fn test_noon_sun_near_zenith_in_tropics() {
        let noon = Jakarta.with_ymd_and_hms(2025, 3, 21, 12, 0, 0).unwrap();
        let geo = AnalyticSolarGeometry::default();
        let angles = geo.solar_position(BANDUNG, &[noon]).unwrap();
        assert!(angles[0].zenith_deg < 15.0, "zenith {:.1}", angles[0].zenith_deg);

        let sky = geo.clear_sky(BANDUNG, &[noon]).unwrap();
        assert!(sky[0].ghi > 800.0 && sky[0].ghi < 1200.0, "GHI {:.0}", sky[0].ghi);
        let elevation = (90.0 - angles[0].zenith_deg).to_radians();
        let closure = sky[0].dni * elevation.sin() + sky[0].dhi;
        assert!((sky[0].ghi - closure).abs() < 1e-6);
    }

    #[test]
    fn test_midnight_is_dark() {
        let midnight = Jakarta.with_ymd_and_hms(2025, 3, 21, 0, 0, 0).unwrap();
        let geo = AnalyticSolarGeometry::default();
        let angles = geo.solar_position(BANDUNG, &[midnight]).unwrap();
        assert!(angles[0].zenith_deg > 90.0);
        let sky = geo.clear_sky(BANDUNG, &[midnight]).unwrap();
        assert_eq!(sky[0].ghi, 0.0);
        let poa = geo.plane_of_array(20.0, 0.0, &sky, &angles).unwrap();
        assert_eq!(poa[0], 0.0);
    }

    #[test]
    fn test_morning_sun_in_the_east() {
        let morning = Jakarta.with_ymd_and_hms(2025, 3, 21, 8, 0, 0).unwrap();
        let angles = AnalyticSolarGeometry::default()
            .solar_position(BANDUNG, &[morning])
            .unwrap();
        assert!(angles[0].azimuth_deg > 45.0 && angles[0].azimuth_deg < 135.0);
    }

    #[test]
    fn test_horizontal_plane_equals_ghi() {
        let t = Jakarta.with_ymd_and_hms(2025, 7, 15, 10, 0, 0).unwrap();
        let geo = AnalyticSolarGeometry::default();
        let angles = geo.solar_position(BANDUNG, &[t]).unwrap();
        let sky = geo.clear_sky(BANDUNG, &[t]).unwrap();
        let poa = geo.plane_of_array(0.0, 0.0, &sky, &angles).unwrap();
        assert!((poa[0] - sky[0].ghi).abs() < 1e-6);
    }

    #[test]
    fn test_series_length_mismatch() {
        let geo = AnalyticSolarGeometry::default();
        let sky = [ClearSkyIrradiance { ghi: 1.0, dni: 1.0, dhi: 0.0 }];
        let err = geo.plane_of_array(10.0, 0.0, &sky, &[]).unwrap_err();
        assert_eq!(err, SolarGeometryError::SeriesMismatch { expected: 1, got: 0 });
    }
}
