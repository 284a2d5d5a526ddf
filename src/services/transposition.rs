//! Clear-sky transposition factor for a fixed surface on a representative day.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, TimeZone};
use chrono_tz::Tz;

use crate::error::SolarGeometryError;
use crate::models::site::Location;
use crate::services::solar_geometry::SolarGeometry;

/// Hourly samples across the representative day.
pub const SAMPLES_PER_DAY: u32 = 24;

/// Daily clear-sky sums behind a transposition factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TranspositionResult {
    /// Σ POA / Σ GHI, or 1.0 when Σ GHI ≤ 0
    pub k_trans: f64,
    /// Σ GHI over the samples (Wh/m² at hourly spacing)
    pub ghi_sum: f64,
    /// Σ POA over the samples (Wh/m² at hourly spacing)
    pub poa_sum: f64,
}

/// Hourly instants starting at local midnight of `date`.
///
/// Midnight is resolved once and the rest are whole-hour offsets from it, so
/// a DST change still yields evenly spaced samples.
pub fn representative_instants(
    date: NaiveDate,
    tz: Tz,
) -> Result<Vec<DateTime<Tz>>, SolarGeometryError> {
    let start = local_midnight(date, tz)?;
    Ok((0..SAMPLES_PER_DAY)
        .map(|hour| start + TimeDelta::hours(i64::from(hour)))
        .collect())
}

/// Earliest instant at local midnight. Zones that skip midnight start the
/// day one hour before the first existing 01:00.
fn local_midnight(date: NaiveDate, tz: Tz) -> Result<DateTime<Tz>, SolarGeometryError> {
    let midnight = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| {
            tz.from_local_datetime(&(midnight + TimeDelta::hours(1)))
                .earliest()
                .map(|t| t - TimeDelta::hours(1))
        })
        .ok_or_else(|| SolarGeometryError::NonexistentLocalTime {
            local: format!("{date} 00:00"),
            timezone: tz.name().to_string(),
        })
}

/// Ratio of daily plane-of-array to daily horizontal irradiance under clear
/// sky. Only geometry and season enter; measured cloudiness does not.
pub fn transposition_factor(
    geometry: &dyn SolarGeometry,
    location: Location,
    tilt_deg: f64,
    azimuth_deg: f64,
    date: NaiveDate,
    tz: Tz,
) -> Result<TranspositionResult, SolarGeometryError> {
    let times = representative_instants(date, tz)?;
    let angles = geometry.solar_position(location, &times)?;
    let sky = geometry.clear_sky(location, &times)?;
    let poa = geometry.plane_of_array(tilt_deg, azimuth_deg, &sky, &angles)?;

    let ghi_sum: f64 = sky.iter().map(|s| s.ghi).sum();
    let poa_sum: f64 = poa.iter().sum();
    let k_trans = if ghi_sum > 0.0 { poa_sum / ghi_sum } else { 1.0 };

    Ok(TranspositionResult {
        k_trans,
        ghi_sum,
        poa_sum,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::solar_geometry::{AnalyticSolarGeometry, ClearSkyIrradiance, SolarAngles};
    use chrono_tz::America::Santiago;
    use chrono_tz::Asia::Jakarta;
    use chrono_tz::Europe::Berlin;

    const BANDUNG: Location = Location {
        latitude: -6.9175,
        longitude: 107.6191,
    };

    /// Geometry double returning empty series, as a vendor library would
    /// for a polar night.
    struct EmptySky;

    impl SolarGeometry for EmptySky {
        fn solar_position(
            &self,
            _: Location,
            _: &[DateTime<Tz>],
        ) -> Result<Vec<SolarAngles>, SolarGeometryError> {
            Ok(Vec::new())
        }
        fn clear_sky(
            &self,
            _: Location,
            _: &[DateTime<Tz>],
        ) -> Result<Vec<ClearSkyIrradiance>, SolarGeometryError> {
            Ok(Vec::new())
        }
        fn plane_of_array(
            &self,
            _: f64,
            _: f64,
            _: &[ClearSkyIrradiance],
            _: &[SolarAngles],
        ) -> Result<Vec<f64>, SolarGeometryError> {
            Ok(Vec::new())
        }
    }

    /// Geometry double whose transposition step always fails.
    struct BrokenPoa;

    impl SolarGeometry for BrokenPoa {
        fn solar_position(
            &self,
            l: Location,
            t: &[DateTime<Tz>],
        ) -> Result<Vec<SolarAngles>, SolarGeometryError> {
            AnalyticSolarGeometry::default().solar_position(l, t)
        }
        fn clear_sky(
            &self,
            l: Location,
            t: &[DateTime<Tz>],
        ) -> Result<Vec<ClearSkyIrradiance>, SolarGeometryError> {
            AnalyticSolarGeometry::default().clear_sky(l, t)
        }
        fn plane_of_array(
            &self,
            _: f64,
            _: f64,
            sky: &[ClearSkyIrradiance],
            _: &[SolarAngles],
        ) -> Result<Vec<f64>, SolarGeometryError> {
            Err(SolarGeometryError::SeriesMismatch {
                expected: sky.len(),
                got: 0,
            })
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_24_local_instants() {
        let times = representative_instants(date(2025, 6, 15), Jakarta).unwrap();
        assert_eq!(times.len(), 24);
        assert_eq!(times[0].to_rfc3339(), "2025-06-15T00:00:00+07:00");
        assert_eq!(times[23].to_rfc3339(), "2025-06-15T23:00:00+07:00");
    }

    #[test]
    fn test_flat_surface_has_unit_factor() {
        let geo = AnalyticSolarGeometry::default();
        let r = transposition_factor(&geo, BANDUNG, 0.0, 0.0, date(2025, 3, 15), Jakarta).unwrap();
        assert!((r.k_trans - 1.0).abs() < 1e-9, "k = {}", r.k_trans);
        assert!(r.ghi_sum > 0.0);
    }

    #[test]
    fn test_equator_facing_tilt_gains_in_winter() {
        // Northern mid-latitude in December: a south-facing tilt sees more
        // than the horizontal.
        let geo = AnalyticSolarGeometry::default();
        let loc = Location::new(30.0, 105.0);
        let r = transposition_factor(&geo, loc, 30.0, 180.0, date(2025, 12, 15), Jakarta).unwrap();
        assert!(r.k_trans > 1.15, "k = {}", r.k_trans);
        let away = transposition_factor(&geo, loc, 30.0, 0.0, date(2025, 12, 15), Jakarta).unwrap();
        assert!(away.k_trans < 1.0, "k = {}", away.k_trans);
    }

    #[test]
    fn test_north_facing_tilt_in_bandung_follows_season() {
        let geo = AnalyticSolarGeometry::default();
        let june =
            transposition_factor(&geo, BANDUNG, 20.0, 0.0, date(2025, 6, 15), Jakarta).unwrap();
        let dec =
            transposition_factor(&geo, BANDUNG, 20.0, 0.0, date(2025, 12, 15), Jakarta).unwrap();
        assert!(june.k_trans > 1.0);
        assert!(dec.k_trans < june.k_trans);
    }

    #[test]
    fn test_empty_series_defaults_to_one() {
        let r = transposition_factor(&EmptySky, BANDUNG, 20.0, 0.0, date(2025, 1, 15), Jakarta)
            .unwrap();
        assert_eq!(r.k_trans, 1.0);
    }

    #[test]
    fn test_geometry_failure_propagates() {
        let err = transposition_factor(&BrokenPoa, BANDUNG, 20.0, 0.0, date(2025, 1, 15), Jakarta)
            .unwrap_err();
        assert_eq!(err, SolarGeometryError::SeriesMismatch { expected: 24, got: 0 });
    }

    #[test]
    fn test_spring_forward_day_is_evenly_sampled() {
        let day = date(2025, 3, 30);
        let times = representative_instants(day, Berlin).unwrap();
        assert_eq!(times.len(), 24);
        assert_eq!(times[0].to_rfc3339(), "2025-03-30T00:00:00+01:00");
        assert_eq!(times[2].to_rfc3339(), "2025-03-30T03:00:00+02:00");
        for pair in times.windows(2) {
            assert_eq!(pair[1] - pair[0], TimeDelta::hours(1));
        }

        let geo = AnalyticSolarGeometry::default();
        let r = transposition_factor(&geo, Location::new(52.52, 13.40), 30.0, 180.0, day, Berlin)
            .unwrap();
        assert!(r.k_trans > 1.0, "k = {}", r.k_trans);
    }

    #[test]
    fn test_fall_back_day_starts_at_midnight() {
        let times = representative_instants(date(2025, 10, 26), Berlin).unwrap();
        assert_eq!(times[0].to_rfc3339(), "2025-10-26T00:00:00+02:00");
        assert_eq!(times[23] - times[0], TimeDelta::hours(23));
    }

    #[test]
    fn test_skipped_midnight_starts_an_hour_before_one_am() {
        // Chile moved clocks from 00:00 to 01:00 on 2024-09-08
        let times = representative_instants(date(2024, 9, 8), Santiago).unwrap();
        assert_eq!(times.len(), 24);
        assert_eq!(times[1].to_rfc3339(), "2024-09-08T01:00:00-03:00");
    }
}
