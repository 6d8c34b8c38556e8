//! Simulated wards used when live data is empty or unreachable.

use airwatch_source::estimate::estimate_pollutants;
use airwatch_source::normalize::build_ward;
use airwatch_ward_models::{GeoPoint, Pollutants, ScreenPoint, TREND_DAYS, Ward};
use rand::Rng;

/// Number of stations synthesized around a query point.
pub const SIMULATED_STATION_COUNT: usize = 8;

/// Lowest simulated baseline AQI.
const BASELINE_MIN: f64 = 150.0;
/// Width of the simulated baseline AQI range.
const BASELINE_SPAN: f64 = 150.0;
/// Maximum day-to-day deviation of a simulated trend from its baseline.
const TREND_JITTER: f64 = 20.0;

/// Returns the fallback for a fetch: simulated stations around `point`,
/// or the fixed reference station when no point was given.
#[must_use]
pub fn fallback_wards<R: Rng + ?Sized>(
    point: Option<GeoPoint>,
    jitter: f64,
    rng: &mut R,
) -> Vec<Ward> {
    point.map_or_else(
        || vec![reference_station()],
        |center| simulate_around(center, jitter, rng),
    )
}

/// Synthesizes [`SIMULATED_STATION_COUNT`] stations scattered up to
/// `jitter` degrees around `center`.
///
/// Each station gets its own baseline AQI in `[150, 300)`. Unlike live
/// stations, every trend value is drawn independently around the baseline,
/// so the last one need not equal the current AQI.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn simulate_around<R: Rng + ?Sized>(center: GeoPoint, jitter: f64, rng: &mut R) -> Vec<Ward> {
    (0..SIMULATED_STATION_COUNT)
        .map(|i| {
            let lat_offset = (rng.r#gen::<f64>() - 0.5) * 2.0 * jitter;
            let lng_offset = (rng.r#gen::<f64>() - 0.5) * 2.0 * jitter;
            let baseline = BASELINE_SPAN.mul_add(rng.r#gen::<f64>(), BASELINE_MIN);
            let aqi = baseline.round() as u32;
            let pollutants = estimate_pollutants(aqi, rng);
            let population = rng.gen_range(5_000..55_000);

            let mut trend = [0; TREND_DAYS];
            for day in &mut trend {
                let variance = rng.r#gen::<f64>().mul_add(2.0 * TREND_JITTER, -TREND_JITTER);
                *day = (baseline + variance).round() as u32;
            }

            let label = char::from(b'A' + u8::try_from(i).unwrap_or(0));

            build_ward(
                format!("sim-local-{i}"),
                format!("Local Sensor Node {label}"),
                population,
                aqi,
                pollutants,
                GeoPoint::new(center.lat + lat_offset, center.lng + lng_offset),
                trend,
            )
        })
        .collect()
}

/// A fixed, known severely polluted station (Anand Vihar, Delhi) returned
/// verbatim when a region-wide fetch yields nothing.
#[must_use]
pub fn reference_station() -> Ward {
    Ward {
        id: "sim-1".to_string(),
        name: "Anand Vihar, Delhi".to_string(),
        population: 250_000,
        aqi: 412,
        pollutants: Pollutants {
            pm25: 350.0,
            pm10: 480.0,
            no2: 110.0,
            so2: 30.0,
            co: 4.5,
            o3: 40.0,
        },
        primary_source: "Heavy Transport Hub".to_string(),
        secondary_source: "Road Dust".to_string(),
        location: GeoPoint::new(28.6469, 77.3160),
        coordinates: ScreenPoint::default(),
        trend: [380, 395, 410, 405, 415, 420, 412],
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn simulates_eight_stations_near_point() {
        let center = GeoPoint::new(19.076, 72.8777);
        let wards = simulate_around(center, 0.075, &mut StdRng::seed_from_u64(4));

        assert_eq!(wards.len(), SIMULATED_STATION_COUNT);
        for (i, ward) in wards.iter().enumerate() {
            assert_eq!(ward.id, format!("sim-local-{i}"));
            assert!((ward.location.lat - center.lat).abs() <= 0.075 + 1e-9);
            assert!((ward.location.lng - center.lng).abs() <= 0.075 + 1e-9);
            assert!((150..=300).contains(&ward.aqi));
            assert!((5_000..55_000).contains(&ward.population));
            assert!((ward.pollutants.pm25 - f64::from(ward.aqi)).abs() < f64::EPSILON);
            assert!(!ward.primary_source.is_empty());
            for value in ward.trend {
                assert!(value + 21 >= ward.aqi && value <= ward.aqi + 21);
            }
        }
        assert_eq!(wards[0].name, "Local Sensor Node A");
        assert_eq!(wards[7].name, "Local Sensor Node H");
    }

    #[test]
    fn region_fallback_is_the_reference_station() {
        let wards = fallback_wards(None, 0.075, &mut StdRng::seed_from_u64(4));
        assert_eq!(wards, vec![reference_station()]);
        assert_eq!(wards[0].trend[TREND_DAYS - 1], wards[0].aqi);
    }

    #[test]
    fn point_fallback_is_seed_deterministic() {
        let center = GeoPoint::new(28.6, 77.2);
        let a = fallback_wards(Some(center), 0.075, &mut StdRng::seed_from_u64(12));
        let b = fallback_wards(Some(center), 0.075, &mut StdRng::seed_from_u64(12));
        assert_eq!(a, b);
    }
}
