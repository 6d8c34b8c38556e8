//! Pollutant profile estimation from a single AQI scalar.
//!
//! Used when a feed carries no per-pollutant readings (bounds and search
//! feeds) and as a gap-filler for detail-feed readings that are zero or
//! negative.

use airwatch_ward_models::Pollutants;
use rand::Rng;

/// Derives a full pollutant profile from a validated AQI.
///
/// `pm25` is the AQI itself; the remaining values are jittered around
/// severity-scaled baselines using `rng`. Every output is non-negative.
#[must_use]
pub fn estimate_pollutants<R: Rng + ?Sized>(aqi: u32, rng: &mut R) -> Pollutants {
    let aqi = f64::from(aqi);
    let severity = aqi / 100.0;

    Pollutants {
        pm25: aqi.round(),
        pm10: (aqi * 0.4f64.mul_add(rng.r#gen::<f64>(), 1.2)).round(),
        no2: (rng.r#gen::<f64>() * 40.0).mul_add(severity, 20.0).round(),
        so2: (rng.r#gen::<f64>() * 20.0).mul_add(severity, 5.0).round(),
        co: round_tenths((rng.r#gen::<f64>() * 2.0).mul_add(severity, 0.5)),
        o3: 60.0f64.mul_add(rng.r#gen::<f64>(), 20.0).round(),
    }
}

/// Replaces every missing reading in `measured` with the matching value
/// from `estimated`.
///
/// A reading that is zero, negative or NaN is treated as "not reported". A
/// genuine zero measurement cannot be told apart and is a known
/// approximation.
#[must_use]
pub fn fill_missing(measured: Pollutants, estimated: &Pollutants) -> Pollutants {
    let pick = |value: f64, fallback: f64| if is_missing(value) { fallback } else { value };

    Pollutants {
        pm25: pick(measured.pm25, estimated.pm25),
        pm10: pick(measured.pm10, estimated.pm10),
        no2: pick(measured.no2, estimated.no2),
        so2: pick(measured.so2, estimated.so2),
        co: pick(measured.co, estimated.co),
        o3: pick(measured.o3, estimated.o3),
    }
}

/// Returns `true` if any reading in `p` would be replaced by
/// [`fill_missing`].
#[must_use]
pub fn has_missing(p: &Pollutants) -> bool {
    [p.pm25, p.pm10, p.no2, p.so2, p.co, p.o3]
        .into_iter()
        .any(is_missing)
}

fn is_missing(value: f64) -> bool {
    value.is_nan() || value <= 0.0
}

fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand::rngs::StdRng;

    use super::*;

    fn all_non_negative(p: &Pollutants) -> bool {
        [p.pm25, p.pm10, p.no2, p.so2, p.co, p.o3]
            .iter()
            .all(|v| *v >= 0.0)
    }

    #[test]
    fn pm25_tracks_aqi_exactly() {
        let mut rng = StdRng::seed_from_u64(7);
        for aqi in [0, 1, 57, 150, 412, 998] {
            let p = estimate_pollutants(aqi, &mut rng);
            assert!((p.pm25 - f64::from(aqi)).abs() < f64::EPSILON);
            assert!(all_non_negative(&p), "negative value in {p:?}");
        }
    }

    #[test]
    fn values_stay_within_documented_ranges() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..500 {
            let aqi = rng.gen_range(0..999);
            let a = f64::from(aqi);
            let severity = a / 100.0;
            let p = estimate_pollutants(aqi, &mut rng);

            assert!(p.pm10 >= (a * 1.2).round() && p.pm10 <= (a * 1.6).round());
            assert!(p.no2 >= 20.0 && p.no2 <= 40.0f64.mul_add(severity, 20.0).round());
            assert!(p.so2 >= 5.0 && p.so2 <= 20.0f64.mul_add(severity, 5.0).round());
            assert!(p.co >= 0.5 && p.co <= 2.0f64.mul_add(severity, 0.5) + 0.05);
            assert!(p.o3 >= 20.0 && p.o3 <= 80.0);
        }
    }

    #[test]
    fn zero_aqi_does_not_panic_and_uses_floors() {
        let mut rng = StdRng::seed_from_u64(1);
        let p = estimate_pollutants(0, &mut rng);
        assert!(p.pm25.abs() < f64::EPSILON);
        assert!(p.pm10.abs() < f64::EPSILON);
        assert!((p.no2 - 20.0).abs() < f64::EPSILON);
        assert!((p.so2 - 5.0).abs() < f64::EPSILON);
        assert!((p.co - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn same_seed_same_profile() {
        let a = estimate_pollutants(200, &mut StdRng::seed_from_u64(99));
        let b = estimate_pollutants(200, &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn fill_missing_only_replaces_zeros() {
        let measured = Pollutants {
            pm25: 120.0,
            pm10: 0.0,
            no2: 35.0,
            so2: 0.0,
            co: 1.2,
            o3: 0.0,
        };
        let estimated = Pollutants {
            pm25: 1.0,
            pm10: 2.0,
            no2: 3.0,
            so2: 4.0,
            co: 5.0,
            o3: 6.0,
        };
        let filled = fill_missing(measured, &estimated);
        assert_eq!(
            filled,
            Pollutants {
                pm25: 120.0,
                pm10: 2.0,
                no2: 35.0,
                so2: 4.0,
                co: 1.2,
                o3: 6.0,
            }
        );
        assert!(has_missing(&measured));
        assert!(!has_missing(&filled));
    }

    #[test]
    fn fill_missing_replaces_negative_readings() {
        let measured = Pollutants {
            pm25: 164.0,
            pm10: -5.0,
            no2: 30.0,
            so2: 10.0,
            co: -0.1,
            o3: 25.0,
        };
        let estimated = Pollutants {
            pm25: 1.0,
            pm10: 2.0,
            no2: 3.0,
            so2: 4.0,
            co: 5.0,
            o3: 6.0,
        };
        assert!(has_missing(&measured));

        let filled = fill_missing(measured, &estimated);
        assert!((filled.pm10 - 2.0).abs() < f64::EPSILON);
        assert!((filled.co - 5.0).abs() < f64::EPSILON);
        assert!((filled.pm25 - 164.0).abs() < f64::EPSILON);
        assert!(all_non_negative(&filled));
        assert!(!has_missing(&filled));
    }
}
