//! Station normalization.
//!
//! Converts one raw provider record (detail, bounds, or search shape) into
//! a canonical [`Ward`]. Every function returns `None` when the record's
//! AQI fails validation; the station is then dropped, not defaulted.

use airwatch_source_models::{BoundsStation, DetailStation, SearchStation};
use airwatch_ward_models::{GeoPoint, Pollutants, ScreenPoint, TREND_DAYS, Ward};
use rand::Rng;

use crate::classify::classify_sources;
use crate::estimate::{estimate_pollutants, fill_missing, has_missing};
use crate::validate::validate_aqi;

/// Identifier prefix for detail-feed stations.
pub const DETAIL_PREFIX: &str = "waqi-detail-";
/// Identifier prefix for bounds-feed stations.
pub const BOUNDS_PREFIX: &str = "waqi-bounds-";
/// Identifier prefix for search-feed stations.
pub const SEARCH_PREFIX: &str = "waqi-search-";

/// Name used when a detail-feed station carries no city name.
const DEFAULT_DETAIL_NAME: &str = "Local Station";

/// Trend values are kept within this band.
const TREND_FLOOR: f64 = 20.0;
const TREND_CEILING: f64 = 500.0;
/// Maximum day-to-day deviation from the current AQI.
const TREND_JITTER: f64 = 20.0;

/// Normalizes the detail feed's single station.
///
/// Real per-pollutant readings are kept; any reading that is zero, negative
/// or absent is gap-filled from [`estimate_pollutants`].
#[must_use]
pub fn normalize_detail<R: Rng + ?Sized>(station: &DetailStation, rng: &mut R) -> Option<Ward> {
    let Some(aqi) = validate_aqi(station.aqi.as_ref()) else {
        log::debug!("Dropping detail station {}: invalid AQI", station.idx);
        return None;
    };

    let measured = Pollutants {
        pm25: station.reading("pm25"),
        pm10: station.reading("pm10"),
        no2: station.reading("no2"),
        so2: station.reading("so2"),
        co: station.reading("co"),
        o3: station.reading("o3"),
    };
    let pollutants = if has_missing(&measured) {
        fill_missing(measured, &estimate_pollutants(aqi, rng))
    } else {
        measured
    };

    let trend = synthesize_trend(aqi, rng);

    let city = station.city.clone().unwrap_or_default();
    let name = city
        .name
        .as_deref()
        .map(truncate_at_comma)
        .filter(|n| !n.is_empty())
        .unwrap_or(DEFAULT_DETAIL_NAME)
        .to_string();
    let geo = city.geo.unwrap_or_default();
    let location = GeoPoint::new(
        geo.first().copied().unwrap_or(0.0),
        geo.get(1).copied().unwrap_or(0.0),
    );

    Some(build_ward(
        format!("{DETAIL_PREFIX}{}", station.idx),
        name,
        rng.gen_range(50_000..100_000),
        aqi,
        pollutants,
        location,
        trend,
    ))
}

/// Normalizes one station from the bounds feed.
#[must_use]
pub fn normalize_bounds<R: Rng + ?Sized>(station: &BoundsStation, rng: &mut R) -> Option<Ward> {
    let Some(aqi) = validate_aqi(station.aqi.as_ref()) else {
        log::trace!("Dropping bounds station {}: invalid AQI", station.uid);
        return None;
    };

    let pollutants = estimate_pollutants(aqi, rng);
    let trend = synthesize_trend(aqi, rng);

    Some(build_ward(
        format!("{BOUNDS_PREFIX}{}", station.uid),
        truncate_at_comma(&station.station.name).to_string(),
        rng.gen_range(10_000..100_000),
        aqi,
        pollutants,
        GeoPoint::new(station.lat, station.lon),
        trend,
    ))
}

/// Normalizes one keyword-search hit. The provider name is kept whole.
#[must_use]
pub fn normalize_search<R: Rng + ?Sized>(station: &SearchStation, rng: &mut R) -> Option<Ward> {
    let Some(aqi) = validate_aqi(station.aqi.as_ref()) else {
        log::trace!("Dropping search result {}: invalid AQI", station.uid);
        return None;
    };

    let pollutants = estimate_pollutants(aqi, rng);
    let trend = synthesize_trend(aqi, rng);
    let [lat, lng] = station.station.geo;

    Some(build_ward(
        format!("{SEARCH_PREFIX}{}", station.uid),
        station.station.name.clone(),
        rng.gen_range(20_000..70_000),
        aqi,
        pollutants,
        GeoPoint::new(lat, lng),
        trend,
    ))
}

/// Synthesizes a seven-day history ending at `aqi`.
///
/// The first six days are `aqi ± 20`, clamped to `[20, 500]`; the last day
/// is always exactly `aqi`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn synthesize_trend<R: Rng + ?Sized>(aqi: u32, rng: &mut R) -> [u32; TREND_DAYS] {
    let current = f64::from(aqi);
    let mut trend = [0; TREND_DAYS];
    for day in &mut trend {
        let variance = rng.r#gen::<f64>().mul_add(2.0 * TREND_JITTER, -TREND_JITTER);
        *day = (current + variance)
            .clamp(TREND_FLOOR, TREND_CEILING)
            .round() as u32;
    }
    trend[TREND_DAYS - 1] = aqi;
    trend
}

/// Returns the text before the first comma (the whole string if there is
/// none).
#[must_use]
pub fn truncate_at_comma(name: &str) -> &str {
    name.split(',').next().unwrap_or(name)
}

/// Builds a ward, classifying its sources from the pollutant profile.
#[must_use]
pub fn build_ward(
    id: String,
    name: String,
    population: u32,
    aqi: u32,
    pollutants: Pollutants,
    location: GeoPoint,
    trend: [u32; TREND_DAYS],
) -> Ward {
    let sources = classify_sources(
        pollutants.pm25,
        pollutants.pm10,
        pollutants.no2,
        pollutants.so2,
    );

    Ward {
        id,
        name,
        population,
        aqi,
        pollutants,
        primary_source: sources.primary().to_string(),
        secondary_source: sources.secondary().to_string(),
        location,
        coordinates: ScreenPoint::default(),
        trend,
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand::rngs::StdRng;
    use serde_json::json;

    use super::*;

    fn bounds(value: serde_json::Value) -> BoundsStation {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn bounds_station_is_normalized() {
        let mut rng = StdRng::seed_from_u64(3);
        let station = bounds(json!({
            "uid": 2553, "aqi": "180", "lat": 28.64, "lon": 77.31,
            "station": { "name": "Anand Vihar, Delhi, India" }
        }));
        let ward = normalize_bounds(&station, &mut rng).unwrap();

        assert_eq!(ward.id, "waqi-bounds-2553");
        assert_eq!(ward.name, "Anand Vihar");
        assert_eq!(ward.aqi, 180);
        assert!((ward.pollutants.pm25 - 180.0).abs() < f64::EPSILON);
        assert_eq!(ward.trend[TREND_DAYS - 1], 180);
        assert!((10_000..100_000).contains(&ward.population));
        assert_eq!(ward.location, GeoPoint::new(28.64, 77.31));
        assert_eq!(ward.coordinates, ScreenPoint::default());
        assert!(!ward.primary_source.is_empty());
    }

    #[test]
    fn dash_aqi_is_rejected_every_time() {
        let mut rng = StdRng::seed_from_u64(3);
        let station = bounds(json!({
            "uid": 1, "aqi": "-", "lat": 0.0, "lon": 0.0,
            "station": { "name": "Broken" }
        }));
        assert!(normalize_bounds(&station, &mut rng).is_none());
        assert!(normalize_bounds(&station, &mut rng).is_none());
    }

    #[test]
    fn detail_station_keeps_real_readings_and_fills_zeros() {
        let mut rng = StdRng::seed_from_u64(11);
        let station: DetailStation = serde_json::from_value(json!({
            "idx": 7021,
            "aqi": 164,
            "city": { "name": "Punjabi Bagh, Delhi, India", "geo": [28.674, 77.131] },
            "iaqi": {
                "pm25": { "v": 164 },
                "pm10": { "v": 121 },
                "no2": { "v": 0 },
                "co": { "v": 12.4 }
            }
        }))
        .unwrap();
        let ward = normalize_detail(&station, &mut rng).unwrap();

        assert_eq!(ward.id, "waqi-detail-7021");
        assert_eq!(ward.name, "Punjabi Bagh");
        assert!((ward.pollutants.pm25 - 164.0).abs() < f64::EPSILON);
        assert!((ward.pollutants.pm10 - 121.0).abs() < f64::EPSILON);
        assert!((ward.pollutants.co - 12.4).abs() < f64::EPSILON);
        assert!(ward.pollutants.no2 >= 20.0);
        assert!(ward.pollutants.so2 >= 5.0);
        assert!(ward.pollutants.o3 >= 20.0);
        assert_eq!(ward.trend[TREND_DAYS - 1], 164);
        assert!((50_000..100_000).contains(&ward.population));
        assert_eq!(ward.location, GeoPoint::new(28.674, 77.131));
    }

    #[test]
    fn detail_station_replaces_negative_readings() {
        let mut rng = StdRng::seed_from_u64(11);
        let station: DetailStation = serde_json::from_value(json!({
            "idx": 7022,
            "aqi": 164,
            "iaqi": {
                "pm25": { "v": 164 },
                "pm10": { "v": -5 },
                "no2": { "v": 30 },
                "so2": { "v": 10 },
                "co": { "v": 1.2 },
                "o3": { "v": 25 }
            }
        }))
        .unwrap();
        let ward = normalize_detail(&station, &mut rng).unwrap();
        let p = &ward.pollutants;

        assert!(p.pm10 >= (164.0f64 * 1.2).round(), "pm10 = {}", p.pm10);
        assert!((p.no2 - 30.0).abs() < f64::EPSILON);
        assert!((p.co - 1.2).abs() < f64::EPSILON);
        assert!(
            [p.pm25, p.pm10, p.no2, p.so2, p.co, p.o3]
                .iter()
                .all(|v| *v >= 0.0),
            "negative value in {p:?}"
        );
    }

    #[test]
    fn detail_station_defaults_name_and_location() {
        let mut rng = StdRng::seed_from_u64(5);
        let station: DetailStation =
            serde_json::from_value(json!({ "idx": 1, "aqi": "45" })).unwrap();
        let ward = normalize_detail(&station, &mut rng).unwrap();
        assert_eq!(ward.name, "Local Station");
        assert_eq!(ward.location, GeoPoint::new(0.0, 0.0));
        assert!((ward.pollutants.pm25 - 45.0).abs() < f64::EPSILON);
    }

    #[test]
    fn detail_station_with_error_aqi_is_rejected() {
        let mut rng = StdRng::seed_from_u64(5);
        let station: DetailStation =
            serde_json::from_value(json!({ "idx": 1, "aqi": 999 })).unwrap();
        assert!(normalize_detail(&station, &mut rng).is_none());
    }

    #[test]
    fn search_hit_keeps_full_name() {
        let mut rng = StdRng::seed_from_u64(8);
        let station: SearchStation = serde_json::from_value(json!({
            "uid": 8190, "aqi": "97",
            "station": { "name": "Bandra, Mumbai, India", "geo": [19.06, 72.84] }
        }))
        .unwrap();
        let ward = normalize_search(&station, &mut rng).unwrap();
        assert_eq!(ward.id, "waqi-search-8190");
        assert_eq!(ward.name, "Bandra, Mumbai, India");
        assert_eq!(ward.trend[TREND_DAYS - 1], 97);
        assert!((20_000..70_000).contains(&ward.population));
    }

    #[test]
    fn trend_is_clamped_and_ends_at_current() {
        let mut rng = StdRng::seed_from_u64(21);
        for aqi in [0, 5, 250, 510, 998] {
            let trend = synthesize_trend(aqi, &mut rng);
            assert_eq!(trend[TREND_DAYS - 1], aqi);
            for value in &trend[..TREND_DAYS - 1] {
                assert!((20..=500).contains(value), "{value} out of band");
            }
        }
    }

    #[test]
    fn truncates_names_at_first_comma() {
        assert_eq!(truncate_at_comma("A, B, C"), "A");
        assert_eq!(truncate_at_comma("No comma"), "No comma");
        assert_eq!(truncate_at_comma(""), "");
    }
}
