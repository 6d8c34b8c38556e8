#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Raw air-quality provider record shapes and query types.
//!
//! The World Air Quality Index (WAQI) feeds return loosely typed JSON:
//! AQI values arrive as numbers, numeric strings, or the `"-"` sentinel,
//! and most nested fields are optional. These types capture that shape
//! as-is so that every validation decision lives in the normalizer.

use std::fmt;

use airwatch_ward_models::GeoPoint;
use serde::{Deserialize, Serialize};

/// A latitude/longitude rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    /// Southern edge.
    pub lat_min: f64,
    /// Western edge.
    pub lng_min: f64,
    /// Northern edge.
    pub lat_max: f64,
    /// Eastern edge.
    pub lng_max: f64,
}

impl BoundingBox {
    /// Creates a rectangle from its edges.
    #[must_use]
    pub const fn new(lat_min: f64, lng_min: f64, lat_max: f64, lng_max: f64) -> Self {
        Self {
            lat_min,
            lng_min,
            lat_max,
            lng_max,
        }
    }

    /// Returns the square of half-width `radius` degrees centred on `center`.
    #[must_use]
    pub fn around(center: GeoPoint, radius: f64) -> Self {
        Self {
            lat_min: center.lat - radius,
            lng_min: center.lng - radius,
            lat_max: center.lat + radius,
            lng_max: center.lng + radius,
        }
    }

    /// Formats the rectangle as the provider's `latlng` query value
    /// (`latMin,lngMin,latMax,lngMax`).
    #[must_use]
    pub fn to_latlng_param(&self) -> String {
        format!(
            "{},{},{},{}",
            self.lat_min, self.lng_min, self.lat_max, self.lng_max
        )
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}] x [{}, {}]",
            self.lat_min, self.lat_max, self.lng_min, self.lng_max
        )
    }
}

/// Which station a detail query should resolve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DetailTarget {
    /// The station the provider considers nearest to the caller (IP based).
    Here,
    /// The station nearest to an explicit coordinate.
    Geo(GeoPoint),
}

/// Common envelope around every provider response.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedEnvelope {
    /// `"ok"` on success; anything else is an error.
    pub status: String,
    /// Payload on success, or an error message string on failure.
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl FeedEnvelope {
    /// Returns the payload if the provider reported success.
    #[must_use]
    pub fn into_ok_data(self) -> Option<serde_json::Value> {
        if self.status == "ok" {
            self.data.filter(|d| !d.is_null())
        } else {
            None
        }
    }

    /// Best-effort error message for a non-`ok` response.
    #[must_use]
    pub fn error_message(&self) -> String {
        match &self.data {
            Some(serde_json::Value::String(msg)) => format!("{}: {msg}", self.status),
            _ => self.status.clone(),
        }
    }
}

/// Provider-native station identifier. Usually numeric, occasionally a
/// string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum StationUid {
    /// Numeric identifier.
    Number(i64),
    /// Textual identifier.
    Text(String),
}

impl fmt::Display for StationUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// One station as returned by the bounds feed.
#[derive(Debug, Clone, Deserialize)]
pub struct BoundsStation {
    /// Provider identifier.
    pub uid: StationUid,
    /// Raw AQI (number, numeric string, `"-"`, or absent).
    #[serde(default)]
    pub aqi: Option<serde_json::Value>,
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lon: f64,
    /// Station label.
    pub station: StationName,
}

/// Station label as used by the bounds feed.
#[derive(Debug, Clone, Deserialize)]
pub struct StationName {
    /// Full provider name, usually `"Site, City, Country"`.
    pub name: String,
}

/// The single high-fidelity station returned by the detail feed.
#[derive(Debug, Clone, Deserialize)]
pub struct DetailStation {
    /// Provider station index.
    pub idx: StationUid,
    /// Raw AQI.
    #[serde(default)]
    pub aqi: Option<serde_json::Value>,
    /// City metadata.
    #[serde(default)]
    pub city: Option<CityInfo>,
    /// Individual pollutant readings keyed by pollutant code
    /// (`pm25`, `pm10`, `no2`, `so2`, `co`, `o3`, ...).
    #[serde(default)]
    pub iaqi: Option<std::collections::BTreeMap<String, IaqiReading>>,
}

impl DetailStation {
    /// Returns the reading for `code`, or `0.0` if absent or non-numeric.
    #[must_use]
    pub fn reading(&self, code: &str) -> f64 {
        self.iaqi
            .as_ref()
            .and_then(|m| m.get(code))
            .map_or(0.0, IaqiReading::value)
    }
}

/// City metadata attached to a detail-feed station.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CityInfo {
    /// Full provider name.
    #[serde(default)]
    pub name: Option<String>,
    /// `[lat, lng]`.
    #[serde(default)]
    pub geo: Option<Vec<f64>>,
}

/// One pollutant reading inside the detail feed's `iaqi` map.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IaqiReading {
    /// The value, when present.
    #[serde(default)]
    pub v: Option<serde_json::Value>,
}

impl IaqiReading {
    /// Numeric value, or `0.0` when missing or not a number.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.v
            .as_ref()
            .and_then(serde_json::Value::as_f64)
            .unwrap_or(0.0)
    }
}

/// One hit from the keyword search feed.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchStation {
    /// Provider identifier.
    pub uid: StationUid,
    /// Raw AQI.
    #[serde(default)]
    pub aqi: Option<serde_json::Value>,
    /// Station label with coordinates.
    pub station: SearchStationInfo,
}

/// Station label and position as used by the search feed.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchStationInfo {
    /// Full provider name.
    pub name: String,
    /// `[lat, lng]`.
    pub geo: [f64; 2],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounding_box_around_point() {
        let bbox = BoundingBox::around(GeoPoint::new(28.5, 77.0), 1.0);
        assert_eq!(bbox, BoundingBox::new(27.5, 76.0, 29.5, 78.0));
        assert_eq!(bbox.to_latlng_param(), "27.5,76,29.5,78");
    }

    #[test]
    fn envelope_rejects_error_status() {
        let env: FeedEnvelope =
            serde_json::from_str(r#"{"status":"error","data":"Unknown station"}"#).unwrap();
        assert_eq!(env.error_message(), "error: Unknown station");
        assert!(env.into_ok_data().is_none());
    }

    #[test]
    fn parses_bounds_station_with_string_aqi() {
        let station: BoundsStation = serde_json::from_value(serde_json::json!({
            "lat": 28.6469,
            "lon": 77.316,
            "uid": 2553,
            "aqi": "412",
            "station": { "name": "Anand Vihar, Delhi, India", "time": "2024-11-02T10:00:00+09:00" }
        }))
        .unwrap();
        assert_eq!(station.uid.to_string(), "2553");
        assert_eq!(station.aqi, Some(serde_json::json!("412")));
    }

    #[test]
    fn detail_station_missing_readings_are_zero() {
        let station: DetailStation = serde_json::from_value(serde_json::json!({
            "idx": 10,
            "aqi": 80,
            "iaqi": { "pm25": { "v": 80 }, "no2": { "v": "n/a" } }
        }))
        .unwrap();
        assert!((station.reading("pm25") - 80.0).abs() < f64::EPSILON);
        assert!(station.reading("no2").abs() < f64::EPSILON);
        assert!(station.reading("so2").abs() < f64::EPSILON);
        assert!(station.city.is_none());
    }
}
