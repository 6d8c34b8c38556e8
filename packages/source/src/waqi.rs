//! World Air Quality Index (WAQI) feed client.
//!
//! Three endpoints are used:
//!
//! - `GET /map/bounds/?latlng=...`: every station inside a rectangle
//! - `GET /feed/geo:{lat};{lng}/` or `/feed/here/`: one station in detail
//! - `GET /search/?keyword=...`: keyword lookup
//!
//! All responses share the `{"status": ..., "data": ...}` envelope. No
//! request is retried; the client-level timeout bounds every call.
//!
//! See <https://aqicn.org/json-api/doc/>

use std::time::Duration;

use airwatch_source_models::{
    BoundingBox, BoundsStation, DetailStation, DetailTarget, FeedEnvelope, SearchStation,
};
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::{SourceError, StationFeed};

/// Public WAQI API root.
pub const DEFAULT_BASE_URL: &str = "https://api.waqi.info";

/// Connection settings for the WAQI API.
#[derive(Debug, Clone, Deserialize)]
pub struct WaqiConfig {
    /// API root, without a trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Access token.
    #[serde(default)]
    pub token: String,
    /// Upper bound on a single request, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

const fn default_timeout_secs() -> u64 {
    15
}

impl Default for WaqiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: String::new(),
            request_timeout_secs: default_timeout_secs(),
        }
    }
}

impl WaqiConfig {
    /// The per-request timeout as a [`Duration`].
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// WAQI implementation of [`StationFeed`].
pub struct WaqiClient {
    config: WaqiConfig,
    client: reqwest::Client,
}

impl WaqiClient {
    /// Creates a client for the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the HTTP client cannot be built.
    pub fn new(config: WaqiConfig) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.trim_end_matches('/'))
    }

    /// Sends `request` and returns the response body as text.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<String, SourceError> {
        let response = request.query(&[("token", &self.config.token)]).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(SourceError::Provider {
                message: format!("HTTP {status}"),
            });
        }

        Ok(body)
    }
}

#[async_trait]
impl StationFeed for WaqiClient {
    async fn bounds(&self, bbox: BoundingBox) -> Result<Vec<BoundsStation>, SourceError> {
        log::debug!("WAQI bounds query for {bbox}");
        let request = self
            .client
            .get(self.url("map/bounds/"))
            .query(&[("latlng", bbox.to_latlng_param())]);
        let body = self.send(request).await?;
        parse_list_payload(&body, "bounds")
    }

    async fn detail(&self, target: DetailTarget) -> Result<Option<DetailStation>, SourceError> {
        let path = match target {
            DetailTarget::Here => "feed/here/".to_string(),
            DetailTarget::Geo(point) => format!("feed/geo:{};{}/", point.lat, point.lng),
        };
        log::debug!("WAQI detail query: {path}");
        let body = self.send(self.client.get(self.url(&path))).await?;
        parse_detail_payload(&body)
    }

    async fn search(&self, keyword: &str) -> Result<Vec<SearchStation>, SourceError> {
        log::debug!("WAQI keyword search for '{keyword}'");
        let request = self
            .client
            .get(self.url("search/"))
            .query(&[("keyword", keyword)]);
        let body = self.send(request).await?;
        parse_list_payload(&body, "search")
    }
}

/// Decodes a list payload (bounds or search).
///
/// A non-`ok` status or a non-array payload is an error. Individual items
/// that do not match `T` are skipped; the rest are kept.
///
/// # Errors
///
/// Returns [`SourceError`] if the envelope is malformed or reports failure.
pub fn parse_list_payload<T: DeserializeOwned>(
    body: &str,
    label: &str,
) -> Result<Vec<T>, SourceError> {
    let envelope: FeedEnvelope = serde_json::from_str(body)?;
    if envelope.status != "ok" {
        return Err(SourceError::Provider {
            message: envelope.error_message(),
        });
    }

    let Some(serde_json::Value::Array(items)) = envelope.into_ok_data() else {
        return Err(SourceError::Provider {
            message: format!("{label} payload is not an array"),
        });
    };

    let total = items.len();
    let records: Vec<T> = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                log::debug!("Skipping malformed {label} record: {e}");
                None
            }
        })
        .collect();

    if records.len() < total {
        log::debug!("{label}: decoded {} of {total} records", records.len());
    }

    Ok(records)
}

/// Decodes a detail payload. A non-`ok` status (e.g. "Unknown station")
/// means there is no station and yields `Ok(None)`.
///
/// # Errors
///
/// Returns [`SourceError::Json`] if the body or the station payload cannot
/// be decoded.
pub fn parse_detail_payload(body: &str) -> Result<Option<DetailStation>, SourceError> {
    let envelope: FeedEnvelope = serde_json::from_str(body)?;
    if envelope.status != "ok" {
        log::debug!("WAQI detail: {}", envelope.error_message());
        return Ok(None);
    }

    match envelope.into_ok_data() {
        Some(data @ serde_json::Value::Object(_)) => Ok(Some(serde_json::from_value(data)?)),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bounds_payload_and_skips_bad_items() {
        let body = r#"{
            "status": "ok",
            "data": [
                {"lat": 28.6, "lon": 77.2, "uid": 1, "aqi": "151", "station": {"name": "A, Delhi"}},
                {"lat": 28.7, "lon": 77.3, "uid": 2, "aqi": "-", "station": {"name": "B, Delhi"}},
                {"uid": 3, "aqi": "20"}
            ]
        }"#;
        let stations: Vec<BoundsStation> = parse_list_payload(body, "bounds").unwrap();
        assert_eq!(stations.len(), 2);
        assert_eq!(stations[1].aqi, Some(serde_json::json!("-")));
    }

    #[test]
    fn list_payload_with_error_status_is_an_error() {
        let body = r#"{"status": "error", "data": "Invalid key"}"#;
        let err = parse_list_payload::<BoundsStation>(body, "bounds").unwrap_err();
        assert!(matches!(err, SourceError::Provider { .. }));
    }

    #[test]
    fn malformed_body_is_a_json_error() {
        let err = parse_list_payload::<SearchStation>("<html>", "search").unwrap_err();
        assert!(matches!(err, SourceError::Json(_)));
    }

    #[test]
    fn parses_detail_payload() {
        let body = r#"{
            "status": "ok",
            "data": {
                "idx": 7021,
                "aqi": 164,
                "city": {"name": "Punjabi Bagh, Delhi, India", "geo": [28.674, 77.131]},
                "iaqi": {"pm25": {"v": 164}}
            }
        }"#;
        let station = parse_detail_payload(body).unwrap().unwrap();
        assert_eq!(station.idx.to_string(), "7021");
    }

    #[test]
    fn unknown_station_is_none() {
        let body = r#"{"status": "error", "data": "Unknown station"}"#;
        assert!(parse_detail_payload(body).unwrap().is_none());
    }

    #[test]
    fn trims_trailing_slash_from_base_url() {
        let client = WaqiClient::new(WaqiConfig {
            base_url: "https://api.example.org/".to_string(),
            ..WaqiConfig::default()
        })
        .unwrap();
        assert_eq!(client.url("search/"), "https://api.example.org/search/");
    }
}
