#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Canonical ward record and analysis result types.
//!
//! Every station the system knows about, whether it came from a live
//! provider feed or from the simulation fallback, is represented as a
//! [`Ward`]. The [`AnalysisResult`] family describes the structured
//! narrative payload returned by the generative-model collaborator.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Number of daily values in a ward's AQI history.
pub const TREND_DAYS: usize = 7;

/// A geographic coordinate (WGS84 degrees).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
}

impl GeoPoint {
    /// Creates a new coordinate.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Returns `true` if `other` lies within `tolerance` degrees of this
    /// point on both axes (inclusive).
    #[must_use]
    pub fn is_near(&self, other: &Self, tolerance: f64) -> bool {
        (self.lat - other.lat).abs() <= tolerance && (self.lng - other.lng).abs() <= tolerance
    }
}

/// Screen-space position of a ward.
///
/// Always `{0, 0}` here; populated later by whatever renders the wards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    /// Horizontal offset.
    pub x: f64,
    /// Vertical offset.
    pub y: f64,
}

/// Pollutant concentrations for a single station.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pollutants {
    /// Fine particulate matter (also used as the AQI proxy).
    pub pm25: f64,
    /// Coarse particulate matter.
    pub pm10: f64,
    /// Nitrogen dioxide.
    pub no2: f64,
    /// Sulphur dioxide.
    pub so2: f64,
    /// Carbon monoxide (one decimal place).
    pub co: f64,
    /// Ozone.
    pub o3: f64,
}

/// Canonical normalized air-quality record for one station.
///
/// Built once by the normalizer or the fallback generator and never
/// modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ward {
    /// Provenance-prefixed identifier (`waqi-detail-`, `waqi-bounds-`,
    /// `waqi-search-`, `sim-`).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Synthesized population estimate.
    pub population: u32,
    /// Validated AQI, always below 999.
    pub aqi: u32,
    /// Pollutant profile.
    pub pollutants: Pollutants,
    /// Most probable pollution source.
    pub primary_source: String,
    /// Second most probable pollution source.
    pub secondary_source: String,
    /// Geographic location of the station.
    pub location: GeoPoint,
    /// Screen-space placeholder.
    pub coordinates: ScreenPoint,
    /// Seven-day AQI history, oldest first.
    pub trend: [u32; TREND_DAYS],
}

/// Who an analysis is written for.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum UserRole {
    /// Municipal authority: policy, enforcement, mitigation.
    Authority,
    /// Local resident: health, safety, community action.
    Resident,
}

/// Urgency class of a recommendation.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum RecommendationKind {
    /// Act now.
    Urgent,
    /// General guidance.
    Advisory,
    /// Policy-level measure.
    Policy,
}

/// Confidence attached to a source-breakdown entry.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Confidence {
    /// High confidence.
    High,
    /// Medium confidence.
    Medium,
    /// Low confidence.
    Low,
}

/// A single actionable recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Identifier (`gen-<n>` for generated items, a fixed id for
    /// placeholders).
    pub id: String,
    /// Short title.
    pub title: String,
    /// Body text.
    pub description: String,
    /// Urgency class.
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
}

/// A citation link returned alongside a generated analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingUrl {
    /// Page title.
    pub title: String,
    /// Link target. Unique within one [`AnalysisResult`].
    pub uri: String,
}

/// Estimated contribution of one source to the observed pollution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceShare {
    /// Source label.
    pub source: String,
    /// Contribution in percent.
    pub percentage: f64,
    /// How sure the model is.
    pub confidence: Confidence,
}

/// A recent news item related to the ward's air quality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    /// Headline.
    pub title: String,
    /// One-paragraph summary.
    pub summary: String,
    /// Relative age (e.g. "2 hours ago").
    pub time_ago: String,
    /// Publisher name.
    pub source: String,
}

/// Structured analysis of a ward.
///
/// Every field is always present; failure paths fill `recommendations`
/// with a single placeholder item instead of leaving it empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Actionable recommendations.
    pub recommendations: Vec<Recommendation>,
    /// Citation links, deduplicated by URI.
    pub grounding_urls: Vec<GroundingUrl>,
    /// Narrative on the seven-day trend.
    pub trend_analysis: String,
    /// Estimated source contributions.
    pub source_breakdown: Vec<SourceShare>,
    /// Recent related news.
    pub news: Vec<NewsItem>,
}

impl AnalysisResult {
    /// Trend text used whenever no real analysis is available.
    pub const UNAVAILABLE_TREND: &'static str = "Historical data analysis unavailable.";

    /// Builds a degraded result carrying a single advisory recommendation
    /// that describes why no real analysis is available.
    #[must_use]
    pub fn placeholder(id: &str, title: &str, description: &str) -> Self {
        Self {
            recommendations: vec![Recommendation {
                id: id.to_string(),
                title: title.to_string(),
                description: description.to_string(),
                kind: RecommendationKind::Advisory,
            }],
            grounding_urls: Vec::new(),
            trend_analysis: Self::UNAVAILABLE_TREND.to_string(),
            source_breakdown: Vec::new(),
            news: Vec::new(),
        }
    }
}
