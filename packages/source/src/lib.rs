#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Air-quality station feeds and normalization logic.
//!
//! A [`StationFeed`] knows how to query a provider for raw station
//! records. The [`normalize`] module turns those records into canonical
//! [`airwatch_ward_models::Ward`] values, using [`validate`] as the gate,
//! [`estimate`] to fill in missing pollutant detail, and [`classify`] to
//! guess the pollution source.

pub mod classify;
pub mod estimate;
pub mod normalize;
pub mod validate;
pub mod waqi;

use airwatch_source_models::{
    BoundingBox, BoundsStation, DetailStation, DetailTarget, SearchStation,
};
use async_trait::async_trait;

/// Keyword searches shorter than this (in characters) are never sent.
pub const MIN_SEARCH_LEN: usize = 3;

/// Errors that can occur while talking to a station feed.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The provider answered but reported a failure.
    #[error("Provider error: {message}")]
    Provider {
        /// Description of what went wrong.
        message: String,
    },

    /// The request did not settle within the configured time.
    #[error("Request timed out after {seconds}s")]
    Timeout {
        /// The limit that was exceeded.
        seconds: u64,
    },
}

/// A provider of raw air-quality station records.
///
/// Every call is an independent, stateless request; implementations must
/// be safe to call concurrently.
#[async_trait]
pub trait StationFeed: Send + Sync {
    /// Returns every station inside `bbox`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the request fails or the provider reports
    /// an error.
    async fn bounds(&self, bbox: BoundingBox) -> Result<Vec<BoundsStation>, SourceError>;

    /// Returns the full reading of the station resolved by `target`, or
    /// `None` if the provider has no station for it.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the request fails or the payload cannot
    /// be decoded.
    async fn detail(&self, target: DetailTarget) -> Result<Option<DetailStation>, SourceError>;

    /// Returns stations whose name matches `keyword`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the request fails or the provider reports
    /// an error.
    async fn search(&self, keyword: &str) -> Result<Vec<SearchStation>, SourceError>;
}
