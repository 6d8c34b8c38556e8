#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Spatial aggregation of air-quality stations into ward lists.
//!
//! Two fetch modes are supported:
//!
//! 1. **Point mode**: the detail station nearest a coordinate plus every
//!    bounds-feed station within [`RegionConfig::point_radius`] degrees,
//!    requested concurrently. The detail station replaces any bounds copy
//!    of itself and is listed first.
//! 2. **Region mode**: the configured extent is tiled into
//!    [`RegionConfig::tile_step`]-degree squares, one bounds request per
//!    tile, all concurrent. Results are deduplicated by identifier.
//!
//! A failed sub-request contributes nothing and never aborts its siblings.
//! If a pass ends with no wards, or every request failed, simulated data
//! from [`fallback`] is returned instead. Nothing here ever returns an
//! error to the caller.

pub mod fallback;
pub mod grid;
pub mod merge;

use std::time::Duration;

use airwatch_source::normalize::{normalize_bounds, normalize_detail, normalize_search};
use airwatch_source::{MIN_SEARCH_LEN, SourceError, StationFeed};
use airwatch_source_models::{BoundingBox, BoundsStation, DetailTarget};
use airwatch_ward_models::{GeoPoint, Ward};
use rand::Rng;
use serde::Deserialize;

/// Errors that abort an aggregation pass before it can produce wards.
#[derive(Debug, thiserror::Error)]
pub enum AggregateError {
    /// Every request in the pass failed.
    #[error("all {attempted} requests failed (last error: {last})")]
    AllRequestsFailed {
        /// Number of requests issued.
        attempted: usize,
        /// The last error observed.
        last: String,
    },
}

/// Geometry settings for aggregation and fallback.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RegionConfig {
    /// Southern edge of the region-mode extent.
    pub lat_min: f64,
    /// Northern edge of the region-mode extent.
    pub lat_max: f64,
    /// Western edge of the region-mode extent.
    pub lng_min: f64,
    /// Eastern edge of the region-mode extent.
    pub lng_max: f64,
    /// Tile edge length in degrees.
    pub tile_step: f64,
    /// Half-width of the point-mode neighbourhood in degrees.
    pub point_radius: f64,
    /// Two stations closer than this on both axes are the same station.
    pub proximity_tolerance: f64,
    /// Maximum offset of simulated stations from the query point.
    pub fallback_jitter: f64,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            lat_min: 6.0,
            lat_max: 38.0,
            lng_min: 68.0,
            lng_max: 98.0,
            tile_step: 8.0,
            point_radius: 1.0,
            proximity_tolerance: 0.01,
            fallback_jitter: 0.075,
        }
    }
}

impl RegionConfig {
    /// The region-mode extent as a rectangle.
    #[must_use]
    pub const fn extent(&self) -> BoundingBox {
        BoundingBox::new(self.lat_min, self.lng_min, self.lat_max, self.lng_max)
    }
}

/// Fetches, normalizes and merges stations from a [`StationFeed`].
///
/// Holds no mutable state; every call is an independent pass.
pub struct Aggregator<F> {
    feed: F,
    config: RegionConfig,
    request_timeout: Duration,
}

impl<F: StationFeed> Aggregator<F> {
    /// Creates an aggregator over `feed`. Each request is abandoned after
    /// `request_timeout`.
    #[must_use]
    pub const fn new(feed: F, config: RegionConfig, request_timeout: Duration) -> Self {
        Self {
            feed,
            config,
            request_timeout,
        }
    }

    /// Returns the tiles a region-mode pass queries.
    #[must_use]
    pub fn region_tiles(&self) -> Vec<BoundingBox> {
        grid::tile_extent(&self.config.extent(), self.config.tile_step)
    }

    /// Returns wards around `point`, or across the whole configured region
    /// when `point` is `None`. Falls back to simulated data when nothing
    /// usable comes back.
    pub async fn fetch_pollution_data<R: Rng + ?Sized>(
        &self,
        point: Option<GeoPoint>,
        rng: &mut R,
    ) -> Vec<Ward> {
        let result = match point {
            Some(center) => self.collect_point(center, rng).await,
            None => self.collect_region(rng).await,
        };

        match result {
            Ok(wards) if !wards.is_empty() => {
                log::info!("Aggregated {} wards", wards.len());
                wards
            }
            Ok(_) => {
                log::warn!("No stations found. Using simulation.");
                fallback::fallback_wards(point, self.config.fallback_jitter, rng)
            }
            Err(e) => {
                log::warn!("Network error fetching stations, using fallback data: {e}");
                fallback::fallback_wards(point, self.config.fallback_jitter, rng)
            }
        }
    }

    /// Looks up stations by name. Queries shorter than
    /// [`MIN_SEARCH_LEN`] characters return nothing without a request.
    pub async fn search_stations<R: Rng + ?Sized>(&self, query: &str, rng: &mut R) -> Vec<Ward> {
        if query.chars().count() < MIN_SEARCH_LEN {
            return Vec::new();
        }

        match self.settle(self.feed.search(query)).await {
            Ok(hits) => hits
                .iter()
                .filter_map(|hit| normalize_search(hit, rng))
                .collect(),
            Err(e) => {
                log::error!("Search for '{query}' failed: {e}");
                Vec::new()
            }
        }
    }

    /// Returns the station the provider considers nearest to the caller,
    /// or `None` if it is unavailable or has no valid reading.
    pub async fn nearest_station<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Ward> {
        match self.settle(self.feed.detail(DetailTarget::Here)).await {
            Ok(Some(station)) => normalize_detail(&station, rng),
            Ok(None) => None,
            Err(e) => {
                log::warn!("Failed to fetch nearest station: {e}");
                None
            }
        }
    }

    async fn collect_point<R: Rng + ?Sized>(
        &self,
        center: GeoPoint,
        rng: &mut R,
    ) -> Result<Vec<Ward>, AggregateError> {
        let bbox = BoundingBox::around(center, self.config.point_radius);
        let (detail, neighbours) = futures::future::join(
            self.settle(self.feed.detail(DetailTarget::Geo(center))),
            self.settle(self.feed.bounds(bbox)),
        )
        .await;

        if let (Err(detail_err), Err(bounds_err)) = (&detail, &neighbours) {
            log::warn!("Detail request failed: {detail_err}");
            return Err(AggregateError::AllRequestsFailed {
                attempted: 2,
                last: bounds_err.to_string(),
            });
        }

        let detail = match detail {
            Ok(station) => station.and_then(|s| normalize_detail(&s, rng)),
            Err(e) => {
                log::warn!("Failed to fetch detailed station: {e}");
                None
            }
        };

        let neighbours = match neighbours {
            Ok(stations) => normalize_all(&stations, rng),
            Err(e) => {
                log::warn!("Bounds request {bbox} failed: {e}");
                Vec::new()
            }
        };

        Ok(merge::merge_detail(
            detail,
            neighbours,
            self.config.proximity_tolerance,
        ))
    }

    async fn collect_region<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<Vec<Ward>, AggregateError> {
        let tiles = self.region_tiles();
        log::info!("Querying {} region tiles", tiles.len());

        let responses = futures::future::join_all(
            tiles
                .iter()
                .map(|tile| self.settle(self.feed.bounds(*tile))),
        )
        .await;

        let mut wards = Vec::new();
        let mut failures = 0;
        let mut last_error = None;
        for (tile, response) in tiles.iter().zip(responses) {
            match response {
                Ok(stations) => wards.extend(normalize_all(&stations, rng)),
                Err(e) => {
                    log::warn!("Bounds request {tile} failed: {e}");
                    failures += 1;
                    last_error = Some(e.to_string());
                }
            }
        }

        if let Some(last) = last_error
            && failures == tiles.len()
        {
            return Err(AggregateError::AllRequestsFailed {
                attempted: failures,
                last,
            });
        }

        Ok(merge::dedupe_by_id(wards))
    }

    /// Awaits `request`, giving up after the configured timeout.
    async fn settle<T>(
        &self,
        request: impl Future<Output = Result<T, SourceError>>,
    ) -> Result<T, SourceError> {
        tokio::time::timeout(self.request_timeout, request)
            .await
            .unwrap_or_else(|_| {
                Err(SourceError::Timeout {
                    seconds: self.request_timeout.as_secs(),
                })
            })
    }
}

fn normalize_all<R: Rng + ?Sized>(stations: &[BoundsStation], rng: &mut R) -> Vec<Ward> {
    stations
        .iter()
        .filter_map(|s| normalize_bounds(s, rng))
        .collect()
}
