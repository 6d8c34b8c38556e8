//! Merging and deduplication of normalized wards.

use std::collections::BTreeSet;

use airwatch_ward_models::Ward;

/// Keeps the first ward for each identifier, preserving order.
///
/// Adjacent or overlapping grid tiles can return the same station; later
/// copies are dropped.
#[must_use]
pub fn dedupe_by_id(wards: Vec<Ward>) -> Vec<Ward> {
    let mut seen = BTreeSet::new();
    let before = wards.len();
    let unique: Vec<Ward> = wards
        .into_iter()
        .filter(|w| seen.insert(w.id.clone()))
        .collect();

    if unique.len() < before {
        log::debug!("Dropped {} duplicate wards", before - unique.len());
    }
    unique
}

/// Puts the detail station first and drops every neighbour within
/// `tolerance` degrees of it on both axes.
///
/// Such a neighbour is the same physical station reported at lower
/// fidelity by the bounds feed.
#[must_use]
pub fn merge_detail(detail: Option<Ward>, neighbours: Vec<Ward>, tolerance: f64) -> Vec<Ward> {
    let Some(detail) = detail else {
        return neighbours;
    };

    let mut merged = Vec::with_capacity(neighbours.len() + 1);
    let anchor = detail.location;
    merged.push(detail);
    merged.extend(neighbours.into_iter().filter(|w| {
        let same_station = w.location.is_near(&anchor, tolerance);
        if same_station {
            log::debug!("Replacing {} with the detail station", w.id);
        }
        !same_station
    }));
    merged
}
