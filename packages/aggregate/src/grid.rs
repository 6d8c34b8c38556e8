//! Grid tiling of a large geographic extent.
//!
//! The bounds feed returns sparse, aggregated results for very large
//! rectangles, so region-wide queries are split into fixed-size tiles and
//! issued one request per tile.

use airwatch_source_models::BoundingBox;

/// Splits `extent` into `step`×`step` degree tiles, row by row from the
/// south-west corner.
///
/// Tiles are clamped at the extent boundary, so the last row and column
/// are narrower when the extent is not evenly divisible. Returns an empty
/// list for a non-positive or non-finite step, and for an empty or
/// non-finite extent.
#[must_use]
pub fn tile_extent(extent: &BoundingBox, step: f64) -> Vec<BoundingBox> {
    if !step.is_finite() || step <= 0.0 {
        log::warn!("Refusing to tile with step {step}");
        return Vec::new();
    }
    let edges = [extent.lat_min, extent.lat_max, extent.lng_min, extent.lng_max];
    if !edges.into_iter().all(f64::is_finite) {
        log::warn!("Refusing to tile non-finite extent {extent}");
        return Vec::new();
    }

    let mut tiles = Vec::new();
    for row in 0u32.. {
        let lat = step.mul_add(f64::from(row), extent.lat_min);
        if lat >= extent.lat_max {
            break;
        }
        let lat_top = (lat + step).min(extent.lat_max);

        for col in 0u32.. {
            let lng = step.mul_add(f64::from(col), extent.lng_min);
            if lng >= extent.lng_max {
                break;
            }
            let lng_right = (lng + step).min(extent.lng_max);
            tiles.push(BoundingBox::new(lat, lng, lat_top, lng_right));
        }
    }

    tiles
}
