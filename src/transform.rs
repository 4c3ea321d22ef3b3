//! Conversion of the host view's projected extent into the overlay's
//! geographic space.

use crate::core::{bounds::Bounds, geo::LatLng, geo::LatLngBounds};
use crate::{BasemapError, Result};

/// Inverse-projects a Web Mercator extent to `[west, south, east, north]`.
///
/// The two corners are converted independently and nothing is checked:
/// callers are expected to pass an extent accepted by [`validate_extent`].
/// Longitudes past the world edge are kept as-is rather than wrapped.
pub fn to_geo_bounds(extent: &Bounds) -> LatLngBounds {
    let south_west = LatLng::from_mercator(extent.min);
    let north_east = LatLng::from_mercator(extent.max);
    LatLngBounds::new(south_west, north_east)
}

/// Rejects extents the overlay cannot be fitted to: non-finite values,
/// inverted corners, or zero width or height.
pub fn validate_extent(extent: &Bounds) -> Result<()> {
    let problem = if !extent.is_finite() {
        "non-finite"
    } else if !extent.is_valid() {
        "inverted"
    } else if extent.is_degenerate() {
        "empty"
    } else {
        return Ok(());
    };
    let message = format!("{} extent {:?}", problem, extent.to_array());
    Err(BasemapError::InvalidExtent(message).into())
}
