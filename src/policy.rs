//! Zoom and latitude limits of the overlay service.

use crate::constants::{
    EARTH_CIRCUMFERENCE, MAX_OVERLAY_LATITUDE, MAX_OVERLAY_ZOOM, OVERLAY_TILE_SIZE,
};
use crate::core::{bounds::Bounds, geo::LatLngBounds};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Corrective action shown to the user when the overlay cannot be drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtentHint {
    ZoomOut,
    PanSouth,
    PanNorth,
    ZoomIn,
}

impl ExtentHint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ZoomOut => "zoom out",
            Self::PanSouth => "pan south",
            Self::PanNorth => "pan north",
            Self::ZoomIn => "zoom in",
        }
    }

    /// Full prompt text, e.g. "zoom out to see the basemap"
    pub fn prompt(&self) -> String {
        format!("{} to see the basemap", self.as_str())
    }
}

impl fmt::Display for ExtentHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtentCheck {
    Visible,
    /// `hint` is `None` when the view has no meaningful scale
    Hidden { hint: Option<ExtentHint> },
}

impl ExtentCheck {
    pub fn is_visible(&self) -> bool {
        matches!(self, Self::Visible)
    }

    pub fn hint(&self) -> Option<ExtentHint> {
        match self {
            Self::Visible => None,
            Self::Hidden { hint } => *hint,
        }
    }
}

/// Converts a ground resolution (metres per pixel) to the overlay
/// service's fractional zoom level.
pub fn scale_to_zoom(metres_per_pixel: f64) -> f64 {
    (EARTH_CIRCUMFERENCE / OVERLAY_TILE_SIZE / metres_per_pixel).log2()
}

/// Approximate overlay zoom for a host view showing `extent` across `pixel_width` pixels
pub fn zoom_for_view(extent: &Bounds, pixel_width: f64) -> f64 {
    scale_to_zoom(extent.width() / pixel_width)
}

/// Decides whether the overlay can display `bounds` at `zoom`.
///
/// Limits are inclusive. When several limits are violated the zoom limit
/// wins, then the southern edge, then the northern edge.
pub fn check_bounds(bounds: &LatLngBounds, zoom: f64) -> ExtentCheck {
    if !zoom.is_finite() {
        return ExtentCheck::Hidden { hint: None };
    }
    let south = bounds.south();
    let north = bounds.north();
    if south >= -MAX_OVERLAY_LATITUDE && north <= MAX_OVERLAY_LATITUDE && zoom <= MAX_OVERLAY_ZOOM {
        return ExtentCheck::Visible;
    }
    let hint = if zoom > MAX_OVERLAY_ZOOM {
        ExtentHint::ZoomOut
    } else if south > 0.0 {
        ExtentHint::PanSouth
    } else if north < 0.0 {
        ExtentHint::PanNorth
    } else {
        ExtentHint::ZoomIn
    };
    ExtentCheck::Hidden { hint: Some(hint) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(south: f64, north: f64) -> LatLngBounds {
        LatLngBounds::from_coords(south, -10.0, north, 10.0)
    }

    #[test]
    fn test_scale_to_zoom() {
        let mpp_z0 = EARTH_CIRCUMFERENCE / OVERLAY_TILE_SIZE;
        assert!(scale_to_zoom(mpp_z0).abs() < 1e-12);
        assert!((scale_to_zoom(mpp_z0 / 1024.0) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_for_view() {
        let extent = Bounds::from_coords(0.0, 0.0, EARTH_CIRCUMFERENCE, 1.0);
        assert!((zoom_for_view(&extent, OVERLAY_TILE_SIZE * 4.0) - 2.0).abs() < 1e-9);
        assert!(!zoom_for_view(&extent, 0.0).is_finite());
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        assert!(check_bounds(&bbox(-85.0, 85.0), 20.0).is_visible());
        assert!(check_bounds(&bbox(-10.0, 10.0), 3.5).is_visible());
    }

    #[test]
    fn test_just_outside_limits() {
        assert_eq!(check_bounds(&bbox(-10.0, 10.0), 20.0001).hint(), Some(ExtentHint::ZoomOut));
        assert_eq!(check_bounds(&bbox(-85.0001, -10.0), 5.0).hint(), Some(ExtentHint::PanNorth));
        assert_eq!(check_bounds(&bbox(10.0, 85.0001), 5.0).hint(), Some(ExtentHint::PanSouth));
    }

    #[test]
    fn test_zoom_hint_takes_precedence() {
        let check = check_bounds(&bbox(10.0, 86.0), 21.0);
        assert_eq!(check.hint(), Some(ExtentHint::ZoomOut));
    }

    #[test]
    fn test_view_spanning_both_limits_asks_to_zoom_in() {
        let check = check_bounds(&bbox(-89.0, 89.0), 0.5);
        assert_eq!(check.hint(), Some(ExtentHint::ZoomIn));
        assert_eq!(ExtentHint::ZoomIn.prompt(), "zoom in to see the basemap");
    }

    #[test]
    fn test_non_finite_zoom_has_no_hint() {
        let check = check_bounds(&bbox(-10.0, 10.0), f64::NAN);
        assert_eq!(check, ExtentCheck::Hidden { hint: None });
        assert!(!check_bounds(&bbox(-10.0, 10.0), f64::INFINITY).is_visible());
    }
}
