use crate::core::geo::Point;
use serde::{Deserialize, Serialize};

/// A bounding box in the host view's projected coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    /// Creates new bounds from two points
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Creates bounds from individual coordinates
    pub fn from_coords(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self::new(Point::new(min_x, min_y), Point::new(max_x, max_y))
    }

    /// Creates bounds from a center point and size
    pub fn from_center_and_size(center: Point, width: f64, height: f64) -> Self {
        let half_width = width / 2.0;
        let half_height = height / 2.0;
        Self::new(
            Point::new(center.x - half_width, center.y - half_height),
            Point::new(center.x + half_width, center.y + half_height),
        )
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.min.x, self.min.y, self.max.x, self.max.y]
    }

    /// Gets the width of the bounds
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Gets the height of the bounds
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Checks if the bounds are valid (min <= max)
    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y
    }

    /// True when the box encloses no area
    pub fn is_degenerate(&self) -> bool {
        self.width() == 0.0 || self.height() == 0.0
    }

    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new(Point::new(0.0, 0.0), Point::new(0.0, 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_creation() {
        let bounds = Bounds::from_coords(10.0, 20.0, 30.0, 40.0);
        assert_eq!(bounds.width(), 20.0);
        assert_eq!(bounds.height(), 20.0);
        assert_eq!(bounds.to_array(), [10.0, 20.0, 30.0, 40.0]);
    }

    #[test]
    fn test_bounds_validity() {
        assert!(Bounds::from_coords(0.0, 0.0, 1.0, 1.0).is_valid());
        assert!(!Bounds::from_coords(1.0, 0.0, 0.0, 1.0).is_valid());
        assert!(Bounds::from_coords(0.0, 0.0, 0.0, 1.0).is_degenerate());
        assert!(!Bounds::from_coords(0.0, f64::NAN, 1.0, 1.0).is_finite());
    }

    #[test]
    fn test_from_center_and_size() {
        let bounds = Bounds::from_center_and_size(Point::new(0.0, 0.0), 4.0, 2.0);
        assert_eq!(bounds, Bounds::from_coords(-2.0, -1.0, 2.0, 1.0));
    }
}
