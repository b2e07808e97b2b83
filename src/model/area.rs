//! Rectangular export areas.

use serde::{Deserialize, Serialize};

/// A rectangular sub-region of the images of a volume.
///
/// Stored the way it is configured: as two arbitrary opposite corners
/// `[x1, y1, x2, y2]`. The corners are not guaranteed to be min/max ordered;
/// use [`ExportArea::normalized`] before testing containment.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct ExportArea {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl ExportArea {
    /// Creates an export area from two opposite corners.
    #[inline]
    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Returns the min/max ordered rectangle spanned by the corners.
    pub fn normalized(&self) -> AreaBounds {
        AreaBounds {
            min_x: self.x1.min(self.x2),
            min_y: self.y1.min(self.y2),
            max_x: self.x1.max(self.x2),
            max_y: self.y1.max(self.y2),
        }
    }
}

impl From<[f64; 4]> for ExportArea {
    fn from(c: [f64; 4]) -> Self {
        Self::from_corners(c[0], c[1], c[2], c[3])
    }
}

impl From<ExportArea> for [f64; 4] {
    fn from(area: ExportArea) -> Self {
        [area.x1, area.y1, area.x2, area.y2]
    }
}

/// A normalized rectangle `[min_x, max_x] x [min_y, max_y]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AreaBounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl AreaBounds {
    /// Returns true if the point lies inside the rectangle (bounds inclusive).
    #[inline]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Returns true if any `(x, y)` pair of a flat coordinate list is inside.
    ///
    /// Pairs are read with stride 2 and a trailing odd value is ignored, so a
    /// circle encoded as `[cx, cy, r]` is tested by its center only.
    pub fn contains_any(&self, points: &[f64]) -> bool {
        points
            .chunks_exact(2)
            .any(|pair| self.contains(pair[0], pair[1]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_orders_corners() {
        let area = ExportArea::from_corners(10.0, 0.0, 0.0, 10.0);
        let bounds = area.normalized();
        assert_eq!(bounds.min_x, 0.0);
        assert_eq!(bounds.min_y, 0.0);
        assert_eq!(bounds.max_x, 10.0);
        assert_eq!(bounds.max_y, 10.0);
    }

    #[test]
    fn test_contains_is_inclusive() {
        let bounds = ExportArea::from_corners(0.0, 0.0, 10.0, 10.0).normalized();
        assert!(bounds.contains(0.0, 0.0));
        assert!(bounds.contains(10.0, 10.0));
        assert!(!bounds.contains(10.5, 5.0));
    }

    #[test]
    fn test_circle_radius_is_ignored() {
        let bounds = ExportArea::from_corners(0.0, 0.0, 10.0, 10.0).normalized();
        // Center outside, radius reaches into the area: still not contained.
        assert!(!bounds.contains_any(&[15.0, 5.0, 20.0]));
        assert!(bounds.contains_any(&[5.0, 5.0, 100.0]));
    }

    #[test]
    fn test_serde_as_corner_array() {
        let area: ExportArea = serde_json::from_str("[4, 3, 1, 2]").expect("parse");
        assert_eq!(area, ExportArea::from_corners(4.0, 3.0, 1.0, 2.0));
        assert_eq!(
            serde_json::to_string(&area).expect("serialize"),
            "[4.0,3.0,1.0,2.0]"
        );
    }
}
