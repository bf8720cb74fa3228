//! Axis-aligned bounding boxes.

use glam::DVec2;

/// Axis-aligned bounding box, stored as min/max corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: DVec2,
    pub max: DVec2,
}

impl BoundingBox {
    /// Create a bounding box from edge coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min: DVec2::new(min_x, min_y),
            max: DVec2::new(max_x, max_y),
        }
    }

    /// Create a bounding box from two corners.
    pub fn from_corners(min: DVec2, max: DVec2) -> Self {
        Self { min, max }
    }

    /// Smallest box containing all the given points, or `None` if there are none.
    pub fn from_points<I: IntoIterator<Item = DVec2>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bbox = Self { min: first, max: first };
        for p in iter {
            bbox.min = bbox.min.min(p);
            bbox.max = bbox.max.max(p);
        }
        Some(bbox)
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Compute the union (bounding box) with another box.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Expand the box by a uniform amount on all sides.
    pub fn expand(&self, amount: f64) -> BoundingBox {
        Self {
            min: self.min - DVec2::splat(amount),
            max: self.max + DVec2::splat(amount),
        }
    }

    /// Check if a point lies inside the box (edges included).
    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Check if another box lies entirely inside this one.
    pub fn contains_box(&self, other: &BoundingBox) -> bool {
        self.contains(other.min) && self.contains(other.max)
    }
}
