//! Polyline geometry.

use glam::DVec2;

use crate::bounds::BoundingBox;

/// A polyline path: an ordered list of points in a shared 2D plane.
///
/// Closed paths repeat no point; the closing segment from last back to
/// first is implied by the `closed` flag.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    points: Vec<DVec2>,
    closed: bool,
}

impl Path {
    /// Create an open path from points.
    pub fn new(points: Vec<DVec2>) -> Self {
        Self { points, closed: false }
    }

    /// Create a closed path from points.
    pub fn closed(points: Vec<DVec2>) -> Self {
        Self { points, closed: true }
    }

    pub fn points(&self) -> &[DVec2] {
        &self.points
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn push(&mut self, point: DVec2) {
        self.points.push(point);
    }

    /// Bounding box over all points, or `None` for an empty path.
    pub fn bounds(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.points.iter().copied())
    }

    /// Translate all points by the given offset.
    pub fn translate(&mut self, delta: DVec2) {
        for p in &mut self.points {
            *p += delta;
        }
    }

    /// Scale all points uniformly about the origin.
    pub fn scale(&mut self, factor: f64) {
        for p in &mut self.points {
            *p *= factor;
        }
    }

    /// Total polyline length, including the closing segment for closed paths.
    pub fn length(&self) -> f64 {
        if self.points.len() < 2 {
            return 0.0;
        }
        let mut sum: f64 = self
            .points
            .windows(2)
            .map(|w| (w[1] - w[0]).length())
            .sum();
        if self.closed {
            sum += (self.points[0] - self.points[self.points.len() - 1]).length();
        }
        sum
    }

    /// Simplify the path using the Douglas-Peucker algorithm.
    ///
    /// Points farther than `tolerance` from the simplified line are kept.
    pub fn simplify(&self, tolerance: f64) -> Path {
        if self.points.len() <= 2 {
            return self.clone();
        }
        Path {
            points: douglas_peucker(&self.points, tolerance),
            closed: self.closed,
        }
    }
}

/// Douglas-Peucker line simplification.
fn douglas_peucker(points: &[DVec2], epsilon: f64) -> Vec<DVec2> {
    if points.len() <= 2 {
        return points.to_vec();
    }

    // Find the point with maximum distance from the chord
    let first = points[0];
    let last = points[points.len() - 1];

    let mut max_dist = 0.0f64;
    let mut max_idx = 0;

    for (i, &point) in points.iter().enumerate().skip(1).take(points.len() - 2) {
        let dist = perpendicular_distance(point, first, last);
        if dist > max_dist {
            max_dist = dist;
            max_idx = i;
        }
    }

    if max_dist > epsilon {
        let mut left = douglas_peucker(&points[..=max_idx], epsilon);
        let right = douglas_peucker(&points[max_idx..], epsilon);

        // Drop the duplicate point at the junction
        left.pop();
        left.extend(right);
        left
    } else {
        vec![first, last]
    }
}

/// Perpendicular distance from a point to the line through `a` and `b`.
fn perpendicular_distance(point: DVec2, a: DVec2, b: DVec2) -> f64 {
    let d = b - a;
    let len_sq = d.length_squared();

    if len_sq < 1e-12 {
        // Chord is a point
        return (point - a).length();
    }

    (d.perp_dot(point - a)).abs() / len_sq.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_of(coords: &[(f64, f64)]) -> Path {
        Path::new(coords.iter().map(|&(x, y)| DVec2::new(x, y)).collect())
    }

    #[test]
    fn bounds_of_path() {
        let path = path_of(&[(10.0, 10.0), (50.0, 30.0), (20.0, 15.0)]);
        let bbox = path.bounds().unwrap();
        assert_eq!(bbox.min, DVec2::new(10.0, 10.0));
        assert_eq!(bbox.max, DVec2::new(50.0, 30.0));
    }

    #[test]
    fn translate_then_scale() {
        let mut path = path_of(&[(1.0, 2.0), (3.0, 4.0)]);
        path.translate(DVec2::new(-1.0, -2.0));
        path.scale(2.0);
        assert_eq!(path.points()[0], DVec2::new(0.0, 0.0));
        assert_eq!(path.points()[1], DVec2::new(4.0, 4.0));
    }

    #[test]
    fn length_closed_vs_open() {
        let open = path_of(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]);
        assert!((open.length() - 20.0).abs() < 1e-12);

        let ring = Path::closed(vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(10.0, 0.0),
            DVec2::new(10.0, 10.0),
            DVec2::new(0.0, 10.0),
        ]);
        assert!((ring.length() - 40.0).abs() < 1e-12);
    }

    #[test]
    fn simplify_straightens_noise() {
        let noisy = path_of(&[
            (0.0, 0.0),
            (1.0, 0.4),
            (2.0, -0.3),
            (3.0, 0.2),
            (10.0, 0.0),
        ]);
        let simplified = noisy.simplify(1.0);
        assert_eq!(simplified.len(), 2);
        assert_eq!(simplified.points()[0], DVec2::new(0.0, 0.0));
        assert_eq!(simplified.points()[1], DVec2::new(10.0, 0.0));
    }

    #[test]
    fn simplify_keeps_corners() {
        let corner = path_of(&[(0.0, 0.0), (5.0, 0.1), (10.0, 0.0), (10.0, 10.0)]);
        let simplified = corner.simplify(0.5);
        // The right-angle corner at (10, 0) must survive
        assert!(simplified.points().contains(&DVec2::new(10.0, 0.0)));
    }
}
