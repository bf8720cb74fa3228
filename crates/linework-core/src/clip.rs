//! Rectangle clipping for polylines.

use glam::DVec2;

use crate::bounds::BoundingBox;
use crate::geometry::Path;

/// Endpoint-join tolerance when reassembling clipped runs.
const JOIN_EPS: f64 = 1e-9;

/// Clip a segment to a rectangle using the Liang-Barsky algorithm.
///
/// Returns the clipped endpoints, or `None` when the segment lies
/// entirely outside.
pub fn clip_segment(a: DVec2, b: DVec2, rect: &BoundingBox) -> Option<(DVec2, DVec2)> {
    let d = b - a;
    let mut t0 = 0.0f64;
    let mut t1 = 1.0f64;

    let checks = [
        (-d.x, a.x - rect.min.x),
        (d.x, rect.max.x - a.x),
        (-d.y, a.y - rect.min.y),
        (d.y, rect.max.y - a.y),
    ];

    for (p, q) in checks {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let r = q / p;
            if p < 0.0 {
                if r > t1 {
                    return None;
                }
                if r > t0 {
                    t0 = r;
                }
            } else {
                if r < t0 {
                    return None;
                }
                if r < t1 {
                    t1 = r;
                }
            }
        }
    }

    Some((a + d * t0, a + d * t1))
}

/// Clip a path to a rectangle.
///
/// A path that leaves and re-enters the rectangle splits into multiple
/// open runs. A closed path that lies entirely inside is returned as-is;
/// otherwise its closing segment participates in the clip and the runs
/// come back open.
pub fn crop_path(path: &Path, rect: &BoundingBox) -> Vec<Path> {
    if path.len() < 2 {
        return Vec::new();
    }

    if let Some(bounds) = path.bounds() {
        if rect.contains_box(&bounds) {
            return vec![path.clone()];
        }
    }

    let points = path.points();
    let mut out: Vec<Path> = Vec::new();
    let mut run: Vec<DVec2> = Vec::new();

    let segment_count = if path.is_closed() {
        points.len()
    } else {
        points.len() - 1
    };

    for i in 0..segment_count {
        let a = points[i];
        let b = points[(i + 1) % points.len()];

        match clip_segment(a, b, rect) {
            Some((ca, cb)) => {
                match run.last() {
                    Some(&last) if (last - ca).length() <= JOIN_EPS => {}
                    Some(_) => {
                        flush(&mut out, &mut run);
                        run.push(ca);
                    }
                    None => run.push(ca),
                }
                run.push(cb);
            }
            None => flush(&mut out, &mut run),
        }
    }
    flush(&mut out, &mut run);

    out
}

fn flush(out: &mut Vec<Path>, run: &mut Vec<DVec2>) {
    if run.len() > 1 {
        out.push(Path::new(std::mem::take(run)));
    } else {
        run.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> BoundingBox {
        BoundingBox::new(0.0, 0.0, 10.0, 10.0)
    }

    #[test]
    fn inside_segment_is_identity() {
        let (a, b) =
            clip_segment(DVec2::new(1.0, 1.0), DVec2::new(9.0, 9.0), &rect()).unwrap();
        assert_eq!(a, DVec2::new(1.0, 1.0));
        assert_eq!(b, DVec2::new(9.0, 9.0));
    }

    #[test]
    fn outside_segment_is_dropped() {
        assert!(clip_segment(DVec2::new(11.0, 0.0), DVec2::new(20.0, 5.0), &rect()).is_none());
        // Diagonal passing fully above the box
        assert!(clip_segment(DVec2::new(-5.0, 11.0), DVec2::new(15.0, 12.0), &rect()).is_none());
    }

    #[test]
    fn crossing_segment_is_cut_at_the_edge() {
        let (a, b) =
            clip_segment(DVec2::new(-5.0, 5.0), DVec2::new(5.0, 5.0), &rect()).unwrap();
        assert!((a.x - 0.0).abs() < 1e-12);
        assert!((a.y - 5.0).abs() < 1e-12);
        assert_eq!(b, DVec2::new(5.0, 5.0));
    }

    #[test]
    fn path_leaving_and_reentering_splits() {
        // In at the left, out over the top, back in on the right
        let path = Path::new(vec![
            DVec2::new(2.0, 5.0),
            DVec2::new(5.0, 20.0),
            DVec2::new(8.0, 5.0),
        ]);
        let cropped = crop_path(&path, &rect());
        assert_eq!(cropped.len(), 2);
        for part in &cropped {
            let bounds = part.bounds().unwrap();
            assert!(bounds.max.y <= 10.0 + 1e-9);
        }
    }

    #[test]
    fn fully_inside_closed_path_is_preserved() {
        let ring = Path::closed(vec![
            DVec2::new(2.0, 2.0),
            DVec2::new(8.0, 2.0),
            DVec2::new(8.0, 8.0),
            DVec2::new(2.0, 8.0),
        ]);
        let cropped = crop_path(&ring, &rect());
        assert_eq!(cropped.len(), 1);
        assert!(cropped[0].is_closed());
    }

    #[test]
    fn clipped_closed_path_includes_closing_segment() {
        // Square straddling the right edge; the closing segment lies inside
        let ring = Path::closed(vec![
            DVec2::new(5.0, 2.0),
            DVec2::new(15.0, 2.0),
            DVec2::new(15.0, 8.0),
            DVec2::new(5.0, 8.0),
        ]);
        let cropped = crop_path(&ring, &rect());
        let total_points: usize = cropped.iter().map(Path::len).sum();
        assert!(total_points >= 4);
        for part in &cropped {
            assert!(!part.is_closed());
            let bounds = part.bounds().unwrap();
            assert!(bounds.max.x <= 10.0 + 1e-9);
        }
    }
}
