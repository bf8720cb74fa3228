//! Marching-squares iso-contour extraction.
//!
//! Works on a scalar grid with one sample per pixel. Each 2x2 cell
//! contributes zero, one, or two segments with linearly interpolated
//! crossings; segments then stitch into polylines by matching
//! endpoints. Cells touching an excluded sample produce nothing, which
//! is how mask transparency punches holes into the contour set.

use std::collections::HashMap;

use glam::DVec2;
use smallvec::SmallVec;

use linework_core::Path;

/// Quantization for endpoint matching during stitching.
const STITCH_SCALE: f64 = 1.0e6;

type Segment = (DVec2, DVec2);

/// Extract the iso-contours of `data` at `level`.
///
/// `data` holds `width * height` samples in row-major order, one per
/// pixel; coordinates in the output are pixel positions, y-down.
/// `mask` marks samples to exclude.
pub fn trace_level(
    data: &[f64],
    mask: Option<&[bool]>,
    width: u32,
    height: u32,
    level: f64,
) -> Vec<Path> {
    if width < 2 || height < 2 {
        return Vec::new();
    }

    let w = width as usize;
    let h = height as usize;
    let mut segments: Vec<Segment> = Vec::new();

    for y in 0..h - 1 {
        for x in 0..w - 1 {
            let i0 = y * w + x;
            let i1 = i0 + 1;
            let i2 = i0 + w + 1;
            let i3 = i0 + w;

            if let Some(mask) = mask {
                if mask[i0] || mask[i1] || mask[i2] || mask[i3] {
                    continue;
                }
            }

            let v = [data[i0], data[i1], data[i2], data[i3]];
            segments.extend(cell_segments(x as f64, y as f64, v, level));
        }
    }

    stitch(segments)
}

/// Segments for one cell. Corner order: top-left, top-right,
/// bottom-right, bottom-left; `(cx, cy)` is the top-left corner.
fn cell_segments(cx: f64, cy: f64, v: [f64; 4], level: f64) -> SmallVec<[Segment; 2]> {
    let mut idx = 0usize;
    for (bit, value) in v.iter().enumerate() {
        if *value >= level {
            idx |= 1 << bit;
        }
    }

    // Interpolated crossing on the edge from corner a to corner b
    let lerp = |a: usize, b: usize| -> DVec2 {
        let (pa, pb) = (corner(cx, cy, a), corner(cx, cy, b));
        let (va, vb) = (v[a], v[b]);
        let t = if (vb - va).abs() < 1e-12 {
            0.5
        } else {
            ((level - va) / (vb - va)).clamp(0.0, 1.0)
        };
        pa + (pb - pa) * t
    };

    let top = || lerp(0, 1);
    let right = || lerp(1, 2);
    let bottom = || lerp(3, 2);
    let left = || lerp(0, 3);

    let mut out = SmallVec::new();
    match idx {
        0 | 15 => {}
        1 | 14 => out.push((left(), top())),
        2 | 13 => out.push((top(), right())),
        3 | 12 => out.push((left(), right())),
        4 | 11 => out.push((right(), bottom())),
        6 | 9 => out.push((top(), bottom())),
        7 | 8 => out.push((left(), bottom())),
        5 | 10 => {
            // Saddle: disambiguate with the cell-center average
            let center_above = (v[0] + v[1] + v[2] + v[3]) / 4.0 >= level;
            let connect_05 = (idx == 5) == center_above;
            if connect_05 {
                out.push((left(), top()));
                out.push((right(), bottom()));
            } else {
                out.push((top(), right()));
                out.push((left(), bottom()));
            }
        }
        _ => unreachable!(),
    }
    out
}

fn corner(cx: f64, cy: f64, index: usize) -> DVec2 {
    match index {
        0 => DVec2::new(cx, cy),
        1 => DVec2::new(cx + 1.0, cy),
        2 => DVec2::new(cx + 1.0, cy + 1.0),
        _ => DVec2::new(cx, cy + 1.0),
    }
}

fn key(p: DVec2) -> (i64, i64) {
    (
        (p.x * STITCH_SCALE).round() as i64,
        (p.y * STITCH_SCALE).round() as i64,
    )
}

/// Stitch loose segments into polylines by endpoint matching.
fn stitch(segments: Vec<Segment>) -> Vec<Path> {
    let mut adjacency: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
    for (i, (a, b)) in segments.iter().enumerate() {
        adjacency.entry(key(*a)).or_default().push(i);
        adjacency.entry(key(*b)).or_default().push(i);
    }

    let mut used = vec![false; segments.len()];
    let mut paths = Vec::new();

    for start in 0..segments.len() {
        if used[start] {
            continue;
        }
        used[start] = true;

        let (a, b) = segments[start];
        let mut chain: Vec<DVec2> = vec![a, b];

        extend(&segments, &adjacency, &mut used, &mut chain);
        chain.reverse();
        extend(&segments, &adjacency, &mut used, &mut chain);

        let closed = chain.len() > 3 && key(chain[0]) == key(chain[chain.len() - 1]);
        if closed {
            chain.pop();
            paths.push(Path::closed(chain));
        } else if chain.len() >= 2 {
            paths.push(Path::new(chain));
        }
    }

    paths
}

/// Grow the chain forward from its last point while unused incident
/// segments exist.
fn extend(
    segments: &[Segment],
    adjacency: &HashMap<(i64, i64), Vec<usize>>,
    used: &mut [bool],
    chain: &mut Vec<DVec2>,
) {
    loop {
        let tip = match chain.last() {
            Some(&p) => p,
            None => return,
        };
        let tip_key = key(tip);

        // Stop on closure
        if chain.len() > 2 && tip_key == key(chain[0]) {
            return;
        }

        let candidates = match adjacency.get(&tip_key) {
            Some(c) => c,
            None => return,
        };

        let mut advanced = false;
        for &i in candidates {
            if used[i] {
                continue;
            }
            let (a, b) = segments[i];
            let next = if key(a) == tip_key {
                b
            } else if key(b) == tip_key {
                a
            } else {
                continue;
            };
            used[i] = true;
            chain.push(next);
            advanced = true;
            break;
        }

        if !advanced {
            return;
        }
    }
}
