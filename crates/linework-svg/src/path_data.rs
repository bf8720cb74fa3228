//! SVG path data parsing and flattening.
//!
//! Path commands parse with `nom` and flatten straight to polylines:
//! cubics and quadratics by recursive subdivision until they sit within
//! the given tolerance of their chord, arcs by sampling at an angular
//! step derived from the same tolerance.

use glam::DVec2;
use nom::{
    bytes::complete::take_while,
    character::complete::one_of,
    number::complete::double,
    sequence::preceded,
    IResult,
};
use smallvec::SmallVec;

use linework_core::errors::SvgError;
use linework_core::Path;

/// Maximum recursion depth for curve subdivision.
const MAX_DEPTH: u32 = 24;

fn sep0(input: &str) -> IResult<&str, &str> {
    take_while(|c: char| c.is_whitespace() || c == ',')(input)
}

fn number(input: &str) -> IResult<&str, f64> {
    preceded(sep0, double)(input)
}

/// Arc flags are single digits and may be packed without separators.
fn flag(input: &str) -> IResult<&str, bool> {
    let (input, c) = preceded(sep0, one_of("01"))(input)?;
    Ok((input, c == '1'))
}

fn command(input: &str) -> IResult<&str, char> {
    preceded(sep0, one_of("MmLlHhVvCcSsQqTtAaZz"))(input)
}

struct Flattener {
    tolerance: f64,
    paths: Vec<Path>,
    points: Vec<DVec2>,
    current: DVec2,
    subpath_start: DVec2,
    prev_cubic_ctrl: Option<DVec2>,
    prev_quad_ctrl: Option<DVec2>,
}

impl Flattener {
    fn new(tolerance: f64) -> Self {
        Self {
            tolerance: tolerance.max(1e-6),
            paths: Vec::new(),
            points: Vec::new(),
            current: DVec2::ZERO,
            subpath_start: DVec2::ZERO,
            prev_cubic_ctrl: None,
            prev_quad_ctrl: None,
        }
    }

    fn move_to(&mut self, p: DVec2) {
        self.flush(false);
        self.current = p;
        self.subpath_start = p;
        self.points.push(p);
    }

    fn line_to(&mut self, p: DVec2) {
        if self.points.is_empty() {
            self.points.push(self.current);
        }
        self.points.push(p);
        self.current = p;
    }

    fn close(&mut self) {
        self.current = self.subpath_start;
        self.flush(true);
        // A segment after Z starts from the subpath origin
        self.points.push(self.current);
    }

    fn flush(&mut self, closed: bool) {
        if self.points.len() > 1 {
            let points = std::mem::take(&mut self.points);
            self.paths.push(if closed {
                Path::closed(points)
            } else {
                Path::new(points)
            });
        } else {
            self.points.clear();
        }
    }

    fn cubic_to(&mut self, c1: DVec2, c2: DVec2, end: DVec2) {
        if self.points.is_empty() {
            self.points.push(self.current);
        }
        flatten_cubic(
            &mut self.points,
            self.current,
            c1,
            c2,
            end,
            self.tolerance,
            0,
        );
        self.current = end;
        self.prev_cubic_ctrl = Some(c2);
    }

    fn quad_to(&mut self, c: DVec2, end: DVec2) {
        // Elevate to a cubic; the flattener only handles one degree
        let c1 = self.current + (c - self.current) * (2.0 / 3.0);
        let c2 = end + (c - end) * (2.0 / 3.0);
        self.cubic_to(c1, c2, end);
        self.prev_cubic_ctrl = None;
        self.prev_quad_ctrl = Some(c);
    }

    fn arc_to(&mut self, rx: f64, ry: f64, rotation_deg: f64, large: bool, sweep: bool, end: DVec2) {
        if self.points.is_empty() {
            self.points.push(self.current);
        }
        flatten_arc(
            &mut self.points,
            self.current,
            rx,
            ry,
            rotation_deg,
            large,
            sweep,
            end,
            self.tolerance,
        );
        self.current = end;
    }
}

/// Parse an SVG `d` attribute into flattened polylines.
///
/// `tolerance` is the maximum deviation between a curve and its
/// polyline approximation, in the path's own units.
pub fn parse_path_data(d: &str, tolerance: f64) -> Result<Vec<Path>, SvgError> {
    let mut state = Flattener::new(tolerance);
    let mut input = d;
    let mut last_cmd: Option<char> = None;

    let invalid = || SvgError::InvalidPathData { value: d.to_string() };

    loop {
        // Trailing separators are fine
        if input
            .trim_start_matches(|c: char| c.is_whitespace() || c == ',')
            .is_empty()
        {
            break;
        }

        let cmd = match command(input) {
            Ok((rest, c)) => {
                input = rest;
                c
            }
            Err(_) => {
                // Implicit repetition of the previous command; M repeats as L
                match last_cmd {
                    Some('M') => 'L',
                    Some('m') => 'l',
                    Some(c) if c != 'Z' && c != 'z' => c,
                    _ => return Err(invalid()),
                }
            }
        };

        // Path data must begin with a moveto
        if last_cmd.is_none() && !matches!(cmd, 'M' | 'm') {
            return Err(invalid());
        }
        last_cmd = Some(cmd);

        let relative = cmd.is_ascii_lowercase();
        let origin = if relative { state.current } else { DVec2::ZERO };

        match cmd.to_ascii_uppercase() {
            'M' => {
                let (rest, p) = point(input).map_err(|_| invalid())?;
                input = rest;
                state.move_to(origin + p);
                state.prev_cubic_ctrl = None;
                state.prev_quad_ctrl = None;
            }
            'L' => {
                let (rest, p) = point(input).map_err(|_| invalid())?;
                input = rest;
                state.line_to(origin + p);
                state.prev_cubic_ctrl = None;
                state.prev_quad_ctrl = None;
            }
            'H' => {
                let (rest, x) = number(input).map_err(|_| invalid())?;
                input = rest;
                let p = if relative {
                    state.current + DVec2::new(x, 0.0)
                } else {
                    DVec2::new(x, state.current.y)
                };
                state.line_to(p);
                state.prev_cubic_ctrl = None;
                state.prev_quad_ctrl = None;
            }
            'V' => {
                let (rest, y) = number(input).map_err(|_| invalid())?;
                input = rest;
                let p = if relative {
                    state.current + DVec2::new(0.0, y)
                } else {
                    DVec2::new(state.current.x, y)
                };
                state.line_to(p);
                state.prev_cubic_ctrl = None;
                state.prev_quad_ctrl = None;
            }
            'C' => {
                let (rest, ps) = points::<3>(input).map_err(|_| invalid())?;
                input = rest;
                state.cubic_to(origin + ps[0], origin + ps[1], origin + ps[2]);
                state.prev_quad_ctrl = None;
            }
            'S' => {
                let (rest, ps) = points::<2>(input).map_err(|_| invalid())?;
                input = rest;
                let c1 = match state.prev_cubic_ctrl {
                    Some(prev) => state.current * 2.0 - prev,
                    None => state.current,
                };
                state.cubic_to(c1, origin + ps[0], origin + ps[1]);
                state.prev_quad_ctrl = None;
            }
            'Q' => {
                let (rest, ps) = points::<2>(input).map_err(|_| invalid())?;
                input = rest;
                state.quad_to(origin + ps[0], origin + ps[1]);
            }
            'T' => {
                let (rest, p) = point(input).map_err(|_| invalid())?;
                input = rest;
                let c = match state.prev_quad_ctrl {
                    Some(prev) => state.current * 2.0 - prev,
                    None => state.current,
                };
                state.quad_to(c, origin + p);
            }
            'A' => {
                let (rest, rx) = number(input).map_err(|_| invalid())?;
                let (rest, ry) = number(rest).map_err(|_| invalid())?;
                let (rest, rot) = number(rest).map_err(|_| invalid())?;
                let (rest, large) = flag(rest).map_err(|_| invalid())?;
                let (rest, sweep) = flag(rest).map_err(|_| invalid())?;
                let (rest, p) = point(rest).map_err(|_| invalid())?;
                input = rest;
                state.arc_to(rx.abs(), ry.abs(), rot, large, sweep, origin + p);
                state.prev_cubic_ctrl = None;
                state.prev_quad_ctrl = None;
            }
            'Z' => {
                state.close();
                state.prev_cubic_ctrl = None;
                state.prev_quad_ctrl = None;
            }
            _ => unreachable!(),
        }
    }

    state.flush(false);
    Ok(state.paths)
}

fn point(input: &str) -> IResult<&str, DVec2> {
    let (input, x) = number(input)?;
    let (input, y) = number(input)?;
    Ok((input, DVec2::new(x, y)))
}

fn points<const N: usize>(input: &str) -> IResult<&str, SmallVec<[DVec2; 3]>> {
    let mut out = SmallVec::new();
    let mut rest = input;
    for _ in 0..N {
        let (r, p) = point(rest)?;
        out.push(p);
        rest = r;
    }
    Ok((rest, out))
}

/// Recursively subdivide a cubic until its control points sit within
/// `tolerance` of the chord, then emit the endpoint.
fn flatten_cubic(
    out: &mut Vec<DVec2>,
    p0: DVec2,
    p1: DVec2,
    p2: DVec2,
    p3: DVec2,
    tolerance: f64,
    depth: u32,
) {
    if depth >= MAX_DEPTH || cubic_is_flat(p0, p1, p2, p3, tolerance) {
        out.push(p3);
        return;
    }

    // de Casteljau split at t = 0.5
    let p01 = (p0 + p1) * 0.5;
    let p12 = (p1 + p2) * 0.5;
    let p23 = (p2 + p3) * 0.5;
    let p012 = (p01 + p12) * 0.5;
    let p123 = (p12 + p23) * 0.5;
    let mid = (p012 + p123) * 0.5;

    flatten_cubic(out, p0, p01, p012, mid, tolerance, depth + 1);
    flatten_cubic(out, mid, p123, p23, p3, tolerance, depth + 1);
}

/// Distance of both control points from the chord bounds the curve's
/// deviation from it.
fn cubic_is_flat(p0: DVec2, p1: DVec2, p2: DVec2, p3: DVec2, tolerance: f64) -> bool {
    let d = p3 - p0;
    let len_sq = d.length_squared();
    if len_sq < 1e-18 {
        return (p1 - p0).length() <= tolerance && (p2 - p0).length() <= tolerance;
    }
    let dist1 = d.perp_dot(p1 - p0).abs();
    let dist2 = d.perp_dot(p2 - p0).abs();
    let limit = tolerance * len_sq.sqrt();
    dist1 <= limit && dist2 <= limit
}

/// Flatten an elliptical arc by sampling at an angular step whose
/// sagitta stays below the tolerance. Degenerate radii collapse to a
/// straight segment, per the SVG arc implementation notes.
#[allow(clippy::too_many_arguments)]
fn flatten_arc(
    out: &mut Vec<DVec2>,
    start: DVec2,
    mut rx: f64,
    mut ry: f64,
    rotation_deg: f64,
    large: bool,
    sweep: bool,
    end: DVec2,
    tolerance: f64,
) {
    if rx == 0.0 || ry == 0.0 || start == end {
        out.push(end);
        return;
    }

    let phi = rotation_deg.to_radians();
    let (sin_phi, cos_phi) = phi.sin_cos();

    // Endpoint to center parameterization (SVG F.6.5)
    let d = (start - end) * 0.5;
    let x1p = cos_phi * d.x + sin_phi * d.y;
    let y1p = -sin_phi * d.x + cos_phi * d.y;

    let lambda = (x1p * x1p) / (rx * rx) + (y1p * y1p) / (ry * ry);
    if lambda > 1.0 {
        let s = lambda.sqrt();
        rx *= s;
        ry *= s;
    }

    let num = rx * rx * ry * ry - rx * rx * y1p * y1p - ry * ry * x1p * x1p;
    let den = rx * rx * y1p * y1p + ry * ry * x1p * x1p;
    let mut c = (num.max(0.0) / den).sqrt();
    if large == sweep {
        c = -c;
    }
    let cxp = c * rx * y1p / ry;
    let cyp = -c * ry * x1p / rx;

    let center = DVec2::new(
        cos_phi * cxp - sin_phi * cyp + (start.x + end.x) * 0.5,
        sin_phi * cxp + cos_phi * cyp + (start.y + end.y) * 0.5,
    );

    let v1 = DVec2::new((x1p - cxp) / rx, (y1p - cyp) / ry);
    let v2 = DVec2::new((-x1p - cxp) / rx, (-y1p - cyp) / ry);

    let theta1 = v1.y.atan2(v1.x);
    let mut delta = (v1.perp_dot(v2)).atan2(v1.dot(v2));
    if !sweep && delta > 0.0 {
        delta -= std::f64::consts::TAU;
    } else if sweep && delta < 0.0 {
        delta += std::f64::consts::TAU;
    }

    let r_max = rx.max(ry);
    let step = if tolerance < r_max {
        2.0 * (1.0 - tolerance / r_max).acos()
    } else {
        std::f64::consts::FRAC_PI_2
    };
    let n = ((delta.abs() / step).ceil() as usize).max(2);

    for i in 1..=n {
        let theta = theta1 + delta * (i as f64) / (n as f64);
        let (sin_t, cos_t) = theta.sin_cos();
        let local = DVec2::new(rx * cos_t, ry * sin_t);
        out.push(DVec2::new(
            cos_phi * local.x - sin_phi * local.y + center.x,
            sin_phi * local.x + cos_phi * local.y + center.y,
        ));
    }
    // Land exactly on the endpoint regardless of rounding
    if let Some(last) = out.last_mut() {
        *last = end;
    }
}
