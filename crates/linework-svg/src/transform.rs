//! SVG transform lists.
//!
//! Transforms are 2D affine matrices `[a, b, c, d, e, f]`, column pairs
//! of the usual 3x3 form: a point (x, y) maps to (ax + cy + e, bx + dy + f).

use glam::DVec2;
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, multispace0},
    combinator::all_consuming,
    multi::{many0, separated_list1},
    number::complete::double,
    sequence::{delimited, preceded},
    IResult,
};

use linework_core::errors::SvgError;

/// A 2D affine transform `[a, b, c, d, e, f]`.
pub type Matrix = [f64; 6];

pub const IDENTITY: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// Multiply two transforms; the right-hand side applies to points first.
pub fn multiply(a: Matrix, b: Matrix) -> Matrix {
    [
        a[0] * b[0] + a[2] * b[1],
        a[1] * b[0] + a[3] * b[1],
        a[0] * b[2] + a[2] * b[3],
        a[1] * b[2] + a[3] * b[3],
        a[0] * b[4] + a[2] * b[5] + a[4],
        a[1] * b[4] + a[3] * b[5] + a[5],
    ]
}

/// Apply a transform to a point.
pub fn apply(m: &Matrix, p: DVec2) -> DVec2 {
    DVec2::new(
        m[0] * p.x + m[2] * p.y + m[4],
        m[1] * p.x + m[3] * p.y + m[5],
    )
}

/// Average scale magnitude of the linear part, used to carry flattening
/// tolerances from document units back into local units.
pub fn scale_magnitude(m: &Matrix) -> f64 {
    let det = (m[0] * m[3] - m[1] * m[2]).abs();
    if det > 0.0 {
        det.sqrt()
    } else {
        1.0
    }
}

fn sep0(input: &str) -> IResult<&str, &str> {
    nom::bytes::complete::take_while(|c: char| c.is_whitespace() || c == ',')(input)
}

fn args(input: &str) -> IResult<&str, Vec<f64>> {
    delimited(
        preceded(multispace0, char('(')),
        separated_list1(sep0, preceded(sep0, double)),
        preceded(sep0, char(')')),
    )(input)
}

fn op(input: &str) -> IResult<&str, Option<Matrix>> {
    let (input, name) = preceded(
        sep0,
        alt((
            tag("matrix"),
            tag("translate"),
            tag("scale"),
            tag("rotate"),
            tag("skewX"),
            tag("skewY"),
        )),
    )(input)?;
    let (input, a) = args(input)?;

    let m = match (name, a.as_slice()) {
        ("matrix", &[a0, b, c, d, e, f]) => Some([a0, b, c, d, e, f]),
        ("translate", &[tx]) => Some([1.0, 0.0, 0.0, 1.0, tx, 0.0]),
        ("translate", &[tx, ty]) => Some([1.0, 0.0, 0.0, 1.0, tx, ty]),
        ("scale", &[s]) => Some([s, 0.0, 0.0, s, 0.0, 0.0]),
        ("scale", &[sx, sy]) => Some([sx, 0.0, 0.0, sy, 0.0, 0.0]),
        ("rotate", &[angle]) => Some(rotation(angle)),
        ("rotate", &[angle, cx, cy]) => {
            // translate(cx, cy) rotate(angle) translate(-cx, -cy)
            let t1 = [1.0, 0.0, 0.0, 1.0, cx, cy];
            let t2 = [1.0, 0.0, 0.0, 1.0, -cx, -cy];
            Some(multiply(multiply(t1, rotation(angle)), t2))
        }
        ("skewX", &[angle]) => Some([1.0, 0.0, angle.to_radians().tan(), 1.0, 0.0, 0.0]),
        ("skewY", &[angle]) => Some([1.0, angle.to_radians().tan(), 0.0, 1.0, 0.0, 0.0]),
        _ => None,
    };

    Ok((input, m))
}

fn rotation(angle_deg: f64) -> Matrix {
    let rad = angle_deg.to_radians();
    let (sin, cos) = rad.sin_cos();
    [cos, sin, -sin, cos, 0.0, 0.0]
}

/// Parse an SVG `transform` attribute into a single matrix.
///
/// Operations compose left to right, the leftmost outermost, per the
/// SVG specification.
pub fn parse_transform(value: &str) -> Result<Matrix, SvgError> {
    let parsed = all_consuming(delimited(sep0, many0(op), sep0))(value);
    match parsed {
        Ok((_, ops)) => {
            let mut m = IDENTITY;
            for op in ops {
                let op = op.ok_or_else(|| SvgError::InvalidTransform {
                    value: value.to_string(),
                })?;
                m = multiply(m, op);
            }
            Ok(m)
        }
        Err(_) => Err(SvgError::InvalidTransform {
            value: value.to_string(),
        }),
    }
}
