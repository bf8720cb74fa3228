//! Physical units and lengths.
//!
//! All document geometry is held in millimeters; these types convert
//! the units that appear in SVG dimension attributes and pen configs.

use std::fmt;
use std::str::FromStr;

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::multispace0,
    combinator::{all_consuming, map, opt, value},
    number::complete::double,
    sequence::{delimited, pair},
    IResult,
};

use crate::errors::ParseError;

/// Length units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Unit {
    /// Millimeters
    Mm,
    /// Centimeters
    Cm,
    /// Inches
    In,
    /// Pixels (1/96 inch, CSS reference pixel)
    Px,
    /// Points (1/72 inch)
    Pt,
    /// Picas (12 points)
    Pc,
}

impl Unit {
    /// Conversion factor from this unit to millimeters.
    pub fn to_mm(self) -> f64 {
        match self {
            Unit::Mm => 1.0,
            Unit::Cm => 10.0,
            Unit::In => 25.4,
            Unit::Px => 25.4 / 96.0,
            Unit::Pt => 25.4 / 72.0,
            Unit::Pc => 25.4 / 72.0 * 12.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Unit::Mm => "mm",
            Unit::Cm => "cm",
            Unit::In => "in",
            Unit::Px => "px",
            Unit::Pt => "pt",
            Unit::Pc => "pc",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A length value with unit.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Length {
    pub value: f64,
    pub unit: Unit,
}

impl Length {
    pub fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }

    pub fn mm(value: f64) -> Self {
        Self { value, unit: Unit::Mm }
    }

    /// Convert to millimeters.
    pub fn to_mm(&self) -> f64 {
        self.value * self.unit.to_mm()
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit)
    }
}

pub(crate) fn unit(input: &str) -> IResult<&str, Unit> {
    alt((
        value(Unit::Mm, tag("mm")),
        value(Unit::Cm, tag("cm")),
        value(Unit::In, tag("in")),
        value(Unit::Px, tag("px")),
        value(Unit::Pt, tag("pt")),
        value(Unit::Pc, tag("pc")),
    ))(input)
}

/// Parse a length with optional unit; a bare number is taken as `default`.
pub(crate) fn length_with_default(
    default: Unit,
) -> impl Fn(&str) -> IResult<&str, Length> {
    move |input| {
        map(pair(double, opt(unit)), |(v, u)| {
            Length::new(v, u.unwrap_or(default))
        })(input)
    }
}

impl FromStr for Length {
    type Err = ParseError;

    /// Parse strings like `"0.3mm"`, `"12px"`, `"4in"`. A bare number is
    /// pixels, matching SVG attribute semantics.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        all_consuming(delimited(
            multispace0,
            length_with_default(Unit::Px),
            multispace0,
        ))(s)
        .map(|(_, l)| l)
        .map_err(|_| ParseError::InvalidLength { value: s.to_string() })
    }
}
