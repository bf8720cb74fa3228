//! Page sizes.

use std::fmt;
use std::str::FromStr;

use nom::{
    character::complete::{char, multispace0},
    combinator::{all_consuming, map},
    sequence::{delimited, separated_pair},
    IResult,
};

use crate::errors::ParseError;
use crate::units::{length_with_default, Unit};

/// Page dimensions in millimeters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageDims {
    pub width: f64,
    pub height: f64,
}

impl PageDims {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// The same dimensions with width and height swapped.
    pub fn swapped(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }

    pub fn is_landscape(self) -> bool {
        self.width > self.height
    }
}

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// A target page size: fixed dimensions, or sized to content.
///
/// `Tight` pages take their dimensions from the content bounding box
/// (plus margin) during layout; they have no orientation of their own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PageSize {
    Fixed(PageDims),
    Tight,
}

impl PageSize {
    pub fn fixed(width: f64, height: f64) -> Self {
        PageSize::Fixed(PageDims::new(width, height))
    }

    pub fn is_tight(&self) -> bool {
        matches!(self, PageSize::Tight)
    }
}

/// Named page sizes, portrait, in millimeters.
pub const NAMED_SIZES: [(&str, f64, f64); 7] = [
    ("a6", 105.0, 148.0),
    ("a5", 148.0, 210.0),
    ("a4", 210.0, 297.0),
    ("a3", 297.0, 420.0),
    ("letter", 215.9, 279.4),
    ("legal", 215.9, 355.6),
    ("executive", 184.15, 266.7),
];

/// Look up a named page size. `"tight"` resolves to [`PageSize::Tight`].
pub fn named_size(name: &str) -> Option<PageSize> {
    if name.eq_ignore_ascii_case("tight") {
        return Some(PageSize::Tight);
    }
    NAMED_SIZES
        .iter()
        .find(|(n, _, _)| name.eq_ignore_ascii_case(n))
        .map(|&(_, w, h)| PageSize::fixed(w, h))
}

/// `WIDTHxHEIGHT` with optional per-component units; bare numbers are mm.
fn dims(input: &str) -> IResult<&str, PageDims> {
    map(
        separated_pair(
            length_with_default(Unit::Mm),
            delimited(multispace0, char('x'), multispace0),
            length_with_default(Unit::Mm),
        ),
        |(w, h)| PageDims::new(w.to_mm(), h.to_mm()),
    )(input)
}

impl FromStr for PageSize {
    type Err = ParseError;

    /// Parse a page-size string: a named size (`"a4"`, `"tight"`) or
    /// explicit dimensions (`"100mmx150mm"`, `"4inx6in"`, `"210x297"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(size) = named_size(trimmed) {
            return Ok(size);
        }
        all_consuming(dims)(trimmed)
            .map(|(_, d)| PageSize::Fixed(d))
            .map_err(|_| ParseError::InvalidPageSize { value: s.to_string() })
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageSize::Fixed(d) => write!(f, "{}mmx{}mm", d.width, d.height),
            PageSize::Tight => f.write_str("tight"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_sizes_resolve() {
        assert_eq!(named_size("a4"), Some(PageSize::fixed(210.0, 297.0)));
        assert_eq!(named_size("A3"), Some(PageSize::fixed(297.0, 420.0)));
        assert_eq!(named_size("tight"), Some(PageSize::Tight));
        assert_eq!(named_size("b5"), None);
    }

    #[test]
    fn parse_explicit_dims() {
        let size: PageSize = "100mmx150mm".parse().unwrap();
        assert_eq!(size, PageSize::fixed(100.0, 150.0));

        let size: PageSize = "210x297".parse().unwrap();
        assert_eq!(size, PageSize::fixed(210.0, 297.0));

        let size: PageSize = "4inx6in".parse().unwrap();
        match size {
            PageSize::Fixed(d) => {
                assert!((d.width - 101.6).abs() < 1e-9);
                assert!((d.height - 152.4).abs() < 1e-9);
            }
            PageSize::Tight => panic!("expected fixed size"),
        }
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("100mm".parse::<PageSize>().is_err());
        assert!("wide".parse::<PageSize>().is_err());
        assert!("x100".parse::<PageSize>().is_err());
    }

    #[test]
    fn swapped_flips_orientation() {
        let d = PageDims::new(210.0, 297.0);
        assert!(!d.is_landscape());
        assert!(d.swapped().is_landscape());
    }
}
