//! The pen table and its TOML representation.

use indexmap::IndexMap;
use serde::Deserialize;

use linework_core::errors::PenError;
use linework_core::{Color, Length};

/// A physical pen: stroke color plus tip width in millimeters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pen {
    pub color: Color,
    /// Tip width in millimeters.
    pub width: f64,
}

impl Pen {
    pub fn new(color: Color, width: f64) -> Self {
        Self { color, width }
    }

    /// The pen used when an id has no table entry: black, 0.3 mm.
    pub fn fallback() -> Self {
        Self::new(Color::BLACK, 0.3)
    }
}

/// An ordered map of pen id to pen.
#[derive(Debug, Clone, Default)]
pub struct PenTable {
    pens: IndexMap<String, Pen>,
}

/// TOML shape: `[pens.<id>] color = "#RRGGBB", width = "0.7mm"`.
#[derive(Debug, Deserialize)]
struct PenConfig {
    pens: IndexMap<String, PenSpec>,
}

#[derive(Debug, Deserialize)]
struct PenSpec {
    color: String,
    width: String,
}

impl PenTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stock pen set: felt tips (0.7 mm), technical pens (0.15 mm),
    /// and gel pens (0.5 mm).
    pub fn builtin() -> Self {
        let mut table = Self::new();
        for (id, hex, width) in [
            ("felt_tip_Black", "#222222", 0.7),
            ("felt_tip_Brown", "#8B5C2A", 0.7),
            ("felt_tip_Red", "#C0392B", 0.7),
            ("felt_tip_Blue", "#2980B9", 0.7),
            ("technical_pen_Black", "#111111", 0.15),
            ("technical_pen_Gray", "#888888", 0.15),
            ("technical_pen_Sepia", "#704214", 0.15),
            ("gel_pen_Black", "#222222", 0.5),
            ("gel_pen_Blue", "#1E90FF", 0.5),
            ("gel_pen_Green", "#27AE60", 0.5),
            ("gel_pen_Pink", "#FF69B4", 0.5),
        ] {
            // The builtin hex values are all well-formed
            if let Some(color) = Color::from_hex(hex) {
                table.insert(id, Pen::new(color, width));
            }
        }
        table
    }

    /// Load a pen table from TOML.
    ///
    /// Widths carry a unit (`"0.3mm"`, `"0.01in"`); a bare number is
    /// taken as millimeters.
    pub fn from_toml_str(source: &str) -> Result<Self, PenError> {
        let config: PenConfig =
            toml::from_str(source).map_err(|e| PenError::InvalidConfig {
                message: e.to_string(),
            })?;

        let mut table = Self::new();
        for (id, spec) in config.pens {
            let color =
                spec.color
                    .parse::<Color>()
                    .map_err(|_| PenError::InvalidColor {
                        pen: id.clone(),
                        value: spec.color.clone(),
                    })?;
            let width = parse_width(&spec.width).ok_or_else(|| PenError::InvalidWidth {
                pen: id.clone(),
                value: spec.width.clone(),
            })?;
            table.insert(id, Pen::new(color, width));
        }
        Ok(table)
    }

    pub fn insert(&mut self, id: impl Into<String>, pen: Pen) {
        self.pens.insert(id.into(), pen);
    }

    pub fn get(&self, id: &str) -> Option<&Pen> {
        self.pens.get(id)
    }

    pub fn is_empty(&self) -> bool {
        self.pens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pens.len()
    }

    /// Iterate pens in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Pen)> {
        self.pens.iter().map(|(id, pen)| (id.as_str(), pen))
    }
}

/// Pen width in millimeters; bare numbers are mm, otherwise any
/// supported unit suffix.
fn parse_width(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if let Ok(value) = trimmed.parse::<f64>() {
        return (value >= 0.0).then_some(value);
    }
    let length: Length = trimmed.parse().ok()?;
    (length.value >= 0.0).then(|| length.to_mm())
}
