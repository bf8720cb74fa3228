//! Error types for the linework toolkit.

use thiserror::Error;

/// Top-level error type for the linework toolkit.
#[derive(Debug, Error)]
pub enum LineworkError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Pen(#[from] PenError),

    #[error(transparent)]
    Svg(#[from] SvgError),
}

/// Errors while parsing lengths, colors, and page-size strings.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid length: {value}")]
    InvalidLength { value: String },

    #[error("Unknown unit: {unit}")]
    UnknownUnit { unit: String },

    #[error("Invalid page size: {value}")]
    InvalidPageSize { value: String },

    #[error("Invalid color: {value}")]
    InvalidColor { value: String },
}

/// Errors during page layout.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("Degenerate content bounds ({width} x {height}): cannot scale to fit")]
    DegenerateBounds { width: f64, height: f64 },
}

/// Errors during pen-table loading and layer assignment.
#[derive(Debug, Error)]
pub enum PenError {
    #[error("Pen table is empty")]
    EmptyTable,

    #[error("Invalid width '{value}' for pen {pen}")]
    InvalidWidth { pen: String, value: String },

    #[error("Invalid color '{value}' for pen {pen}")]
    InvalidColor { pen: String, value: String },

    #[error("Failed to parse pen config: {message}")]
    InvalidConfig { message: String },
}

/// Errors while reading, rewriting, or inspecting SVG markup.
#[derive(Debug, Error)]
pub enum SvgError {
    #[error("Malformed XML: {message}")]
    Xml { message: String },

    #[error("No <svg> root element found")]
    MissingRoot,

    #[error("Invalid path data: {value}")]
    InvalidPathData { value: String },

    #[error("Invalid transform: {value}")]
    InvalidTransform { value: String },

    #[error("Invalid dimension: {value}")]
    InvalidDimension { value: String },

    #[error(transparent)]
    Parse(#[from] ParseError),
}
