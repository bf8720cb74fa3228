//! Core types and geometry for the linework plotter toolkit.
//!
//! This crate provides the foundational types used across all other linework crates:
//! - Polyline geometry and bounding boxes
//! - The layered `Document` model that the layout, pen, and I/O crates operate on
//! - Page sizes, physical units, and stroke colors
//! - Error types

pub mod bounds;
pub mod clip;
pub mod color;
pub mod document;
pub mod errors;
pub mod geometry;
pub mod page;
pub mod units;

pub use bounds::BoundingBox;
pub use color::Color;
pub use document::{Document, Layer};
pub use errors::*;
pub use geometry::Path;
pub use page::{Orientation, PageDims, PageSize};
pub use units::{Length, Unit};
