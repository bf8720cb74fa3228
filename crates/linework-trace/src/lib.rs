//! Raster-to-vector tracing.
//!
//! Two converters from raster images to plotter documents:
//! - [`trace_isolines`]: iso-contour lines from a grayscale depth map,
//!   optionally restricted by an alpha mask
//! - [`hatch_image`]: tonal hatching, covering dark regions with
//!   diagonal (and cross-diagonal) pen strokes
//!
//! Both produce single-layer documents in image pixel coordinates,
//! y-down, with the page sized to the image.

pub mod hatch;
pub mod isolines;
pub mod marching;

pub use hatch::{hatch_image, HatchConfig};
pub use isolines::{trace_isolines, IsolineConfig};

use thiserror::Error;

/// Errors during raster tracing.
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("Failed to decode image: {0}")]
    ImageDecode(String),

    #[error("Failed to decode mask: {0}")]
    MaskDecode(String),

    #[error("Image has no pixels")]
    EmptyImage,
}
