//! SVG input and output for linework documents.
//!
//! Reading groups geometry into pen layers by effective stroke color,
//! flattening curves to polylines; writing emits one `<g>` per layer.
//! The remaining modules are small inspection passes over raw markup:
//! dropping figure-export artifacts, listing stroke colors, and
//! guessing the page size of an unlabeled file.
//!
//! # Example
//!
//! ```ignore
//! use linework_svg::{read_svg, write_svg, ReadOptions};
//!
//! let doc = read_svg(&markup, &ReadOptions::default())?;
//! let out = write_svg(&doc);
//! ```

mod clean;
mod detect;
mod path_data;
mod read;
mod strokes;
mod transform;
mod write;

pub use clean::clean_svg;
pub use detect::{detect_page_size, PageMatch};
pub use path_data::parse_path_data;
pub use read::{read_svg, ReadOptions};
pub use strokes::{layer_colors, stroke_colors};
pub use transform::{apply, parse_transform, Matrix, IDENTITY};
pub use write::write_svg;
