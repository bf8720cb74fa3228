//! Page-fit layout for linework documents.
//!
//! This crate positions a document's geometry on a target page: it
//! normalizes the page orientation, optionally scales the content to fit
//! inside a margin (preserving aspect ratio), and aligns it against the
//! nine anchor combinations of left/center/right and top/center/bottom.
//!
//! # Example
//!
//! ```ignore
//! use linework_core::PageSize;
//! use linework_layout::{layout, LayoutOptions};
//!
//! let mut doc = read_svg(source, &ReadOptions::default())?;
//! layout(&mut doc, &LayoutOptions::new("a4".parse()?).with_margin(15.0))?;
//! ```

mod fit;

pub use fit::{layout, normalize_page_size, HAlign, LayoutOptions, VAlign};
