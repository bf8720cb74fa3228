//! The page-fit transform.

use linework_core::errors::LayoutError;
use linework_core::{BoundingBox, Document, PageDims, PageSize};

/// Horizontal anchor for content placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// Vertical anchor for content placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VAlign {
    Top,
    #[default]
    Center,
    Bottom,
}

/// Options for the page-fit transform.
#[derive(Debug, Clone)]
pub struct LayoutOptions {
    /// Target page size, or `Tight` to size the page to the content.
    pub size: PageSize,
    /// Reorient a fixed page so width >= height (or the reverse when false).
    pub landscape: bool,
    /// Margin in millimeters. `Some` (including zero) scales the content
    /// to fit inside the margin; `None` only translates.
    pub margin: Option<f64>,
    pub halign: HAlign,
    pub valign: VAlign,
    /// Lay out against the document's declared page rectangle instead of
    /// the geometry bounding box.
    pub use_page_bounds: bool,
}

impl LayoutOptions {
    pub fn new(size: PageSize) -> Self {
        Self {
            size,
            landscape: false,
            margin: None,
            halign: HAlign::default(),
            valign: VAlign::default(),
            use_page_bounds: false,
        }
    }

    pub fn with_landscape(mut self, landscape: bool) -> Self {
        self.landscape = landscape;
        self
    }

    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = Some(margin);
        self
    }

    pub fn with_halign(mut self, halign: HAlign) -> Self {
        self.halign = halign;
        self
    }

    pub fn with_valign(mut self, valign: VAlign) -> Self {
        self.valign = valign;
        self
    }

    pub fn with_page_bounds(mut self, use_page_bounds: bool) -> Self {
        self.use_page_bounds = use_page_bounds;
        self
    }
}

/// Normalize page dimensions to respect the requested orientation.
///
/// Swaps width and height only when the current orientation disagrees
/// with the requested one.
pub fn normalize_page_size(dims: PageDims, landscape: bool) -> PageDims {
    if (landscape && dims.width < dims.height) || (!landscape && dims.width > dims.height) {
        dims.swapped()
    } else {
        dims
    }
}

/// Fit a document onto a page.
///
/// Mutates the document in place: assigns the resulting page size, then
/// translates (and, when a margin is given, scales) the geometry so it
/// sits on the page at the requested alignment.
///
/// Empty documents only get their page size assigned (or are left
/// untouched entirely when the target is `Tight`, since no page size can
/// be derived from empty content).
pub fn layout(document: &mut Document, options: &LayoutOptions) -> Result<(), LayoutError> {
    let fixed = match options.size {
        PageSize::Fixed(dims) => Some(normalize_page_size(dims, options.landscape)),
        PageSize::Tight => None,
    };

    let bounds = if options.use_page_bounds {
        document
            .page_size()
            .map(|d| BoundingBox::new(0.0, 0.0, d.width, d.height))
    } else {
        document.bounds()
    };

    let Some(bbox) = bounds else {
        if let Some(dims) = fixed {
            document.set_page_size(dims);
        }
        return Ok(());
    };

    let mut min_x = bbox.min.x;
    let mut min_y = bbox.min.y;
    let mut width = bbox.width();
    let mut height = bbox.height();

    // Scale-to-fit divides by the content extent; reject zero-extent
    // content before touching the document
    if options.margin.is_some() && (width == 0.0 || height == 0.0) {
        return Err(LayoutError::DegenerateBounds { width, height });
    }

    let size = match fixed {
        Some(dims) => dims,
        None => {
            let extra = 2.0 * options.margin.unwrap_or(0.0);
            PageDims::new(width + extra, height + extra)
        }
    };

    document.set_page_size(size);

    let margin = if let Some(margin) = options.margin {
        document.translate(-min_x, -min_y);
        let scale = ((size.width - 2.0 * margin) / width)
            .min((size.height - 2.0 * margin) / height);
        document.scale(scale);
        min_x = 0.0;
        min_y = 0.0;
        width *= scale;
        height *= scale;
        margin
    } else {
        0.0
    };

    let h_offset = match options.halign {
        HAlign::Left => margin - min_x,
        HAlign::Right => size.width - margin - width - min_x,
        HAlign::Center => margin + (size.width - width - 2.0 * margin) / 2.0 - min_x,
    };

    let v_offset = match options.valign {
        VAlign::Top => margin - min_y,
        VAlign::Bottom => size.height - margin - height - min_y,
        VAlign::Center => margin + (size.height - height - 2.0 * margin) / 2.0 - min_y,
    };

    document.translate(h_offset, v_offset);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;
    use linework_core::Path;

    const EPS: f64 = 1e-9;

    fn doc_with_bounds(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Document {
        let mut doc = Document::new();
        doc.push_path(
            1,
            Path::new(vec![DVec2::new(min_x, min_y), DVec2::new(max_x, max_y)]),
        );
        doc
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < EPS, "expected {b}, got {a}");
    }

    #[test]
    fn normalize_respects_orientation() {
        let dims = PageDims::new(100.0, 200.0);
        let landscape = normalize_page_size(dims, true);
        assert_eq!((landscape.width, landscape.height), (200.0, 100.0));

        let portrait = normalize_page_size(dims, false);
        assert_eq!((portrait.width, portrait.height), (100.0, 200.0));

        // Already in the requested orientation: unchanged
        let wide = PageDims::new(200.0, 100.0);
        let still_wide = normalize_page_size(wide, true);
        assert_eq!((still_wide.width, still_wide.height), (200.0, 100.0));
    }

    #[test]
    fn worked_scenario_center_center() {
        // bounds (10,10)-(50,30), target 100x50, margin 5:
        // scale = min(90/40, 40/20) = 2, content 80x40,
        // offsets (10, 5), final box (10,5)-(90,45)
        let mut doc = doc_with_bounds(10.0, 10.0, 50.0, 30.0);
        let options = LayoutOptions::new(PageSize::fixed(100.0, 50.0))
            .with_landscape(true)
            .with_margin(5.0);
        layout(&mut doc, &options).unwrap();

        let page = doc.page_size().unwrap();
        assert_close(page.width, 100.0);
        assert_close(page.height, 50.0);

        let bbox = doc.bounds().unwrap();
        assert_close(bbox.min.x, 10.0);
        assert_close(bbox.min.y, 5.0);
        assert_close(bbox.max.x, 90.0);
        assert_close(bbox.max.y, 45.0);
    }

    #[test]
    fn tight_with_zero_margin_wraps_content_exactly() {
        let mut doc = doc_with_bounds(10.0, 10.0, 50.0, 30.0);
        let options = LayoutOptions::new(PageSize::Tight).with_margin(0.0);
        layout(&mut doc, &options).unwrap();

        let page = doc.page_size().unwrap();
        assert_close(page.width, 40.0);
        assert_close(page.height, 20.0);

        let bbox = doc.bounds().unwrap();
        assert_close(bbox.min.x, 0.0);
        assert_close(bbox.min.y, 0.0);
        assert_close(bbox.max.x, 40.0);
        assert_close(bbox.max.y, 20.0);
    }

    #[test]
    fn tight_with_margin_adds_clearance_on_all_sides() {
        let mut doc = doc_with_bounds(10.0, 10.0, 50.0, 30.0);
        let options = LayoutOptions::new(PageSize::Tight).with_margin(7.0);
        layout(&mut doc, &options).unwrap();

        let page = doc.page_size().unwrap();
        assert_close(page.width, 54.0);
        assert_close(page.height, 34.0);

        let bbox = doc.bounds().unwrap();
        assert_close(bbox.min.x, 7.0);
        assert_close(bbox.min.y, 7.0);
        assert_close(bbox.max.x, 47.0);
        assert_close(bbox.max.y, 27.0);
    }

    #[test]
    fn tight_without_margin_only_translates() {
        let mut doc = doc_with_bounds(-3.0, 4.0, 7.0, 24.0);
        layout(&mut doc, &LayoutOptions::new(PageSize::Tight)).unwrap();

        let page = doc.page_size().unwrap();
        assert_close(page.width, 10.0);
        assert_close(page.height, 20.0);

        let bbox = doc.bounds().unwrap();
        assert_close(bbox.min.x, 0.0);
        assert_close(bbox.min.y, 0.0);
    }

    #[test]
    fn margin_absent_means_no_scaling() {
        let mut doc = doc_with_bounds(0.0, 0.0, 10.0, 10.0);
        layout(&mut doc, &LayoutOptions::new(PageSize::fixed(100.0, 200.0))).unwrap();

        let bbox = doc.bounds().unwrap();
        assert_close(bbox.width(), 10.0);
        assert_close(bbox.height(), 10.0);
        // Centered on the page
        assert_close(bbox.min.x, 45.0);
        assert_close(bbox.min.y, 95.0);
    }

    #[test]
    fn alignment_corners_without_scaling() {
        // margin absent: content keeps its 10x20 size, margin is 0 for
        // the alignment arithmetic
        for (halign, valign, expect_min) in [
            (HAlign::Left, VAlign::Top, (0.0, 0.0)),
            (HAlign::Right, VAlign::Bottom, (90.0, 180.0)),
            (HAlign::Left, VAlign::Bottom, (0.0, 180.0)),
            (HAlign::Right, VAlign::Top, (90.0, 0.0)),
        ] {
            let mut doc = doc_with_bounds(3.0, -4.0, 13.0, 16.0);
            let options = LayoutOptions::new(PageSize::fixed(100.0, 200.0))
                .with_halign(halign)
                .with_valign(valign);
            layout(&mut doc, &options).unwrap();

            let bbox = doc.bounds().unwrap();
            assert_close(bbox.width(), 10.0);
            assert_close(bbox.height(), 20.0);
            assert_close(bbox.min.x, expect_min.0);
            assert_close(bbox.min.y, expect_min.1);
        }
    }

    #[test]
    fn alignment_on_the_slack_axis_when_scaling() {
        // scale = min(90/10, 190/20) = 9: width binds exactly, so only
        // the vertical anchor moves the content
        for (valign, expect_min_y) in [
            (VAlign::Top, 5.0),
            (VAlign::Center, 10.0),
            (VAlign::Bottom, 15.0),
        ] {
            let mut doc = doc_with_bounds(0.0, 0.0, 10.0, 20.0);
            let options = LayoutOptions::new(PageSize::fixed(100.0, 200.0))
                .with_margin(5.0)
                .with_valign(valign);
            layout(&mut doc, &options).unwrap();

            let bbox = doc.bounds().unwrap();
            assert_close(bbox.width(), 90.0);
            assert_close(bbox.height(), 180.0);
            assert_close(bbox.min.x, 5.0);
            assert_close(bbox.min.y, expect_min_y);
        }
    }

    #[test]
    fn recentering_is_idempotent() {
        let mut doc = doc_with_bounds(13.0, -7.0, 57.0, 21.0);
        let options = LayoutOptions::new(PageSize::fixed(100.0, 200.0)).with_margin(10.0);

        layout(&mut doc, &options).unwrap();
        let first = doc.bounds().unwrap();

        layout(&mut doc, &options).unwrap();
        let second = doc.bounds().unwrap();

        assert_close(first.min.x, second.min.x);
        assert_close(first.min.y, second.min.y);
        assert_close(first.max.x, second.max.x);
        assert_close(first.max.y, second.max.y);
    }

    #[test]
    fn empty_document_with_fixed_size_only_sets_page() {
        let mut doc = Document::new();
        layout(&mut doc, &LayoutOptions::new(PageSize::fixed(100.0, 200.0))).unwrap();

        let page = doc.page_size().unwrap();
        assert_close(page.width, 100.0);
        assert_close(page.height, 200.0);
        assert!(doc.bounds().is_none());
    }

    #[test]
    fn empty_document_with_tight_size_is_untouched() {
        let mut doc = Document::new();
        layout(&mut doc, &LayoutOptions::new(PageSize::Tight)).unwrap();
        assert!(doc.page_size().is_none());
    }

    #[test]
    fn degenerate_bounds_with_margin_is_an_error() {
        // A horizontal line has zero height
        let mut doc = doc_with_bounds(0.0, 5.0, 10.0, 5.0);
        let options = LayoutOptions::new(PageSize::fixed(100.0, 100.0)).with_margin(5.0);

        let err = layout(&mut doc, &options).unwrap_err();
        match err {
            LayoutError::DegenerateBounds { width, height } => {
                assert_close(width, 10.0);
                assert_close(height, 0.0);
            }
        }
        // The failed call must not have touched the document
        assert!(doc.page_size().is_none());
        assert_close(doc.bounds().unwrap().min.x, 0.0);
    }

    #[test]
    fn degenerate_bounds_without_margin_is_fine() {
        let mut doc = doc_with_bounds(0.0, 5.0, 10.0, 5.0);
        layout(&mut doc, &LayoutOptions::new(PageSize::fixed(100.0, 100.0))).unwrap();
        let bbox = doc.bounds().unwrap();
        assert_close(bbox.min.x, 45.0);
        assert_close(bbox.min.y, 50.0);
    }

    #[test]
    fn page_bounds_override_uses_declared_rectangle() {
        let mut doc = doc_with_bounds(10.0, 10.0, 20.0, 20.0);
        doc.set_page_size(PageDims::new(100.0, 100.0));

        let options = LayoutOptions::new(PageSize::fixed(200.0, 200.0))
            .with_margin(0.0)
            .with_page_bounds(true);
        layout(&mut doc, &options).unwrap();

        // The 100x100 page rectangle scales by 2; the content follows
        let bbox = doc.bounds().unwrap();
        assert_close(bbox.min.x, 20.0);
        assert_close(bbox.min.y, 20.0);
        assert_close(bbox.max.x, 40.0);
        assert_close(bbox.max.y, 40.0);
    }

    #[test]
    fn page_bounds_override_without_page_size_acts_like_empty() {
        let mut doc = doc_with_bounds(10.0, 10.0, 20.0, 20.0);
        let options = LayoutOptions::new(PageSize::fixed(50.0, 60.0)).with_page_bounds(true);
        layout(&mut doc, &options).unwrap();

        let page = doc.page_size().unwrap();
        assert_close(page.width, 50.0);
        assert_close(page.height, 60.0);
        // Geometry untouched
        let bbox = doc.bounds().unwrap();
        assert_close(bbox.min.x, 10.0);
    }

    #[test]
    fn landscape_applies_before_fitting() {
        let mut doc = doc_with_bounds(0.0, 0.0, 40.0, 20.0);
        let options = LayoutOptions::new(PageSize::fixed(50.0, 100.0))
            .with_landscape(true)
            .with_margin(5.0);
        layout(&mut doc, &options).unwrap();

        let page = doc.page_size().unwrap();
        assert_close(page.width, 100.0);
        assert_close(page.height, 50.0);
    }
}
