//! The layered plotter document model.

use glam::DVec2;
use indexmap::IndexMap;

use crate::bounds::BoundingBox;
use crate::color::Color;
use crate::geometry::Path;
use crate::page::PageDims;

/// A single pen layer: paths drawn with one pen in one pass.
#[derive(Debug, Clone, Default)]
pub struct Layer {
    paths: Vec<Path>,
    /// Human-readable layer name (pen id after assignment).
    pub name: Option<String>,
    /// Stroke color the layer is drawn with.
    pub color: Option<Color>,
    /// Pen width in millimeters.
    pub pen_width: Option<f64>,
}

impl Layer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: Path) {
        if !path.is_empty() {
            self.paths.push(path);
        }
    }

    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn bounds(&self) -> Option<BoundingBox> {
        self.paths
            .iter()
            .filter_map(Path::bounds)
            .reduce(|acc, b| acc.union(&b))
    }

    pub fn translate(&mut self, delta: DVec2) {
        for path in &mut self.paths {
            path.translate(delta);
        }
    }

    pub fn scale(&mut self, factor: f64) {
        for path in &mut self.paths {
            path.scale(factor);
        }
    }

    /// Clip all paths to a rectangle, splitting paths that leave and re-enter.
    pub fn crop(&mut self, rect: &BoundingBox) {
        self.paths = self
            .paths
            .iter()
            .flat_map(|p| crate::clip::crop_path(p, rect))
            .collect();
    }

    /// Simplify every path with the given Douglas-Peucker tolerance.
    pub fn simplify(&mut self, tolerance: f64) {
        for path in &mut self.paths {
            *path = path.simplify(tolerance);
        }
    }
}

/// A plotter document: ordered pen layers plus an optional page size.
///
/// Layer ids are 1-based and keep insertion order. A document is built
/// once, transformed in place, and serialized; it holds no other state.
#[derive(Debug, Clone, Default)]
pub struct Document {
    layers: IndexMap<u32, Layer>,
    page_size: Option<PageDims>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page size, builder style.
    pub fn with_page_size(mut self, dims: PageDims) -> Self {
        self.page_size = Some(dims);
        self
    }

    pub fn page_size(&self) -> Option<PageDims> {
        self.page_size
    }

    pub fn set_page_size(&mut self, dims: PageDims) {
        self.page_size = Some(dims);
    }

    /// Get a layer, creating it empty if absent.
    pub fn ensure_layer(&mut self, id: u32) -> &mut Layer {
        self.layers.entry(id).or_default()
    }

    pub fn layer(&self, id: u32) -> Option<&Layer> {
        self.layers.get(&id)
    }

    pub fn layer_mut(&mut self, id: u32) -> Option<&mut Layer> {
        self.layers.get_mut(&id)
    }

    /// Iterate layers in insertion order.
    pub fn layers(&self) -> impl Iterator<Item = (u32, &Layer)> {
        self.layers.iter().map(|(&id, layer)| (id, layer))
    }

    pub fn layers_mut(&mut self) -> impl Iterator<Item = (u32, &mut Layer)> {
        self.layers.iter_mut().map(|(&id, layer)| (id, layer))
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// True when no layer holds any geometry.
    pub fn is_empty(&self) -> bool {
        self.layers.values().all(Layer::is_empty)
    }

    /// Total number of paths across all layers.
    pub fn path_count(&self) -> usize {
        self.layers.values().map(Layer::len).sum()
    }

    pub fn push_path(&mut self, layer_id: u32, path: Path) {
        self.ensure_layer(layer_id).push(path);
    }

    /// Bounding box over all geometry, or `None` for an empty document.
    pub fn bounds(&self) -> Option<BoundingBox> {
        self.layers
            .values()
            .filter_map(Layer::bounds)
            .reduce(|acc, b| acc.union(&b))
    }

    /// Translate all geometry by `(dx, dy)`.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        let delta = DVec2::new(dx, dy);
        for layer in self.layers.values_mut() {
            layer.translate(delta);
        }
    }

    /// Scale all geometry uniformly about the origin.
    pub fn scale(&mut self, factor: f64) {
        for layer in self.layers.values_mut() {
            layer.scale(factor);
        }
    }

    /// Clip all geometry to a rectangle.
    pub fn crop(&mut self, rect: &BoundingBox) {
        for layer in self.layers.values_mut() {
            layer.crop(rect);
        }
        self.layers.retain(|_, layer| !layer.is_empty());
    }

    /// Simplify every path with the given Douglas-Peucker tolerance.
    pub fn simplify(&mut self, tolerance: f64) {
        for layer in self.layers.values_mut() {
            layer.simplify(tolerance);
        }
    }
}
