//! SVG reading: geometry into pen layers, grouped by stroke color.

use glam::DVec2;
use indexmap::IndexMap;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use linework_core::errors::SvgError;
use linework_core::{BoundingBox, Color, Document, Length, PageDims, Path, Unit};

use crate::path_data::parse_path_data;
use crate::strokes::element_stroke;
use crate::transform::{self, Matrix, IDENTITY};

/// Options for [`read_svg`].
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Maximum deviation when flattening curves, in document millimeters.
    pub quantization: f64,
    /// Douglas-Peucker tolerance applied after reading, in millimeters.
    pub simplify: Option<f64>,
    /// Clip the geometry to the page rectangle.
    pub crop: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            quantization: 0.1,
            simplify: None,
            crop: false,
        }
    }
}

/// Per-element state inherited down the tree.
#[derive(Debug, Clone)]
struct Frame {
    ctm: Matrix,
    /// Effective stroke value; `None` means unset.
    stroke: Option<String>,
}

struct ReadState {
    document: Document,
    /// Stroke value -> layer id, in first-seen order. `None` keys the
    /// default layer for unstroked geometry.
    layers: IndexMap<Option<String>, u32>,
    quantization: f64,
}

impl ReadState {
    fn layer_for(&mut self, stroke: &Option<String>) -> u32 {
        let key = match stroke.as_deref() {
            None | Some("none") => None,
            Some(raw) => Some(canonical_stroke(raw)),
        };
        if let Some(&id) = self.layers.get(&key) {
            return id;
        }
        let id = self.layers.len() as u32 + 1;
        let layer = self.document.ensure_layer(id);
        if let Some(raw) = &key {
            layer.color = raw.parse::<Color>().ok();
        }
        self.layers.insert(key, id);
        id
    }

    fn emit(&mut self, e: &BytesStart, frame: &Frame) -> Result<(), SvgError> {
        let tolerance = self.quantization / transform::scale_magnitude(&frame.ctm);
        let paths = match e.local_name().as_ref() {
            b"path" => match attr(e, b"d")? {
                Some(d) => parse_path_data(&d, tolerance)?,
                None => Vec::new(),
            },
            b"line" => {
                let x1 = fattr(e, b"x1")?.unwrap_or(0.0);
                let y1 = fattr(e, b"y1")?.unwrap_or(0.0);
                let x2 = fattr(e, b"x2")?.unwrap_or(0.0);
                let y2 = fattr(e, b"y2")?.unwrap_or(0.0);
                vec![Path::new(vec![DVec2::new(x1, y1), DVec2::new(x2, y2)])]
            }
            b"rect" => {
                let x = fattr(e, b"x")?.unwrap_or(0.0);
                let y = fattr(e, b"y")?.unwrap_or(0.0);
                let w = fattr(e, b"width")?.unwrap_or(0.0);
                let h = fattr(e, b"height")?.unwrap_or(0.0);
                if w <= 0.0 || h <= 0.0 {
                    Vec::new()
                } else {
                    vec![Path::closed(vec![
                        DVec2::new(x, y),
                        DVec2::new(x + w, y),
                        DVec2::new(x + w, y + h),
                        DVec2::new(x, y + h),
                    ])]
                }
            }
            b"polyline" | b"polygon" => {
                let closed = e.local_name().as_ref() == b"polygon";
                match attr(e, b"points")? {
                    Some(points) => {
                        let coords = parse_point_list(&points)?;
                        if coords.len() < 2 {
                            Vec::new()
                        } else if closed {
                            vec![Path::closed(coords)]
                        } else {
                            vec![Path::new(coords)]
                        }
                    }
                    None => Vec::new(),
                }
            }
            b"circle" => {
                let cx = fattr(e, b"cx")?.unwrap_or(0.0);
                let cy = fattr(e, b"cy")?.unwrap_or(0.0);
                let r = fattr(e, b"r")?.unwrap_or(0.0);
                ellipse_path(DVec2::new(cx, cy), r, r, tolerance)
            }
            b"ellipse" => {
                let cx = fattr(e, b"cx")?.unwrap_or(0.0);
                let cy = fattr(e, b"cy")?.unwrap_or(0.0);
                let rx = fattr(e, b"rx")?.unwrap_or(0.0);
                let ry = fattr(e, b"ry")?.unwrap_or(0.0);
                ellipse_path(DVec2::new(cx, cy), rx, ry, tolerance)
            }
            _ => Vec::new(),
        };

        if paths.is_empty() {
            return Ok(());
        }

        let layer_id = self.layer_for(&frame.stroke);
        for path in paths {
            let mapped: Vec<DVec2> = path
                .points()
                .iter()
                .map(|&p| transform::apply(&frame.ctm, p))
                .collect();
            let mapped = if path.is_closed() {
                Path::closed(mapped)
            } else {
                Path::new(mapped)
            };
            self.document.push_path(layer_id, mapped);
        }
        Ok(())
    }
}

/// Read an SVG string into a layered document.
///
/// Geometry groups into layers by effective stroke color in first-seen
/// order; unstroked geometry goes to a shared default layer. The page
/// size comes from the root `width`/`height` (or the viewBox extent),
/// converted to millimeters.
pub fn read_svg(source: &str, options: &ReadOptions) -> Result<Document, SvgError> {
    let mut reader = Reader::from_str(source);
    let mut stack: Vec<Frame> = Vec::new();
    let mut state = ReadState {
        document: Document::new(),
        layers: IndexMap::new(),
        quantization: options.quantization.max(1e-6),
    };
    let mut page: Option<PageDims> = None;
    let mut seen_root = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let frame = if !seen_root {
                    if e.local_name().as_ref() != b"svg" {
                        return Err(SvgError::MissingRoot);
                    }
                    seen_root = true;
                    let (dims, root) = root_viewport(&e)?;
                    page = dims;
                    Frame { ctm: root, stroke: None }
                } else {
                    child_frame(stack.last(), &e)?
                };
                if is_drawable(&e) {
                    state.emit(&e, &frame)?;
                }
                stack.push(frame);
            }
            Ok(Event::Empty(e)) => {
                if !seen_root {
                    // A self-closing root is a legal, if empty, document
                    if e.local_name().as_ref() != b"svg" {
                        return Err(SvgError::MissingRoot);
                    }
                    seen_root = true;
                    let (dims, _) = root_viewport(&e)?;
                    page = dims;
                    continue;
                }
                let frame = child_frame(stack.last(), &e)?;
                if is_drawable(&e) {
                    state.emit(&e, &frame)?;
                }
            }
            Ok(Event::End(_)) => {
                stack.pop();
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                return Err(SvgError::Xml {
                    message: err.to_string(),
                })
            }
        }
    }

    if !seen_root {
        return Err(SvgError::MissingRoot);
    }

    if let Some(dims) = page {
        state.document.set_page_size(dims);
        if options.crop {
            state
                .document
                .crop(&BoundingBox::new(0.0, 0.0, dims.width, dims.height));
        }
    }

    if let Some(tolerance) = options.simplify {
        state.document.simplify(tolerance);
    }

    Ok(state.document)
}

fn is_drawable(e: &BytesStart) -> bool {
    matches!(
        e.local_name().as_ref(),
        b"path" | b"line" | b"rect" | b"polyline" | b"polygon" | b"circle" | b"ellipse"
    )
}

fn child_frame(parent: Option<&Frame>, e: &BytesStart) -> Result<Frame, SvgError> {
    let (parent_ctm, parent_stroke) = match parent {
        Some(f) => (f.ctm, f.stroke.clone()),
        None => (IDENTITY, None),
    };

    let ctm = match attr(e, b"transform")? {
        Some(t) => transform::multiply(parent_ctm, transform::parse_transform(&t)?),
        None => parent_ctm,
    };

    let stroke = match element_stroke(e)? {
        Some(value) if value == "inherit" => parent_stroke,
        Some(value) => Some(value),
        None => parent_stroke,
    };

    Ok(Frame { ctm, stroke })
}

/// Page dimensions and the user-unit -> millimeter root transform.
fn root_viewport(e: &BytesStart) -> Result<(Option<PageDims>, Matrix), SvgError> {
    let px = Unit::Px.to_mm();

    let width = dim_attr(e, b"width")?;
    let height = dim_attr(e, b"height")?;
    let viewbox = match attr(e, b"viewBox")? {
        Some(value) => Some(parse_viewbox(&value)?),
        None => None,
    };

    match (width, height, viewbox) {
        (Some(w), Some(h), Some((min_x, min_y, vw, vh))) if vw > 0.0 && vh > 0.0 => {
            let scale = [w / vw, 0.0, 0.0, h / vh, 0.0, 0.0];
            let shift = [1.0, 0.0, 0.0, 1.0, -min_x, -min_y];
            Ok((
                Some(PageDims::new(w, h)),
                transform::multiply(scale, shift),
            ))
        }
        (Some(w), Some(h), None) => {
            // No viewBox: user units are CSS pixels
            Ok((Some(PageDims::new(w, h)), [px, 0.0, 0.0, px, 0.0, 0.0]))
        }
        (_, _, Some((min_x, min_y, vw, vh))) => {
            let shift = [1.0, 0.0, 0.0, 1.0, -min_x, -min_y];
            Ok((
                Some(PageDims::new(vw * px, vh * px)),
                transform::multiply([px, 0.0, 0.0, px, 0.0, 0.0], shift),
            ))
        }
        _ => Ok((None, [px, 0.0, 0.0, px, 0.0, 0.0])),
    }
}

fn parse_viewbox(value: &str) -> Result<(f64, f64, f64, f64), SvgError> {
    let mut parts = value
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(str::parse::<f64>);

    let invalid = || SvgError::InvalidDimension {
        value: value.to_string(),
    };

    let min_x = parts.next().ok_or_else(invalid)?.map_err(|_| invalid())?;
    let min_y = parts.next().ok_or_else(invalid)?.map_err(|_| invalid())?;
    let w = parts.next().ok_or_else(invalid)?.map_err(|_| invalid())?;
    let h = parts.next().ok_or_else(invalid)?.map_err(|_| invalid())?;
    Ok((min_x, min_y, w, h))
}

fn attr(e: &BytesStart, name: &[u8]) -> Result<Option<String>, SvgError> {
    for a in e.attributes() {
        let a = a.map_err(|err| SvgError::Xml {
            message: err.to_string(),
        })?;
        if a.key.local_name().as_ref() == name {
            let value = a.unescape_value().map_err(|err| SvgError::Xml {
                message: err.to_string(),
            })?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Numeric attribute in user units.
fn fattr(e: &BytesStart, name: &[u8]) -> Result<Option<f64>, SvgError> {
    match attr(e, name)? {
        Some(value) => value
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| SvgError::InvalidDimension { value }),
        None => Ok(None),
    }
}

/// Dimension attribute with an optional unit, in millimeters.
fn dim_attr(e: &BytesStart, name: &[u8]) -> Result<Option<f64>, SvgError> {
    match attr(e, name)? {
        Some(value) => match value.trim().parse::<Length>() {
            Ok(length) => Ok(Some(length.to_mm())),
            // Percentages and other non-lengths carry no absolute size
            Err(_) => Ok(None),
        },
        None => Ok(None),
    }
}

fn parse_point_list(value: &str) -> Result<Vec<DVec2>, SvgError> {
    let mut coords = Vec::new();
    for part in value
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
    {
        coords.push(
            part.parse::<f64>()
                .map_err(|_| SvgError::InvalidDimension {
                    value: value.to_string(),
                })?,
        );
    }
    Ok(coords
        .chunks_exact(2)
        .map(|c| DVec2::new(c[0], c[1]))
        .collect())
}

/// Canonical form of a stroke value, so `#FF0000`, `#f00`, and `red`
/// group into one layer.
fn canonical_stroke(raw: &str) -> String {
    match raw.parse::<Color>() {
        Ok(color) => color.to_hex(),
        Err(_) => raw.to_ascii_lowercase(),
    }
}

/// Sampled closed ellipse; the step keeps the sagitta under `tolerance`.
fn ellipse_path(center: DVec2, rx: f64, ry: f64, tolerance: f64) -> Vec<Path> {
    if rx <= 0.0 || ry <= 0.0 {
        return Vec::new();
    }
    let r_max = rx.max(ry);
    let step = if tolerance < r_max {
        2.0 * (1.0 - tolerance / r_max).acos()
    } else {
        std::f64::consts::FRAC_PI_2
    };
    let n = ((std::f64::consts::TAU / step).ceil() as usize).max(8);

    let points = (0..n)
        .map(|i| {
            let theta = std::f64::consts::TAU * (i as f64) / (n as f64);
            center + DVec2::new(rx * theta.cos(), ry * theta.sin())
        })
        .collect();
    vec![Path::closed(points)]
}
