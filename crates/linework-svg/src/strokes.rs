//! Stroke-color inspection over raw markup.

use indexmap::IndexMap;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use linework_core::errors::SvgError;

/// Look up a property in a `style` attribute value.
pub(crate) fn style_value<'a>(style: &'a str, property: &str) -> Option<&'a str> {
    style.split(';').find_map(|decl| {
        let (name, value) = decl.split_once(':')?;
        (name.trim() == property).then(|| value.trim())
    })
}

/// Effective stroke of an element: the `stroke` attribute, or the
/// `stroke` property of its `style` attribute.
pub(crate) fn element_stroke(e: &BytesStart) -> Result<Option<String>, SvgError> {
    let mut from_style = None;
    for attr in e.attributes() {
        let attr = attr.map_err(|err| SvgError::Xml {
            message: err.to_string(),
        })?;
        let value = attr.unescape_value().map_err(|err| SvgError::Xml {
            message: err.to_string(),
        })?;
        match attr.key.local_name().as_ref() {
            b"stroke" => return Ok(Some(value.trim().to_string())),
            b"style" => {
                from_style = style_value(&value, "stroke").map(str::to_string);
            }
            _ => {}
        }
    }
    Ok(from_style)
}

fn is_paint(value: &str) -> bool {
    value != "none" && value != "inherit"
}

/// Unique stroke colors in document order.
///
/// Both `stroke` attributes and `stroke` style properties count;
/// `none` and `inherit` are skipped.
pub fn stroke_colors(source: &str) -> Result<Vec<String>, SvgError> {
    let mut reader = Reader::from_str(source);
    let mut colors: Vec<String> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if let Some(stroke) = element_stroke(&e)? {
                    if is_paint(&stroke) && !colors.iter().any(|c| *c == stroke) {
                        colors.push(stroke);
                    }
                }
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

    Ok(colors)
}

/// Stroke colors of the top-level `<g>` elements, keyed by 1-based
/// position. Groups without a stroke of their own are absent.
pub fn layer_colors(source: &str) -> Result<IndexMap<u32, String>, SvgError> {
    let mut reader = Reader::from_str(source);
    let mut colors = IndexMap::new();
    let mut depth = 0usize;
    let mut group_index = 0u32;
    let mut seen_root = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if depth == 0 && e.local_name().as_ref() == b"svg" {
                    seen_root = true;
                }
                if depth == 1 && seen_root && e.local_name().as_ref() == b"g" {
                    group_index += 1;
                    if let Some(stroke) = element_stroke(&e)? {
                        if is_paint(&stroke) {
                            colors.insert(group_index, stroke);
                        }
                    }
                }
                depth += 1;
            }
            Ok(Event::Empty(e)) => {
                if depth == 1 && seen_root && e.local_name().as_ref() == b"g" {
                    group_index += 1;
                    if let Some(stroke) = element_stroke(&e)? {
                        if is_paint(&stroke) {
                            colors.insert(group_index, stroke);
                        }
                    }
                }
            }
            Ok(Event::End(_)) => depth = depth.saturating_sub(1),
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

    Ok(colors)
}
