//! Cleanup pass for figure-export artifacts.

use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};

use linework_core::errors::SvgError;

use crate::strokes::style_value;

fn xml_err(err: impl std::fmt::Display) -> SvgError {
    SvgError::Xml {
        message: err.to_string(),
    }
}

/// Strip the artifacts a raster-figure export leaves behind: `<path>`
/// elements styled with a white fill (background rectangles) and
/// `<path>` elements with no `d` attribute. Everything else passes
/// through byte-for-byte in order.
pub fn clean_svg(source: &str) -> Result<String, SvgError> {
    let mut reader = Reader::from_str(source);
    let mut writer = Writer::new(Vec::new());
    let mut skip_depth = 0usize;

    loop {
        let event = reader.read_event().map_err(xml_err)?;
        match event {
            Event::Eof => break,
            Event::Start(ref e) => {
                if skip_depth > 0 {
                    skip_depth += 1;
                    continue;
                }
                if should_drop(e)? {
                    skip_depth = 1;
                    continue;
                }
                writer.write_event(event).map_err(xml_err)?;
            }
            Event::Empty(ref e) => {
                if skip_depth == 0 && !should_drop(e)? {
                    writer.write_event(event).map_err(xml_err)?;
                }
            }
            Event::End(_) => {
                if skip_depth > 0 {
                    skip_depth -= 1;
                    continue;
                }
                writer.write_event(event).map_err(xml_err)?;
            }
            other => {
                if skip_depth == 0 {
                    writer.write_event(other).map_err(xml_err)?;
                }
            }
        }
    }

    String::from_utf8(writer.into_inner()).map_err(xml_err)
}

/// A path is dropped when its style fills white, or when it has no
/// path data at all.
fn should_drop(e: &BytesStart) -> Result<bool, SvgError> {
    if e.local_name().as_ref() != b"path" {
        return Ok(false);
    }

    let mut has_d = false;
    let mut white_fill = false;

    for attr in e.attributes() {
        let attr = attr.map_err(xml_err)?;
        match attr.key.local_name().as_ref() {
            b"d" => has_d = true,
            b"style" => {
                let value = attr.unescape_value().map_err(xml_err)?;
                if let Some(fill) = style_value(&value, "fill") {
                    white_fill = fill.eq_ignore_ascii_case("#ffffff");
                }
            }
            _ => {}
        }
    }

    Ok(white_fill || !has_d)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_white_filled_and_dataless_paths() {
        let source = r##"<svg xmlns="http://www.w3.org/2000/svg"><path style="fill: #ffffff; stroke: none" d="M 0 0 L 10 0"/><path d="M 1 1 L 2 2"/><path stroke="#000000"/><path d="M 3 3 L 4 4"/></svg>"##;
        let cleaned = clean_svg(source).unwrap();

        assert!(!cleaned.contains("#ffffff"));
        assert!(cleaned.contains(r#"d="M 1 1 L 2 2""#));
        assert!(cleaned.contains(r#"d="M 3 3 L 4 4""#));
        // The d-less path is gone entirely
        assert!(!cleaned.contains("stroke=\"#000000\""));
    }

    #[test]
    fn preserves_sibling_order_and_other_elements() {
        let source = r##"<svg xmlns="http://www.w3.org/2000/svg"><g id="first"><path d="M 0 0"/></g><path style="fill:#FFFFFF"/><g id="second"/></svg>"##;
        let cleaned = clean_svg(source).unwrap();

        let first = cleaned.find("first").unwrap();
        let second = cleaned.find("second").unwrap();
        assert!(first < second);
        assert!(!cleaned.contains("FFFFFF"));
    }

    #[test]
    fn children_of_dropped_paths_go_with_them() {
        let source = r##"<svg xmlns="http://www.w3.org/2000/svg"><path style="fill:#ffffff"><title>background</title></path><path d="M 0 0 L 1 1"/></svg>"##;
        let cleaned = clean_svg(source).unwrap();

        assert!(!cleaned.contains("background"));
        assert!(cleaned.contains(r#"d="M 0 0 L 1 1""#));
    }

    #[test]
    fn colored_fills_survive() {
        let source = r##"<svg xmlns="http://www.w3.org/2000/svg"><path style="fill: #ff00ff" d="M 0 0 L 1 1"/></svg>"##;
        let cleaned = clean_svg(source).unwrap();
        assert!(cleaned.contains("#ff00ff"));
    }
}
