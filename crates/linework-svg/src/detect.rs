//! Page-size detection for unlabeled SVG files.

use quick_xml::events::Event;
use quick_xml::Reader;

use linework_core::errors::SvgError;
use linework_core::page::NAMED_SIZES;
use linework_core::{Length, Orientation};

/// Relative tolerance when matching dimensions against a named size.
const TOLERANCE: f64 = 0.02;

/// A recognized page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageMatch {
    pub name: &'static str,
    pub orientation: Orientation,
}

/// Guess the named page size of an SVG document.
///
/// Parses the root `width`/`height`, converts to millimeters, and
/// compares against the named page table in both orientations with 2%
/// relative tolerance. Returns `None` when the dimensions are missing,
/// unitless-and-unparsable, or match nothing.
pub fn detect_page_size(source: &str) -> Result<Option<PageMatch>, SvgError> {
    let Some((width, height)) = root_dimensions(source)? else {
        return Ok(None);
    };

    for &(name, w, h) in NAMED_SIZES.iter() {
        if within_tolerance(width, w) && within_tolerance(height, h) {
            return Ok(Some(PageMatch {
                name,
                orientation: Orientation::Portrait,
            }));
        }
        if within_tolerance(width, h) && within_tolerance(height, w) {
            return Ok(Some(PageMatch {
                name,
                orientation: Orientation::Landscape,
            }));
        }
    }

    Ok(None)
}

fn within_tolerance(a: f64, b: f64) -> bool {
    let average = (a + b) / 2.0;
    if average <= 0.0 {
        return false;
    }
    (a - b).abs() / average <= TOLERANCE
}

/// Root `width`/`height` in millimeters, when both parse as lengths.
fn root_dimensions(source: &str) -> Result<Option<(f64, f64)>, SvgError> {
    let mut reader = Reader::from_str(source);

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() != b"svg" {
                    return Err(SvgError::MissingRoot);
                }
                let mut width = None;
                let mut height = None;
                for attr in e.attributes() {
                    let attr = attr.map_err(|err| SvgError::Xml {
                        message: err.to_string(),
                    })?;
                    let value = attr.unescape_value().map_err(|err| SvgError::Xml {
                        message: err.to_string(),
                    })?;
                    match attr.key.local_name().as_ref() {
                        b"width" => width = value.trim().parse::<Length>().ok(),
                        b"height" => height = value.trim().parse::<Length>().ok(),
                        _ => {}
                    }
                }
                return Ok(match (width, height) {
                    (Some(w), Some(h)) => Some((w.to_mm(), h.to_mm())),
                    _ => None,
                });
            }
            Ok(Event::Eof) => return Err(SvgError::MissingRoot),
            Ok(_) => {}
            Err(err) => {
                return Err(SvgError::Xml {
                    message: err.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn svg(width: &str, height: &str) -> String {
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}"/>"#
        )
    }

    #[test]
    fn exact_a4_portrait() {
        let m = detect_page_size(&svg("210mm", "297mm")).unwrap().unwrap();
        assert_eq!(m.name, "a4");
        assert_eq!(m.orientation, Orientation::Portrait);
    }

    #[test]
    fn a4_landscape() {
        let m = detect_page_size(&svg("297mm", "210mm")).unwrap().unwrap();
        assert_eq!(m.name, "a4");
        assert_eq!(m.orientation, Orientation::Landscape);
    }

    #[test]
    fn pixel_dimensions_within_tolerance() {
        // A5 is 148x210mm; 96dpi pixels: 559.37 x 793.70
        let m = detect_page_size(&svg("560px", "794px")).unwrap().unwrap();
        assert_eq!(m.name, "a5");
        assert_eq!(m.orientation, Orientation::Portrait);
    }

    #[test]
    fn off_by_more_than_two_percent_is_no_match() {
        assert_eq!(detect_page_size(&svg("230mm", "297mm")).unwrap(), None);
    }

    #[test]
    fn missing_or_relative_dimensions() {
        let source = r#"<svg xmlns="http://www.w3.org/2000/svg" width="100%" height="100%"/>"#;
        assert_eq!(detect_page_size(source).unwrap(), None);

        let source = r#"<svg xmlns="http://www.w3.org/2000/svg"/>"#;
        assert_eq!(detect_page_size(source).unwrap(), None);
    }
}
