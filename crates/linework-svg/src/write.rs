//! SVG output: one `<g>` per pen layer.

use linework_core::{Color, Document};

/// Serialize a document to SVG.
///
/// The page size lands on the root element in millimeters with a
/// matching viewBox; missing page sizes fall back to the content
/// extent. Each layer becomes a group carrying its stroke color, pen
/// width, and an Inkscape layer label, with `fill="none"` throughout.
pub fn write_svg(document: &Document) -> String {
    let (width, height) = match document.page_size() {
        Some(dims) => (dims.width, dims.height),
        None => document
            .bounds()
            .map(|b| (b.max.x.max(1.0), b.max.y.max(1.0)))
            .unwrap_or((1.0, 1.0)),
    };

    let mut svg = String::new();
    svg.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" \
         xmlns:inkscape=\"http://www.inkscape.org/namespaces/inkscape\" \
         width=\"{w}mm\" height=\"{h}mm\" viewBox=\"0 0 {w} {h}\">\n",
        w = fmt_num(width),
        h = fmt_num(height),
    ));

    for (id, layer) in document.layers() {
        if layer.is_empty() {
            continue;
        }

        let label = match &layer.name {
            Some(name) => escape(name),
            None => format!("{id}"),
        };
        let color = layer.color.unwrap_or(Color::BLACK);

        svg.push_str(&format!(
            "  <g id=\"layer{id}\" inkscape:groupmode=\"layer\" \
             inkscape:label=\"{label}\" fill=\"none\" stroke=\"{color}\"",
            color = color.to_hex(),
        ));
        if let Some(pen_width) = layer.pen_width {
            svg.push_str(&format!(" stroke-width=\"{}\"", fmt_num(pen_width)));
        }
        svg.push_str(">\n");

        for path in layer.paths() {
            svg.push_str("    <path d=\"");
            for (i, p) in path.points().iter().enumerate() {
                if i == 0 {
                    svg.push_str(&format!("M {},{}", fmt_num(p.x), fmt_num(p.y)));
                } else {
                    svg.push_str(&format!(" L {},{}", fmt_num(p.x), fmt_num(p.y)));
                }
            }
            if path.is_closed() {
                svg.push_str(" Z");
            }
            svg.push_str("\"/>\n");
        }

        svg.push_str("  </g>\n");
    }

    svg.push_str("</svg>\n");
    svg
}

/// Format a coordinate with at most four decimals, no trailing zeros.
fn fmt_num(value: f64) -> String {
    let s = format!("{value:.4}");
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
