//! Iso-contour extraction from grayscale depth maps.

use image::imageops::FilterType;
use image::GenericImageView;

use linework_core::{Document, PageDims};

use crate::marching::trace_level;
use crate::TraceError;

/// Options for [`trace_isolines`].
#[derive(Debug, Clone)]
pub struct IsolineConfig {
    /// Number of distinct gray levels to contour, taken from the
    /// brightest end of the values actually present.
    pub max_levels: usize,

    /// Mask pixels with alpha below this are excluded from tracing.
    pub alpha_threshold: u8,

    /// Contours with fewer points are dropped.
    pub min_points: usize,

    /// Optional Douglas-Peucker tolerance, in pixels.
    pub simplify: Option<f64>,
}

impl Default for IsolineConfig {
    fn default() -> Self {
        Self {
            max_levels: 250,
            alpha_threshold: 200,
            min_points: 2,
            simplify: None,
        }
    }
}

/// Trace iso-contours of a grayscale depth image.
///
/// `depth` is a decodable image, converted to 8-bit grayscale. `mask`,
/// when given, is resized to the depth dimensions and its transparent
/// pixels (alpha below the threshold) are excluded from tracing; a mask
/// without an alpha channel excludes nothing.
///
/// The result is a single-layer document in pixel coordinates, y-down,
/// with the page sized to the image.
pub fn trace_isolines(
    depth: &[u8],
    mask: Option<&[u8]>,
    config: &IsolineConfig,
) -> Result<Document, TraceError> {
    let depth = image::load_from_memory(depth)
        .map_err(|e| TraceError::ImageDecode(e.to_string()))?
        .to_luma8();
    let (width, height) = depth.dimensions();
    if width == 0 || height == 0 {
        return Err(TraceError::EmptyImage);
    }

    let excluded = match mask {
        Some(bytes) => Some(decode_mask(bytes, width, height, config.alpha_threshold)?),
        None => None,
    };

    let data: Vec<f64> = depth.as_raw().iter().map(|&v| v as f64).collect();

    // Contour the brightest distinct values present, like a foreground
    // slice off a full-range depth map
    let mut present = [false; 256];
    for &v in depth.as_raw() {
        present[v as usize] = true;
    }
    let levels: Vec<f64> = present
        .iter()
        .enumerate()
        .filter(|(_, &p)| p)
        .map(|(v, _)| v as f64)
        .rev()
        .take(config.max_levels)
        .collect();

    let mut document = Document::new().with_page_size(PageDims::new(width as f64, height as f64));

    for level in levels.iter().rev() {
        for path in trace_level(&data, excluded.as_deref(), width, height, *level) {
            if path.len() < config.min_points {
                continue;
            }
            let path = match config.simplify {
                Some(tolerance) => path.simplify(tolerance),
                None => path,
            };
            document.push_path(1, path);
        }
    }

    Ok(document)
}

/// Decode the mask, resize it to the depth dimensions if needed, and
/// return the exclusion grid.
fn decode_mask(
    bytes: &[u8],
    width: u32,
    height: u32,
    alpha_threshold: u8,
) -> Result<Vec<bool>, TraceError> {
    let mask = image::load_from_memory(bytes).map_err(|e| TraceError::MaskDecode(e.to_string()))?;

    let has_alpha = mask.color().has_alpha();
    let mask = if mask.dimensions() == (width, height) {
        mask
    } else {
        mask.resize_exact(width, height, FilterType::Triangle)
    };

    // Without an alpha channel nothing is transparent, so nothing is excluded
    if !has_alpha {
        return Ok(vec![false; (width * height) as usize]);
    }

    let rgba = mask.to_rgba8();
    Ok(rgba.pixels().map(|p| p.0[3] < alpha_threshold).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayAlphaImage, GrayImage, Luma, LumaA};
    use std::io::Cursor;

    fn encode_gray(image: &GrayImage) -> Vec<u8> {
        let mut bytes = Cursor::new(Vec::new());
        image
            .write_to(&mut bytes, image::ImageFormat::Png)
            .expect("png encoding");
        bytes.into_inner()
    }

    fn encode_gray_alpha(image: &GrayAlphaImage) -> Vec<u8> {
        let mut bytes = Cursor::new(Vec::new());
        image
            .write_to(&mut bytes, image::ImageFormat::Png)
            .expect("png encoding");
        bytes.into_inner()
    }

    /// Horizontal brightness ramp: one vertical contour per level edge.
    fn ramp_png() -> Vec<u8> {
        let img = GrayImage::from_fn(12, 6, |x, _| Luma([(x * 20) as u8]));
        encode_gray(&img)
    }

    #[test]
    fn ramp_gives_vertical_contours() {
        let doc = trace_isolines(&ramp_png(), None, &IsolineConfig::default()).unwrap();

        assert_eq!(doc.layer_count(), 1);
        assert!(doc.path_count() > 0);

        let page = doc.page_size().unwrap();
        assert_eq!(page.width, 12.0);
        assert_eq!(page.height, 6.0);

        // Every contour of a pure x-ramp is a vertical line
        for (_, layer) in doc.layers() {
            for path in layer.paths() {
                let bounds = path.bounds().unwrap();
                assert!(bounds.width() < 1e-9, "expected vertical contour");
            }
        }
    }

    #[test]
    fn max_levels_caps_the_contour_count() {
        let config = IsolineConfig {
            max_levels: 3,
            ..IsolineConfig::default()
        };
        let doc = trace_isolines(&ramp_png(), None, &config).unwrap();
        // The ramp has 12 distinct values; level 0 has no crossings, so
        // capping at the 3 brightest keeps exactly 3 contours
        assert_eq!(doc.path_count(), 3);
    }

    #[test]
    fn transparent_mask_excludes_pixels() {
        // Left half transparent
        let mask = GrayAlphaImage::from_fn(12, 6, |x, _| {
            LumaA([255u8, if x < 6 { 0 } else { 255 }])
        });
        let doc = trace_isolines(
            &ramp_png(),
            Some(&encode_gray_alpha(&mask)),
            &IsolineConfig::default(),
        )
        .unwrap();

        let bounds = doc.bounds().unwrap();
        assert!(
            bounds.min.x >= 5.0,
            "contours in the masked half should be gone, min_x = {}",
            bounds.min.x
        );
    }

    #[test]
    fn opaque_mask_excludes_nothing() {
        let with_mask = {
            let mask = GrayImage::from_fn(12, 6, |_, _| Luma([255u8]));
            trace_isolines(
                &ramp_png(),
                Some(&encode_gray(&mask)),
                &IsolineConfig::default(),
            )
            .unwrap()
        };
        let without_mask = trace_isolines(&ramp_png(), None, &IsolineConfig::default()).unwrap();
        assert_eq!(with_mask.path_count(), without_mask.path_count());
    }

    #[test]
    fn mask_resizes_to_match() {
        // Mask at double resolution still lands on the right half
        let mask = GrayAlphaImage::from_fn(24, 12, |x, _| {
            LumaA([255u8, if x < 12 { 0 } else { 255 }])
        });
        let doc = trace_isolines(
            &ramp_png(),
            Some(&encode_gray_alpha(&mask)),
            &IsolineConfig::default(),
        )
        .unwrap();
        let bounds = doc.bounds().unwrap();
        assert!(bounds.min.x >= 4.0);
    }

    #[test]
    fn garbage_bytes_are_a_decode_error() {
        let err = trace_isolines(b"not a png", None, &IsolineConfig::default()).unwrap_err();
        assert!(matches!(err, TraceError::ImageDecode(_)));
    }
}
