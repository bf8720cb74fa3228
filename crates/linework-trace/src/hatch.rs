//! Tonal hatching of raster images.
//!
//! The image is blurred, split into three tone bands, and covered with
//! diagonal pen strokes: mid tones and darker get one diagonal
//! direction, dark tones additionally get the counter-diagonal
//! (cross-hatch). Light areas stay empty.

use glam::DVec2;

use linework_core::{Document, PageDims, Path};

use crate::TraceError;

/// Options for [`hatch_image`].
#[derive(Debug, Clone)]
pub struct HatchConfig {
    /// Spacing between hatch lines, in pixels.
    pub pitch: f64,

    /// Box-blur radius applied before thresholding, in pixels.
    pub blur_radius: u32,

    /// Tone boundaries: below `levels.0` is dark (cross-hatched),
    /// below `levels.1` is mid (hatched).
    pub levels: (u8, u8),

    /// Invert the tonal response (hatch light areas instead).
    pub invert: bool,
}

impl Default for HatchConfig {
    fn default() -> Self {
        Self {
            pitch: 5.0,
            blur_radius: 1,
            levels: (64, 128),
            invert: false,
        }
    }
}

/// Hatch a raster image into pen strokes.
///
/// Returns a single-layer document in pixel coordinates, y-down, page
/// sized to the image.
pub fn hatch_image(bytes: &[u8], config: &HatchConfig) -> Result<Document, TraceError> {
    let image = image::load_from_memory(bytes)
        .map_err(|e| TraceError::ImageDecode(e.to_string()))?
        .to_luma8();
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(TraceError::EmptyImage);
    }

    let mut gray: Vec<f64> = image.as_raw().iter().map(|&v| v as f64).collect();
    if config.invert {
        for v in &mut gray {
            *v = 255.0 - *v;
        }
    }
    let blurred = box_blur(&gray, width as usize, height as usize, config.blur_radius);

    let dark: Vec<bool> = blurred.iter().map(|&v| v < config.levels.0 as f64).collect();
    let mid: Vec<bool> = blurred.iter().map(|&v| v < config.levels.1 as f64).collect();

    let pitch = config.pitch.max(1.0).round() as i64;
    let mut document =
        Document::new().with_page_size(PageDims::new(width as f64, height as f64));

    for path in diagonal_runs(&mid, width, height, pitch, Diagonal::Down) {
        document.push_path(1, path);
    }
    for path in diagonal_runs(&dark, width, height, pitch, Diagonal::Up) {
        document.push_path(1, path);
    }

    Ok(document)
}

#[derive(Clone, Copy, PartialEq)]
enum Diagonal {
    /// Down-right: along (1, 1)
    Down,
    /// Up-right: along (1, -1)
    Up,
}

/// Walk 45-degree scanlines across the mask and turn contiguous masked
/// runs into strokes.
fn diagonal_runs(
    mask: &[bool],
    width: u32,
    height: u32,
    pitch: i64,
    direction: Diagonal,
) -> Vec<Path> {
    let w = width as i64;
    let h = height as i64;
    let mut paths = Vec::new();

    // Lines of constant c, where c = x - y (down-right) or c = x + y
    let range = match direction {
        Diagonal::Down => (-(h - 1), w - 1),
        Diagonal::Up => (0, w + h - 2),
    };

    let mut c = range.0;
    while c <= range.1 {
        let mut run_start: Option<(i64, i64)> = None;
        let mut run_end = (0i64, 0i64);

        // t runs along x; the y for this scanline follows from c
        for t in 0..w {
            let (x, y) = match direction {
                Diagonal::Down => (t, t - c),
                Diagonal::Up => (t, c - t),
            };
            let inside = x >= 0 && x < w && y >= 0 && y < h;
            let masked = inside && mask[(y * w + x) as usize];

            if masked {
                if run_start.is_none() {
                    run_start = Some((x, y));
                }
                run_end = (x, y);
            } else if let Some(start) = run_start.take() {
                push_run(&mut paths, start, run_end);
            }
        }
        if let Some(start) = run_start.take() {
            push_run(&mut paths, start, run_end);
        }

        c += pitch;
    }

    paths
}

fn push_run(paths: &mut Vec<Path>, start: (i64, i64), end: (i64, i64)) {
    if start == end {
        return;
    }
    paths.push(Path::new(vec![
        DVec2::new(start.0 as f64, start.1 as f64),
        DVec2::new(end.0 as f64, end.1 as f64),
    ]));
}

/// Separable box blur with the given radius.
fn box_blur(data: &[f64], width: usize, height: usize, radius: u32) -> Vec<f64> {
    if radius == 0 {
        return data.to_vec();
    }
    let r = radius as i64;

    let mut horizontal = vec![0.0; data.len()];
    for y in 0..height {
        for x in 0..width {
            let mut sum = 0.0;
            let mut count = 0.0;
            for dx in -r..=r {
                let nx = x as i64 + dx;
                if nx >= 0 && nx < width as i64 {
                    sum += data[y * width + nx as usize];
                    count += 1.0;
                }
            }
            horizontal[y * width + x] = sum / count;
        }
    }

    let mut out = vec![0.0; data.len()];
    for y in 0..height {
        for x in 0..width {
            let mut sum = 0.0;
            let mut count = 0.0;
            for dy in -r..=r {
                let ny = y as i64 + dy;
                if ny >= 0 && ny < height as i64 {
                    sum += horizontal[ny as usize * width + x];
                    count += 1.0;
                }
            }
            out[y * width + x] = sum / count;
        }
    }

    out
}
