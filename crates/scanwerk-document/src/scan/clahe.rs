// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Contrast-limited adaptive histogram equalization (CLAHE).
//
// The image is cut into a grid of tiles. Each tile gets its own equalization
// lookup table built from a clipped histogram, and every output pixel blends
// the tables of the four nearest tile centres bilinearly so tile seams do not
// show.

use image::{GrayImage, Luma};
use tracing::debug;

const BINS: usize = 256;

/// Equalize `gray` over a `grid` of (columns, rows) tiles.
///
/// `clip_limit` is relative to a perfectly flat histogram: 2.0 lets any bin
/// hold at most twice its uniform share before the excess is spread out. The
/// grid is clamped so no tile is narrower than one pixel.
pub fn clahe(gray: &GrayImage, clip_limit: f64, grid: (u32, u32)) -> GrayImage {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return gray.clone();
    }
    let cols = grid.0.clamp(1, width);
    let rows = grid.1.clamp(1, height);

    let mut luts = Vec::with_capacity((cols * rows) as usize);
    for ty in 0..rows {
        let (y0, y1) = tile_span(ty, rows, height);
        for tx in 0..cols {
            let (x0, x1) = tile_span(tx, cols, width);
            luts.push(tile_lut(gray, x0..x1, y0..y1, clip_limit));
        }
    }
    debug!(cols, rows, clip_limit, "CLAHE tile tables built");

    let tile_w = width as f64 / cols as f64;
    let tile_h = height as f64 / rows as f64;
    let lut_at = |tx: u32, ty: u32| &luts[(ty * cols + tx) as usize];

    GrayImage::from_fn(width, height, |x, y| {
        let (tx0, tx1, wx) = neighbours(x, tile_w, cols);
        let (ty0, ty1, wy) = neighbours(y, tile_h, rows);
        let v = gray.get_pixel(x, y).0[0] as usize;

        let top = lut_at(tx0, ty0)[v] * (1.0 - wx) + lut_at(tx1, ty0)[v] * wx;
        let bottom = lut_at(tx0, ty1)[v] * (1.0 - wx) + lut_at(tx1, ty1)[v] * wx;
        let blended = top * (1.0 - wy) + bottom * wy;
        Luma([blended.round().clamp(0.0, 255.0) as u8])
    })
}

/// Pixel span `[start, end)` of tile `index` out of `count` along `len` pixels.
fn tile_span(index: u32, count: u32, len: u32) -> (u32, u32) {
    let start = (index as u64 * len as u64 / count as u64) as u32;
    let end = ((index as u64 + 1) * len as u64 / count as u64) as u32;
    (start, end)
}

/// The two tiles whose centres bracket coordinate `pos`, and the weight of the
/// second one.
fn neighbours(pos: u32, tile_len: f64, count: u32) -> (u32, u32, f32) {
    let f = (pos as f64 + 0.5) / tile_len - 0.5;
    let floor = f.floor();
    let last = count as i64 - 1;
    let i0 = floor as i64;
    if i0 < 0 {
        (0, 0, 0.0)
    } else if i0 >= last {
        (last as u32, last as u32, 0.0)
    } else {
        (i0 as u32, i0 as u32 + 1, (f - floor) as f32)
    }
}

/// Equalization table for one tile, built from its clipped histogram.
fn tile_lut(
    gray: &GrayImage,
    xs: std::ops::Range<u32>,
    ys: std::ops::Range<u32>,
    clip_limit: f64,
) -> [f32; BINS] {
    let mut hist = [0u32; BINS];
    for y in ys.clone() {
        for x in xs.clone() {
            hist[gray.get_pixel(x, y).0[0] as usize] += 1;
        }
    }
    let area = (xs.len() * ys.len()) as u32;

    let clip = ((clip_limit * area as f64 / BINS as f64) as u32).max(1);
    clip_histogram(&mut hist, clip);

    let scale = 255.0 / area.max(1) as f32;
    let mut lut = [0.0f32; BINS];
    let mut cumulative = 0u32;
    for (bin, slot) in hist.iter().zip(lut.iter_mut()) {
        cumulative += bin;
        *slot = (cumulative as f32 * scale).round().min(255.0);
    }
    lut
}

/// Cap every bin at `clip` and hand the excess back out evenly, with any
/// remainder spread one count at a time across the range.
fn clip_histogram(hist: &mut [u32; BINS], clip: u32) {
    let mut excess = 0u32;
    for bin in hist.iter_mut() {
        if *bin > clip {
            excess += *bin - clip;
            *bin = clip;
        }
    }
    if excess == 0 {
        return;
    }

    let batch = excess / BINS as u32;
    let mut residual = excess - batch * BINS as u32;
    for bin in hist.iter_mut() {
        *bin += batch;
    }
    if residual > 0 {
        let step = (BINS / residual as usize).max(1);
        for bin in hist.iter_mut().step_by(step) {
            if residual == 0 {
                break;
            }
            *bin += 1;
            residual -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn std_dev(gray: &GrayImage) -> f64 {
        let n = gray.as_raw().len() as f64;
        let mean = gray.as_raw().iter().map(|&v| v as f64).sum::<f64>() / n;
        let var = gray
            .as_raw()
            .iter()
            .map(|&v| (v as f64 - mean).powi(2))
            .sum::<f64>()
            / n;
        var.sqrt()
    }

    #[test]
    fn uniform_input_stays_uniform() {
        let gray = GrayImage::from_pixel(40, 40, Luma([100]));
        let out = clahe(&gray, 2.0, (8, 8));
        let first = out.get_pixel(0, 0).0[0];
        assert!(out.pixels().all(|p| p.0[0] == first));
    }

    #[test]
    fn low_contrast_gradient_is_stretched() {
        let gray = GrayImage::from_fn(256, 64, |x, _| Luma([100 + (x / 16) as u8]));
        let out = clahe(&gray, 2.0, (2, 2));
        assert!(std_dev(&out) > std_dev(&gray));
    }

    #[test]
    fn grid_larger_than_image_is_clamped() {
        let gray = GrayImage::from_fn(3, 2, |x, y| Luma([(x * 50 + y * 20) as u8]));
        let out = clahe(&gray, 2.0, (8, 8));
        assert_eq!(out.dimensions(), (3, 2));
    }

    #[test]
    fn clipping_conserves_the_pixel_count() {
        let mut hist = [0u32; BINS];
        hist[10] = 500;
        hist[200] = 37;
        clip_histogram(&mut hist, 8);
        assert_eq!(hist.iter().sum::<u32>(), 537);
        assert!(hist[10] <= 8 + 3);
    }

    #[test]
    fn tiles_cover_every_pixel() {
        let spans: Vec<_> = (0..3).map(|i| tile_span(i, 3, 10)).collect();
        assert_eq!(spans, vec![(0, 3), (3, 6), (6, 10)]);
    }
}
