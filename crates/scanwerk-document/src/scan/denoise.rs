// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Non-local means denoising.
//
// Every output pixel is a weighted average of the pixels in a search window
// around it, weighted by how similar the patch around each candidate is to
// the patch around the pixel itself. Patch distances for one search offset
// are read from a summed-area table, so the cost per offset is constant in
// the patch size.

use tracing::debug;

use crate::image::Plane;

/// Denoise one channel.
///
/// `h` is the filter strength: larger values smooth more and also remove more
/// detail. `template_size` is the side of the compared patch and
/// `search_size` the side of the window searched for similar patches.
pub fn nl_means(plane: &Plane, h: f32, template_size: u32, search_size: u32) -> Plane {
    let (width, height) = (plane.width(), plane.height());
    if width == 0 || height == 0 {
        return plane.clone();
    }
    let patch_radius = template_size / 2;
    let search_radius = (search_size / 2) as i64;
    let h2 = (h * h).max(f32::EPSILON) as f64;

    let len = width as usize * height as usize;
    let mut acc = vec![0.0f64; len];
    let mut weights = vec![0.0f64; len];
    let mut sq_diff = Plane::new(width, height);

    for dy in -search_radius..=search_radius {
        for dx in -search_radius..=search_radius {
            for y in 0..height {
                for x in 0..width {
                    let shifted = plane.get_clamped(x as i64 + dx, y as i64 + dy);
                    let d = plane.get(x, y) - shifted;
                    sq_diff.set(x, y, d * d);
                }
            }
            let integral = compute_integral_image(&sq_diff);

            for y in 0..height {
                for x in 0..width {
                    let distance = region_mean(&integral, width, height, x, y, patch_radius);
                    let weight = (-distance / h2).exp();
                    let idx = y as usize * width as usize + x as usize;
                    acc[idx] += weight * plane.get_clamped(x as i64 + dx, y as i64 + dy) as f64;
                    weights[idx] += weight;
                }
            }
        }
    }
    debug!(width, height, h, template_size, search_size, "Non-local means pass complete");

    let mut out = Plane::new(width, height);
    for ((slot, a), w) in out.data_mut().iter_mut().zip(&acc).zip(&weights) {
        // The zero offset always contributes weight 1, so `w` is never 0.
        *slot = (a / w) as f32;
    }
    out
}

// -- Integral image helpers ---------------------------------------------------

/// Summed-area table of a plane.
///
/// `table[y * (width+1) + x]` holds the sum over the rectangle [0, 0) to
/// (x, y), exclusive on both axes, with a zero-padded first row and column.
fn compute_integral_image(plane: &Plane) -> Vec<f64> {
    let (w, h) = (plane.width(), plane.height());
    let stride = (w + 1) as usize;
    let mut table = vec![0.0f64; stride * (h + 1) as usize];

    for y in 0..h {
        let mut row_sum = 0.0f64;
        for x in 0..w {
            row_sum += plane.get(x, y) as f64;
            let idx = (y + 1) as usize * stride + (x + 1) as usize;
            let above = y as usize * stride + (x + 1) as usize;
            table[idx] = row_sum + table[above];
        }
    }

    table
}

/// Mean over the square of the given radius centred on (cx, cy), cut to the
/// plane bounds.
fn region_mean(integral: &[f64], width: u32, height: u32, cx: u32, cy: u32, radius: u32) -> f64 {
    let stride = (width + 1) as usize;

    let x1 = cx.saturating_sub(radius) as usize;
    let y1 = cy.saturating_sub(radius) as usize;
    let x2 = ((cx + radius + 1) as usize).min(width as usize);
    let y2 = ((cy + radius + 1) as usize).min(height as usize);

    let area = ((x2 - x1) * (y2 - y1)) as f64;
    if area == 0.0 {
        return 0.0;
    }

    let sum = integral[y2 * stride + x2] - integral[y1 * stride + x2] - integral[y2 * stride + x1]
        + integral[y1 * stride + x1];

    sum / area
}
