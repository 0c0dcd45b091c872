// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// sRGB <-> CIE L*a*b* (D65) conversion with the usual 8-bit scaling:
// L is stretched from 0..100 to 0..255, a and b are offset by 128.
// Working on lightness alone lets contrast equalization leave hue untouched.

use image::RgbImage;

use super::plane::{Plane, merge_rgb};

// Reference white, D65.
const WHITE_X: f32 = 0.950_456;
const WHITE_Z: f32 = 1.088_754;

const EPSILON: f32 = 0.008_856;
const KAPPA: f32 = 903.3;

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.040_45 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(c: f32) -> f32 {
    if c <= 0.003_130_8 {
        12.92 * c
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

fn lab_f(t: f32) -> f32 {
    if t > EPSILON {
        t.cbrt()
    } else {
        7.787 * t + 16.0 / 116.0
    }
}

fn lab_f_inv(t: f32) -> f32 {
    let cubed = t * t * t;
    if cubed > EPSILON {
        cubed
    } else {
        (t - 16.0 / 116.0) / 7.787
    }
}

/// Convert one 8-bit sRGB pixel to 8-bit-scaled Lab.
pub fn rgb_to_lab_pixel(rgb: [u8; 3]) -> [f32; 3] {
    let [r, g, b] = rgb.map(|c| srgb_to_linear(c as f32 / 255.0));

    let x = (0.412_453 * r + 0.357_580 * g + 0.180_423 * b) / WHITE_X;
    let y = 0.212_671 * r + 0.715_160 * g + 0.072_169 * b;
    let z = (0.019_334 * r + 0.119_193 * g + 0.950_227 * b) / WHITE_Z;

    let (fx, fy, fz) = (lab_f(x), lab_f(y), lab_f(z));
    let lightness = if y > EPSILON { 116.0 * fy - 16.0 } else { KAPPA * y };

    [
        lightness * 255.0 / 100.0,
        500.0 * (fx - fy) + 128.0,
        200.0 * (fy - fz) + 128.0,
    ]
}

/// Convert one 8-bit-scaled Lab pixel back to sRGB in the 0..=255 range
/// (unrounded, possibly out of gamut).
pub fn lab_to_rgb_pixel(lab: [f32; 3]) -> [f32; 3] {
    let lightness = lab[0] * 100.0 / 255.0;
    let a = lab[1] - 128.0;
    let b = lab[2] - 128.0;

    let fy = (lightness + 16.0) / 116.0;
    let fx = fy + a / 500.0;
    let fz = fy - b / 200.0;

    let x = lab_f_inv(fx) * WHITE_X;
    let y = if lightness > KAPPA * EPSILON {
        fy * fy * fy
    } else {
        lightness / KAPPA
    };
    let z = lab_f_inv(fz) * WHITE_Z;

    let r = 3.240_479 * x - 1.537_150 * y - 0.498_535 * z;
    let g = -0.969_256 * x + 1.875_992 * y + 0.041_556 * z;
    let bl = 0.055_648 * x - 0.204_043 * y + 1.057_311 * z;

    [r, g, bl].map(|c| linear_to_srgb(c.clamp(0.0, 1.0)) * 255.0)
}

/// Split an RGB image into L, a and b planes.
pub fn rgb_to_lab(rgb: &RgbImage) -> [Plane; 3] {
    let (w, h) = rgb.dimensions();
    let mut planes = [Plane::new(w, h), Plane::new(w, h), Plane::new(w, h)];
    for (x, y, pixel) in rgb.enumerate_pixels() {
        let lab = rgb_to_lab_pixel(pixel.0);
        for (plane, value) in planes.iter_mut().zip(lab) {
            plane.set(x, y, value);
        }
    }
    planes
}

/// Reassemble L, a and b planes into an RGB image.
pub fn lab_to_rgb(lab: &[Plane; 3]) -> RgbImage {
    let (w, h) = (lab[0].width(), lab[0].height());
    let mut rgb = [Plane::new(w, h), Plane::new(w, h), Plane::new(w, h)];
    for y in 0..h {
        for x in 0..w {
            let pixel = lab_to_rgb_pixel([lab[0].get(x, y), lab[1].get(x, y), lab[2].get(x, y)]);
            for (plane, value) in rgb.iter_mut().zip(pixel) {
                plane.set(x, y, value);
            }
        }
    }
    merge_rgb(&rgb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn neutral_gray_has_no_chroma() {
        let [l, a, b] = rgb_to_lab_pixel([128, 128, 128]);
        assert!((a - 128.0).abs() < 0.5, "a = {a}");
        assert!((b - 128.0).abs() < 0.5, "b = {b}");
        assert!(l > 100.0 && l < 160.0, "L = {l}");
    }

    #[test]
    fn white_and_black_hit_the_lightness_extremes() {
        assert!((rgb_to_lab_pixel([255, 255, 255])[0] - 255.0).abs() < 1.0);
        assert!(rgb_to_lab_pixel([0, 0, 0])[0].abs() < 1e-3);
    }

    #[test]
    fn round_trip_is_close() {
        let rgb = RgbImage::from_fn(16, 16, |x, y| {
            Rgb([(x * 16) as u8, (y * 16) as u8, ((x + y) * 8) as u8])
        });
        let back = lab_to_rgb(&rgb_to_lab(&rgb));
        for (orig, got) in rgb.pixels().zip(back.pixels()) {
            for c in 0..3 {
                let diff = (orig.0[c] as i32 - got.0[c] as i32).abs();
                assert!(diff <= 1, "{:?} came back as {:?}", orig, got);
            }
        }
    }
}
