// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Single-channel floating-point planes. The enhancement strategies work on
// planes so that multi-stage pipelines and color-space conversions do not
// quantize to 8 bits between every step.

use image::{GrayImage, ImageBuffer, Luma, Pixel, Rgb, RgbImage};

/// One image channel stored row-major as `f32` in the 0..=255 range.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl Plane {
    /// A plane filled with zeros.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width as usize * height as usize],
        }
    }

    pub fn from_luma(gray: &GrayImage) -> Self {
        Self {
            width: gray.width(),
            height: gray.height(),
            data: gray.as_raw().iter().map(|&v| v as f32).collect(),
        }
    }

    /// Round and saturate back into an 8-bit grayscale image.
    pub fn to_luma(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| Luma([to_u8(self.get(x, y))]))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.data[y as usize * self.width as usize + x as usize]
    }

    pub fn set(&mut self, x: u32, y: u32, value: f32) {
        let idx = y as usize * self.width as usize + x as usize;
        self.data[idx] = value;
    }

    /// Sample with out-of-range coordinates clamped to the nearest edge pixel.
    pub fn get_clamped(&self, x: i64, y: i64) -> f32 {
        let cx = x.clamp(0, self.width as i64 - 1) as u32;
        let cy = y.clamp(0, self.height as i64 - 1) as u32;
        self.get(cx, cy)
    }
}

/// Pad `image` by one pixel on every side, mirroring without repeating the
/// edge pixel, so a 3x3 filter over the result sees reflect-101 borders.
pub fn pad_reflect101<P: Pixel>(
    image: &ImageBuffer<P, Vec<P::Subpixel>>,
) -> ImageBuffer<P, Vec<P::Subpixel>> {
    let (w, h) = (image.width() as i64, image.height() as i64);
    ImageBuffer::from_fn(image.width() + 2, image.height() + 2, |x, y| {
        *image.get_pixel(reflect101(x as i64 - 1, w), reflect101(y as i64 - 1, h))
    })
}

/// Mirror an index into `0..len` (`-1 -> 1`, `len -> len - 2`).
fn reflect101(i: i64, len: i64) -> u32 {
    if len <= 1 {
        return 0;
    }
    let mirrored = if i < 0 {
        -i
    } else if i >= len {
        2 * len - 2 - i
    } else {
        i
    };
    mirrored.clamp(0, len - 1) as u32
}

/// Round and saturate a sample to `u8`.
pub fn to_u8(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Reassemble three equally sized channels into an RGB image.
pub fn merge_rgb(planes: &[Plane; 3]) -> RgbImage {
    let [r, g, b] = planes;
    RgbImage::from_fn(r.width(), r.height(), |x, y| {
        Rgb([to_u8(r.get(x, y)), to_u8(g.get(x, y)), to_u8(b.get(x, y))])
    })
}
