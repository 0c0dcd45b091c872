// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scalar quality score of a page image, combining sharpness (Laplacian
// variance), contrast (intensity standard deviation) and how well the mean
// brightness is centred.

use image::{DynamicImage, GrayImage};
use imageproc::filter::laplacian_filter;

/// Laplacian variance at which the sharpness term saturates.
const SHARPNESS_SCALE: f64 = 1000.0;
/// Standard deviation at which the contrast term saturates.
const CONTRAST_SCALE: f64 = 128.0;
const MID_GRAY: f64 = 127.0;

/// Raw statistics behind a quality score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityStats {
    /// Variance of the Laplacian response.
    pub sharpness: f64,
    /// Mean intensity.
    pub brightness: f64,
    /// Intensity standard deviation.
    pub contrast: f64,
}

impl QualityStats {
    pub fn measure(gray: &GrayImage) -> Self {
        let laplacian = laplacian_filter(gray);
        let (_, sharpness) = mean_and_variance(laplacian.as_raw().iter().map(|&v| v as f64));
        let (brightness, variance) = mean_and_variance(gray.as_raw().iter().map(|&v| v as f64));
        Self {
            sharpness,
            brightness,
            contrast: variance.sqrt(),
        }
    }

    /// Unweighted mean of the three normalized terms, each clamped to [0, 1].
    pub fn score(&self) -> f64 {
        let sharpness = (self.sharpness / SHARPNESS_SCALE).clamp(0.0, 1.0);
        let contrast = (self.contrast / CONTRAST_SCALE).clamp(0.0, 1.0);
        let centring = (1.0 - (self.brightness - MID_GRAY).abs() / MID_GRAY).clamp(0.0, 1.0);
        ((sharpness + contrast + centring) / 3.0).min(1.0)
    }
}

/// Quality score in [0, 1] of an image of any color type.
pub fn assess(image: &DynamicImage) -> f64 {
    assess_gray(&image.to_luma8())
}

/// Quality score of an intensity image. An empty image scores 0.
pub fn assess_gray(gray: &GrayImage) -> f64 {
    if gray.width() == 0 || gray.height() == 0 {
        return 0.0;
    }
    QualityStats::measure(gray).score()
}

/// Population mean and variance in one pass (returns zeros for no samples).
fn mean_and_variance(samples: impl Iterator<Item = f64>) -> (f64, f64) {
    let (mut n, mut sum, mut sum_sq) = (0usize, 0.0f64, 0.0f64);
    for v in samples {
        n += 1;
        sum += v;
        sum_sq += v * v;
    }
    if n == 0 {
        return (0.0, 0.0);
    }
    let mean = sum / n as f64;
    let variance = (sum_sq / n as f64 - mean * mean).max(0.0);
    (mean, variance)
}
