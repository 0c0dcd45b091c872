// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page enhancement ahead of OCR: contrast equalization, denoising, sharpening
// and their combinations, chosen explicitly or from the measured quality of
// the page.

use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use imageproc::filter::filter3x3;
use scanwerk_core::{EnhancementMethod, EnhancementMetrics, EnhancementParams};
use tracing::{debug, info, instrument};

use super::clahe::clahe;
use super::denoise::nl_means;
use super::quality;
use crate::image::Plane;
use crate::image::color::{lab_to_rgb, rgb_to_lab};
use crate::image::plane::{pad_reflect101, to_u8};

/// Below this quality score `auto` runs the full pipeline.
pub const AUTO_FULL_BELOW: f64 = 0.30;
/// Below this quality score (and at or above [`AUTO_FULL_BELOW`]) `auto`
/// denoises and equalizes without sharpening.
pub const AUTO_SHARPEN_FROM: f64 = 0.60;

/// 3x3 high-pass kernel: centre 9, all eight neighbours -1.
const SHARPEN_KERNEL: [f32; 9] = [-1.0, -1.0, -1.0, -1.0, 9.0, -1.0, -1.0, -1.0, -1.0];

/// What `auto` settles on for a given quality score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoChoice {
    /// Denoise, contrast, sharpen.
    Full,
    /// Denoise, then contrast.
    DenoiseContrast,
    /// Sharpen only.
    Sharpen,
}

impl AutoChoice {
    pub fn for_quality(quality: f64) -> Self {
        if quality < AUTO_FULL_BELOW {
            Self::Full
        } else if quality < AUTO_SHARPEN_FROM {
            Self::DenoiseContrast
        } else {
            Self::Sharpen
        }
    }
}

/// Pixel data an enhancement strategy works on. Alpha is dropped; images
/// without color stay single-channel.
#[derive(Debug, Clone)]
enum Working {
    Gray(GrayImage),
    Color(RgbImage),
}

impl Working {
    fn from_dynamic(image: &DynamicImage) -> Self {
        if image.color().has_color() {
            Self::Color(image.to_rgb8())
        } else {
            Self::Gray(image.to_luma8())
        }
    }

    fn into_dynamic(self) -> DynamicImage {
        match self {
            Self::Gray(gray) => DynamicImage::ImageLuma8(gray),
            Self::Color(rgb) => DynamicImage::ImageRgb8(rgb),
        }
    }
}

/// Applies an [`EnhancementMethod`] to page images and reports before/after
/// quality.
#[derive(Debug, Clone, Default)]
pub struct ImageEnhancer {
    params: EnhancementParams,
}

impl ImageEnhancer {
    pub fn new(params: EnhancementParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &EnhancementParams {
        &self.params
    }

    /// Enhance `image` with `method`.
    ///
    /// `EnhancementMethod::None` returns an unchanged copy with
    /// `enhancement_applied = false`. Both quality scores are measured here,
    /// the second one on the returned image.
    #[instrument(skip(self, image), fields(width = image.width(), height = image.height()))]
    pub fn enhance(
        &self,
        image: &DynamicImage,
        method: EnhancementMethod,
    ) -> (DynamicImage, EnhancementMetrics) {
        let original_quality = quality::assess(image);

        let enhanced = match method {
            EnhancementMethod::None => image.clone(),
            other => {
                let working = Working::from_dynamic(image);
                self.apply(working, other, original_quality).into_dynamic()
            }
        };

        let enhanced_quality = quality::assess(&enhanced);
        let metrics = EnhancementMetrics::new(
            original_quality,
            enhanced_quality,
            method != EnhancementMethod::None,
        );
        info!(
            original_quality,
            enhanced_quality,
            improvement = ?metrics.improvement_factor,
            "Page enhanced"
        );
        (enhanced, metrics)
    }

    fn apply(&self, working: Working, method: EnhancementMethod, quality: f64) -> Working {
        match method {
            EnhancementMethod::Auto => self.auto(working, quality),
            EnhancementMethod::Contrast => self.contrast(working),
            EnhancementMethod::Denoise => self.denoise(working),
            EnhancementMethod::Sharpen => self.sharpen(working),
            EnhancementMethod::Full => self.full(working),
            EnhancementMethod::None => working,
        }
    }

    fn auto(&self, working: Working, quality: f64) -> Working {
        let choice = AutoChoice::for_quality(quality);
        debug!(quality, ?choice, "Auto enhancement selected");
        match choice {
            AutoChoice::Full => self.full(working),
            AutoChoice::DenoiseContrast => self.contrast(self.denoise(working)),
            AutoChoice::Sharpen => self.sharpen(working),
        }
    }

    fn full(&self, working: Working) -> Working {
        self.sharpen(self.contrast(self.denoise(working)))
    }

    /// CLAHE on intensity, or on Lab lightness for color pages so hues stay put.
    fn contrast(&self, working: Working) -> Working {
        let clip = self.params.clip_limit;
        let grid = (self.params.tile_size[0], self.params.tile_size[1]);
        match working {
            Working::Gray(gray) => Working::Gray(clahe(&gray, clip, grid)),
            Working::Color(rgb) => {
                let [l, a, b] = rgb_to_lab(&rgb);
                let l = Plane::from_luma(&clahe(&l.to_luma(), clip, grid));
                Working::Color(lab_to_rgb(&[l, a, b]))
            }
        }
    }

    /// Non-local means; color pages are filtered in Lab with a separate
    /// strength for the chroma channels.
    fn denoise(&self, working: Working) -> Working {
        let p = &self.params;
        let h = p.h as f32;
        match working {
            Working::Gray(gray) => {
                let plane = nl_means(&Plane::from_luma(&gray), h, p.template_size, p.search_size);
                Working::Gray(plane.to_luma())
            }
            Working::Color(rgb) => {
                let h_color = p.h_color as f32;
                let [l, a, b] = rgb_to_lab(&rgb);
                let lab = [
                    nl_means(&l, h, p.template_size, p.search_size),
                    nl_means(&a, h_color, p.template_size, p.search_size),
                    nl_means(&b, h_color, p.template_size, p.search_size),
                ];
                Working::Color(lab_to_rgb(&lab))
            }
        }
    }

    /// 3x3 high-pass over every channel with reflect-101 borders, rounded
    /// and saturated back to 8 bits.
    fn sharpen(&self, working: Working) -> Working {
        let strength = self.params.sharpen_strength as f32;
        let kernel = SHARPEN_KERNEL.map(|k| k * strength);
        match working {
            Working::Gray(gray) if gray.width() > 0 && gray.height() > 0 => {
                let filtered = filter3x3::<_, f32, f32>(&pad_reflect101(&gray), &kernel);
                Working::Gray(GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
                    Luma(filtered.get_pixel(x + 1, y + 1).0.map(to_u8))
                }))
            }
            Working::Color(rgb) if rgb.width() > 0 && rgb.height() > 0 => {
                let filtered = filter3x3::<_, f32, f32>(&pad_reflect101(&rgb), &kernel);
                Working::Color(RgbImage::from_fn(rgb.width(), rgb.height(), |x, y| {
                    Rgb(filtered.get_pixel(x + 1, y + 1).0.map(to_u8))
                }))
            }
            empty => empty,
        }
    }
}
