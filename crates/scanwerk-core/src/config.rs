// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Reader configuration. One immutable value is handed to every pipeline
// operation; nothing in the pipeline mutates it.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanwerkError};
use crate::types::EnhancementMethod;

/// Tuning values for the enhancement strategies.
///
/// Missing keys fall back to the defaults below and unknown keys are ignored
/// when deserializing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhancementParams {
    /// CLAHE clip limit, relative to a uniform histogram.
    pub clip_limit: f64,
    /// CLAHE tile grid (columns, rows).
    pub tile_size: [u32; 2],
    /// Non-local means filter strength for intensity / lightness.
    pub h: f64,
    /// Non-local means filter strength for the chroma channels of color images.
    pub h_color: f64,
    /// Side of the square patch compared by non-local means.
    pub template_size: u32,
    /// Side of the square window searched for similar patches.
    pub search_size: u32,
    /// Multiplier applied to the sharpening kernel.
    pub sharpen_strength: f64,
}

impl Default for EnhancementParams {
    fn default() -> Self {
        Self {
            clip_limit: 2.0,
            tile_size: [8, 8],
            h: 10.0,
            h_color: 10.0,
            template_size: 7,
            search_size: 21,
            sharpen_strength: 1.0,
        }
    }
}

impl EnhancementParams {
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("clip_limit", self.clip_limit),
            ("h", self.h),
            ("h_color", self.h_color),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ScanwerkError::InvalidArgument(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        if !self.sharpen_strength.is_finite() {
            return Err(ScanwerkError::InvalidArgument(
                "sharpen_strength must be finite".into(),
            ));
        }
        if self.tile_size.contains(&0) {
            return Err(ScanwerkError::InvalidArgument(format!(
                "tile_size must be at least 1x1, got {:?}",
                self.tile_size
            )));
        }
        if self.template_size == 0 || self.search_size == 0 {
            return Err(ScanwerkError::InvalidArgument(
                "template_size and search_size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Settings for a document run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// OCR language code (`en`, `de`, or a tesseract code such as `eng`).
    pub language: String,
    /// Page rasterisation scale; 1.0 renders at 72 DPI.
    pub resolution_scale: f32,
    /// JPEG quality (1-100) pages are encoded at after rasterisation.
    pub encode_quality: u8,
    /// Detections scoring at or below this are counted as low confidence.
    pub confidence_threshold: f64,
    /// Run an enhancement strategy on every page before OCR.
    pub enable_enhancement: bool,
    pub enhancement_method: EnhancementMethod,
    pub enhancement_params: EnhancementParams,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            language: "en".into(),
            resolution_scale: 2.0,
            encode_quality: 80,
            confidence_threshold: 0.3,
            enable_enhancement: false,
            enhancement_method: EnhancementMethod::Auto,
            enhancement_params: EnhancementParams::default(),
        }
    }
}

impl ReaderConfig {
    /// Load a JSON config file. Keys left out keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw).map_err(|err| match err {
            ScanwerkError::InvalidArgument(detail) => {
                ScanwerkError::InvalidArgument(format!("{}: {detail}", path.display()))
            }
            other => other,
        })
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)
            .map_err(|err| ScanwerkError::InvalidArgument(format!("invalid config: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no pipeline run could use.
    pub fn validate(&self) -> Result<()> {
        if self.language.trim().is_empty() {
            return Err(ScanwerkError::InvalidArgument(
                "language must not be empty".into(),
            ));
        }
        if !self.resolution_scale.is_finite() || self.resolution_scale <= 0.0 {
            return Err(ScanwerkError::InvalidArgument(format!(
                "resolution_scale must be positive, got {}",
                self.resolution_scale
            )));
        }
        if !(1..=100).contains(&self.encode_quality) {
            return Err(ScanwerkError::InvalidArgument(format!(
                "encode_quality must be within 1-100, got {}",
                self.encode_quality
            )));
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(ScanwerkError::InvalidArgument(format!(
                "confidence_threshold must be within [0, 1], got {}",
                self.confidence_threshold
            )));
        }
        self.enhancement_params.validate()
    }
}
