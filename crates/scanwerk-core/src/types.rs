// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Scanwerk extraction pipeline.

use std::ops::Range;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ScanwerkError;

/// Image enhancement strategy applied to a page before OCR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnhancementMethod {
    /// Pick a strategy from the measured quality of the page.
    #[default]
    Auto,
    /// Adaptive histogram equalization on the lightness channel.
    Contrast,
    /// Non-local means denoising.
    Denoise,
    /// 3x3 high-pass sharpening.
    Sharpen,
    /// Denoise, then contrast, then sharpen.
    Full,
    /// Identity.
    None,
}

impl EnhancementMethod {
    pub const ALL: [Self; 6] = [
        Self::Auto,
        Self::Contrast,
        Self::Denoise,
        Self::Sharpen,
        Self::Full,
        Self::None,
    ];

    /// Keyword used on the command line and in config files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Contrast => "contrast",
            Self::Denoise => "denoise",
            Self::Sharpen => "sharpen",
            Self::Full => "full",
            Self::None => "none",
        }
    }
}

impl std::fmt::Display for EnhancementMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnhancementMethod {
    type Err = ScanwerkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|method| method.as_str() == wanted)
            .ok_or_else(|| {
                ScanwerkError::InvalidArgument(format!(
                    "unknown enhancement method '{s}' (expected one of auto, contrast, denoise, sharpen, full, none)"
                ))
            })
    }
}

/// Before/after quality measurements for one enhanced page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnhancementMetrics {
    pub original_quality: f64,
    /// Measured on the transformed image, never the input.
    pub enhanced_quality: f64,
    /// `enhanced_quality / original_quality`; `None` when the original scored 0.
    pub improvement_factor: Option<f64>,
    pub enhancement_applied: bool,
}

impl EnhancementMetrics {
    pub fn new(original_quality: f64, enhanced_quality: f64, enhancement_applied: bool) -> Self {
        let improvement_factor =
            (original_quality > 0.0).then(|| enhanced_quality / original_quality);
        Self {
            original_quality,
            enhanced_quality,
            improvement_factor,
            enhancement_applied,
        }
    }
}

/// Axis-aligned bounding box of a detection, in page pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(left: u32, top: u32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Smallest box containing both `self` and `other`.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let left = self.left.min(other.left);
        let top = self.top.min(other.top);
        let right = (self.left + self.width).max(other.left + other.width);
        let bottom = (self.top + self.height).max(other.top + other.height);
        BoundingBox::new(left, top, right - left, bottom - top)
    }
}

/// One piece of text found by the OCR engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub region: BoundingBox,
    pub text: String,
    /// Raw engine confidence in [0, 1].
    pub score: f64,
}

impl Detection {
    pub fn new(region: BoundingBox, text: impl Into<String>, score: f64) -> Self {
        Self {
            region,
            text: text.into(),
            score,
        }
    }
}

/// A recognised text block and its confidence, in document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    /// 1-indexed page number in the source document.
    pub page: u32,
    pub text: String,
    pub confidence: f64,
}

/// Confidence statistics accumulated over every page of one document run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConfidenceData {
    /// Mean accepted score per processed page, in page order.
    pub page_confidences: Vec<f64>,
    /// Every detection seen, accepted or not.
    pub text_blocks: Vec<TextBlock>,
    /// One entry per page when enhancement was enabled.
    pub enhancement_metrics: Vec<EnhancementMetrics>,
    pub low_confidence_count: usize,
    pub total_text_blocks: usize,
    pub average_confidence: f64,
    pub min_confidence: f64,
    pub max_confidence: f64,
}

impl ConfidenceData {
    /// Share of blocks at or below the acceptance threshold (0 when empty).
    pub fn low_confidence_ratio(&self) -> f64 {
        if self.total_text_blocks == 0 {
            0.0
        } else {
            self.low_confidence_count as f64 / self.total_text_blocks as f64
        }
    }

    /// Whether any page went through an enhancement strategy.
    pub fn enhancement_applied(&self) -> bool {
        self.enhancement_metrics
            .iter()
            .any(|metrics| metrics.enhancement_applied)
    }
}

/// Discrete OCR quality tier of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityRating {
    Excellent,
    Good,
    Fair,
    Poor,
    #[serde(rename = "Requires Review")]
    RequiresReview,
}

impl QualityRating {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
            Self::RequiresReview => "Requires Review",
        }
    }

    /// A person should read the extracted text before it is trusted.
    pub fn requires_manual_review(&self) -> bool {
        matches!(self, Self::Poor | Self::RequiresReview)
    }
}

impl std::fmt::Display for QualityRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Document-level quality verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub quality_rating: QualityRating,
    pub average_confidence: f64,
    pub low_confidence_ratio: f64,
    pub requires_manual_review: bool,
    pub enhancement_recommended: bool,
    pub confidence_data: ConfidenceData,
}

/// A text block whose confidence fell below a review threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LowConfidenceRegion {
    pub page: u32,
    pub text: String,
    pub confidence: f64,
    pub warning: String,
}

/// Every detection on one page, as returned by the OCR engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    pub page: u32,
    pub blocks: Vec<Detection>,
    pub num_blocks: usize,
}

/// Inclusive, 1-indexed page range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRange {
    pub start: u32,
    pub end: u32,
}

impl PageRange {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Turn the range into 0-indexed slice bounds for a document with
    /// `page_count` pages. The end is clamped to the page count; a start past
    /// the last page yields an empty range.
    pub fn resolve(&self, page_count: usize) -> Result<Range<usize>, ScanwerkError> {
        if self.start == 0 {
            return Err(ScanwerkError::InvalidArgument(
                "page range starts at 1, got 0".into(),
            ));
        }
        if self.start > self.end {
            return Err(ScanwerkError::InvalidArgument(format!(
                "page range start {} is after end {}",
                self.start, self.end
            )));
        }
        let end = (self.end as usize).min(page_count);
        let start = (self.start as usize - 1).min(end);
        Ok(start..end)
    }
}

impl FromStr for PageRange {
    type Err = ScanwerkError;

    /// Accepts `"N"` or `"START-END"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |part: &str| {
            part.trim().parse::<u32>().map_err(|_| {
                ScanwerkError::InvalidArgument(format!("invalid page number '{part}' in '{s}'"))
            })
        };
        let range = match s.split_once('-') {
            Some((start, end)) => PageRange::new(parse(start)?, parse(end)?),
            None => {
                let page = parse(s)?;
                PageRange::new(page, page)
            }
        };
        // Validate eagerly so a bad flag fails before any rendering.
        range.resolve(0)?;
        Ok(range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_parsing_is_case_insensitive() {
        assert_eq!("FULL".parse::<EnhancementMethod>().unwrap(), EnhancementMethod::Full);
        assert_eq!(" none ".parse::<EnhancementMethod>().unwrap(), EnhancementMethod::None);
    }

    #[test]
    fn unknown_method_is_invalid_argument() {
        let err = "blur".parse::<EnhancementMethod>().unwrap_err();
        assert!(matches!(err, ScanwerkError::InvalidArgument(_)));
    }

    #[test]
    fn method_serde_uses_keywords() {
        let json = serde_json::to_string(&EnhancementMethod::Contrast).unwrap();
        assert_eq!(json, "\"contrast\"");
        assert!(serde_json::from_str::<EnhancementMethod>("\"bogus\"").is_err());
    }

    #[test]
    fn improvement_factor_guards_zero_original() {
        let metrics = EnhancementMetrics::new(0.0, 0.4, true);
        assert_eq!(metrics.improvement_factor, None);

        let metrics = EnhancementMetrics::new(0.2, 0.5, true);
        let factor = metrics.improvement_factor.unwrap();
        assert!((factor - 2.5).abs() < 1e-9);
    }

    #[test]
    fn bounding_box_union() {
        let a = BoundingBox::new(10, 20, 30, 10);
        let b = BoundingBox::new(50, 15, 10, 10);
        assert_eq!(a.union(&b), BoundingBox::new(10, 15, 50, 15));
    }

    #[test]
    fn page_range_selects_inclusive_pages() {
        assert_eq!(PageRange::new(2, 4).resolve(5).unwrap(), 1..4);
    }

    #[test]
    fn page_range_clamps_to_page_count() {
        assert_eq!(PageRange::new(1, 100).resolve(5).unwrap(), 0..5);
        assert_eq!(PageRange::new(7, 9).resolve(5).unwrap(), 5..5);
    }

    #[test]
    fn malformed_page_ranges_are_rejected() {
        assert!(PageRange::new(0, 3).resolve(5).is_err());
        assert!(PageRange::new(4, 2).resolve(5).is_err());
    }

    #[test]
    fn page_range_from_str() {
        assert_eq!("2-4".parse::<PageRange>().unwrap(), PageRange::new(2, 4));
        assert_eq!("3".parse::<PageRange>().unwrap(), PageRange::new(3, 3));
        assert!("4-2".parse::<PageRange>().is_err());
        assert!("a-b".parse::<PageRange>().is_err());
    }

    #[test]
    fn low_confidence_ratio_of_empty_document_is_zero() {
        assert_eq!(ConfidenceData::default().low_confidence_ratio(), 0.0);
    }

    #[test]
    fn rating_labels_and_review_flag() {
        assert_eq!(QualityRating::RequiresReview.to_string(), "Requires Review");
        assert_eq!(
            serde_json::to_string(&QualityRating::RequiresReview).unwrap(),
            "\"Requires Review\""
        );
        assert!(QualityRating::Poor.requires_manual_review());
        assert!(!QualityRating::Fair.requires_manual_review());
    }
}
