// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document pipeline: rasterise -> select pages -> enhance (optional) -> OCR ->
// aggregate confidence -> rate. Pages are processed one after another and the
// statistics of a run live in a single accumulator owned by that run.

use std::path::Path;

use image::DynamicImage;
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::{
    ConfidenceData, LowConfidenceRegion, PageLayout, PageRange, QualityReport, ReaderConfig,
};
use tracing::{debug, info, instrument};

use crate::confidence::{ConfidenceAggregator, PageSummary, build_report};
use crate::pdf::{PageRenderer, RenderSettings};
use crate::scan::enhance::ImageEnhancer;
use crate::scan::ocr::{OcrBackend, OcrSession};

/// Everything one pass over a document produced.
struct RunOutput {
    summaries: Vec<PageSummary>,
    layouts: Vec<PageLayout>,
    data: ConfidenceData,
}

/// Extracts text and confidence statistics from scanned PDF documents.
///
/// The reader owns the OCR session, so the engine is set up once and reused
/// for every page of every document read through the same reader.
pub struct DocumentReader<R, B> {
    renderer: R,
    ocr: OcrSession<B>,
}

#[cfg(feature = "pdfium")]
impl DocumentReader<crate::pdf::PdfiumRenderer, crate::scan::ocr::TesseractBackend> {
    /// pdfium for rendering and the `tesseract` binary for OCR.
    pub fn with_defaults() -> Result<Self> {
        Ok(Self::new(
            crate::pdf::PdfiumRenderer::new()?,
            crate::scan::ocr::TesseractBackend::new(),
        ))
    }
}

impl<R: PageRenderer, B: OcrBackend> DocumentReader<R, B> {
    pub fn new(renderer: R, backend: B) -> Self {
        Self {
            renderer,
            ocr: OcrSession::new(backend),
        }
    }

    /// Plain text of the accepted blocks, page by page.
    pub fn process(
        &mut self,
        path: &Path,
        config: &ReaderConfig,
        pages: Option<PageRange>,
    ) -> Result<String> {
        let (text, _) = self.process_with_confidence(path, config, pages)?;
        Ok(text)
    }

    /// Plain text plus the confidence record of the run.
    #[instrument(skip(self, config), fields(path = %path.display()))]
    pub fn process_with_confidence(
        &mut self,
        path: &Path,
        config: &ReaderConfig,
        pages: Option<PageRange>,
    ) -> Result<(String, ConfidenceData)> {
        let output = self.run(path, config, pages)?;
        let text = assemble_text(&output.summaries);
        info!(
            pages = output.summaries.len(),
            blocks = output.data.total_text_blocks,
            average_confidence = output.data.average_confidence,
            text_len = text.len(),
            "Document processed"
        );
        Ok((text, output.data))
    }

    /// Rate the OCR quality of the whole document.
    #[instrument(skip(self, config), fields(path = %path.display()))]
    pub fn assess_quality(&mut self, path: &Path, config: &ReaderConfig) -> Result<QualityReport> {
        let output = self.run(path, config, None)?;
        let report = build_report(output.data);
        info!(
            rating = %report.quality_rating,
            average_confidence = report.average_confidence,
            low_confidence_ratio = report.low_confidence_ratio,
            "Quality assessed"
        );
        Ok(report)
    }

    /// Blocks scoring strictly below `threshold`, in document order.
    #[instrument(skip(self, config), fields(path = %path.display()))]
    pub fn low_confidence_regions(
        &mut self,
        path: &Path,
        config: &ReaderConfig,
        threshold: f64,
    ) -> Result<Vec<LowConfidenceRegion>> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ScanwerkError::InvalidArgument(format!(
                "review threshold must be within [0, 1], got {threshold}"
            )));
        }
        let output = self.run(path, config, None)?;
        let regions: Vec<_> = output
            .data
            .text_blocks
            .into_iter()
            .filter(|block| block.confidence < threshold)
            .map(|block| LowConfidenceRegion {
                warning: format!(
                    "Low confidence ({:.1}%) - manual review recommended",
                    block.confidence * 100.0
                ),
                page: block.page,
                text: block.text,
                confidence: block.confidence,
            })
            .collect();
        info!(regions = regions.len(), threshold, "Low-confidence regions collected");
        Ok(regions)
    }

    /// Every detection of every selected page, accepted or not.
    #[instrument(skip(self, config), fields(path = %path.display()))]
    pub fn page_results(
        &mut self,
        path: &Path,
        config: &ReaderConfig,
        pages: Option<PageRange>,
    ) -> Result<Vec<PageLayout>> {
        Ok(self.run(path, config, pages)?.layouts)
    }

    fn run(
        &mut self,
        path: &Path,
        config: &ReaderConfig,
        pages: Option<PageRange>,
    ) -> Result<RunOutput> {
        let selected = self.rasterize(path, config, pages)?;

        let enhancer = config
            .enable_enhancement
            .then(|| ImageEnhancer::new(config.enhancement_params.clone()));
        let mut aggregator = ConfidenceAggregator::new(config.confidence_threshold);
        let mut summaries = Vec::with_capacity(selected.len());
        let mut layouts = Vec::with_capacity(selected.len());

        for (page, image) in selected {
            let image = match &enhancer {
                Some(enhancer) => {
                    let (enhanced, metrics) = enhancer.enhance(&image, config.enhancement_method);
                    aggregator.record_enhancement(metrics);
                    enhanced
                }
                None => image,
            };

            let detections = self.ocr.detect(&image, &config.language)?;
            drop(image);

            summaries.push(aggregator.add_page(page, &detections));
            layouts.push(PageLayout {
                page,
                num_blocks: detections.len(),
                blocks: detections,
            });
        }

        Ok(RunOutput {
            summaries,
            layouts,
            data: aggregator.finish(),
        })
    }

    /// Render the document and keep the requested pages, numbered from 1.
    fn rasterize(
        &self,
        path: &Path,
        config: &ReaderConfig,
        pages: Option<PageRange>,
    ) -> Result<Vec<(u32, DynamicImage)>> {
        if !path.exists() {
            return Err(ScanwerkError::NotFound(path.display().to_string()));
        }
        config.validate()?;
        if let Some(range) = pages {
            range.resolve(0)?;
        }

        let rendered = self
            .renderer
            .render_pages(path, &RenderSettings::from_config(config))?;
        let total = rendered.len();
        let window = match pages {
            Some(range) => range.resolve(total)?,
            None => 0..total,
        };
        debug!(total, first = window.start + 1, last = window.end, "Pages selected");

        Ok(rendered
            .into_iter()
            .enumerate()
            .skip(window.start)
            .take(window.len())
            .map(|(index, image)| (index as u32 + 1, image))
            .collect())
    }
}

/// Join accepted blocks, each page introduced by a `--- Page N ---` marker
/// where `N` counts pages within the selection, starting at 1. Pages without
/// accepted text are left out but still counted.
fn assemble_text(summaries: &[PageSummary]) -> String {
    let mut parts: Vec<String> = Vec::new();
    for (position, summary) in summaries.iter().enumerate() {
        if summary.accepted.is_empty() {
            continue;
        }
        parts.push(format!("\n--- Page {} ---\n", position + 1));
        parts.extend(summary.accepted.iter().cloned());
        parts.push("\n".to_string());
    }
    parts.join("\n")
}
