// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scanwerk-document: text extraction from scanned PDF documents.
//
// Rasterises pages, optionally enhances them (contrast equalization,
// non-local means denoising, sharpening, or a quality-driven choice among
// them), runs OCR, and turns per-detection confidence into page and document
// quality ratings.

pub mod confidence;
pub mod image;
pub mod pdf;
pub mod reader;
pub mod scan;

// Re-export the primary entry points so callers can use `scanwerk_document::DocumentReader` etc.
pub use confidence::{ConfidenceAggregator, build_report, classify};
pub use pdf::{PageRenderer, RenderSettings};
pub use reader::DocumentReader;
pub use scan::enhance::{AutoChoice, ImageEnhancer};
pub use scan::ocr::{OcrBackend, OcrSession, TesseractBackend};
pub use scan::quality::assess;

#[cfg(feature = "pdfium")]
pub use pdf::PdfiumRenderer;
