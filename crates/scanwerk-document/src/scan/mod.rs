// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan pipeline: quality assessment, enhancement strategies, and optical
// character recognition (OCR).

pub mod clahe;
pub mod denoise;
pub mod enhance;
pub mod ocr;
pub mod quality;

pub use enhance::ImageEnhancer;
pub use ocr::{OcrBackend, OcrSession, TesseractBackend};
