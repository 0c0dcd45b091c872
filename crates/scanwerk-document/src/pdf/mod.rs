// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF rasterisation.

pub mod render;

pub use render::{PageRenderer, RenderSettings};

#[cfg(feature = "pdfium")]
pub use render::PdfiumRenderer;
