// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Confidence aggregation and quality rating of OCR output.

pub mod aggregate;
pub mod rating;

pub use aggregate::{ConfidenceAggregator, PageSummary, aggregate};
pub use rating::{build_report, classify, enhancement_recommended};
