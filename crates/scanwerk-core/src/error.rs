// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Scanwerk.

use thiserror::Error;

/// Top-level error type for all Scanwerk operations.
#[derive(Debug, Error)]
pub enum ScanwerkError {
    // -- Input errors --
    #[error("document not found: {0}")]
    NotFound(String),

    #[error("document could not be read: {0}")]
    CorruptDocument(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    // -- Engine errors --
    #[error("OCR language not supported: {0}")]
    UnsupportedLanguage(String),

    #[error("PDF renderer unavailable: {0}")]
    RenderError(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("OCR failed: {0}")]
    OcrError(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScanwerkError>;
