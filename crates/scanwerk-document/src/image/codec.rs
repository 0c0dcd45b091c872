// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Decoding and encoding of raster pages. Rendered pages are pushed through a
// JPEG round trip at the configured quality before OCR, so the OCR engine sees
// the same compression artefacts a scanned JPEG would carry.

use std::path::Path;

use image::{DynamicImage, ImageFormat};
use scanwerk_core::error::ScanwerkError;
use tracing::{debug, instrument};

/// Load an image from a file path.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn open(path: impl AsRef<Path>) -> Result<DynamicImage, ScanwerkError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ScanwerkError::NotFound(path.display().to_string()));
    }
    let image = image::open(path).map_err(|err| {
        ScanwerkError::ImageError(format!("failed to open {}: {}", path.display(), err))
    })?;
    debug!(width = image.width(), height = image.height(), "Image loaded");
    Ok(image)
}

/// Decode raw encoded bytes (JPEG, PNG, etc.).
pub fn decode(data: &[u8]) -> Result<DynamicImage, ScanwerkError> {
    image::load_from_memory(data)
        .map_err(|err| ScanwerkError::ImageError(format!("failed to decode image: {}", err)))
}

/// Encode as JPEG with the given quality (1-100).
pub fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>, ScanwerkError> {
    let mut buffer = Vec::new();
    let rgb = image.to_rgb8();
    let encoder =
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
    rgb.write_with_encoder(encoder)
        .map_err(|err| ScanwerkError::ImageError(format!("JPEG encoding failed: {}", err)))?;
    Ok(buffer)
}

/// Encode at `quality` and decode again, yielding an RGB page.
pub fn jpeg_roundtrip(image: &DynamicImage, quality: u8) -> Result<DynamicImage, ScanwerkError> {
    let bytes = encode_jpeg(image, quality)?;
    debug!(jpeg_bytes = bytes.len(), quality, "Page JPEG-encoded");
    Ok(DynamicImage::ImageRgb8(decode(&bytes)?.to_rgb8()))
}

/// Encode as PNG bytes.
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, ScanwerkError> {
    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    image
        .write_to(&mut cursor, ImageFormat::Png)
        .map_err(|err| ScanwerkError::ImageError(format!("PNG encoding failed: {}", err)))?;
    Ok(buffer)
}

/// Write the image to a file. The format is inferred from the file extension.
pub fn save(image: &DynamicImage, path: impl AsRef<Path>) -> Result<(), ScanwerkError> {
    image.save(path.as_ref()).map_err(|err| {
        ScanwerkError::ImageError(format!(
            "failed to save image to {}: {}",
            path.as_ref().display(),
            err
        ))
    })
}
