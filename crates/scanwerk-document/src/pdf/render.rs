// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page rasterisation behind the `PageRenderer` trait. The pdfium-backed
// renderer is compiled in with the `pdfium` feature (on by default).

use std::path::Path;

use image::DynamicImage;
use scanwerk_core::ReaderConfig;
use scanwerk_core::error::ScanwerkError;

/// How pages are rasterised.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSettings {
    /// 1.0 renders at the page's native 72 DPI.
    pub resolution_scale: f32,
    /// JPEG quality (1-100) each page is encoded at before OCR.
    pub encode_quality: u8,
}

impl RenderSettings {
    pub fn from_config(config: &ReaderConfig) -> Self {
        Self {
            resolution_scale: config.resolution_scale,
            encode_quality: config.encode_quality,
        }
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self::from_config(&ReaderConfig::default())
    }
}

/// Produces one raster image per page, in page order.
pub trait PageRenderer {
    /// Render every page of the document at `path`. Fails with
    /// [`ScanwerkError::CorruptDocument`] when the file cannot be parsed.
    fn render_pages(
        &self,
        path: &Path,
        settings: &RenderSettings,
    ) -> Result<Vec<DynamicImage>, ScanwerkError>;
}

#[cfg(feature = "pdfium")]
pub use self::pdfium_backend::PdfiumRenderer;

#[cfg(feature = "pdfium")]
mod pdfium_backend {
    use std::path::Path;

    use image::DynamicImage;
    use pdfium_render::prelude::*;
    use scanwerk_core::error::ScanwerkError;
    use tracing::{debug, info, instrument};

    use super::{PageRenderer, RenderSettings};
    use crate::image::codec;

    /// Renders pages with the pdfium library, loaded from the working
    /// directory or, failing that, from the system library path.
    pub struct PdfiumRenderer {
        pdfium: Pdfium,
    }

    impl PdfiumRenderer {
        pub fn new() -> Result<Self, ScanwerkError> {
            let local = Pdfium::pdfium_platform_library_name_at_path("./");
            let bindings = Pdfium::bind_to_library(local)
                .or_else(|_| Pdfium::bind_to_system_library())
                .map_err(|err| {
                    ScanwerkError::RenderError(format!("pdfium library not available: {}", err))
                })?;
            info!("pdfium bound");
            Ok(Self {
                pdfium: Pdfium::new(bindings),
            })
        }
    }

    impl PageRenderer for PdfiumRenderer {
        #[instrument(skip(self, settings), fields(path = %path.display()))]
        fn render_pages(
            &self,
            path: &Path,
            settings: &RenderSettings,
        ) -> Result<Vec<DynamicImage>, ScanwerkError> {
            let document = self.pdfium.load_pdf_from_file(path, None).map_err(|err| {
                ScanwerkError::CorruptDocument(format!("{}: {}", path.display(), err))
            })?;

            let config = PdfRenderConfig::new().scale_page_by_factor(settings.resolution_scale);
            let mut pages = Vec::with_capacity(document.pages().len() as usize);
            for (index, page) in document.pages().iter().enumerate() {
                let bitmap = page.render_with_config(&config).map_err(|err| {
                    ScanwerkError::CorruptDocument(format!(
                        "failed to render page {} of {}: {}",
                        index + 1,
                        path.display(),
                        err
                    ))
                })?;
                let raster = codec::jpeg_roundtrip(&bitmap.as_image(), settings.encode_quality)?;
                debug!(
                    page = index + 1,
                    width = raster.width(),
                    height = raster.height(),
                    "Page rendered"
                );
                pages.push(raster);
            }

            info!(pages = pages.len(), "Document rasterised");
            Ok(pages)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_follow_the_config() {
        let config = ReaderConfig {
            resolution_scale: 3.0,
            encode_quality: 95,
            ..Default::default()
        };
        let settings = RenderSettings::from_config(&config);
        assert_eq!(settings.resolution_scale, 3.0);
        assert_eq!(settings.encode_quality, 95);
        assert_eq!(RenderSettings::default().encode_quality, 80);
    }
}
