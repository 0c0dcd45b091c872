// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use scanwerk_core::error::Result;
use scanwerk_core::{EnhancementMethod, PageRange, ReaderConfig};

#[derive(Debug, Parser)]
#[command(name = "scanwerk")]
#[command(
    about = "Extract text from scanned PDFs, with image enhancement and OCR confidence scoring"
)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract plain text, page by page
    Extract {
        /// PDF to read
        pdf: PathBuf,
        #[command(flatten)]
        reader: ReaderArgs,
        /// Write the text here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Extract text and print a confidence summary
    Confidence {
        pdf: PathBuf,
        #[command(flatten)]
        reader: ReaderArgs,
        /// Also write text and confidence data as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Rate OCR quality of the whole document (JSON)
    Assess {
        pdf: PathBuf,
        #[command(flatten)]
        reader: ReaderArgs,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List text blocks that need a human look (JSON)
    Regions {
        pdf: PathBuf,
        #[command(flatten)]
        reader: ReaderArgs,
        /// Report blocks with confidence strictly below this
        #[arg(long, default_value = "0.5")]
        below: f64,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Every detection of every page with its box and confidence (JSON)
    Layout {
        pdf: PathBuf,
        #[command(flatten)]
        reader: ReaderArgs,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Enhance a single image file and print the before/after quality
    Enhance {
        /// Image to enhance (PNG, JPEG, TIFF, ...)
        image: PathBuf,
        /// Where to write the enhanced image
        #[arg(short, long)]
        output: PathBuf,
        /// auto, contrast, denoise, sharpen, full or none
        #[arg(short, long, default_value = "auto")]
        method: EnhancementMethod,
        /// JSON config supplying enhancement parameters
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

/// Flags shared by every document command. Anything given here overrides
/// the value from `--config`.
#[derive(Debug, Clone, Default, Args)]
pub struct ReaderArgs {
    /// JSON config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Page range, e.g. `3` or `2-5` (1-indexed, inclusive)
    #[arg(short, long)]
    pub pages: Option<PageRange>,

    /// OCR language (`en`, `de`, or a tesseract code such as `eng+deu`)
    #[arg(short, long)]
    pub language: Option<String>,

    /// Rasterisation scale; 1.0 is 72 DPI
    #[arg(long)]
    pub scale: Option<f32>,

    /// JPEG quality pages are encoded at before OCR (1-100)
    #[arg(long)]
    pub quality: Option<u8>,

    /// Detections scoring at or below this are treated as low confidence
    #[arg(short, long)]
    pub threshold: Option<f64>,

    /// Enhance pages before OCR
    #[arg(short, long)]
    pub enhance: bool,

    /// Enhancement strategy (implies --enhance)
    #[arg(short, long)]
    pub method: Option<EnhancementMethod>,
}

impl ReaderArgs {
    /// Build the run configuration: config file (or defaults), then flags.
    pub fn to_config(&self) -> Result<ReaderConfig> {
        let mut config = load_config(self.config.as_ref())?;
        if let Some(language) = &self.language {
            config.language = language.clone();
        }
        if let Some(scale) = self.scale {
            config.resolution_scale = scale;
        }
        if let Some(quality) = self.quality {
            config.encode_quality = quality;
        }
        if let Some(threshold) = self.threshold {
            config.confidence_threshold = threshold;
        }
        if let Some(method) = self.method {
            config.enhancement_method = method;
            config.enable_enhancement = true;
        }
        if self.enhance {
            config.enable_enhancement = true;
        }
        config.validate()?;
        Ok(config)
    }
}

pub fn load_config(path: Option<&PathBuf>) -> Result<ReaderConfig> {
    match path {
        Some(path) => ReaderConfig::from_json_file(path),
        None => Ok(ReaderConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanwerk_core::ScanwerkError;

    fn reader_args(argv: &[&str]) -> ReaderArgs {
        let mut full = vec!["scanwerk", "extract", "doc.pdf"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Command::Extract { reader, .. } => reader,
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn flags_override_defaults() {
        let config = reader_args(&[
            "--pages",
            "2-4",
            "-l",
            "de",
            "--threshold",
            "0.5",
            "--method",
            "denoise",
        ])
        .to_config()
        .unwrap();
        assert_eq!(config.language, "de");
        assert_eq!(config.confidence_threshold, 0.5);
        assert_eq!(config.enhancement_method, EnhancementMethod::Denoise);
        assert!(config.enable_enhancement);
    }

    #[test]
    fn page_range_flag_is_parsed() {
        let args = reader_args(&["--pages", "2-4"]);
        assert_eq!(args.pages, Some(PageRange::new(2, 4)));
    }

    #[test]
    fn bad_page_range_is_rejected_by_the_parser() {
        assert!(Cli::try_parse_from(["scanwerk", "extract", "doc.pdf", "--pages", "4-2"]).is_err());
        assert!(Cli::try_parse_from(["scanwerk", "extract", "doc.pdf", "--pages", "0"]).is_err());
    }

    #[test]
    fn unknown_method_is_rejected_by_the_parser() {
        let argv = ["scanwerk", "enhance", "in.png", "-o", "out.png", "-m", "blur"];
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn flags_win_over_the_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scanwerk.json");
        std::fs::write(&path, r#"{ "language": "fr", "encode_quality": 60 }"#).unwrap();

        let path_arg = path.to_string_lossy().into_owned();
        let config = reader_args(&["--config", &path_arg, "--quality", "90"])
            .to_config()
            .unwrap();
        assert_eq!(config.language, "fr");
        assert_eq!(config.encode_quality, 90);
        assert!(!config.enable_enhancement);
    }

    #[test]
    fn out_of_range_flag_fails_validation() {
        let err = reader_args(&["--threshold", "2"]).to_config().unwrap_err();
        assert!(matches!(err, ScanwerkError::InvalidArgument(_)));
    }
}
