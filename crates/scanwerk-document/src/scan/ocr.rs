// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// OCR (Optical Character Recognition) for Scanwerk.
//
// Text detection sits behind the `OcrBackend` trait so the document pipeline
// can be driven by any engine that reports a confidence per detection. The
// bundled backend drives the `tesseract` command-line tool and reads its TSV
// output, which carries a bounding box and a confidence for every word.
//
// # Engine Lifecycle
//
// Engine setup (model loading, language checks) is expensive. `OcrSession`
// owns a backend and initializes it once per language on first use, then
// reuses it for every later page and document until the session is dropped.

use std::collections::HashSet;
use std::path::PathBuf;
use std::process::Command;

use image::DynamicImage;
use scanwerk_core::error::ScanwerkError;
use scanwerk_core::{BoundingBox, Detection};
use tracing::{debug, info, instrument};

use crate::image::codec;

/// A text detector that reports a confidence per detection.
pub trait OcrBackend {
    /// One-time setup for `language`. Fails with
    /// [`ScanwerkError::UnsupportedLanguage`] if the engine cannot read it.
    fn initialize(&mut self, language: &str) -> Result<(), ScanwerkError>;

    /// Detect text on one page. Scores are in [0, 1].
    fn detect(&self, image: &DynamicImage, language: &str) -> Result<Vec<Detection>, ScanwerkError>;
}

/// Owns an [`OcrBackend`] and initializes it lazily, once per language.
#[derive(Debug)]
pub struct OcrSession<B> {
    backend: B,
    ready: HashSet<String>,
}

impl<B: OcrBackend> OcrSession<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            ready: HashSet::new(),
        }
    }

    /// Run detection, initializing the backend for `language` first if this
    /// session has not used that language before.
    pub fn detect(
        &mut self,
        image: &DynamicImage,
        language: &str,
    ) -> Result<Vec<Detection>, ScanwerkError> {
        if !self.ready.contains(language) {
            info!(language, "Initializing OCR backend (one-time setup)");
            self.backend.initialize(language)?;
            self.ready.insert(language.to_string());
        }
        self.backend.detect(image, language)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

// -- Tesseract ----------------------------------------------------------------

/// Runs the `tesseract` binary with TSV output.
#[derive(Debug, Clone)]
pub struct TesseractBackend {
    binary: PathBuf,
}

impl Default for TesseractBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl TesseractBackend {
    /// Use `tesseract` from `PATH`.
    pub fn new() -> Self {
        Self::with_binary("tesseract")
    }

    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn run(&self, command: &mut Command) -> Result<std::process::Output, ScanwerkError> {
        match command.output() {
            Ok(output) => Ok(output),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(ScanwerkError::OcrError(
                format!("{} not found (install tesseract-ocr)", self.binary.display()),
            )),
            Err(err) => Err(ScanwerkError::Io(err)),
        }
    }

    /// Languages the installed engine has trained data for.
    fn installed_languages(&self) -> Result<HashSet<String>, ScanwerkError> {
        let output = self.run(Command::new(&self.binary).arg("--list-langs"))?;
        if !output.status.success() {
            return Err(ScanwerkError::OcrError(format!(
                "tesseract --list-langs failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        // Older releases print the list on stderr.
        let mut listing = String::from_utf8_lossy(&output.stdout).into_owned();
        listing.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(parse_language_list(&listing))
    }
}

impl OcrBackend for TesseractBackend {
    #[instrument(skip(self))]
    fn initialize(&mut self, language: &str) -> Result<(), ScanwerkError> {
        let installed = self.installed_languages()?;
        let wanted = tesseract_language(language);
        for code in wanted.split('+') {
            if !installed.contains(code) {
                return Err(ScanwerkError::UnsupportedLanguage(format!(
                    "{language} (tesseract code '{code}' is not installed)"
                )));
            }
        }
        debug!(installed = installed.len(), %wanted, "Tesseract language data found");
        Ok(())
    }

    #[instrument(skip(self, image), fields(width = image.width(), height = image.height()))]
    fn detect(
        &self,
        image: &DynamicImage,
        language: &str,
    ) -> Result<Vec<Detection>, ScanwerkError> {
        let page = tempfile::Builder::new()
            .prefix("scanwerk-page-")
            .suffix(".png")
            .tempfile()?;
        std::fs::write(page.path(), codec::encode_png(image)?)?;

        let lang = tesseract_language(language);
        let output = self.run(
            Command::new(&self.binary)
                .arg(page.path())
                .arg("stdout")
                .args(["-l", lang.as_str()])
                .arg("tsv"),
        )?;
        if !output.status.success() {
            return Err(ScanwerkError::OcrError(format!(
                "tesseract failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let detections = parse_tsv(&String::from_utf8_lossy(&output.stdout));
        debug!(detections = detections.len(), "Tesseract detection complete");
        Ok(detections)
    }
}

/// Map a two-letter ISO 639-1 code to tesseract's three-letter code. Codes
/// tesseract already understands (`eng`, `chi_sim`, `eng+deu`) pass through.
pub fn tesseract_language(language: &str) -> String {
    let code = language.trim().to_ascii_lowercase();
    let mapped = match code.as_str() {
        "en" => "eng",
        "de" => "deu",
        "fr" => "fra",
        "es" => "spa",
        "it" => "ita",
        "pt" => "por",
        "nl" => "nld",
        "sv" => "swe",
        "da" => "dan",
        "no" | "nb" => "nor",
        "fi" => "fin",
        "pl" => "pol",
        "cs" => "ces",
        "ru" => "rus",
        "uk" => "ukr",
        "tr" => "tur",
        "el" => "ell",
        "ar" => "ara",
        "he" => "heb",
        "hi" => "hin",
        "ja" => "jpn",
        "ko" => "kor",
        "zh" | "ch_sim" => "chi_sim",
        "ch_tra" => "chi_tra",
        _ => return code,
    };
    mapped.to_string()
}

/// Language codes from `tesseract --list-langs` output.
fn parse_language_list(listing: &str) -> HashSet<String> {
    listing
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.contains(' '))
        .map(str::to_string)
        .collect()
}

/// Word-level TSV rows grouped into one detection per text line.
///
/// Words with a negative confidence or blank text are skipped. A line's score
/// is the mean confidence of its words divided by 100; its region is the union
/// of the word boxes.
pub fn parse_tsv(tsv: &str) -> Vec<Detection> {
    struct Line {
        key: (u32, u32, u32, u32),
        words: Vec<String>,
        conf_sum: f64,
        region: BoundingBox,
    }

    let mut lines: Vec<Line> = Vec::new();
    for row in tsv.lines().skip(1) {
        let cols: Vec<&str> = row.split('\t').collect();
        if cols.len() < 12 || cols[0] != "5" {
            continue;
        }
        let num = |i: usize| cols[i].trim().parse::<u32>().ok();
        let (Some(page), Some(block), Some(par), Some(line)) = (num(1), num(2), num(3), num(4))
        else {
            continue;
        };
        let (Some(left), Some(top), Some(width), Some(height)) = (num(6), num(7), num(8), num(9))
        else {
            continue;
        };
        let Ok(conf) = cols[10].trim().parse::<f64>() else {
            continue;
        };
        let text = cols[11..].join("\t");
        let text = text.trim();
        if conf < 0.0 || text.is_empty() {
            continue;
        }

        let key = (page, block, par, line);
        let region = BoundingBox::new(left, top, width, height);
        match lines.last_mut() {
            Some(current) if current.key == key => {
                current.words.push(text.to_string());
                current.conf_sum += conf;
                current.region = current.region.union(&region);
            }
            _ => lines.push(Line {
                key,
                words: vec![text.to_string()],
                conf_sum: conf,
                region,
            }),
        }
    }

    lines
        .into_iter()
        .map(|line| {
            let score = (line.conf_sum / line.words.len() as f64 / 100.0).clamp(0.0, 1.0);
            Detection::new(line.region, line.words.join(" "), score)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext";

    #[derive(Default)]
    struct CountingBackend {
        initialized: Vec<String>,
    }

    impl OcrBackend for CountingBackend {
        fn initialize(&mut self, language: &str) -> Result<(), ScanwerkError> {
            if language == "xx" {
                return Err(ScanwerkError::UnsupportedLanguage(language.into()));
            }
            self.initialized.push(language.to_string());
            Ok(())
        }

        fn detect(&self, _: &DynamicImage, _: &str) -> Result<Vec<Detection>, ScanwerkError> {
            Ok(vec![Detection::new(BoundingBox::default(), "hello", 0.9)])
        }
    }

    #[test]
    fn session_initializes_once_per_language() {
        let mut session = OcrSession::new(CountingBackend::default());
        let page = DynamicImage::new_luma8(4, 4);
        for _ in 0..3 {
            session.detect(&page, "en").unwrap();
        }
        session.detect(&page, "de").unwrap();
        session.detect(&page, "en").unwrap();
        assert_eq!(session.backend().initialized, vec!["en", "de"]);
    }

    #[test]
    fn failed_initialization_is_retried_and_reported() {
        let mut session = OcrSession::new(CountingBackend::default());
        let page = DynamicImage::new_luma8(4, 4);
        for _ in 0..2 {
            let err = session.detect(&page, "xx").unwrap_err();
            assert!(matches!(err, ScanwerkError::UnsupportedLanguage(_)));
        }
    }

    #[test]
    fn tsv_words_are_grouped_into_lines() {
        let tsv = format!(
            "{HEADER}\n\
             1\t1\t0\t0\t0\t0\t0\t0\t800\t600\t-1\t\n\
             4\t1\t1\t1\t1\t0\t10\t10\t200\t20\t-1\t\n\
             5\t1\t1\t1\t1\t1\t10\t10\t50\t20\t96.5\tPolicy\n\
             5\t1\t1\t1\t1\t2\t70\t12\t60\t18\t91.5\tnumber\n\
             5\t1\t1\t1\t2\t1\t10\t40\t30\t20\t40\tA-12\n\
             5\t1\t1\t1\t2\t2\t50\t40\t10\t20\t-1\t \n"
        );
        let detections = parse_tsv(&tsv);
        assert_eq!(detections.len(), 2);

        assert_eq!(detections[0].text, "Policy number");
        assert!((detections[0].score - 0.94).abs() < 1e-9);
        assert_eq!(detections[0].region, BoundingBox::new(10, 10, 120, 20));

        assert_eq!(detections[1].text, "A-12");
        assert!((detections[1].score - 0.40).abs() < 1e-9);
    }

    #[test]
    fn empty_tsv_has_no_detections() {
        assert!(parse_tsv("").is_empty());
        assert!(parse_tsv(HEADER).is_empty());
    }

    #[test]
    fn language_codes_are_mapped() {
        assert_eq!(tesseract_language("en"), "eng");
        assert_eq!(tesseract_language("DE"), "deu");
        assert_eq!(tesseract_language("eng+deu"), "eng+deu");
        assert_eq!(tesseract_language("chi_sim"), "chi_sim");
    }

    #[test]
    fn language_listing_skips_the_banner() {
        let listing = "List of available languages in \"/usr/share/tessdata/\" (3):\neng\nosd\ndeu\n";
        let langs = parse_language_list(listing);
        assert_eq!(langs.len(), 3);
        assert!(langs.contains("eng") && langs.contains("deu"));
    }

    #[test]
    fn missing_binary_is_reported_as_not_found() {
        let mut backend = TesseractBackend::with_binary("/nonexistent/bin/tesseract-scanwerk");
        let err = backend.initialize("en").unwrap_err();
        match err {
            ScanwerkError::OcrError(detail) => assert!(detail.contains("not found")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
