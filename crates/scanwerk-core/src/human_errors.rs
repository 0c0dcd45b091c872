// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for people running the extractor by hand.
//
// Every technical error is mapped to plain English with a clear suggestion.
// The severity drives how the CLI presents the failure.

use crate::error::ScanwerkError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Something flaky; running the same command again may work.
    Transient,
    /// The user must fix an input (path, flag, installed language pack).
    ActionRequired,
    /// The document itself cannot be processed.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary.
    pub message: String,
    /// What the user should try.
    pub suggestion: String,
    /// Whether running the same command again could succeed.
    pub retriable: bool,
    pub severity: Severity,
}

impl std::fmt::Display for HumanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\n{}", self.message, self.suggestion)
    }
}

/// Convert a `ScanwerkError` into a `HumanError`.
pub fn humanize_error(err: &ScanwerkError) -> HumanError {
    match err {
        // -- Input errors --
        ScanwerkError::NotFound(path) => HumanError {
            message: "The input file couldn't be found.".into(),
            suggestion: format!("Check the path and try again. (Looked for: {path})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanwerkError::CorruptDocument(_) => HumanError {
            message: "This PDF file can't be read.".into(),
            suggestion: "The file may be damaged or not a PDF at all. Try opening it in a PDF viewer first.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        ScanwerkError::InvalidArgument(detail) => HumanError {
            message: "One of the options doesn't look right.".into(),
            suggestion: format!("Check the command line or config file. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        // -- Engine errors --
        ScanwerkError::UnsupportedLanguage(language) => HumanError {
            message: format!("Text recognition isn't installed for language '{language}'."),
            suggestion: "Install the matching tesseract language pack (for example tesseract-ocr-deu), or choose another language.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanwerkError::RenderError(_) => HumanError {
            message: "The PDF renderer couldn't be loaded.".into(),
            suggestion: "Place the pdfium library next to the scanwerk binary, or install it system-wide.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanwerkError::ImageError(_) => HumanError {
            message: "There's a problem with this image.".into(),
            suggestion: "The image may be damaged or in an unusual format. Try saving it as a PNG or JPEG first.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        ScanwerkError::OcrError(detail) => {
            if detail.contains("not found") {
                HumanError {
                    message: "The text recognition engine isn't installed.".into(),
                    suggestion: "Install tesseract (for example `apt install tesseract-ocr`) and try again.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "Text recognition didn't work on this document.".into(),
                    suggestion: format!("Try again, or try with --enhance for a poor-quality scan. ({detail})"),
                    retriable: true,
                    severity: Severity::Transient,
                }
            }
        }

        // -- Storage --
        ScanwerkError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "A file couldn't be found.".into(),
                    suggestion: "It may have been moved or deleted. Check the path and try again.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError {
                    message: "Scanwerk doesn't have permission to use that file.".into(),
                    suggestion: "Check the file permissions, or choose a different output location.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Try again. If this keeps happening, the disk may be full.".into(),
                    retriable: true,
                    severity: Severity::Transient,
                }
            }
        }

        ScanwerkError::Serialization(_) => HumanError {
            message: "The configuration or results file couldn't be processed.".into(),
            suggestion: "Check that the config file is valid JSON.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_document_is_action_required() {
        let human = humanize_error(&ScanwerkError::NotFound("scan.pdf".into()));
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(!human.retriable);
        assert!(human.suggestion.contains("scan.pdf"));
    }

    #[test]
    fn missing_input_message_fits_images_too() {
        let human = humanize_error(&ScanwerkError::NotFound("page.png".into()));
        assert_eq!(human.message, "The input file couldn't be found.");
        assert!(human.suggestion.contains("page.png"));
    }

    #[test]
    fn corrupt_document_is_permanent() {
        let human = humanize_error(&ScanwerkError::CorruptDocument("bad xref".into()));
        assert_eq!(human.severity, Severity::Permanent);
    }

    #[test]
    fn missing_tesseract_binary_asks_for_install() {
        let err = ScanwerkError::OcrError("tesseract not found (install tesseract-ocr)".into());
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(!human.retriable);
    }

    #[test]
    fn recognition_failure_is_transient() {
        let err = ScanwerkError::OcrError("tesseract exited with status 1".into());
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::Transient);
        assert!(human.retriable);
    }

    #[test]
    fn unsupported_language_names_the_language() {
        let human = humanize_error(&ScanwerkError::UnsupportedLanguage("xx".into()));
        assert!(human.message.contains("'xx'"));
    }
}
