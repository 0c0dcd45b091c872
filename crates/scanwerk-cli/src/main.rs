// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanwerk: text extraction from scanned PDFs
//
// Entry point. Initialises logging (stderr, so stdout stays machine-readable),
// parses the command line, and runs one document command.

mod cli;

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use scanwerk_core::ConfidenceData;
use scanwerk_core::error::Result;
use scanwerk_core::human_errors::humanize_error;
use scanwerk_document::image::codec;
use scanwerk_document::{DocumentReader, ImageEnhancer};
use serde::Serialize;

use crate::cli::{Cli, Command, load_config};

/// Below this average the summary warns that a person should check the text.
const REVIEW_WARNING_BELOW: f64 = 0.70;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "command failed");
            eprintln!("{}", humanize_error(&err));
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Extract {
            pdf,
            reader,
            output,
        } => {
            let config = reader.to_config()?;
            let text = DocumentReader::with_defaults()?.process(&pdf, &config, reader.pages)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, &text)?;
                    tracing::info!(
                        path = %path.display(),
                        chars = text.chars().count(),
                        "text written"
                    );
                }
                None => println!("{text}"),
            }
        }

        Command::Confidence {
            pdf,
            reader,
            output,
        } => {
            let config = reader.to_config()?;
            let (text, data) = DocumentReader::with_defaults()?.process_with_confidence(
                &pdf,
                &config,
                reader.pages,
            )?;
            print_summary(&pdf, &text, &data);
            if let Some(path) = output {
                let export = ConfidenceExport {
                    text: &text,
                    confidence_data: &data,
                };
                write_json(&path, &export)?;
            }
        }

        Command::Assess {
            pdf,
            reader,
            output,
        } => {
            let config = reader.to_config()?;
            let report = DocumentReader::with_defaults()?.assess_quality(&pdf, &config)?;
            emit_json(output.as_deref(), &report)?;
        }

        Command::Regions {
            pdf,
            reader,
            below,
            output,
        } => {
            let config = reader.to_config()?;
            let regions =
                DocumentReader::with_defaults()?.low_confidence_regions(&pdf, &config, below)?;
            emit_json(output.as_deref(), &regions)?;
        }

        Command::Layout {
            pdf,
            reader,
            output,
        } => {
            let config = reader.to_config()?;
            let layouts =
                DocumentReader::with_defaults()?.page_results(&pdf, &config, reader.pages)?;
            emit_json(output.as_deref(), &layouts)?;
        }

        Command::Enhance {
            image,
            output,
            method,
            config,
        } => {
            let config = load_config(config.as_ref())?;
            let input = codec::open(&image)?;
            let (enhanced, metrics) =
                ImageEnhancer::new(config.enhancement_params).enhance(&input, method);
            codec::save(&enhanced, &output)?;

            println!("Method:           {method}");
            println!("Original quality: {:.3}", metrics.original_quality);
            println!("Enhanced quality: {:.3}", metrics.enhanced_quality);
            match metrics.improvement_factor {
                Some(factor) => println!("Improvement:      {factor:.2}x"),
                None => println!("Improvement:      n/a (original scored 0)"),
            }
            println!("Written to:       {}", output.display());
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct ConfidenceExport<'a> {
    text: &'a str,
    confidence_data: &'a ConfidenceData,
}

fn print_summary(pdf: &Path, text: &str, data: &ConfidenceData) {
    println!("Processing: {}", pdf.display());
    println!("{}", "-".repeat(40));
    println!("Average OCR Confidence: {:.1}%", data.average_confidence * 100.0);
    println!(
        "Enhancement Applied: {}",
        if data.enhancement_applied() { "Yes" } else { "No" }
    );
    println!("Text Length: {} characters", text.chars().count());
    println!(
        "Text Blocks: {} ({} low confidence)",
        data.total_text_blocks, data.low_confidence_count
    );
    if data.average_confidence < REVIEW_WARNING_BELOW {
        println!("Low confidence detected - document may need manual review");
    } else {
        println!("Good OCR confidence");
    }
    println!();
    if text.is_empty() {
        println!("No text was extracted from the PDF.");
    } else {
        println!("{text}");
    }
}

fn emit_json<T: Serialize>(output: Option<&Path>, value: &T) -> Result<()> {
    match output {
        Some(path) => write_json(path, value),
        None => {
            println!("{}", serde_json::to_string_pretty(value)?);
            Ok(())
        }
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    std::fs::write(path, serde_json::to_string_pretty(value)?)?;
    tracing::info!(path = %path.display(), "JSON written");
    Ok(())
}
