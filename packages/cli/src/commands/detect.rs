use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagewright_components::{Classifier, Detections, Position};
use std::fmt::Write;
use std::path::PathBuf;

use super::{read, OutputFormat};

#[derive(Args, Debug)]
pub struct DetectArgs {
    /// Document to classify
    pub document: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

pub fn detect(args: DetectArgs, config: &Config) -> Result<()> {
    let source = read(&args.document)?;
    let classifier = Classifier::new().with_threshold(config.editor.confidence_threshold);
    let detections = classifier.classify_document(&source);

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&detections)?),
        OutputFormat::Text => print!("{}", report(&detections)),
    }
    Ok(())
}

/// Human-readable detection summary
pub fn report(detections: &Detections) -> String {
    let mut out = String::new();
    for position in Position::GLOBAL {
        match detections.get(position) {
            Some(detection) => {
                let _ = writeln!(
                    out,
                    "{} {} at {} ({}%)",
                    "✓".green(),
                    position.as_str().bold(),
                    detection.address,
                    detection.confidence
                );
                for signal in &detection.signals {
                    let _ = writeln!(out, "    {:<14} +{}", signal.signal, signal.score);
                }
            }
            None => {
                let _ = writeln!(out, "{} no {} detected", "-".dimmed(), position);
            }
        }
    }
    out
}
