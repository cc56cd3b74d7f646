//! Classify command - show supplier scores for a document.

use std::path::PathBuf;

use clap::Args;
use console::style;
use serde::Serialize;

use billtrack_core::classify::score_all;
use billtrack_core::{ClassifierMatch, DocumentKind, Pipeline};

use super::source::read_document;

/// Arguments for the classify command.
#[derive(Args)]
pub struct ClassifyArgs {
    /// Input file (PDF with a text layer, or extracted .txt)
    #[arg(required = true)]
    input: PathBuf,

    /// Score against statement layouts instead of invoice layouts
    #[arg(long)]
    statement: bool,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct ClassifyReport {
    kind: DocumentKind,
    threshold: f64,
    scores: Vec<ClassifierMatch>,
    selected: Option<ClassifierMatch>,
}

pub async fn run(args: ClassifyArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = super::config::load(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let text = read_document(&args.input, &config)?;
    let pipeline = Pipeline::from_config(&config);
    let kind = DocumentKind::from_is_invoice(!args.statement);

    let labels = pipeline.registry().labels(kind);
    let report = ClassifyReport {
        kind,
        threshold: pipeline.classifier().threshold(kind),
        scores: score_all(&text, &labels),
        selected: pipeline.classify(&text, kind),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{} {} layouts, threshold {:.1}",
        style("ℹ").blue(),
        report.kind,
        report.threshold
    );

    for score in &report.scores {
        let marker = match &report.selected {
            Some(m) if m.label == score.label => style("→").green().to_string(),
            _ => " ".to_string(),
        };
        println!("{} {:>6.1}  {}", marker, score.score, score.label);
    }

    match &report.selected {
        Some(m) => println!("\n{} Matched {}", style("✓").green(), m.label),
        None => println!("\n{} No layout reached the threshold", style("✗").red()),
    }

    Ok(())
}
