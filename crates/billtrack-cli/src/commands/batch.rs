//! Batch processing command for multiple documents.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use billtrack_core::{BatchReport, DocumentInput, DocumentKind, KnownKeys, Parties};

use super::output::{OutputFormat, format_outcome};
use super::process::build_pipeline;
use super::source::{is_supported, load_known_keys, read_document};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Supplier the documents were uploaded under
    #[arg(short, long)]
    supplier: String,

    /// Company the documents belong to
    #[arg(long)]
    company: String,

    /// Treat the documents as statements of account
    #[arg(long)]
    statement: bool,

    /// Use the language-model fallback when no layout matches
    #[arg(long)]
    ai_fallback: bool,

    /// Known (invoice_no, invoice_date) pairs, CSV or JSON
    #[arg(long)]
    known_keys: Option<PathBuf>,

    /// Output directory for per-document results
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each document
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Write the insert payload (valid, new records) as JSON
    #[arg(long)]
    payload: Option<PathBuf>,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue when a file cannot be read
    #[arg(long)]
    continue_on_error: bool,
}

/// A file that never reached the pipeline.
struct ReadFailure {
    path: PathBuf,
    error: String,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::config::load(config_path)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| is_supported(p))
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let use_fallback = args.ai_fallback || config.fallback.enabled;
    let pipeline = build_pipeline(&config, use_fallback);
    let parties = Parties::new(&args.supplier, &args.company);
    let kind = DocumentKind::from_is_invoice(!args.statement);

    let known = match &args.known_keys {
        Some(path) => load_known_keys(path, pipeline.normalizer())?,
        None => KnownKeys::new(),
    };

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let mut inputs = Vec::with_capacity(files.len());
    let mut failures = Vec::new();

    for path in &files {
        match read_document(path, &config) {
            Ok(text) => inputs.push(
                DocumentInput::new(text, parties.clone(), kind)
                    .with_fallback(use_fallback)
                    .with_source(path.display().to_string()),
            ),
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to read {}: {}", path.display(), error_msg);
                    failures.push(ReadFailure {
                        path: path.clone(),
                        error: error_msg,
                    });
                } else {
                    error!("Failed to read {}: {}", path.display(), error_msg);
                    anyhow::bail!("Processing failed: {}", error_msg);
                }
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();

    let report = pipeline.process_batch(&inputs, &known);

    if let Some(output_dir) = &args.output_dir {
        let mut taken = HashSet::new();
        for outcome in &report.documents {
            let output_path =
                output_path_for(output_dir, outcome.source.as_deref(), args.format, &mut taken);
            fs::write(&output_path, format_outcome(outcome, args.format)?)?;
            debug!("Wrote output to {}", output_path.display());
        }
    }

    if let Some(payload_path) = &args.payload {
        fs::write(payload_path, serde_json::to_string_pretty(report.insert_payload())?)?;
        println!(
            "{} Insert payload ({} records) written to {}",
            style("✓").green(),
            report.insert_payload().len(),
            payload_path.display()
        );
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &report, &failures)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    print_summary(&report, &failures, start);

    Ok(())
}

/// Output file for one document: the source file name plus the format
/// extension (`inv.pdf` -> `inv.pdf.json`), suffixed when a name repeats.
fn output_path_for(
    output_dir: &Path,
    source: Option<&str>,
    format: OutputFormat,
    taken: &mut HashSet<PathBuf>,
) -> PathBuf {
    let name = source
        .and_then(|s| Path::new(s).file_name())
        .and_then(|s| s.to_str())
        .unwrap_or("document");

    let mut path = output_dir.join(format!("{}.{}", name, format.extension()));
    let mut n = 2;
    while !taken.insert(path.clone()) {
        path = output_dir.join(format!("{}-{}.{}", name, n, format.extension()));
        n += 1;
    }
    path
}

fn print_summary(report: &BatchReport, failures: &[ReadFailure], start: Instant) {
    let parts = &report.partition;

    println!();
    println!(
        "{} Processed {} documents in {:?}",
        style("✓").green(),
        report.documents.len(),
        start.elapsed()
    );
    println!(
        "   {} new, {} duplicate, {} invalid records; {} unmatched documents",
        style(parts.valid_new.len()).green(),
        style(parts.duplicates.len()).yellow(),
        style(parts.invalid.len()).red(),
        report.unmatched_count()
    );

    if !failures.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for failure in failures {
            println!("  - {}: {}", failure.path.display(), failure.error);
        }
    }
}

fn write_summary(path: &Path, report: &BatchReport, failures: &[ReadFailure]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "supplier_match",
        "score",
        "strategy",
        "records",
        "valid",
        "duplicates",
        "processing_time_ms",
        "error",
    ])?;

    for outcome in &report.documents {
        let filename = outcome
            .source
            .as_deref()
            .and_then(|s| Path::new(s).file_name())
            .and_then(|s| s.to_str())
            .unwrap_or("");
        let status = serde_json::to_value(outcome.route)?;

        wtr.write_record([
            filename,
            status.as_str().unwrap_or(""),
            outcome.matched.as_ref().map(|m| m.label.as_str()).unwrap_or(""),
            &outcome
                .matched
                .as_ref()
                .map(|m| format!("{:.1}", m.score))
                .unwrap_or_default(),
            outcome.strategy.as_deref().unwrap_or(""),
            &outcome.records.len().to_string(),
            &outcome.valid_count().to_string(),
            &outcome.records.iter().filter(|r| r.is_duplicate).count().to_string(),
            &outcome.processing_time_ms.to_string(),
            "",
        ])?;
    }

    for failure in failures {
        let filename = failure
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        wtr.write_record([filename, "error", "", "", "", "", "", "", "", failure.error.as_str()])?;
    }

    wtr.flush()?;
    Ok(())
}
