//! Process command - extract records from a single document.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use billtrack_core::models::config::BilltrackConfig;
use billtrack_core::{DocumentInput, DocumentKind, Parties, Pipeline, flag_duplicates};

use super::output::{OutputFormat, format_outcome};
use super::source::{load_known_keys, read_document};
use crate::fallback::ChatFallback;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF with a text layer, or extracted .txt)
    #[arg(required = true)]
    input: PathBuf,

    /// Supplier the document was uploaded under
    #[arg(short, long)]
    supplier: String,

    /// Company the document belongs to
    #[arg(long)]
    company: String,

    /// Treat the document as a statement of account
    #[arg(long)]
    statement: bool,

    /// Use the language-model fallback when no layout matches
    #[arg(long)]
    ai_fallback: bool,

    /// Known (invoice_no, invoice_date) pairs, CSV or JSON
    #[arg(long)]
    known_keys: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::config::load(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));

    pb.set_message("Reading document...");
    let text = read_document(&args.input, &config)?;

    pb.set_message("Extracting records...");
    let use_fallback = args.ai_fallback || config.fallback.enabled;
    let pipeline = build_pipeline(&config, use_fallback);

    let kind = DocumentKind::from_is_invoice(!args.statement);
    let input = DocumentInput::new(text, Parties::new(&args.supplier, &args.company), kind)
        .with_fallback(use_fallback)
        .with_source(args.input.display().to_string());

    let mut outcome = pipeline.process(&input);

    if let Some(path) = &args.known_keys {
        let known = load_known_keys(path, pipeline.normalizer())?;
        outcome.records = flag_duplicates(outcome.records, &known);
    }

    pb.finish_and_clear();

    for warning in &outcome.warnings {
        eprintln!("{} {}", style("⚠").yellow(), warning);
    }

    let output = format_outcome(&outcome, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Pipeline from configuration, with the chat fallback installed when wanted
/// and available.
pub fn build_pipeline(config: &BilltrackConfig, use_fallback: bool) -> Pipeline {
    let pipeline = Pipeline::from_config(config);

    if !use_fallback {
        return pipeline;
    }

    match ChatFallback::from_config(&config.fallback) {
        Ok(fallback) => pipeline.with_fallback(Box::new(fallback)),
        Err(e) => {
            warn!("Fallback unavailable: {}", e);
            pipeline
        }
    }
}
