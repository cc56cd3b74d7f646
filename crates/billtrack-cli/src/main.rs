//! CLI application for supplier invoice and statement extraction.

mod commands;
mod fallback;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use commands::{batch, classify, config, process, suppliers};

/// billtrack - Extract payable records from supplier invoices and statements
#[derive(Parser)]
#[command(name = "billtrack")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a single document
    Process(process::ProcessArgs),

    /// Process multiple documents
    Batch(batch::BatchArgs),

    /// Show supplier classification scores for a document
    Classify(classify::ClassifyArgs),

    /// List registered supplier layouts
    Suppliers(suppliers::SuppliersArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose)?;

    match cli.command {
        Commands::Process(args) => process::run(args, cli.config.as_deref()).await,
        Commands::Batch(args) => batch::run(args, cli.config.as_deref()).await,
        Commands::Classify(args) => classify::run(args, cli.config.as_deref()).await,
        Commands::Suppliers(args) => suppliers::run(args).await,
        Commands::Config(args) => config::run(args, cli.config.as_deref()).await,
    }
}

/// `RUST_LOG` wins when set; otherwise `-v` raises the level for the billtrack
/// crates only. Logs go to stderr so stdout stays parseable.
fn init_logging(verbose: u8) -> anyhow::Result<()> {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("warn,billtrack={level},billtrack_core={level}"))
    });

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(verbose > 1)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
