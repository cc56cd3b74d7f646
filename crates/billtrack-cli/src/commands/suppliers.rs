//! Suppliers command - list registered layouts.

use clap::Args;
use console::style;
use serde::Serialize;

use billtrack_core::{DocumentKind, StrategyRegistry};

/// Arguments for the suppliers command.
#[derive(Args)]
pub struct SuppliersArgs {
    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct SupplierEntry {
    supplier: &'static str,
    kind: DocumentKind,
    strategy: &'static str,
}

pub async fn run(args: SuppliersArgs) -> anyhow::Result<()> {
    let registry = StrategyRegistry::builtin();

    let entries: Vec<SupplierEntry> = registry
        .iter()
        .map(|s| SupplierEntry {
            supplier: s.supplier(),
            kind: s.kind(),
            strategy: s.name(),
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("{}", style("Registered supplier layouts:").bold());
    println!();
    println!("  {:<30} {:<8} {}", "Supplier", "Kind", "Strategy");
    println!("  {}", "-".repeat(64));

    for entry in &entries {
        println!(
            "  {:<30} {:<8} {}",
            entry.supplier,
            entry.kind.as_str(),
            style(entry.strategy).dim()
        );
    }

    println!();
    println!("{} {} layouts", style("ℹ").blue(), entries.len());

    Ok(())
}
