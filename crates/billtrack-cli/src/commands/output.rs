//! Rendering of outcomes and records as JSON, CSV or text.

use billtrack_core::coerce::format_amount;
use billtrack_core::{CanonicalRecord, DocumentOutcome, Route};

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub fn format_outcome(outcome: &DocumentOutcome, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(outcome)?),
        OutputFormat::Csv => records_csv(&outcome.records),
        OutputFormat::Text => Ok(outcome_text(outcome)),
    }
}

pub fn records_csv(records: &[CanonicalRecord]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "supplier_name",
        "company_name",
        "invoice_no",
        "invoice_date",
        "due_date",
        "amount",
        "reference",
        "status",
        "is_valid",
        "is_duplicate",
        "warnings",
    ])?;

    for record in records {
        wtr.write_record([
            record.supplier_name.as_str(),
            record.company_name.as_str(),
            record.invoice_no.as_deref().unwrap_or(""),
            record.invoice_date.as_deref().unwrap_or(""),
            record.due_date.as_deref().unwrap_or(""),
            &record.amount.map(|a| a.to_string()).unwrap_or_default(),
            record.reference.as_deref().unwrap_or(""),
            record.status.as_str(),
            &record.is_valid.to_string(),
            &record.is_duplicate.to_string(),
            &record.warnings.join("; "),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn outcome_text(outcome: &DocumentOutcome) -> String {
    let mut output = String::new();

    if let Some(source) = &outcome.source {
        output.push_str(&format!("Document: {}\n", source));
    }

    match (&outcome.matched, outcome.route) {
        (Some(m), Route::Strategy) => output.push_str(&format!(
            "Supplier: {} ({}, score {:.1}, {})\n",
            m.label,
            outcome.kind,
            m.score,
            outcome.strategy.as_deref().unwrap_or("-")
        )),
        (_, Route::Fallback) => output.push_str("Supplier: no layout matched, fallback extractor used\n"),
        _ => output.push_str("Supplier: no layout matched\n"),
    }

    output.push_str(&format!("Records: {}\n", outcome.records.len()));

    for (i, record) in outcome.records.iter().enumerate() {
        let flag = if !record.is_valid {
            "INVALID"
        } else if record.is_duplicate {
            "DUPLICATE"
        } else {
            "ok"
        };

        output.push_str(&format!(
            "  [{}] {:<14} {:<10}  due {:<10}  {:>12}  {}  {}\n",
            i + 1,
            record.invoice_no.as_deref().unwrap_or("-"),
            record.invoice_date.as_deref().unwrap_or("-"),
            record.due_date.as_deref().unwrap_or("-"),
            record.amount.map(format_amount).unwrap_or_else(|| "-".to_string()),
            record.reference.as_deref().unwrap_or("-"),
            flag
        ));

        for warning in &record.warnings {
            output.push_str(&format!("      ! {}\n", warning));
        }
    }

    if !outcome.warnings.is_empty() {
        output.push_str("\nWarnings:\n");
        for warning in &outcome.warnings {
            output.push_str(&format!("  - {}\n", warning));
        }
    }

    output
}
