//! Document text and known-keys loading.

use std::fs;
use std::path::Path;

use tracing::debug;

use billtrack_core::models::config::BilltrackConfig;
use billtrack_core::text::{document_from_pages, split_pages, truncate_chars};
use billtrack_core::{DuplicateKey, KnownKeys, Normalizer, PdfExtractor, PdfProcessor};

/// File extensions the CLI reads documents from.
pub fn is_supported(path: &Path) -> bool {
    matches!(extension(path).as_str(), "pdf" | "txt")
}

/// Read a document as normalized text.
///
/// PDFs must carry a text layer; `.txt` files are taken as already-extracted
/// text, with form feeds as page breaks.
pub fn read_document(path: &Path, config: &BilltrackConfig) -> anyhow::Result<String> {
    let ext = extension(path);

    let text = match ext.as_str() {
        "pdf" => {
            let extractor = PdfExtractor::open(path, &config.pdf)?;
            debug!("PDF has {} pages", extractor.page_count());
            extractor.extract_content()?.text
        }
        "txt" => {
            let raw = fs::read_to_string(path)?;
            document_from_pages(&split_pages(&raw))
        }
        _ => anyhow::bail!("Unsupported file format: {}", ext),
    };

    if text.trim().is_empty() {
        anyhow::bail!("No text could be read from {}", path.display());
    }

    Ok(truncate_chars(&text, config.pdf.max_text_chars).to_string())
}

/// Load the store's known-keys snapshot from CSV (`invoice_no,invoice_date`)
/// or a JSON array of objects. Dates are canonicalized on the way in.
pub fn load_known_keys(path: &Path, normalizer: &Normalizer) -> anyhow::Result<KnownKeys> {
    let keys: Vec<DuplicateKey> = match extension(path).as_str() {
        "json" => serde_json::from_str(&fs::read_to_string(path)?)?,
        "csv" => {
            let mut rdr = csv::Reader::from_path(path)?;
            rdr.deserialize().collect::<Result<Vec<DuplicateKey>, _>>()?
        }
        other => anyhow::bail!("Known keys must be .csv or .json, got '{}'", other),
    };

    let known = normalizer.known_keys(keys);
    debug!("Loaded {} known keys from {}", known.len(), path.display());
    Ok(known)
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}
