//! Error types for the billtrack-core library.

use thiserror::Error;

/// Main error type for the billtrack library.
#[derive(Error, Debug)]
pub enum BilltrackError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Extraction pipeline error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to reading the text layer of a PDF.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// The PDF carries no usable text layer; it must go through OCR first.
    #[error("PDF has no usable text layer ({0} characters)")]
    NoTextLayer(usize),
}

/// Errors raised around strategy dispatch and the fallback collaborator.
///
/// None of these escape [`crate::pipeline::Pipeline::process`]; the pipeline
/// turns them into warnings on the outcome.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// A second strategy was registered for an existing key.
    #[error("a strategy is already registered for {supplier} ({kind})")]
    DuplicateStrategy { supplier: String, kind: String },

    /// A strategy panicked while scanning a document.
    #[error("strategy {0} failed on this document")]
    StrategyPanicked(String),

    /// The fallback extractor could not produce a result.
    #[error("fallback extraction failed: {0}")]
    Fallback(String),

    /// The fallback extractor answered with something that is not a record.
    #[error("malformed fallback reply: {0}")]
    MalformedReply(String),
}

/// Result type for the billtrack library.
pub type Result<T> = std::result::Result<T, BilltrackError>;
