//! PDF text extraction using lopdf and pdf-extract.

use lopdf::Document;
use std::path::Path;
use tracing::{debug, trace};

use super::{PdfProcessor, Result};
use crate::error::PdfError;
use crate::models::config::PdfConfig;
use crate::text::{document_from_pages, split_pages};

/// PDF text extractor.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
    min_text_length: usize,
}

/// Text pulled from a PDF, ready for the pipeline.
#[derive(Debug, Clone)]
pub struct PdfContent {
    /// Per-page text, in page order.
    pub pages: Vec<String>,
    /// Pages joined and normalized into one document.
    pub text: String,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
            min_text_length: 20,
        }
    }

    /// Minimum normalized text length for a usable text layer.
    pub fn with_min_text_length(mut self, min: usize) -> Self {
        self.min_text_length = min;
        self
    }

    /// Load a PDF file from disk with the configured text-layer threshold.
    pub fn open(path: &Path, config: &PdfConfig) -> Result<Self> {
        let data = std::fs::read(path)
            .map_err(|e| PdfError::Parse(format!("{}: {}", path.display(), e)))?;
        let mut extractor = Self::new().with_min_text_length(config.min_text_length);
        extractor.load(&data)?;
        Ok(extractor)
    }

    /// Extract the document text, failing when the text layer is too thin.
    pub fn extract_content(&self) -> Result<PdfContent> {
        let pages = self.extract_pages()?;
        let text = document_from_pages(&pages);
        let usable = text.chars().filter(|c| !c.is_whitespace()).count();

        debug!(
            "PDF text layer: {} pages, {} non-blank chars",
            pages.len(),
            usable
        );

        if usable < self.min_text_length {
            return Err(PdfError::NoTextLayer(usable));
        }

        Ok(PdfContent { pages, text })
    }

    fn loaded(&self) -> Result<&Document> {
        self.document
            .as_ref()
            .ok_or_else(|| PdfError::Parse("No document loaded".to_string()))
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract reads the bytes, so keep the decrypted form
            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn extract_text(&self) -> Result<String> {
        self.loaded()?;
        pdf_extract::extract_text_from_mem(&self.raw_data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }

    fn extract_pages(&self) -> Result<Vec<String>> {
        let doc = self.loaded()?;
        let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();

        let mut pages = Vec::with_capacity(page_numbers.len());
        for number in &page_numbers {
            let text = doc.extract_text(&[*number]).unwrap_or_default();
            trace!("Page {}: {} chars", number, text.len());
            pages.push(text);
        }

        if pages.iter().all(|p| p.trim().is_empty()) {
            // Some encodings defeat lopdf's per-page decoder; pdf-extract
            // handles more fonts and marks page breaks with form feeds.
            debug!("Per-page text empty, falling back to whole-document extraction");
            let full = self.extract_text()?;
            return Ok(split_pages(&full).into_iter().map(String::from).collect());
        }

        Ok(pages)
    }
}
