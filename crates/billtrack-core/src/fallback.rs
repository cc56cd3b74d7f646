//! Best-effort extractor used when no layout matches.
//!
//! The pipeline only knows this trait. A concrete client (for example a
//! language-model chat endpoint) lives with the caller.

use crate::error::ExtractionError;
use crate::models::record::{Parties, RawFieldSet};

/// An extractor of last resort.
///
/// Its output goes through the same normalizer as strategy output, so dates
/// are canonicalized and the required-field check applies unchanged.
pub trait FallbackExtractor: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Produce a single field-set for the document.
    fn extract(&self, text: &str, parties: &Parties) -> Result<RawFieldSet, ExtractionError>;
}

/// Fallback returning a canned field-set. Handy for tests and dry runs.
#[derive(Debug, Clone)]
pub struct StaticFallback {
    fields: RawFieldSet,
}

impl StaticFallback {
    /// Reply with `fields`, keeping the caller's parties.
    pub fn new(fields: RawFieldSet) -> Self {
        Self { fields }
    }
}

impl FallbackExtractor for StaticFallback {
    fn name(&self) -> &str {
        "static"
    }

    fn extract(&self, _text: &str, parties: &Parties) -> Result<RawFieldSet, ExtractionError> {
        Ok(RawFieldSet {
            supplier_name: parties.supplier_name.clone(),
            company_name: parties.company_name.clone(),
            ..self.fields.clone()
        })
    }
}
