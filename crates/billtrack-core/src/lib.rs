//! Core library for supplier invoice and statement extraction.
//!
//! This crate provides:
//! - Fuzzy supplier classification of raw document text
//! - A registry of per-(supplier, document kind) extraction strategies
//! - Date and amount coercion to canonical forms
//! - Record normalization, validation and duplicate flagging
//! - PDF text-layer extraction

pub mod classify;
pub mod coerce;
pub mod error;
pub mod fallback;
pub mod models;
pub mod normalize;
pub mod pdf;
pub mod pipeline;
pub mod registry;
pub mod strategies;
pub mod text;

pub use classify::{ClassifierMatch, SupplierClassifier, classify, partial_ratio};
pub use coerce::{parse_amount, parse_date};
pub use error::{BilltrackError, ExtractionError, PdfError, Result};
pub use fallback::{FallbackExtractor, StaticFallback};
pub use models::config::BilltrackConfig;
pub use models::record::{
    CanonicalRecord, DuplicateKey, Parties, Payment, PaymentStatus, RawAmount, RawFieldSet,
};
pub use normalize::{KnownKeys, Normalizer, Partition, flag_duplicates, partition};
pub use pdf::{PdfContent, PdfExtractor, PdfProcessor};
pub use pipeline::{BatchReport, DocumentInput, DocumentOutcome, Pipeline, Route};
pub use registry::{DocumentKind, ExtractionStrategy, StrategyRegistry, SupplierKey};
