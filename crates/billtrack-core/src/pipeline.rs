//! Classification, dispatch and normalization for one document or a batch.

use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::classify::{ClassifierMatch, SupplierClassifier};
use crate::error::ExtractionError;
use crate::fallback::FallbackExtractor;
use crate::models::config::BilltrackConfig;
use crate::models::record::{CanonicalRecord, Parties, RawFieldSet};
use crate::normalize::{KnownKeys, Normalizer, Partition, flag_duplicates, partition};
use crate::registry::{DocumentKind, ExtractionStrategy, StrategyRegistry};

/// One uploaded document, already reduced to text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentInput {
    /// Page-concatenated document text.
    pub text: String,
    pub supplier_name: String,
    pub company_name: String,
    pub kind: DocumentKind,
    /// Hand unmatched documents to the fallback extractor.
    pub allow_fallback: bool,
    /// Where the text came from, for reporting.
    pub source: Option<String>,
}

impl DocumentInput {
    pub fn new(text: impl Into<String>, parties: Parties, kind: DocumentKind) -> Self {
        Self {
            text: text.into(),
            supplier_name: parties.supplier_name,
            company_name: parties.company_name,
            kind,
            allow_fallback: false,
            source: None,
        }
    }

    pub fn with_fallback(mut self, allow: bool) -> Self {
        self.allow_fallback = allow;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn parties(&self) -> Parties {
        Parties::new(self.supplier_name.clone(), self.company_name.clone())
    }
}

/// How a document's records were produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    /// A registered layout strategy ran.
    Strategy,
    /// The fallback extractor answered.
    Fallback,
    /// Nothing matched; a single all-empty record stands in.
    Unmatched,
}

/// Result of processing one document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentOutcome {
    pub source: Option<String>,
    pub kind: DocumentKind,
    /// Classifier winner, if any reached the threshold.
    pub matched: Option<ClassifierMatch>,
    /// Name of the strategy that ran.
    pub strategy: Option<String>,
    pub route: Route,
    pub records: Vec<CanonicalRecord>,
    pub warnings: Vec<String>,
    pub processing_time_ms: u64,
}

impl DocumentOutcome {
    pub fn valid_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_valid).count()
    }
}

/// Result of a batch run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// Per-document outcomes in submission order, duplicates flagged.
    pub documents: Vec<DocumentOutcome>,
    /// All records, split for persistence.
    pub partition: Partition,
    pub processing_time_ms: u64,
}

impl BatchReport {
    /// Records to hand to the store.
    pub fn insert_payload(&self) -> &[CanonicalRecord] {
        self.partition.insert_payload()
    }

    pub fn record_count(&self) -> usize {
        self.partition.total()
    }

    pub fn unmatched_count(&self) -> usize {
        self.documents
            .iter()
            .filter(|d| d.route == Route::Unmatched)
            .count()
    }
}

/// The extraction pipeline. Holds everything a run needs; no global state.
pub struct Pipeline {
    registry: StrategyRegistry,
    classifier: SupplierClassifier,
    normalizer: Normalizer,
    fallback: Option<Box<dyn FallbackExtractor>>,
}

impl Pipeline {
    /// Pipeline with every shipped strategy and default settings.
    pub fn new() -> Self {
        Self::from_config(&BilltrackConfig::default())
    }

    /// Pipeline with every shipped strategy and the given settings.
    pub fn from_config(config: &BilltrackConfig) -> Self {
        Self {
            registry: StrategyRegistry::builtin(),
            classifier: SupplierClassifier::from_config(&config.classifier),
            normalizer: Normalizer::from_config(&config.normalizer),
            fallback: None,
        }
    }

    pub fn with_registry(mut self, registry: StrategyRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_classifier(mut self, classifier: SupplierClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Install the extractor used for unmatched documents that allow it.
    pub fn with_fallback(mut self, fallback: Box<dyn FallbackExtractor>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    pub fn classifier(&self) -> &SupplierClassifier {
        &self.classifier
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Classify against the labels registered for `kind`.
    pub fn classify(&self, text: &str, kind: DocumentKind) -> Option<ClassifierMatch> {
        let labels = self.registry.labels(kind);
        self.classifier.classify(text, &labels, kind)
    }

    /// Process one document. Never fails: every problem becomes a warning,
    /// an empty record list or an all-empty record.
    pub fn process(&self, input: &DocumentInput) -> DocumentOutcome {
        let start = Instant::now();
        let parties = input.parties();
        let mut warnings = Vec::new();

        let matched = self.classify(&input.text, input.kind);
        let strategy = matched
            .as_ref()
            .and_then(|m| self.registry.lookup(&m.label, input.kind));

        let (route, strategy_name, raws) = match strategy {
            Some(strategy) => {
                let raws = dispatch(strategy, &input.text, &parties, &mut warnings);
                (Route::Strategy, Some(strategy.name().to_string()), raws)
            }
            None => {
                match &matched {
                    Some(m) => {
                        warn!("No {} strategy registered for '{}'", input.kind, m.label);
                        warnings.push(format!("no {} layout registered for {}", input.kind, m.label));
                    }
                    None => {
                        warn!("No supplier layout matched {}", describe(input));
                        warnings.push("no supplier layout matched".to_string());
                    }
                }

                match self.run_fallback(input, &parties, &mut warnings) {
                    Some(raw) => (Route::Fallback, None, vec![raw]),
                    None => (Route::Unmatched, None, vec![RawFieldSet::empty(&parties)]),
                }
            }
        };

        let records = self.normalizer.normalize_all(raws);
        let processing_time_ms = start.elapsed().as_millis() as u64;

        debug!(
            "{}: {} record(s) via {:?} in {} ms",
            describe(input),
            records.len(),
            route,
            processing_time_ms
        );

        DocumentOutcome {
            source: input.source.clone(),
            kind: input.kind,
            matched,
            strategy: strategy_name,
            route,
            records,
            warnings,
            processing_time_ms,
        }
    }

    /// Process documents in submission order, flag duplicates against the
    /// fixed `known` snapshot and partition the records.
    ///
    /// Records accepted earlier in the batch do not extend the snapshot.
    pub fn process_batch(&self, inputs: &[DocumentInput], known: &KnownKeys) -> BatchReport {
        let start = Instant::now();

        let documents: Vec<DocumentOutcome> = inputs
            .iter()
            .map(|input| {
                let mut outcome = self.process(input);
                outcome.records = flag_duplicates(outcome.records, known);
                outcome
            })
            .collect();

        let all_records = documents
            .iter()
            .flat_map(|d| d.records.iter().cloned())
            .collect();
        let partition = partition(all_records);

        info!(
            "Batch of {} document(s): {} new, {} duplicate, {} invalid",
            documents.len(),
            partition.valid_new.len(),
            partition.duplicates.len(),
            partition.invalid.len()
        );

        BatchReport {
            documents,
            partition,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }

    fn run_fallback(
        &self,
        input: &DocumentInput,
        parties: &Parties,
        warnings: &mut Vec<String>,
    ) -> Option<RawFieldSet> {
        if !input.allow_fallback {
            return None;
        }

        let Some(fallback) = &self.fallback else {
            warnings.push("fallback requested but no fallback extractor is configured".to_string());
            return None;
        };

        info!("Handing {} to fallback '{}'", describe(input), fallback.name());
        match fallback.extract(&input.text, parties) {
            Ok(raw) => Some(raw),
            Err(e) => {
                warn!("Fallback '{}' failed: {}", fallback.name(), e);
                warnings.push(e.to_string());
                None
            }
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Run a strategy, turning a panic into zero records.
fn dispatch(
    strategy: &dyn ExtractionStrategy,
    text: &str,
    parties: &Parties,
    warnings: &mut Vec<String>,
) -> Vec<RawFieldSet> {
    match panic::catch_unwind(AssertUnwindSafe(|| strategy.extract(text, parties))) {
        Ok(raws) => {
            if raws.is_empty() {
                warnings.push(format!("{} found no line items", strategy.name()));
            }
            raws
        }
        Err(_) => {
            let err = ExtractionError::StrategyPanicked(strategy.name().to_string());
            warn!("{}", err);
            warnings.push(err.to_string());
            Vec::new()
        }
    }
}

fn describe(input: &DocumentInput) -> &str {
    input.source.as_deref().unwrap_or("document")
}
