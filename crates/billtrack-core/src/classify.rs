//! Fuzzy supplier classification.
//!
//! A supplier label is usually a short phrase ("Fu Luxe Pte. Ltd.") buried
//! somewhere in a long document, so scoring slides the label across the
//! document and keeps the best window instead of comparing whole strings.

use serde::Serialize;
use tracing::{debug, info, trace};

use crate::coerce::patterns::WHITESPACE_RUN;
use crate::models::config::ClassifierConfig;
use crate::registry::DocumentKind;

/// Best-scoring label for a document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifierMatch {
    /// Candidate label that won.
    pub label: String,
    /// Partial-ratio score, 0 - 100.
    pub score: f64,
}

/// Partial similarity of `needle` within `haystack`, 0 - 100.
///
/// Both sides are lower-cased and whitespace-collapsed. The needle is compared
/// against every window of the haystack with the same character length using
/// normalized Levenshtein similarity; the best window wins. A verbatim
/// occurrence scores 100.
pub fn partial_ratio(needle: &str, haystack: &str) -> f64 {
    let needle = fold(needle);
    let haystack = fold(haystack);

    if needle.is_empty() || haystack.is_empty() {
        return 0.0;
    }
    if haystack.contains(&needle) {
        return 100.0;
    }

    let needle_len = needle.chars().count();
    let boundaries: Vec<usize> = haystack
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(haystack.len()))
        .collect();
    let haystack_len = boundaries.len() - 1;

    if haystack_len <= needle_len {
        return strsim::normalized_levenshtein(&needle, &haystack) * 100.0;
    }

    let mut best = 0.0_f64;
    for start in 0..=(haystack_len - needle_len) {
        let window = &haystack[boundaries[start]..boundaries[start + needle_len]];
        let score = strsim::normalized_levenshtein(&needle, window);
        if score > best {
            best = score;
        }
    }

    best * 100.0
}

/// Score every candidate against the document, in candidate order.
pub fn score_all<S: AsRef<str>>(text: &str, candidates: &[S]) -> Vec<ClassifierMatch> {
    candidates
        .iter()
        .map(|label| ClassifierMatch {
            label: label.as_ref().to_string(),
            score: partial_ratio(label.as_ref(), text),
        })
        .collect()
}

/// Pick the best-scoring candidate if it reaches `threshold`.
///
/// The first candidate holding the maximum score wins, so the result depends
/// only on candidate order and is deterministic.
pub fn classify<S: AsRef<str>>(
    text: &str,
    candidates: &[S],
    threshold: f64,
) -> Option<ClassifierMatch> {
    let mut best: Option<ClassifierMatch> = None;

    for candidate in score_all(text, candidates) {
        trace!("Candidate '{}' scored {:.1}", candidate.label, candidate.score);
        let better = match &best {
            Some(current) => candidate.score > current.score,
            None => true,
        };
        if better {
            best = Some(candidate);
        }
    }

    match best {
        Some(m) if m.score >= threshold => {
            info!("Matched supplier '{}' with score {:.1}", m.label, m.score);
            Some(m)
        }
        Some(m) => {
            debug!(
                "Best candidate '{}' scored {:.1}, below threshold {:.1}",
                m.label, m.score, threshold
            );
            None
        }
        None => None,
    }
}

/// Classifier holding one threshold per document kind.
#[derive(Debug, Clone)]
pub struct SupplierClassifier {
    invoice_threshold: f64,
    statement_threshold: f64,
}

impl SupplierClassifier {
    /// Create a classifier with default thresholds.
    pub fn new() -> Self {
        Self::from_config(&ClassifierConfig::default())
    }

    /// Create a classifier from configuration.
    pub fn from_config(config: &ClassifierConfig) -> Self {
        Self {
            invoice_threshold: config.invoice_threshold,
            statement_threshold: config.statement_threshold,
        }
    }

    /// Set the invoice threshold.
    pub fn with_invoice_threshold(mut self, threshold: f64) -> Self {
        self.invoice_threshold = threshold;
        self
    }

    /// Set the statement threshold.
    pub fn with_statement_threshold(mut self, threshold: f64) -> Self {
        self.statement_threshold = threshold;
        self
    }

    /// Threshold applied to documents of `kind`.
    pub fn threshold(&self, kind: DocumentKind) -> f64 {
        match kind {
            DocumentKind::Invoice => self.invoice_threshold,
            DocumentKind::StatementOfAccount => self.statement_threshold,
        }
    }

    /// Classify `text` among `candidates` with the threshold for `kind`.
    pub fn classify<S: AsRef<str>>(
        &self,
        text: &str,
        candidates: &[S],
        kind: DocumentKind,
    ) -> Option<ClassifierMatch> {
        classify(text, candidates, self.threshold(kind))
    }
}

impl Default for SupplierClassifier {
    fn default() -> Self {
        Self::new()
    }
}

fn fold(s: &str) -> String {
    WHITESPACE_RUN.replace_all(s.trim(), " ").to_lowercase()
}
