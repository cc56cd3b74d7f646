//! Registry of per-(supplier, document kind) extraction strategies.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ExtractionError;
use crate::models::record::{Parties, RawFieldSet};
use crate::strategies;

/// Kind of supplier document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// A single bill.
    Invoice,
    /// A multi-line-item ledger.
    StatementOfAccount,
}

impl DocumentKind {
    /// Map the upload form's "processing invoices" toggle to a kind.
    pub fn from_is_invoice(is_invoice: bool) -> Self {
        if is_invoice {
            DocumentKind::Invoice
        } else {
            DocumentKind::StatementOfAccount
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Invoice => "Invoice",
            DocumentKind::StatementOfAccount => "SOA",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registry lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SupplierKey {
    /// Supplier identity string as it appears on the document.
    pub supplier: String,
    /// Document kind.
    pub kind: DocumentKind,
}

impl SupplierKey {
    pub fn new(supplier: impl Into<String>, kind: DocumentKind) -> Self {
        Self {
            supplier: supplier.into(),
            kind,
        }
    }
}

/// One supplier layout's extraction routine.
///
/// Implementations must be pure and total: no shared mutable state, and a
/// field that cannot be found is `None` rather than an error.
pub trait ExtractionStrategy: Send + Sync {
    /// Short strategy name for logs and outcomes.
    fn name(&self) -> &'static str;

    /// Supplier identity string; also the classifier label.
    fn supplier(&self) -> &'static str;

    /// Document kind this layout handles.
    fn kind(&self) -> DocumentKind;

    /// Extract zero or more raw field-sets from the full document text.
    fn extract(&self, text: &str, parties: &Parties) -> Vec<RawFieldSet>;

    /// Registry key for this strategy.
    fn key(&self) -> SupplierKey {
        SupplierKey::new(self.supplier(), self.kind())
    }
}

/// Ordered, keyed collection of strategies.
///
/// Registration order is kept: it is the candidate order handed to the
/// classifier and therefore decides ties.
#[derive(Default)]
pub struct StrategyRegistry {
    entries: Vec<Box<dyn ExtractionStrategy>>,
    index: HashMap<SupplierKey, usize>,
}

impl StrategyRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every shipped strategy.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for strategy in strategies::builtin() {
            if let Err(e) = registry.register(strategy) {
                warn!("Skipping built-in strategy: {}", e);
            }
        }
        registry
    }

    /// Add a strategy. A key maps to exactly one strategy.
    pub fn register(
        &mut self,
        strategy: Box<dyn ExtractionStrategy>,
    ) -> Result<(), ExtractionError> {
        let key = strategy.key();
        if self.index.contains_key(&key) {
            return Err(ExtractionError::DuplicateStrategy {
                supplier: key.supplier,
                kind: key.kind.to_string(),
            });
        }
        self.index.insert(key, self.entries.len());
        self.entries.push(strategy);
        Ok(())
    }

    /// Exact-key lookup.
    pub fn lookup(&self, label: &str, kind: DocumentKind) -> Option<&dyn ExtractionStrategy> {
        let key = SupplierKey::new(label, kind);
        self.index.get(&key).map(|&i| self.entries[i].as_ref())
    }

    /// Supplier labels registered for `kind`, in registration order.
    pub fn labels(&self, kind: DocumentKind) -> Vec<&'static str> {
        self.entries
            .iter()
            .filter(|s| s.kind() == kind)
            .map(|s| s.supplier())
            .collect()
    }

    /// All strategies in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn ExtractionStrategy> {
        self.entries.iter().map(|s| s.as_ref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|s| (s.supplier(), s.kind())))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(&'static str, DocumentKind);

    impl ExtractionStrategy for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn supplier(&self) -> &'static str {
            self.0
        }

        fn kind(&self) -> DocumentKind {
            self.1
        }

        fn extract(&self, _text: &str, parties: &Parties) -> Vec<RawFieldSet> {
            vec![RawFieldSet::empty(parties)]
        }
    }

    #[test]
    fn test_lookup_is_exact_on_kind() {
        let mut registry = StrategyRegistry::new();
        registry.register(Box::new(Fixed("Acme", DocumentKind::Invoice))).unwrap();

        assert!(registry.lookup("Acme", DocumentKind::Invoice).is_some());
        assert!(registry.lookup("Acme", DocumentKind::StatementOfAccount).is_none());
        assert!(registry.lookup("acme", DocumentKind::Invoice).is_none());
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let mut registry = StrategyRegistry::new();
        registry.register(Box::new(Fixed("Acme", DocumentKind::Invoice))).unwrap();

        let err = registry
            .register(Box::new(Fixed("Acme", DocumentKind::Invoice)))
            .unwrap_err();
        assert!(matches!(err, ExtractionError::DuplicateStrategy { .. }));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_labels_keep_registration_order() {
        let mut registry = StrategyRegistry::new();
        registry.register(Box::new(Fixed("Zeta", DocumentKind::Invoice))).unwrap();
        registry.register(Box::new(Fixed("Alpha", DocumentKind::StatementOfAccount))).unwrap();
        registry.register(Box::new(Fixed("Beta", DocumentKind::Invoice))).unwrap();

        assert_eq!(registry.labels(DocumentKind::Invoice), vec!["Zeta", "Beta"]);
        assert_eq!(registry.labels(DocumentKind::StatementOfAccount), vec!["Alpha"]);
    }

    #[test]
    fn test_builtin_registers_every_strategy() {
        let registry = StrategyRegistry::builtin();
        assert_eq!(registry.len(), strategies::builtin().len());

        for strategy in registry.iter() {
            let found = registry.lookup(strategy.supplier(), strategy.kind()).unwrap();
            assert_eq!(found.name(), strategy.name());
        }
    }

    #[test]
    fn test_from_is_invoice() {
        assert_eq!(DocumentKind::from_is_invoice(true), DocumentKind::Invoice);
        assert_eq!(DocumentKind::from_is_invoice(false), DocumentKind::StatementOfAccount);
    }
}
