//! Record normalization, validation and duplicate flagging.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::coerce::{is_canonical_date, parse_amount, parse_date};
use crate::models::config::NormalizerConfig;
use crate::models::record::{
    CanonicalRecord, DuplicateKey, PaymentStatus, RawAmount, RawFieldSet,
};

/// Turns raw field-sets into canonical records.
#[derive(Debug, Clone)]
pub struct Normalizer {
    date_formats: Vec<String>,
    default_status: PaymentStatus,
}

impl Normalizer {
    /// Create a normalizer with default date formats.
    pub fn new() -> Self {
        Self::from_config(&NormalizerConfig::default())
    }

    /// Create a normalizer from configuration.
    pub fn from_config(config: &NormalizerConfig) -> Self {
        Self {
            date_formats: config.date_formats.clone(),
            default_status: config.default_status,
        }
    }

    /// Replace the date formats tried on every date field.
    pub fn with_date_formats<S: Into<String>>(mut self, formats: impl IntoIterator<Item = S>) -> Self {
        self.date_formats = formats.into_iter().map(Into::into).collect();
        self
    }

    /// Date formats in the order they are tried.
    pub fn date_formats(&self) -> &[String] {
        &self.date_formats
    }

    /// Coerce every field and compute validity.
    ///
    /// The record is never flagged duplicate here; see [`flag_duplicates`].
    pub fn normalize(&self, raw: RawFieldSet) -> CanonicalRecord {
        let mut warnings = Vec::new();

        let invoice_date = self.coerce_date("invoice_date", raw.invoice_date, &mut warnings);
        let due_date = self.coerce_date("due_date", raw.due_date, &mut warnings);
        let amount = coerce_amount(raw.amount, &mut warnings);

        let mut record = CanonicalRecord {
            supplier_name: raw.supplier_name,
            company_name: raw.company_name,
            invoice_no: trimmed(raw.invoice_no),
            invoice_date,
            due_date,
            amount,
            reference: trimmed(raw.reference),
            status: self.default_status,
            payment: None,
            is_valid: false,
            is_duplicate: false,
            warnings,
        };
        record.is_valid = record.has_required_fields();

        if !record.is_valid {
            debug!(
                "Record {:?} is missing required fields",
                record.invoice_no.as_deref().unwrap_or("<no invoice number>")
            );
        }

        record
    }

    /// Normalize a batch of field-sets, preserving order.
    pub fn normalize_all(&self, raws: Vec<RawFieldSet>) -> Vec<CanonicalRecord> {
        raws.into_iter().map(|raw| self.normalize(raw)).collect()
    }

    /// A duplicate key with its date in canonical form.
    pub fn canonical_key(&self, invoice_no: &str, invoice_date: &str) -> DuplicateKey {
        DuplicateKey {
            invoice_no: invoice_no.trim().to_string(),
            invoice_date: parse_date(invoice_date.trim(), &self.date_formats),
        }
    }

    /// Build a known-keys snapshot, canonicalizing each stored date.
    pub fn known_keys<I>(&self, keys: I) -> KnownKeys
    where
        I: IntoIterator<Item = DuplicateKey>,
    {
        keys.into_iter()
            .map(|k| self.canonical_key(&k.invoice_no, &k.invoice_date))
            .collect()
    }

    fn coerce_date(
        &self,
        field: &str,
        raw: Option<String>,
        warnings: &mut Vec<String>,
    ) -> Option<String> {
        let raw = trimmed(raw)?;
        let date = parse_date(&raw, &self.date_formats);
        if !is_canonical_date(&date) {
            warnings.push(format!("{} '{}' is not a recognised date", field, date));
        }
        Some(date)
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

fn coerce_amount(raw: Option<RawAmount>, warnings: &mut Vec<String>) -> Option<Decimal> {
    let raw = raw?;
    match parse_amount(&raw) {
        Some(value) => {
            if value.is_sign_negative() && !value.is_zero() {
                warnings.push(format!("amount {} is a credit", value));
            }
            Some(value)
        }
        None => {
            let shown = match &raw {
                RawAmount::Text(s) => s.clone(),
                RawAmount::Number(n) => n.to_string(),
            };
            warnings.push(format!("amount '{}' is not numeric", shown));
            None
        }
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Snapshot of (invoice number, canonical invoice date) pairs already stored.
///
/// Read-only for the duration of a batch.
#[derive(Debug, Clone, Default)]
pub struct KnownKeys {
    keys: HashSet<DuplicateKey>,
}

impl KnownKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key as given. Use [`Normalizer::canonical_key`] first when the
    /// date may not be canonical.
    pub fn insert(&mut self, key: DuplicateKey) -> bool {
        self.keys.insert(key)
    }

    pub fn contains(&self, key: &DuplicateKey) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DuplicateKey> {
        self.keys.iter()
    }
}

impl FromIterator<DuplicateKey> for KnownKeys {
    fn from_iter<T: IntoIterator<Item = DuplicateKey>>(iter: T) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

/// Flag records whose key is in the snapshot. Other fields play no part.
pub fn flag_duplicates(mut records: Vec<CanonicalRecord>, known: &KnownKeys) -> Vec<CanonicalRecord> {
    for record in &mut records {
        record.is_duplicate = record
            .duplicate_key()
            .is_some_and(|key| known.contains(&key));
    }
    records
}

/// Records split for the persistence collaborator.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Partition {
    /// Valid and not yet stored.
    pub valid_new: Vec<CanonicalRecord>,
    /// Valid but already stored.
    pub duplicates: Vec<CanonicalRecord>,
    /// Missing a required field; needs manual correction.
    pub invalid: Vec<CanonicalRecord>,
}

impl Partition {
    /// The batch insert payload: valid, non-duplicate records only.
    pub fn insert_payload(&self) -> &[CanonicalRecord] {
        &self.valid_new
    }

    pub fn total(&self) -> usize {
        self.valid_new.len() + self.duplicates.len() + self.invalid.len()
    }
}

/// Split records into new, duplicate and invalid, keeping order in each.
pub fn partition(records: Vec<CanonicalRecord>) -> Partition {
    let mut out = Partition::default();
    for record in records {
        if !record.is_valid {
            out.invalid.push(record);
        } else if record.is_duplicate {
            out.duplicates.push(record);
        } else {
            out.valid_new.push(record);
        }
    }
    out
}
