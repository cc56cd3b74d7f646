//! Record shapes that flow through the extraction pipeline.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The two identifiers selected upstream of extraction.
///
/// They are passed through to every record untouched and are never derived
/// from document text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parties {
    /// Supplier the document was uploaded under.
    pub supplier_name: String,

    /// Company (buyer) the document belongs to.
    pub company_name: String,
}

impl Parties {
    pub fn new(supplier_name: impl Into<String>, company_name: impl Into<String>) -> Self {
        Self {
            supplier_name: supplier_name.into(),
            company_name: company_name.into(),
        }
    }
}

/// An amount as a strategy or fallback found it, before coercion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    /// Text such as `"$1,234.56"`.
    Text(String),
    /// A bare number, as JSON replies sometimes carry.
    Number(f64),
}

impl From<&str> for RawAmount {
    fn from(s: &str) -> Self {
        RawAmount::Text(s.to_string())
    }
}

impl From<String> for RawAmount {
    fn from(s: String) -> Self {
        RawAmount::Text(s)
    }
}

/// Fields produced by one strategy invocation for one billable item.
///
/// Every field is always present in serialized form; unset fields are `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFieldSet {
    pub supplier_name: String,
    pub company_name: String,
    pub invoice_no: Option<String>,
    pub invoice_date: Option<String>,
    pub due_date: Option<String>,
    pub amount: Option<RawAmount>,
    pub reference: Option<String>,
}

impl RawFieldSet {
    /// A field-set with only the pass-through identifiers filled.
    pub fn empty(parties: &Parties) -> Self {
        Self {
            supplier_name: parties.supplier_name.clone(),
            company_name: parties.company_name.clone(),
            ..Default::default()
        }
    }

    /// True when no extracted field is set.
    pub fn is_blank(&self) -> bool {
        self.invoice_no.is_none()
            && self.invoice_date.is_none()
            && self.due_date.is_none()
            && self.amount.is_none()
            && self.reference.is_none()
    }
}

/// Payment state of a persisted record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "Unpaid",
            PaymentStatus::Paid => "Paid",
        }
    }
}

/// Settlement details recorded by the payment workflow.
///
/// Extraction never fills this in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_via: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

/// Key used for duplicate detection: invoice number plus canonical invoice date.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DuplicateKey {
    pub invoice_no: String,
    pub invoice_date: String,
}

/// Normalized, validated record common to all suppliers and document kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    /// Supplier identifier selected upstream.
    pub supplier_name: String,

    /// Company identifier selected upstream.
    pub company_name: String,

    /// Supplier-assigned invoice identifier.
    pub invoice_no: Option<String>,

    /// Invoice date, `dd/mm/yyyy` when coercion succeeded.
    pub invoice_date: Option<String>,

    /// Due date, `dd/mm/yyyy` when coercion succeeded.
    pub due_date: Option<String>,

    /// Amount with grouping separators and currency symbols removed.
    pub amount: Option<Decimal>,

    /// Purchase order or contract number.
    pub reference: Option<String>,

    /// Payment status; new records start as the configured default.
    pub status: PaymentStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<Payment>,

    /// Required fields are all present.
    pub is_valid: bool,

    /// Key already exists in the store snapshot.
    pub is_duplicate: bool,

    /// Soft data-quality notes for the reviewer.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl CanonicalRecord {
    /// True iff invoice number, invoice date and amount are present and non-empty.
    pub fn has_required_fields(&self) -> bool {
        non_empty(&self.invoice_no) && non_empty(&self.invoice_date) && self.amount.is_some()
    }

    /// Duplicate-detection key, when both parts are present.
    pub fn duplicate_key(&self) -> Option<DuplicateKey> {
        match (&self.invoice_no, &self.invoice_date) {
            (Some(no), Some(date)) if !no.trim().is_empty() && !date.trim().is_empty() => {
                Some(DuplicateKey {
                    invoice_no: no.trim().to_string(),
                    invoice_date: date.trim().to_string(),
                })
            }
            _ => None,
        }
    }
}

fn non_empty(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn record() -> CanonicalRecord {
        CanonicalRecord {
            supplier_name: "Acme".to_string(),
            company_name: "Buyer".to_string(),
            invoice_no: Some("INV-1".to_string()),
            invoice_date: Some("05/01/2025".to_string()),
            due_date: None,
            amount: Some(Decimal::from_str("10.00").unwrap()),
            reference: None,
            status: PaymentStatus::Unpaid,
            payment: None,
            is_valid: true,
            is_duplicate: false,
            warnings: Vec::new(),
        }
    }

    #[test]
    fn test_required_fields() {
        assert!(record().has_required_fields());

        let mut r = record();
        r.invoice_no = Some("  ".to_string());
        assert!(!r.has_required_fields());

        let mut r = record();
        r.amount = None;
        assert!(!r.has_required_fields());
    }

    #[test]
    fn test_raw_field_set_serializes_nulls() {
        let raw = RawFieldSet::empty(&Parties::new("Acme", "Buyer"));
        let json = serde_json::to_value(&raw).unwrap();

        assert!(json.get("invoice_no").unwrap().is_null());
        assert!(json.get("amount").unwrap().is_null());
        assert!(json.get("reference").unwrap().is_null());
    }

    #[test]
    fn test_raw_amount_untagged() {
        let a: RawAmount = serde_json::from_str("1234.5").unwrap();
        assert_eq!(a, RawAmount::Number(1234.5));

        let b: RawAmount = serde_json::from_str("\"$1,234.50\"").unwrap();
        assert_eq!(b, RawAmount::Text("$1,234.50".to_string()));
    }

    #[test]
    fn test_status_serializes_as_name() {
        assert_eq!(serde_json::to_string(&PaymentStatus::Unpaid).unwrap(), "\"Unpaid\"");
    }
}
