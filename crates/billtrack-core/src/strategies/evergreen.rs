//! Evergreen Produce Pte Ltd tax invoices.

use lazy_static::lazy_static;
use regex::Regex;

use super::layout::{AmountRule, DateRule, InvoiceLayout};
use crate::models::record::{Parties, RawFieldSet};
use crate::registry::{DocumentKind, ExtractionStrategy};

pub const SUPPLIER: &str = "Evergreen Produce Pte Ltd";

const DATE_FORMATS: &[&str] = &["%d-%b-%Y", "%d/%m/%Y"];

lazy_static! {
    static ref INVOICE_NO: Regex =
        Regex::new(r"(?i)Tax\s+Invoice\s+No\.?\s*:?\s*([A-Z0-9][A-Z0-9/\-]*)").unwrap();
    static ref INVOICE_DATE: Regex = Regex::new(
        r"(?im)^\s*(?:Invoice\s+)?Date\s*:?\s*(\d{1,2}-[A-Z]{3}-\d{4}|\d{1,2}/\d{1,2}/\d{4})"
    ).unwrap();
    static ref DUE_DATE: Regex = Regex::new(
        r"(?i)Due\s+Date\s*:?\s*(\d{1,2}-[A-Z]{3}-\d{4}|\d{1,2}/\d{1,2}/\d{4})"
    ).unwrap();
    static ref CUSTOMER_PO: Regex =
        Regex::new(r"(?i)Customer\s+PO\s*(?:No\.?)?\s*:?\s*([A-Z0-9][A-Z0-9\-]*)").unwrap();
    // Grand total line; "SUB TOTAL" does not qualify
    static ref TOTAL_LINE: Regex = Regex::new(r"(?i)^\s*TOTAL\b").unwrap();
}

/// Evergreen Produce tax invoice. The payable figure is the last amount on
/// the final TOTAL line, after GST.
pub struct EvergreenInvoice {
    layout: InvoiceLayout,
}

impl EvergreenInvoice {
    pub fn new() -> Self {
        Self {
            layout: InvoiceLayout {
                invoice_no: vec![&*INVOICE_NO],
                invoice_date: DateRule::new(vec![&*INVOICE_DATE], DATE_FORMATS),
                due_date: Some(DateRule::new(vec![&*DUE_DATE], DATE_FORMATS)),
                reference: vec![&*CUSTOMER_PO],
                amount: AmountRule::LastTokenOnLine(&TOTAL_LINE),
            },
        }
    }
}

impl Default for EvergreenInvoice {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionStrategy for EvergreenInvoice {
    fn name(&self) -> &'static str {
        "evergreen_invoice"
    }

    fn supplier(&self) -> &'static str {
        SUPPLIER
    }

    fn kind(&self) -> DocumentKind {
        DocumentKind::Invoice
    }

    fn extract(&self, text: &str, parties: &Parties) -> Vec<RawFieldSet> {
        vec![self.layout.extract(text, parties)]
    }
}
