//! Fu Luxe Pte. Ltd.: accounting-package invoices and activity statements.

use lazy_static::lazy_static;
use regex::Regex;

use super::layout::{AmountRule, DateRule, InvoiceLayout, StatementLayout};
use crate::models::record::{Parties, RawFieldSet};
use crate::registry::{DocumentKind, ExtractionStrategy};

pub const SUPPLIER: &str = "Fu Luxe Pte. Ltd.";

const DATE_FORMATS: &[&str] = &["%d %b %Y"];

lazy_static! {
    static ref INVOICE_NO: Regex = Regex::new(r"(?i)Invoice Number[:.]?\s*(INV-\d+)").unwrap();
    static ref INVOICE_DATE: Regex =
        Regex::new(r"(?i)Invoice Date[:.]?\s*(\d{1,2}\s+[A-Z]{3}\s+\d{4})").unwrap();
    static ref DUE_DATE: Regex =
        Regex::new(r"(?i)Due Date[:.]?\s*(\d{1,2}\s+[A-Z]{3}\s+\d{4})").unwrap();
    // Label and value may sit on separate lines
    static ref REFERENCE: Regex = Regex::new(r"(?im)^\s*Reference\b[:.]?\s*(.+)$").unwrap();
    static ref AMOUNT_DUE: Regex =
        Regex::new(r"(?i)Amount Due SGD\s*([\d,]+\.\d{2})").unwrap();
    static ref INVOICE_TOTAL: Regex =
        Regex::new(r"(?i)Invoice Total SGD\s*([\d,]+\.\d{2})").unwrap();

    static ref ACTIVITY_HEADER: Regex = Regex::new(r"(?i)^Activity$").unwrap();
    static ref BALANCE_FOOTER: Regex = Regex::new(r"(?i)^BALANCE DUE\b").unwrap();
    // 05 Jan 2025  Invoice # INV-0042  PO-7781  Due 04 Feb 2025  1,234.56  1,234.56
    static ref ACTIVITY_ROW: Regex = Regex::new(
        r"^(?P<date>\d{1,2}\s+[A-Za-z]{3}\s+\d{4})\s+Invoice\s*#\s*(?P<invoice_no>INV-\d+)\s+(?:(?P<reference>\S+)\s+)?Due\s+(?P<due>\d{1,2}\s+[A-Za-z]{3}\s+\d{4})\s+(?P<amount>-?[\d,]+\.\d{2})\s+(?P<balance>-?[\d,]+\.\d{2})$"
    ).unwrap();
}

/// Fu Luxe invoice.
pub struct FuLuxeInvoice {
    layout: InvoiceLayout,
}

impl FuLuxeInvoice {
    pub fn new() -> Self {
        Self {
            layout: InvoiceLayout {
                invoice_no: vec![&*INVOICE_NO],
                invoice_date: DateRule::new(vec![&*INVOICE_DATE], DATE_FORMATS),
                due_date: Some(DateRule::new(vec![&*DUE_DATE], DATE_FORMATS)),
                reference: vec![&*REFERENCE],
                amount: AmountRule::FirstLabeled(vec![&*AMOUNT_DUE, &*INVOICE_TOTAL]),
            },
        }
    }
}

impl Default for FuLuxeInvoice {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionStrategy for FuLuxeInvoice {
    fn name(&self) -> &'static str {
        "fu_luxe_invoice"
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

/// Fu Luxe statement. Only the activity table between its header and the
/// balance footer is read; the remittance slip below repeats rows.
pub struct FuLuxeStatement {
    layout: StatementLayout,
}

impl FuLuxeStatement {
    pub fn new() -> Self {
        Self {
            layout: StatementLayout::new(&ACTIVITY_ROW, DATE_FORMATS)
                .with_section(&ACTIVITY_HEADER, &BALANCE_FOOTER),
        }
    }
}

impl Default for FuLuxeStatement {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionStrategy for FuLuxeStatement {
    fn name(&self) -> &'static str {
        "fu_luxe_statement"
    }

    fn supplier(&self) -> &'static str {
        SUPPLIER
    }

    fn kind(&self) -> DocumentKind {
        DocumentKind::StatementOfAccount
    }

    fn extract(&self, text: &str, parties: &Parties) -> Vec<RawFieldSet> {
        self.layout.scan(text, parties)
    }
}
