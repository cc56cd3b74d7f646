//! Sourdough Factory LLP: labelled invoices and an ISO-dated ledger statement.

use lazy_static::lazy_static;
use regex::Regex;

use super::layout::{AmountRule, DateRule, InvoiceLayout, StatementLayout};
use crate::models::record::{Parties, RawFieldSet};
use crate::registry::{DocumentKind, ExtractionStrategy};

pub const SUPPLIER: &str = "Sourdough Factory LLP";

const INVOICE_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d %b %Y"];
const STATEMENT_DATE_FORMATS: &[&str] = &["%Y-%m-%d"];

lazy_static! {
    static ref INVOICE_NO: Regex =
        Regex::new(r"(?i)Invoice No[:.\s]*([A-Z0-9][A-Z0-9/\-]*)").unwrap();
    static ref INVOICE_DATE: Regex = Regex::new(
        r"(?i)Invoice Date[:\s]*(\d{4}-\d{2}-\d{2}|\d{1,2}/\d{1,2}/\d{4}|\d{1,2}\s+[A-Z]{3,9}\s+\d{4})"
    ).unwrap();
    // Sourdough bills against delivery, so the delivery date is the due date
    static ref DELIVERY_DATE: Regex = Regex::new(
        r"(?i)Delivery Date[:\s]*(\d{4}-\d{2}-\d{2}|\d{1,2}/\d{1,2}/\d{4}|\d{1,2}\s+[A-Z]{3,9}\s+\d{4})"
    ).unwrap();
    static ref PO_REF: Regex = Regex::new(r"(?i)Po Ref[:\s]*([A-Z0-9][A-Z0-9\-]*)").unwrap();
    static ref BALANCE_DUE: Regex =
        Regex::new(r"(?i)Balance Due[:\s]*(?:S?\$)?\s*([\d,]+\.\d{2})").unwrap();

    // 2025-01-05  20451  2025-02-04  PO5521  1,234.56  1,234.56
    static ref LEDGER_ROW: Regex = Regex::new(
        r"^(?P<date>\d{4}-\d{2}-\d{2})\s+(?P<invoice_no>\S+)\s+(?P<due>\d{4}-\d{2}-\d{2})\s+(?:(?P<reference>\S+)\s+)?(?P<amount>-?[\d,]+\.\d{2})\s+(?P<balance>-?[\d,]+\.\d{2})$"
    ).unwrap();
}

/// Sourdough Factory invoice.
pub struct SourdoughInvoice {
    layout: InvoiceLayout,
}

impl SourdoughInvoice {
    pub fn new() -> Self {
        Self {
            layout: InvoiceLayout {
                invoice_no: vec![&*INVOICE_NO],
                invoice_date: DateRule::new(vec![&*INVOICE_DATE], INVOICE_DATE_FORMATS),
                due_date: Some(DateRule::new(vec![&*DELIVERY_DATE], INVOICE_DATE_FORMATS)),
                reference: vec![&*PO_REF],
                amount: AmountRule::LastLabeled(&BALANCE_DUE),
            },
        }
    }
}

impl Default for SourdoughInvoice {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionStrategy for SourdoughInvoice {
    fn name(&self) -> &'static str {
        "sourdough_invoice"
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

/// Sourdough Factory statement. The ledger closes with a running-total row
/// laid out exactly like an item row.
pub struct SourdoughStatement {
    layout: StatementLayout,
}

impl SourdoughStatement {
    pub fn new() -> Self {
        Self {
            layout: StatementLayout::new(&LEDGER_ROW, STATEMENT_DATE_FORMATS).with_trailing_total(),
        }
    }
}

impl Default for SourdoughStatement {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionStrategy for SourdoughStatement {
    fn name(&self) -> &'static str {
        "sourdough_statement"
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::RawAmount;
    use pretty_assertions::assert_eq;

    fn parties() -> Parties {
        Parties::new(SUPPLIER, "Bakehouse Pte Ltd")
    }

    #[test]
    fn test_invoice_fields() {
        let text = "SOURDOUGH FACTORY LLP\nTAX INVOICE\nInvoice No: 20451\nInvoice Date: 2025-01-05\n\
                    Po Ref: PO5521\nDelivery Date: 2025-01-06\nSourdough loaf x 40\nBalance Due: $1,234.56";

        let rows = SourdoughInvoice::new().extract(text, &parties());
        assert_eq!(rows.len(), 1);

        let raw = &rows[0];
        assert_eq!(raw.invoice_no.as_deref(), Some("20451"));
        assert_eq!(raw.invoice_date.as_deref(), Some("05/01/2025"));
        assert_eq!(raw.due_date.as_deref(), Some("06/01/2025"));
        assert_eq!(raw.reference.as_deref(), Some("PO5521"));
        assert_eq!(raw.amount, Some(RawAmount::from("1234.56")));
        assert_eq!(raw.company_name, "Bakehouse Pte Ltd");
    }

    #[test]
    fn test_invoice_with_prefixed_number_and_named_month() {
        let text = "Invoice No: INV-1001\nInvoice Date: 05 Jan 2025\nBalance Due: $1,234.56";
        let raw = &SourdoughInvoice::new().extract(text, &parties())[0];

        assert_eq!(raw.invoice_no.as_deref(), Some("INV-1001"));
        assert_eq!(raw.invoice_date.as_deref(), Some("05/01/2025"));
        assert_eq!(raw.amount, Some(RawAmount::from("1234.56")));
        assert_eq!(raw.due_date, None);
        assert_eq!(raw.reference, None);
    }

    #[test]
    fn test_invoice_without_labels_is_one_blank_set() {
        let rows = SourdoughInvoice::new().extract("illegible scan", &parties());
        assert_eq!(rows.len(), 1);
        assert!(rows[0].is_blank());
    }

    #[test]
    fn test_statement_drops_running_total() {
        let text = "SOURDOUGH FACTORY LLP\nSTATEMENT OF ACCOUNT\n\
                    Date        Invoice  Due Date    Ref      Amount    Balance\n\
                    2025-01-05  20451    2025-02-04  PO5521   1,234.56  1,234.56\n\
                    2025-01-12  20467    2025-02-11           500.00    1,734.56\n\
                    2025-01-19  20488    2025-02-18  PO5533   265.44    2,000.00\n\
                    2025-01-31  Total    2025-01-31           2,000.00  2,000.00";

        let rows = SourdoughStatement::new().extract(text, &parties());
        assert_eq!(rows.len(), 3);

        let numbers: Vec<_> = rows.iter().filter_map(|r| r.invoice_no.as_deref()).collect();
        assert_eq!(numbers, vec!["20451", "20467", "20488"]);

        assert_eq!(rows[0].invoice_date.as_deref(), Some("05/01/2025"));
        assert_eq!(rows[0].due_date.as_deref(), Some("04/02/2025"));
        assert_eq!(rows[0].reference.as_deref(), Some("PO5521"));
        assert_eq!(rows[0].amount, Some(RawAmount::from("1234.56")));
        assert_eq!(rows[1].reference, None);
        assert_eq!(rows[1].amount, Some(RawAmount::from("500.00")));
    }

    #[test]
    fn test_statement_without_rows() {
        let rows = SourdoughStatement::new().extract("STATEMENT OF ACCOUNT\nNo activity", &parties());
        assert!(rows.is_empty());
    }
}
