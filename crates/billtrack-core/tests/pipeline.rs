//! End-to-end extraction scenarios.

use std::str::FromStr;

use billtrack_core::classify::classify;
use billtrack_core::coerce::{GENERIC_DATE_FORMATS, parse_amount_str, parse_date};
use billtrack_core::{
    DocumentInput, DocumentKind, DuplicateKey, ExtractionStrategy, KnownKeys, Parties, Pipeline,
    RawFieldSet, Route, StaticFallback, StrategyRegistry,
};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;

fn parties() -> Parties {
    Parties::new("Sourdough Factory LLP", "Bakehouse Pte Ltd")
}

fn invoice(text: &str) -> DocumentInput {
    DocumentInput::new(text, parties(), DocumentKind::Invoice)
}

fn statement(text: &str) -> DocumentInput {
    DocumentInput::new(text, parties(), DocumentKind::StatementOfAccount)
}

const LABELLED_INVOICE: &str = "SOURDOUGH FACTORY LLP\n\
                                12 Bakery Lane, Singapore\n\
                                TAX INVOICE\n\
                                Invoice No: INV-1001\n\
                                Invoice Date: 05 Jan 2025\n\
                                Country loaf x 20     400.00\n\
                                Subtotal              1,132.62\n\
                                GST 9%                101.94\n\
                                Balance Due: $1,234.56";

const LEDGER: &str = "SOURDOUGH FACTORY LLP\n\
                      STATEMENT OF ACCOUNT\n\
                      Date        Invoice  Due Date    Ref      Amount    Balance\n\
                      2025-01-05  20451    2025-02-04  PO5521   1,234.56  1,234.56\n\
                      2025-01-12  20467    2025-02-11           500.00    1,734.56\n\
                      2025-01-19  20488    2025-02-18  PO5533   265.44    2,000.00\n\
                      2025-01-31  Total    2025-01-31           2,000.00  2,000.00";

#[test]
fn labelled_invoice_yields_one_valid_record() {
    let outcome = Pipeline::new().process(&invoice(LABELLED_INVOICE));

    assert_eq!(outcome.route, Route::Strategy);
    assert_eq!(outcome.strategy.as_deref(), Some("sourdough_invoice"));
    assert_eq!(outcome.records.len(), 1);

    let record = &outcome.records[0];
    assert_eq!(record.invoice_no.as_deref(), Some("INV-1001"));
    assert_eq!(record.invoice_date.as_deref(), Some("05/01/2025"));
    assert_eq!(record.amount, Some(Decimal::from_str("1234.56").unwrap()));
    assert!(record.is_valid);
    assert!(!record.is_duplicate);
    assert_eq!(record.supplier_name, "Sourdough Factory LLP");
    assert_eq!(record.company_name, "Bakehouse Pte Ltd");
}

#[test]
fn statement_trailing_total_is_not_a_record() {
    let outcome = Pipeline::new().process(&statement(LEDGER));

    assert_eq!(outcome.strategy.as_deref(), Some("sourdough_statement"));
    assert_eq!(outcome.records.len(), 3);
    assert!(outcome.records.iter().all(|r| r.is_valid));
    assert_eq!(
        outcome.records[2].amount,
        Some(Decimal::from_str("265.44").unwrap())
    );
}

#[test]
fn unmatched_document_without_fallback_is_one_empty_invalid_record() {
    let outcome = Pipeline::new().process(&invoice("Corner Mart\nReceipt 0042\nTotal 12.00"));

    assert_eq!(outcome.route, Route::Unmatched);
    assert!(outcome.matched.is_none());
    assert_eq!(outcome.records.len(), 1);

    let record = &outcome.records[0];
    assert_eq!(record.invoice_no, None);
    assert_eq!(record.invoice_date, None);
    assert_eq!(record.due_date, None);
    assert_eq!(record.amount, None);
    assert_eq!(record.reference, None);
    assert!(!record.is_valid);
}

#[test]
fn unmatched_document_goes_to_fallback_when_allowed() {
    let mut canned = RawFieldSet::default();
    canned.invoice_no = Some("R-42".to_string());
    canned.invoice_date = Some("2025-03-01".to_string());
    canned.amount = Some("12.00".into());

    let pipeline = Pipeline::new().with_fallback(Box::new(StaticFallback::new(canned)));
    let outcome = pipeline.process(&invoice("Corner Mart\nReceipt 0042").with_fallback(true));

    assert_eq!(outcome.route, Route::Fallback);
    assert_eq!(outcome.records[0].invoice_date.as_deref(), Some("01/03/2025"));
    assert!(outcome.records[0].is_valid);
}

#[test]
fn equivalent_date_formats_share_one_canonical_form() {
    let canonical = parse_date("05/01/2025", GENERIC_DATE_FORMATS);
    for raw in ["05 Jan 2025", "2025-01-05", "05-Jan-2025", "5 January 2025"] {
        assert_eq!(parse_date(raw, GENERIC_DATE_FORMATS), canonical, "input {raw}");
    }
}

#[test]
fn amounts_ignore_separators_and_symbols() {
    let plain = parse_amount_str("1234.56");
    for raw in ["$1,234.56", "SGD 1,234.56", "S$ 1,234.56"] {
        assert_eq!(parse_amount_str(raw), plain, "input {raw}");
    }
}

#[test]
fn classification_is_deterministic_and_prefers_verbatim_labels() {
    let labels = ["Sourdough Factory LLP", "Fu Luxe Pte. Ltd."];
    let first = classify(LABELLED_INVOICE, &labels, 85.0);
    let second = classify(LABELLED_INVOICE, &labels, 85.0);

    assert_eq!(first, second);
    assert_eq!(first.unwrap().label, "Sourdough Factory LLP");
}

#[test]
fn batch_flags_known_keys_after_date_normalization() {
    let pipeline = Pipeline::new();
    let known: KnownKeys = pipeline.normalizer().known_keys(vec![DuplicateKey {
        invoice_no: "20451".to_string(),
        invoice_date: "2025-01-05".to_string(),
    }]);

    let report = pipeline.process_batch(
        &[
            statement(LEDGER).with_source("ledger.txt"),
            invoice("nothing recognisable").with_source("blank.txt"),
        ],
        &known,
    );

    assert_eq!(report.documents.len(), 2);
    assert_eq!(report.record_count(), 4);
    assert_eq!(report.partition.duplicates.len(), 1);
    assert_eq!(report.partition.duplicates[0].invoice_no.as_deref(), Some("20451"));
    assert_eq!(report.partition.invalid.len(), 1);
    assert_eq!(report.insert_payload().len(), 2);
    assert_eq!(report.unmatched_count(), 1);
}

#[test]
fn batch_siblings_do_not_extend_the_snapshot() {
    let pipeline = Pipeline::new();
    let report = pipeline.process_batch(
        &[invoice(LABELLED_INVOICE), invoice(LABELLED_INVOICE)],
        &KnownKeys::new(),
    );

    assert_eq!(report.insert_payload().len(), 2);
    assert!(report.partition.duplicates.is_empty());
}

struct Kiosk;

impl ExtractionStrategy for Kiosk {
    fn name(&self) -> &'static str {
        "kiosk_invoice"
    }

    fn supplier(&self) -> &'static str {
        "Kiosk Coffee Roasters"
    }

    fn kind(&self) -> DocumentKind {
        DocumentKind::Invoice
    }

    fn extract(&self, text: &str, parties: &Parties) -> Vec<RawFieldSet> {
        let mut raw = RawFieldSet::empty(parties);
        raw.invoice_no = text
            .lines()
            .find_map(|l| l.strip_prefix("Bill #"))
            .map(|s| s.trim().to_string());
        vec![raw]
    }
}

#[test]
fn custom_strategy_registers_alongside_builtins() {
    let mut registry = StrategyRegistry::builtin();
    let before = registry.len();
    registry.register(Box::new(Kiosk)).unwrap();
    assert_eq!(registry.len(), before + 1);

    let pipeline = Pipeline::new().with_registry(registry);
    let outcome = pipeline.process(&invoice("KIOSK COFFEE ROASTERS\nBill # K-77"));

    assert_eq!(outcome.strategy.as_deref(), Some("kiosk_invoice"));
    assert_eq!(outcome.records[0].invoice_no.as_deref(), Some("K-77"));
    assert!(!outcome.records[0].is_valid);
}
