//! Harbour Dairy Supplies statements. The reference column is narrow, so
//! long references push the amount onto the following line.

use lazy_static::lazy_static;
use regex::Regex;

use super::layout::StatementLayout;
use crate::models::record::{Parties, RawFieldSet};
use crate::registry::{DocumentKind, ExtractionStrategy};

pub const SUPPLIER: &str = "Harbour Dairy Supplies";

const DATE_FORMATS: &[&str] = &["%d/%m/%Y"];

lazy_static! {
    static ref LEDGER_HEADER: Regex = Regex::new(r"(?i)^Invoice\s+Date\s+Due\b").unwrap();
    static ref OUTSTANDING_FOOTER: Regex = Regex::new(r"(?i)^Total\s+Outstanding\b").unwrap();
    // HD-20817  03/01/2025  02/02/2025  PO-33019  212.40
    static ref LEDGER_ROW: Regex = Regex::new(
        r"^(?P<invoice_no>HD-\d+)\s+(?P<date>\d{2}/\d{2}/\d{4})\s+(?P<due>\d{2}/\d{2}/\d{4})(?:\s+(?P<reference>.+?))?\s+(?P<amount>-?[\d,]+\.\d{2})$"
    ).unwrap();
}

/// Harbour Dairy statement of account.
pub struct HarbourDairyStatement {
    layout: StatementLayout,
}

impl HarbourDairyStatement {
    pub fn new() -> Self {
        Self {
            layout: StatementLayout::new(&LEDGER_ROW, DATE_FORMATS)
                .with_section(&LEDGER_HEADER, &OUTSTANDING_FOOTER)
                .with_stitching(),
        }
    }
}

impl Default for HarbourDairyStatement {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionStrategy for HarbourDairyStatement {
    fn name(&self) -> &'static str {
        "harbour_dairy_statement"
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
