//! Declarative layout engines shared by the supplier strategies.
//!
//! An invoice layout is a handful of anchor rules; a statement layout is a
//! row pattern plus a few scanning switches. Supplier modules only declare
//! these, the engines here do the walking.

use regex::{Captures, Regex};
use tracing::trace;

use crate::coerce::{capture_last, first_capture, last_money_token, parse_date, strip_grouping};
use crate::models::record::{Parties, RawAmount, RawFieldSet};

/// Where a date field lives and how it is written.
#[derive(Debug, Clone)]
pub struct DateRule {
    /// Anchor patterns, tried in order.
    pub patterns: Vec<&'static Regex>,
    /// Formats tried in order; first successful parse wins.
    pub formats: &'static [&'static str],
}

impl DateRule {
    pub fn new(patterns: Vec<&'static Regex>, formats: &'static [&'static str]) -> Self {
        Self { patterns, formats }
    }

    /// Captured date in canonical form, or as found when no format fits.
    pub fn resolve(&self, text: &str) -> Option<String> {
        first_capture(text, &self.patterns).map(|raw| parse_date(&raw, self.formats))
    }
}

/// How to pick the billable amount among several candidates.
#[derive(Debug, Clone)]
pub enum AmountRule {
    /// Labeled patterns in priority order; the first that captures wins.
    FirstLabeled(Vec<&'static Regex>),
    /// The last occurrence of a labeled total in the document.
    LastLabeled(&'static Regex),
    /// The last money token on the last matching line that carries one.
    LastTokenOnLine(&'static Regex),
}

impl AmountRule {
    /// Selected amount with grouping separators stripped.
    pub fn resolve(&self, text: &str) -> Option<String> {
        let found = match self {
            AmountRule::FirstLabeled(patterns) => first_capture(text, patterns),
            AmountRule::LastLabeled(pattern) => capture_last(text, pattern),
            AmountRule::LastTokenOnLine(line_pattern) => text
                .lines()
                .filter(|line| line_pattern.is_match(line))
                .rev()
                .find_map(last_money_token),
        };
        found.map(|s| strip_grouping(&s))
    }
}

/// Field rules for a single-invoice layout.
#[derive(Debug, Clone)]
pub struct InvoiceLayout {
    pub invoice_no: Vec<&'static Regex>,
    pub invoice_date: DateRule,
    pub due_date: Option<DateRule>,
    pub reference: Vec<&'static Regex>,
    pub amount: AmountRule,
}

impl InvoiceLayout {
    /// Apply every rule. Always yields one field-set; misses stay `None`.
    pub fn extract(&self, text: &str, parties: &Parties) -> RawFieldSet {
        let mut raw = RawFieldSet::empty(parties);

        raw.invoice_no = first_capture(text, &self.invoice_no);
        raw.invoice_date = self.invoice_date.resolve(text);
        raw.due_date = self.due_date.as_ref().and_then(|rule| rule.resolve(text));
        raw.reference = first_capture(text, &self.reference);
        raw.amount = self.amount.resolve(text).map(RawAmount::Text);

        raw
    }
}

/// Line-item scanner for statement-of-account layouts.
///
/// The row pattern must be anchored (`^...$`) and use the named groups
/// `invoice_no`, `date` and `amount`; `due` and `reference` are optional.
#[derive(Debug, Clone)]
pub struct StatementLayout {
    pub row: &'static Regex,
    pub date_formats: &'static [&'static str],
    /// Retry a non-matching line joined with its successor, unless the
    /// successor is a row of its own.
    pub stitch_wrapped: bool,
    /// The last matched row is a running total, not an item.
    pub drop_trailing_row: bool,
    /// Ledger section starts after the first line matching this.
    pub start_after: Option<&'static Regex>,
    /// Ledger section ends at the first line matching this.
    pub stop_at: Option<&'static Regex>,
}

impl StatementLayout {
    pub fn new(row: &'static Regex, date_formats: &'static [&'static str]) -> Self {
        Self {
            row,
            date_formats,
            stitch_wrapped: false,
            drop_trailing_row: false,
            start_after: None,
            stop_at: None,
        }
    }

    pub fn with_stitching(mut self) -> Self {
        self.stitch_wrapped = true;
        self
    }

    pub fn with_trailing_total(mut self) -> Self {
        self.drop_trailing_row = true;
        self
    }

    pub fn with_section(mut self, start_after: &'static Regex, stop_at: &'static Regex) -> Self {
        self.start_after = Some(start_after);
        self.stop_at = Some(stop_at);
        self
    }

    /// Walk the ledger and emit one field-set per matched row.
    pub fn scan(&self, text: &str, parties: &Parties) -> Vec<RawFieldSet> {
        let lines: Vec<&str> = text.lines().map(str::trim).collect();
        let (start, end) = self.section(&lines);

        let mut rows = Vec::new();
        let mut i = start;

        while i < end {
            let line = lines[i];

            if let Some(caps) = self.row.captures(line) {
                rows.push(self.to_field_set(&caps, parties));
                i += 1;
                continue;
            }

            if self.stitch_wrapped && i + 1 < end && !self.row.is_match(lines[i + 1]) {
                let stitched = format!("{} {}", line, lines[i + 1]);
                if let Some(caps) = self.row.captures(&stitched) {
                    trace!("Stitched wrapped row: {}", stitched);
                    rows.push(self.to_field_set(&caps, parties));
                    i += 2;
                    continue;
                }
            }

            i += 1;
        }

        if self.drop_trailing_row {
            rows.pop();
        }

        rows
    }

    fn section(&self, lines: &[&str]) -> (usize, usize) {
        let start = self
            .start_after
            .and_then(|re| lines.iter().position(|l| re.is_match(l)))
            .map(|idx| idx + 1)
            .unwrap_or(0);

        let end = self
            .stop_at
            .and_then(|re| lines[start..].iter().position(|l| re.is_match(l)))
            .map(|offset| start + offset)
            .unwrap_or(lines.len());

        (start, end)
    }

    fn to_field_set(&self, caps: &Captures<'_>, parties: &Parties) -> RawFieldSet {
        let group = |name: &str| {
            caps.name(name)
                .map(|m| m.as_str().trim().to_string())
                .filter(|s| !s.is_empty())
        };

        let mut raw = RawFieldSet::empty(parties);
        raw.invoice_no = group("invoice_no");
        raw.invoice_date = group("date").map(|d| parse_date(&d, self.date_formats));
        raw.due_date = group("due").map(|d| parse_date(&d, self.date_formats));
        raw.reference = group("reference");
        raw.amount = group("amount").map(|a| RawAmount::Text(strip_grouping(&a)));
        raw
    }
}
